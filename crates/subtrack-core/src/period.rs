//! Month granularity calendar values and the "active during period" rule.
//!
//! Subscriptions are billed per month, so every date in the system is a
//! [`MonthYear`]. Its textual form is `MM-YYYY`; ordering is calendar order
//! (year first), which is *not* the lexicographic order of the text.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── MonthYear ───────────────────────────────────────────────────────────────

/// A calendar month, e.g. `03-2024`.
///
/// Field order matters: the derived `Ord` compares `year` before `month`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct MonthYear {
  year:  u16,
  month: u8,
}

impl MonthYear {
  /// Build from numeric parts. `month` must be 1–12, `year` 1–9999.
  pub fn new(month: u8, year: u16) -> Result<Self> {
    if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
      return Err(Error::InvalidMonthYear(format!("{month:02}-{year:04}")));
    }
    Ok(Self { year, month })
  }

  pub fn month(self) -> u8 { self.month }

  pub fn year(self) -> u16 { self.year }
}

impl fmt::Display for MonthYear {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}-{:04}", self.month, self.year)
  }
}

impl FromStr for MonthYear {
  type Err = Error;

  /// Strict `MM-YYYY`: two-digit month, dash, four-digit year.
  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::InvalidMonthYear(s.to_owned());

    let (mm, yyyy) = s.split_once('-').ok_or_else(invalid)?;
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if mm.len() != 2 || yyyy.len() != 4 || !all_digits(mm) || !all_digits(yyyy) {
      return Err(invalid());
    }

    let month = mm.parse().map_err(|_| invalid())?;
    let year = yyyy.parse().map_err(|_| invalid())?;
    Self::new(month, year).map_err(|_| invalid())
  }
}

impl TryFrom<String> for MonthYear {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<MonthYear> for String {
  fn from(m: MonthYear) -> Self { m.to_string() }
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// An inclusive window of months queried by a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
  start: MonthYear,
  end:   MonthYear,
}

impl Period {
  /// Returns [`Error::InvertedPeriod`] when `start` is after `end`.
  pub fn new(start: MonthYear, end: MonthYear) -> Result<Self> {
    if start > end {
      return Err(Error::InvertedPeriod { start, end });
    }
    Ok(Self { start, end })
  }

  pub fn start(&self) -> MonthYear { self.start }

  pub fn end(&self) -> MonthYear { self.end }
}

// ─── ActiveWindow ────────────────────────────────────────────────────────────

/// The months during which a subscription is in force. `end: None` means the
/// subscription is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
  pub start: MonthYear,
  pub end:   Option<MonthYear>,
}

impl ActiveWindow {
  /// True when the subscription was active at any point within `period`:
  /// it started no later than the period's end, and it is either open-ended
  /// or ended no earlier than the period's start.
  ///
  /// Storage backends must select summary rows with exactly this predicate.
  pub fn overlaps(&self, period: &Period) -> bool {
    self.start <= period.end() && self.end.is_none_or(|end| end >= period.start())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn my(s: &str) -> MonthYear { s.parse().unwrap() }

  fn period(start: &str, end: &str) -> Period { Period::new(my(start), my(end)).unwrap() }

  #[test]
  fn parses_and_displays_mm_yyyy() {
    let m = my("03-2024");
    assert_eq!(m.month(), 3);
    assert_eq!(m.year(), 2024);
    assert_eq!(m.to_string(), "03-2024");
  }

  #[test]
  fn rejects_malformed_month_years() {
    for bad in ["", "3-2024", "03-24", "2024-03", "13-2024", "00-2024", "03/2024", "ab-cdef", "03-0000", "+3-2024"] {
      assert!(
        matches!(bad.parse::<MonthYear>(), Err(Error::InvalidMonthYear(_))),
        "accepted {bad:?}"
      );
    }
  }

  #[test]
  fn orders_by_calendar_not_text() {
    assert!(my("12-2022") < my("01-2023"));
    assert!(my("02-2023") > my("12-2022"));
    assert!("12-2022" > "01-2023", "text order disagrees, which is the point");
  }

  #[test]
  fn inverted_period_is_rejected() {
    let err = Period::new(my("02-2023"), my("01-2023")).unwrap_err();
    assert!(matches!(err, Error::InvertedPeriod { .. }));
  }

  #[test]
  fn open_ended_subscription_overlaps_windows_after_start() {
    let w = ActiveWindow { start: my("01-2023"), end: None };
    assert!(w.overlaps(&period("06-2023", "06-2023")));
    assert!(w.overlaps(&period("12-2022", "02-2023")));
    assert!(w.overlaps(&period("01-2023", "01-2023")));
    assert!(!w.overlaps(&period("01-2022", "12-2022")));
  }

  #[test]
  fn closed_subscription_overlaps_only_intersecting_windows() {
    let w = ActiveWindow { start: my("01-2023"), end: Some(my("03-2023")) };
    assert!(w.overlaps(&period("02-2023", "02-2023")));
    assert!(w.overlaps(&period("03-2023", "05-2023")));
    assert!(w.overlaps(&period("11-2022", "01-2023")));
    assert!(!w.overlaps(&period("04-2023", "12-2023")));
    assert!(!w.overlaps(&period("06-2022", "12-2022")));
  }

  #[test]
  fn serde_uses_text_form() {
    let json = serde_json::to_string(&my("07-2025")).unwrap();
    assert_eq!(json, "\"07-2025\"");
    assert!(serde_json::from_str::<MonthYear>("\"7-2025\"").is_err());
  }
}
