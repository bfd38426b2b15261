//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! UUIDs are hyphenated lowercase strings, timestamps RFC 3339 strings, and
//! months `MM-YYYY` strings.

use chrono::{DateTime, Utc};
use subtrack_core::{period::MonthYear, subscription::Subscription};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── MonthYear ───────────────────────────────────────────────────────────────

/// The stored column form, `MM-YYYY`.
pub fn encode_month(m: MonthYear) -> String { m.to_string() }

pub fn decode_month(s: &str) -> Result<MonthYear> {
  s.parse().map_err(|e: subtrack_core::Error| Error::Decode(e.to_string()))
}

/// The comparison form, `YYYYMM`. Matches the `substr` key expression used in
/// SQL so that text comparison follows calendar order.
pub fn month_key(m: MonthYear) -> String { format!("{:04}{:02}", m.year(), m.month()) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `subscriptions` row, in [`crate::schema::COLUMNS`] order.
pub struct RawSubscription {
  pub id:           String,
  pub service_name: String,
  pub price:        i64,
  pub user_id:      String,
  pub start_date:   String,
  pub end_date:     Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawSubscription {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      service_name: row.get(1)?,
      price:        row.get(2)?,
      user_id:      row.get(3)?,
      start_date:   row.get(4)?,
      end_date:     row.get(5)?,
      created_at:   row.get(6)?,
      updated_at:   row.get(7)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      id:           decode_uuid(&self.id)?,
      service_name: self.service_name,
      price:        u32::try_from(self.price)
        .map_err(|_| Error::Decode(format!("price out of range: {}", self.price)))?,
      user_id:      decode_uuid(&self.user_id)?,
      start_date:   decode_month(&self.start_date)?,
      end_date:     self.end_date.as_deref().map(decode_month).transpose()?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn month_key_sorts_like_calendar() {
    let dec: MonthYear = "12-2022".parse().unwrap();
    let jan: MonthYear = "01-2023".parse().unwrap();
    assert_eq!(month_key(dec), "202212");
    assert!(month_key(dec) < month_key(jan));
  }

  #[test]
  fn sqlite_clock_format_decodes() {
    let dt = decode_dt("2025-07-01T09:30:15.123Z").unwrap();
    assert_eq!(dt.timestamp_subsec_millis(), 123);
  }
}
