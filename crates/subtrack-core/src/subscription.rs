//! Subscription records and the request shapes that create, patch, list and
//! summarise them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  period::{ActiveWindow, MonthYear, Period},
};

// ─── Subscription ────────────────────────────────────────────────────────────

/// A user's subscription to a paid service, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  /// Store-assigned; never changes after creation.
  pub id:           Uuid,
  pub service_name: String,
  /// Monthly price in the smallest currency unit.
  pub price:        u32,
  pub user_id:      Uuid,
  /// First active month.
  pub start_date:   MonthYear,
  /// Last active month; `None` while the subscription is still running.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_date:     Option<MonthYear>,
  pub created_at:   DateTime<Utc>,
  /// Refreshed by the store on every update.
  pub updated_at:   DateTime<Utc>,
}

impl Subscription {
  pub fn active_window(&self) -> ActiveWindow {
    ActiveWindow { start: self.start_date, end: self.end_date }
  }
}

fn check_dates(start: MonthYear, end: Option<MonthYear>) -> Result<()> {
  match end {
    Some(end) if end < start => Err(Error::EndBeforeStart { start, end }),
    _ => Ok(()),
  }
}

// ─── NewSubscription ─────────────────────────────────────────────────────────

/// Input to [`crate::store::SubscriptionStore::create`].
/// `id`, `created_at` and `updated_at` are always set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
  pub service_name: String,
  pub price:        u32,
  pub user_id:      Uuid,
  pub start_date:   MonthYear,
  #[serde(default)]
  pub end_date:     Option<MonthYear>,
}

impl NewSubscription {
  /// An open-ended subscription starting at `start_date`.
  pub fn new(
    service_name: impl Into<String>,
    price: u32,
    user_id: Uuid,
    start_date: MonthYear,
  ) -> Self {
    Self {
      service_name: service_name.into(),
      price,
      user_id,
      start_date,
      end_date: None,
    }
  }

  pub fn with_end_date(mut self, end_date: MonthYear) -> Self {
    self.end_date = Some(end_date);
    self
  }

  pub fn validate(&self) -> Result<()> {
    if self.service_name.trim().is_empty() {
      return Err(Error::EmptyServiceName);
    }
    check_dates(self.start_date, self.end_date)
  }
}

// ─── SubscriptionPatch ───────────────────────────────────────────────────────

/// A sparse update: `None` leaves the column untouched, `Some` overwrites it.
///
/// `end_date` can be set but not cleared back to open-ended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubscriptionPatch {
  pub service_name: Option<String>,
  pub price:        Option<u32>,
  pub start_date:   Option<MonthYear>,
  pub end_date:     Option<MonthYear>,
}

impl SubscriptionPatch {
  pub fn is_empty(&self) -> bool {
    self.service_name.is_none()
      && self.price.is_none()
      && self.start_date.is_none()
      && self.end_date.is_none()
  }

  /// Checks what can be checked without reading the stored row.
  pub fn validate(&self) -> Result<()> {
    if self.is_empty() {
      return Err(Error::EmptyPatch);
    }
    if self.service_name.as_deref().is_some_and(|s| s.trim().is_empty()) {
      return Err(Error::EmptyServiceName);
    }
    match self.start_date {
      Some(start) => check_dates(start, self.end_date),
      None => Ok(()),
    }
  }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::SubscriptionStore::list`]. All filters are
/// exact matches; an empty filter lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
  pub user_id:      Option<Uuid>,
  pub service_name: Option<String>,
}

/// Parameters for [`crate::store::SubscriptionStore::summarize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
  pub period:       Period,
  pub user_id:      Option<Uuid>,
  pub service_name: Option<String>,
}

impl SummaryQuery {
  /// Unfiltered summary over `period`.
  pub fn new(period: Period) -> Self {
    Self { period, user_id: None, service_name: None }
  }
}

/// Aggregate cost of the subscriptions active during a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
  /// Sum of `price` over matching subscriptions; `0` when none match.
  pub total_cost: u64,
  pub count:      u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn my(s: &str) -> MonthYear { s.parse().unwrap() }

  #[test]
  fn new_subscription_validation() {
    let user = Uuid::new_v4();
    assert!(NewSubscription::new("Netflix", 999, user, my("01-2024")).validate().is_ok());

    let blank = NewSubscription::new("   ", 999, user, my("01-2024"));
    assert!(matches!(blank.validate(), Err(Error::EmptyServiceName)));

    let inverted = NewSubscription::new("Netflix", 999, user, my("05-2024")).with_end_date(my("04-2024"));
    assert!(matches!(inverted.validate(), Err(Error::EndBeforeStart { .. })));

    let same_month = NewSubscription::new("Netflix", 999, user, my("05-2024")).with_end_date(my("05-2024"));
    assert!(same_month.validate().is_ok());
  }

  #[test]
  fn empty_patch_is_rejected() {
    let patch = SubscriptionPatch::default();
    assert!(patch.is_empty());
    assert!(matches!(patch.validate(), Err(Error::EmptyPatch)));
  }

  #[test]
  fn patch_checks_dates_only_when_both_present() {
    let only_end = SubscriptionPatch { end_date: Some(my("01-2000")), ..Default::default() };
    assert!(only_end.validate().is_ok());

    let both = SubscriptionPatch {
      start_date: Some(my("02-2024")),
      end_date: Some(my("01-2024")),
      ..Default::default()
    };
    assert!(matches!(both.validate(), Err(Error::EndBeforeStart { .. })));
  }

  #[test]
  fn patch_deserialises_sparse_json() {
    let patch: SubscriptionPatch = serde_json::from_str(r#"{"price": 500}"#).unwrap();
    assert_eq!(patch, SubscriptionPatch { price: Some(500), ..Default::default() });
  }

  #[test]
  fn open_ended_subscription_omits_end_date_in_json() {
    let now = Utc::now();
    let sub = Subscription {
      id:           Uuid::new_v4(),
      service_name: "Yandex Plus".into(),
      price:        400,
      user_id:      Uuid::new_v4(),
      start_date:   my("07-2025"),
      end_date:     None,
      created_at:   now,
      updated_at:   now,
    };
    let json = serde_json::to_value(&sub).unwrap();
    assert_eq!(json["start_date"], "07-2025");
    assert!(json.get("end_date").is_none());
  }
}
