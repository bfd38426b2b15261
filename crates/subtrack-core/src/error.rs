//! Error types for `subtrack-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::period::MonthYear;

#[derive(Debug, Error)]
pub enum Error {
  #[error("subscription not found: {0}")]
  NotFound(Uuid),

  #[error("update patch has no fields set")]
  EmptyPatch,

  #[error("service name must not be empty")]
  EmptyServiceName,

  #[error("invalid month-year {0:?}: expected MM-YYYY")]
  InvalidMonthYear(String),

  #[error("end date {end} precedes start date {start}")]
  EndBeforeStart { start: MonthYear, end: MonthYear },

  #[error("period start {start} is after period end {end}")]
  InvertedPeriod { start: MonthYear, end: MonthYear },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// The three failure classes callers are expected to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Rejected input; no storage call was made.
  Validation,
  /// The target id matched no row.
  NotFound,
  /// Anything the storage layer raised: connectivity, constraints, decoding.
  Storage,
}

/// Implemented by every error type that crosses the store boundary, so that
/// callers can branch on the failure class without knowing the backend.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound(_) => ErrorKind::NotFound,
      Self::EmptyPatch
      | Self::EmptyServiceName
      | Self::InvalidMonthYear(_)
      | Self::EndBeforeStart { .. }
      | Self::InvertedPeriod { .. } => ErrorKind::Validation,
    }
  }
}
