//! Abandoning database calls whose caller has gone away.
//!
//! A [`CallGuard`] lives in the caller's future. If that future is dropped
//! before the call completes, the guard raises a shared flag. The database
//! thread checks the flag before starting the call and, through an SQLite
//! progress handler, while the statement runs.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use rusqlite::{Connection, ffi};

/// VM instructions between progress-handler checks.
const PROGRESS_OPS: i32 = 1_000;

pub(crate) struct CallGuard {
  abandoned: Arc<AtomicBool>,
  finished:  bool,
}

impl CallGuard {
  pub fn new() -> Self {
    Self { abandoned: Arc::new(AtomicBool::new(false)), finished: false }
  }

  pub fn flag(&self) -> Arc<AtomicBool> { Arc::clone(&self.abandoned) }

  /// The call completed; dropping the guard no longer abandons anything.
  pub fn finish(mut self) { self.finished = true; }
}

impl Drop for CallGuard {
  fn drop(&mut self) {
    if !self.finished {
      self.abandoned.store(true, Ordering::Release);
    }
  }
}

fn interrupted() -> rusqlite::Error {
  rusqlite::Error::SqliteFailure(
    ffi::Error::new(ffi::SQLITE_INTERRUPT),
    Some("call abandoned by caller".to_owned()),
  )
}

/// Run `f` on `conn` unless `abandoned` is already set, interrupting the
/// running statement if it becomes set midway.
pub(crate) fn run_unless_abandoned<R>(
  conn: &mut Connection,
  abandoned: &Arc<AtomicBool>,
  f: impl FnOnce(&mut Connection) -> rusqlite::Result<R>,
) -> rusqlite::Result<R> {
  if abandoned.load(Ordering::Acquire) {
    return Err(interrupted());
  }

  let flag = Arc::clone(abandoned);
  conn.progress_handler(PROGRESS_OPS, Some(move || flag.load(Ordering::Acquire)));
  let out = f(conn);
  conn.progress_handler(0, None::<fn() -> bool>);
  out
}
