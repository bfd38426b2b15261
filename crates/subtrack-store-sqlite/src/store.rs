//! [`SqliteStore`]: the SQLite implementation of [`SubscriptionStore`].

use std::{
  path::Path,
  sync::{Arc, atomic::AtomicBool},
};

use rusqlite::{OptionalExtension as _, params_from_iter};
use uuid::Uuid;

use subtrack_core::{
  store::SubscriptionStore,
  subscription::{
    NewSubscription, Subscription, SubscriptionFilter, SubscriptionPatch, Summary,
    SummaryQuery,
  },
};

use crate::{
  Error, Result,
  cancel::{CallGuard, run_unless_abandoned},
  encode::{RawSubscription, decode_dt},
  query::{self, Statement},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subscription store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Calls through other clones of this
  /// store fail afterwards.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the database thread. If the returned future is dropped first,
  /// the call is skipped or interrupted.
  async fn call<R, F>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let guard = CallGuard::new();
    let out = self.call_flagged(guard.flag(), f).await;
    guard.finish();
    out
  }

  pub(crate) async fn call_flagged<R, F>(&self, abandoned: Arc<AtomicBool>, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let out = self
      .conn
      .call(move |conn| Ok(run_unless_abandoned(conn, &abandoned, f)?))
      .await?;
    Ok(out)
  }

  /// Execute a mutating statement and return the affected-row count.
  async fn execute(&self, stmt: Statement) -> Result<usize> {
    self
      .call(move |conn| {
        let Statement { sql, args } = stmt;
        conn.execute(&sql, params_from_iter(args))
      })
      .await
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewSubscription) -> Result<Subscription> {
    input.validate()?;

    let id   = Uuid::new_v4();
    let stmt = query::insert_subscription(id, &input);

    let (created_at, updated_at): (String, String) = self
      .call(move |conn| {
        let Statement { sql, args } = stmt;
        conn.query_row(&sql, params_from_iter(args), |row| Ok((row.get(0)?, row.get(1)?)))
      })
      .await?;

    Ok(Subscription {
      id,
      service_name: input.service_name,
      price:        input.price,
      user_id:      input.user_id,
      start_date:   input.start_date,
      end_date:     input.end_date,
      created_at:   decode_dt(&created_at)?,
      updated_at:   decode_dt(&updated_at)?,
    })
  }

  async fn get(&self, id: Uuid) -> Result<Subscription> {
    let stmt = query::select_subscription(id);

    let raw: Option<RawSubscription> = self
      .call(move |conn| {
        let Statement { sql, args } = stmt;
        conn
          .query_row(&sql, params_from_iter(args), RawSubscription::from_row)
          .optional()
      })
      .await?;

    raw.ok_or(Error::NotFound(id))?.into_subscription()
  }

  async fn update(&self, id: Uuid, patch: SubscriptionPatch) -> Result<()> {
    patch.validate()?;
    let stmt = query::update_subscription(id, &patch)?;

    match self.execute(stmt).await? {
      0 => Err(Error::NotFound(id)),
      _ => Ok(()),
    }
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    match self.execute(query::delete_subscription(id)).await? {
      0 => Err(Error::NotFound(id)),
      _ => Ok(()),
    }
  }

  async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>> {
    let stmt = query::list_subscriptions(filter);

    let raws: Vec<RawSubscription> = self
      .call(move |conn| {
        let Statement { sql, args } = stmt;
        let mut prepared = conn.prepare(&sql)?;
        let rows = prepared
          .query_map(params_from_iter(args), RawSubscription::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  async fn summarize(&self, query: &SummaryQuery) -> Result<Summary> {
    let stmt = query::summarize_subscriptions(query);

    let (total_cost, count): (i64, i64) = self
      .call(move |conn| {
        let Statement { sql, args } = stmt;
        conn.query_row(&sql, params_from_iter(args), |row| Ok((row.get(0)?, row.get(1)?)))
      })
      .await?;

    let non_negative = |v: i64| {
      u64::try_from(v).map_err(|_| Error::Decode(format!("negative aggregate: {v}")))
    };
    Ok(Summary { total_cost: non_negative(total_cost)?, count: non_negative(count)? })
  }
}
