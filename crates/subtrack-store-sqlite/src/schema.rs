//! SQL schema for the subtrack SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout version.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// `start_date` / `end_date` hold `MM-YYYY` text. Anything that compares them
/// goes through the `YYYYMM` key (`substr(d, 4, 4) || substr(d, 1, 2)`), whose
/// text order is calendar order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS subscriptions (
    id            TEXT PRIMARY KEY,
    service_name  TEXT NOT NULL CHECK (length(service_name) > 0),
    price         INTEGER NOT NULL CHECK (price >= 0),
    user_id       TEXT NOT NULL,
    start_date    TEXT NOT NULL,   -- MM-YYYY
    end_date      TEXT,            -- MM-YYYY; NULL while still running
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned
    updated_at    TEXT NOT NULL,   -- RFC 3339 UTC; refreshed on every UPDATE
    CHECK (
      end_date IS NULL
      OR (substr(end_date, 4, 4) || substr(end_date, 1, 2))
         >= (substr(start_date, 4, 4) || substr(start_date, 1, 2))
    )
);

CREATE INDEX IF NOT EXISTS subscriptions_user_idx    ON subscriptions(user_id);
CREATE INDEX IF NOT EXISTS subscriptions_service_idx ON subscriptions(service_name);
CREATE INDEX IF NOT EXISTS subscriptions_created_idx ON subscriptions(created_at);

PRAGMA user_version = 1;
";

/// The store clock, as an SQL expression. Evaluates to the same instant for
/// every use within one statement, so an INSERT that writes it to both
/// timestamp columns gets `created_at == updated_at`.
pub const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Column list shared by every `SELECT` that decodes into a subscription.
pub const COLUMNS: &str =
  "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";
