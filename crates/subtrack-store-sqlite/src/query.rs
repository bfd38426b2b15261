//! Parameterised statement construction.
//!
//! [`QueryBuilder`] keeps SQL text and bound values in a single ordered list
//! and only renders `?N` placeholders in [`QueryBuilder::build`]. Placeholder
//! numbers are therefore always `?1..?n` and always line up with
//! [`Statement::args`]. SQL text can only be pushed as `&'static str`, so no
//! caller-supplied value can end up in the statement text.

use rusqlite::types::Value;
use subtrack_core::{
  Error as CoreError,
  period::Period,
  subscription::{NewSubscription, SubscriptionFilter, SubscriptionPatch, SummaryQuery},
};
use uuid::Uuid;

use crate::{
  encode::{encode_month, encode_uuid, month_key},
  schema::{COLUMNS, NOW},
};

// ─── Builder ─────────────────────────────────────────────────────────────────

enum Fragment {
  Sql(&'static str),
  Bind(Value),
}

/// A rendered statement: SQL with `?1..?n` placeholders and the values to bind,
/// in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
  pub sql:  String,
  pub args: Vec<Value>,
}

#[derive(Default)]
pub struct QueryBuilder {
  fragments: Vec<Fragment>,
}

impl QueryBuilder {
  pub fn new(sql: &'static str) -> Self {
    let mut builder = Self::default();
    builder.push(sql);
    builder
  }

  /// Append literal SQL.
  pub fn push(&mut self, sql: &'static str) -> &mut Self {
    self.fragments.push(Fragment::Sql(sql));
    self
  }

  /// Append a placeholder bound to `value`.
  pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
    self.fragments.push(Fragment::Bind(value.into()));
    self
  }

  /// Start a list of items: `prefix` is written before the first item and
  /// `separator` between items. Nothing is written if no item is pushed.
  pub fn separated(
    &mut self,
    prefix: &'static str,
    separator: &'static str,
  ) -> Separated<'_> {
    Separated { builder: self, prefix, separator, empty: true }
  }

  pub fn build(self) -> Statement {
    let mut sql = String::new();
    let mut args = Vec::new();
    for fragment in self.fragments {
      match fragment {
        Fragment::Sql(s) => sql.push_str(s),
        Fragment::Bind(value) => {
          args.push(value);
          sql.push('?');
          sql.push_str(&args.len().to_string());
        }
      }
    }
    Statement { sql, args }
  }
}

/// See [`QueryBuilder::separated`].
pub struct Separated<'a> {
  builder:   &'a mut QueryBuilder,
  prefix:    &'static str,
  separator: &'static str,
  empty:     bool,
}

impl Separated<'_> {
  /// Begin a new item with `sql`.
  pub fn push(&mut self, sql: &'static str) -> &mut Self {
    let lead = if self.empty { self.prefix } else { self.separator };
    self.empty = false;
    self.builder.push(lead).push(sql);
    self
  }

  /// Continue the current item with more SQL.
  pub fn push_unseparated(&mut self, sql: &'static str) -> &mut Self {
    self.builder.push(sql);
    self
  }

  /// Continue the current item with a bound value.
  pub fn push_bind_unseparated(&mut self, value: impl Into<Value>) -> &mut Self {
    self.builder.push_bind(value);
    self
  }
}

// ─── Statements ──────────────────────────────────────────────────────────────

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

/// `INSERT … RETURNING created_at, updated_at`, both timestamps taken from the
/// store clock.
pub fn insert_subscription(id: Uuid, input: &NewSubscription) -> Statement {
  let mut q = QueryBuilder::new(
    "INSERT INTO subscriptions (
       id, service_name, price, user_id, start_date, end_date, created_at, updated_at
     ) VALUES (",
  );
  q.push_bind(text(encode_uuid(id)))
    .push(", ")
    .push_bind(text(input.service_name.as_str()))
    .push(", ")
    .push_bind(i64::from(input.price))
    .push(", ")
    .push_bind(text(encode_uuid(input.user_id)))
    .push(", ")
    .push_bind(text(encode_month(input.start_date)))
    .push(", ")
    .push_bind(input.end_date.map_or(Value::Null, |m| text(encode_month(m))))
    .push(", ")
    .push(NOW)
    .push(", ")
    .push(NOW)
    .push(") RETURNING created_at, updated_at");
  q.build()
}

pub fn select_subscription(id: Uuid) -> Statement {
  let mut q = QueryBuilder::new("SELECT ");
  q.push(COLUMNS)
    .push(" FROM subscriptions WHERE id = ")
    .push_bind(text(encode_uuid(id)));
  q.build()
}

pub fn delete_subscription(id: Uuid) -> Statement {
  let mut q = QueryBuilder::new("DELETE FROM subscriptions WHERE id = ");
  q.push_bind(text(encode_uuid(id)));
  q.build()
}

/// Exact-match filters, newest first. Insertion order breaks `created_at` ties.
pub fn list_subscriptions(filter: &SubscriptionFilter) -> Statement {
  let mut q = QueryBuilder::new("SELECT ");
  q.push(COLUMNS).push(" FROM subscriptions");

  let mut conds = q.separated(" WHERE ", " AND ");
  push_owner_filters(&mut conds, filter.user_id, filter.service_name.as_deref());

  q.push(" ORDER BY created_at DESC, rowid DESC");
  q.build()
}

/// One `column = ?` assignment per present field, in the fixed order
/// service_name, price, start_date, end_date; then `updated_at`; then the id.
///
/// Fails with [`CoreError::EmptyPatch`] without building anything if the
/// patch sets no field.
pub fn update_subscription(
  id: Uuid,
  patch: &SubscriptionPatch,
) -> subtrack_core::Result<Statement> {
  if patch.is_empty() {
    return Err(CoreError::EmptyPatch);
  }

  let mut q = QueryBuilder::new("UPDATE subscriptions");
  let mut set = q.separated(" SET ", ", ");
  if let Some(name) = &patch.service_name {
    set.push("service_name = ").push_bind_unseparated(text(name.as_str()));
  }
  if let Some(price) = patch.price {
    set.push("price = ").push_bind_unseparated(i64::from(price));
  }
  if let Some(start) = patch.start_date {
    set.push("start_date = ").push_bind_unseparated(text(encode_month(start)));
  }
  if let Some(end) = patch.end_date {
    set.push("end_date = ").push_bind_unseparated(text(encode_month(end)));
  }
  set.push("updated_at = ").push_unseparated(NOW);

  q.push(" WHERE id = ").push_bind(text(encode_uuid(id)));
  Ok(q.build())
}

/// Total price and row count of subscriptions active during the query period,
/// narrowed by the optional owner filters.
pub fn summarize_subscriptions(query: &SummaryQuery) -> Statement {
  let mut q =
    QueryBuilder::new("SELECT COALESCE(SUM(price), 0), COUNT(*) FROM subscriptions");

  let mut conds = q.separated(" WHERE ", " AND ");
  push_active_during(&mut conds, &query.period);
  push_owner_filters(&mut conds, query.user_id, query.service_name.as_deref());

  q.build()
}

/// SQL form of [`subtrack_core::period::ActiveWindow::overlaps`]:
/// `start_date <= period.end AND (end_date IS NULL OR end_date >= period.start)`,
/// compared on `YYYYMM` keys.
fn push_active_during(conds: &mut Separated<'_>, period: &Period) {
  conds
    .push("(substr(start_date, 4, 4) || substr(start_date, 1, 2)) <= ")
    .push_bind_unseparated(text(month_key(period.end())));
  conds
    .push("(end_date IS NULL OR (substr(end_date, 4, 4) || substr(end_date, 1, 2)) >= ")
    .push_bind_unseparated(text(month_key(period.start())))
    .push_unseparated(")");
}

fn push_owner_filters(
  conds: &mut Separated<'_>,
  user_id: Option<Uuid>,
  service_name: Option<&str>,
) {
  if let Some(user_id) = user_id {
    conds.push("user_id = ").push_bind_unseparated(text(encode_uuid(user_id)));
  }
  if let Some(name) = service_name {
    conds.push("service_name = ").push_bind_unseparated(text(name));
  }
}

#[cfg(test)]
mod tests {
  use subtrack_core::period::MonthYear;

  use super::*;

  /// Placeholder numbers in the order they appear in `sql`.
  fn placeholders(sql: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut rest = sql;
    while let Some(pos) = rest.find('?') {
      rest = &rest[pos + 1..];
      let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
      found.push(digits.parse().expect("placeholder without number"));
    }
    found
  }

  fn assert_contiguous(stmt: &Statement) {
    let numbers = placeholders(&stmt.sql);
    assert_eq!(numbers.len(), stmt.args.len(), "sql: {}", stmt.sql);
    assert_eq!(numbers, (1..=stmt.args.len()).collect::<Vec<_>>(), "sql: {}", stmt.sql);
  }

  fn my(s: &str) -> MonthYear { s.parse().unwrap() }

  fn period(start: &str, end: &str) -> Period { Period::new(my(start), my(end)).unwrap() }

  #[test]
  fn builder_numbers_placeholders_in_push_order() {
    let mut q = QueryBuilder::new("SELECT 1 WHERE a = ");
    q.push_bind(1_i64).push(" AND b = ").push_bind(text("x"));
    let stmt = q.build();
    assert_eq!(stmt.sql, "SELECT 1 WHERE a = ?1 AND b = ?2");
    assert_eq!(stmt.args, vec![Value::Integer(1), text("x")]);
  }

  #[test]
  fn separated_writes_nothing_when_empty() {
    let mut q = QueryBuilder::new("SELECT * FROM t");
    q.separated(" WHERE ", " AND ");
    q.push(" ORDER BY x");
    assert_eq!(q.build().sql, "SELECT * FROM t ORDER BY x");
  }

  #[test]
  fn list_without_filters_selects_everything_newest_first() {
    let stmt = list_subscriptions(&SubscriptionFilter::default());
    assert_eq!(
      stmt.sql,
      "SELECT id, service_name, price, user_id, start_date, end_date, created_at, updated_at \
       FROM subscriptions ORDER BY created_at DESC, rowid DESC"
    );
    assert!(stmt.args.is_empty());
  }

  #[test]
  fn list_with_both_filters() {
    let user = Uuid::new_v4();
    let stmt = list_subscriptions(&SubscriptionFilter {
      user_id:      Some(user),
      service_name: Some("Spotify".into()),
    });
    assert!(
      stmt.sql.ends_with(
        "FROM subscriptions WHERE user_id = ?1 AND service_name = ?2 \
         ORDER BY created_at DESC, rowid DESC"
      ),
      "sql: {}",
      stmt.sql
    );
    assert_eq!(stmt.args, vec![text(encode_uuid(user)), text("Spotify")]);
  }

  #[test]
  fn list_placeholders_match_args_for_every_filter_combination() {
    for user_id in [None, Some(Uuid::new_v4())] {
      for service_name in [None, Some("Netflix".to_owned())] {
        let expected = usize::from(user_id.is_some()) + usize::from(service_name.is_some());
        let stmt = list_subscriptions(&SubscriptionFilter { user_id, service_name });
        assert_contiguous(&stmt);
        assert_eq!(stmt.args.len(), expected);
      }
    }
  }

  #[test]
  fn update_with_empty_patch_builds_nothing() {
    let err = update_subscription(Uuid::new_v4(), &SubscriptionPatch::default()).unwrap_err();
    assert!(matches!(err, CoreError::EmptyPatch));
  }

  #[test]
  fn update_assigns_present_fields_then_timestamp_then_id() {
    let id = Uuid::new_v4();
    let patch = SubscriptionPatch {
      price: Some(1299),
      end_date: Some(my("12-2025")),
      ..Default::default()
    };
    let stmt = update_subscription(id, &patch).unwrap();
    assert_eq!(
      stmt.sql,
      "UPDATE subscriptions SET price = ?1, end_date = ?2, \
       updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?3"
    );
    assert_eq!(
      stmt.args,
      vec![Value::Integer(1299), text("12-2025"), text(encode_uuid(id))]
    );
  }

  #[test]
  fn update_placeholders_match_args_for_every_patch_combination() {
    let id = Uuid::new_v4();
    for mask in 1_u8..16 {
      let patch = SubscriptionPatch {
        service_name: (mask & 1 != 0).then(|| "Kinopoisk".to_owned()),
        price:        (mask & 2 != 0).then_some(299),
        start_date:   (mask & 4 != 0).then(|| my("01-2024")),
        end_date:     (mask & 8 != 0).then(|| my("06-2024")),
      };
      let stmt = update_subscription(id, &patch).unwrap();
      assert_contiguous(&stmt);
      assert_eq!(stmt.args.len(), mask.count_ones() as usize + 1);
      assert_eq!(stmt.args.last(), Some(&text(encode_uuid(id))), "id must bind last");
      assert!(stmt.sql.contains("updated_at = strftime("), "sql: {}", stmt.sql);
    }
  }

  #[test]
  fn summary_binds_period_end_then_start_then_filters() {
    let user = Uuid::new_v4();
    let query = SummaryQuery {
      period:       period("12-2022", "02-2023"),
      user_id:      Some(user),
      service_name: Some("Netflix".into()),
    };
    let stmt = summarize_subscriptions(&query);
    assert_eq!(
      stmt.sql,
      "SELECT COALESCE(SUM(price), 0), COUNT(*) FROM subscriptions \
       WHERE (substr(start_date, 4, 4) || substr(start_date, 1, 2)) <= ?1 \
       AND (end_date IS NULL OR (substr(end_date, 4, 4) || substr(end_date, 1, 2)) >= ?2) \
       AND user_id = ?3 AND service_name = ?4"
    );
    assert_eq!(
      stmt.args,
      vec![text("202302"), text("202212"), text(encode_uuid(user)), text("Netflix")]
    );
  }

  #[test]
  fn summary_placeholders_match_args_for_every_filter_combination() {
    for user_id in [None, Some(Uuid::new_v4())] {
      for service_name in [None, Some("Netflix".to_owned())] {
        let expected =
          2 + usize::from(user_id.is_some()) + usize::from(service_name.is_some());
        let stmt = summarize_subscriptions(&SummaryQuery {
          period: period("01-2024", "03-2024"),
          user_id,
          service_name,
        });
        assert_contiguous(&stmt);
        assert_eq!(stmt.args.len(), expected);
      }
    }
  }

  #[test]
  fn filter_values_never_reach_sql_text() {
    let hostile = "x'; DROP TABLE subscriptions; --";
    let list = list_subscriptions(&SubscriptionFilter {
      user_id:      None,
      service_name: Some(hostile.into()),
    });
    let update = update_subscription(
      Uuid::new_v4(),
      &SubscriptionPatch { service_name: Some(hostile.into()), ..Default::default() },
    )
    .unwrap();
    let mut summary = SummaryQuery::new(period("01-2024", "01-2024"));
    summary.service_name = Some(hostile.into());
    let summary = summarize_subscriptions(&summary);

    for stmt in [list, update, summary] {
      assert!(!stmt.sql.contains("DROP"), "sql: {}", stmt.sql);
      assert!(stmt.args.contains(&text(hostile)));
    }
  }

  #[test]
  fn insert_binds_null_for_open_ended() {
    let input = NewSubscription::new("Netflix", 999, Uuid::new_v4(), my("01-2024"));
    let stmt = insert_subscription(Uuid::new_v4(), &input);
    assert_contiguous(&stmt);
    assert_eq!(stmt.args.len(), 6);
    assert_eq!(stmt.args[5], Value::Null);
    assert!(stmt.sql.ends_with("RETURNING created_at, updated_at"));
  }
}
