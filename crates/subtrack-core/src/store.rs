//! The `SubscriptionStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `subtrack-store-sqlite`).
//! [`crate::service::SubscriptionService`] depends on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify,
  subscription::{
    NewSubscription, Subscription, SubscriptionFilter, SubscriptionPatch, Summary,
    SummaryQuery,
  },
};

/// Abstraction over a subscription storage backend.
///
/// Every operation is a single statement against the backend; none retries.
/// Dropping a returned future abandons the underlying call.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  /// Persist a new subscription and return it with `id`, `created_at` and
  /// `updated_at` filled in. `created_at == updated_at` on the returned value.
  fn create(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Fetch one subscription. Fails with a not-found error when `id` matches
  /// no row.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Apply a sparse patch and refresh `updated_at`.
  ///
  /// An empty patch fails validation before any statement runs. A patch
  /// against a missing id fails with not-found.
  fn update(
    &self,
    id: Uuid,
    patch: SubscriptionPatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Hard-delete a subscription. Deleting a missing id fails with not-found.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// List matching subscriptions, newest first. Never fails with not-found.
  fn list<'a>(
    &'a self,
    filter: &'a SubscriptionFilter,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + 'a;

  /// Sum the price of every matching subscription active during the query
  /// period (see [`crate::period::ActiveWindow::overlaps`]).
  fn summarize<'a>(
    &'a self,
    query: &'a SummaryQuery,
  ) -> impl Future<Output = Result<Summary, Self::Error>> + Send + 'a;
}
