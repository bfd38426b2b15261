//! JSON REST API for subtrack.
//!
//! Exposes an axum [`Router`] backed by a
//! [`subtrack_core::service::SubscriptionService`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api/v1", subtrack_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod subscriptions;
pub mod summary;

use std::sync::Arc;

use axum::{Router, routing::get};
use subtrack_core::{service::SubscriptionService, store::SubscriptionStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<SubscriptionService<S>>) -> Router<()>
where
  S: SubscriptionStore + 'static,
{
  Router::new()
    .route(
      "/subscriptions",
      get(subscriptions::list::<S>).post(subscriptions::create::<S>),
    )
    .route(
      "/subscriptions/{id}",
      get(subscriptions::get_one::<S>)
        .put(subscriptions::update::<S>)
        .delete(subscriptions::delete::<S>),
    )
    .route("/summary", get(summary::handler::<S>))
    .with_state(service)
}

/// Treat `?param=` the same as an absent parameter.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.is_empty())
}
