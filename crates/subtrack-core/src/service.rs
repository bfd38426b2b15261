//! [`SubscriptionService`], the façade transport code calls through.
//!
//! Each method forwards to the store unchanged and reports the outcome as a
//! `tracing` event. Which subscriber (if any) receives those events is decided
//! by the binary, not here.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Classify,
  store::SubscriptionStore,
  subscription::{
    NewSubscription, Subscription, SubscriptionFilter, SubscriptionPatch, Summary,
    SummaryQuery,
  },
};

/// Use-case entry points over a shared store handle.
pub struct SubscriptionService<S> {
  store: Arc<S>,
}

impl<S> Clone for SubscriptionService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: SubscriptionStore> SubscriptionService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub async fn create(&self, input: NewSubscription) -> Result<Subscription, S::Error> {
    debug!(user_id = %input.user_id, service_name = %input.service_name, "creating subscription");
    let created = self.store.create(input).await.inspect_err(report::<S::Error>("create"))?;
    info!(id = %created.id, user_id = %created.user_id, "subscription created");
    Ok(created)
  }

  pub async fn get(&self, id: Uuid) -> Result<Subscription, S::Error> {
    debug!(%id, "fetching subscription");
    self.store.get(id).await.inspect_err(report::<S::Error>("get"))
  }

  pub async fn update(&self, id: Uuid, patch: SubscriptionPatch) -> Result<(), S::Error> {
    debug!(%id, ?patch, "updating subscription");
    self.store.update(id, patch).await.inspect_err(report::<S::Error>("update"))?;
    info!(%id, "subscription updated");
    Ok(())
  }

  pub async fn delete(&self, id: Uuid) -> Result<(), S::Error> {
    debug!(%id, "deleting subscription");
    self.store.delete(id).await.inspect_err(report::<S::Error>("delete"))?;
    info!(%id, "subscription deleted");
    Ok(())
  }

  pub async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, S::Error> {
    debug!(user_id = ?filter.user_id, service_name = ?filter.service_name, "listing subscriptions");
    let found = self.store.list(filter).await.inspect_err(report::<S::Error>("list"))?;
    debug!(count = found.len(), "subscriptions listed");
    Ok(found)
  }

  pub async fn summarize(&self, query: &SummaryQuery) -> Result<Summary, S::Error> {
    debug!(
      start = %query.period.start(),
      end = %query.period.end(),
      user_id = ?query.user_id,
      service_name = ?query.service_name,
      "summarising subscriptions"
    );
    let summary = self.store.summarize(query).await.inspect_err(report::<S::Error>("summarize"))?;
    debug!(total_cost = summary.total_cost, count = summary.count, "summary computed");
    Ok(summary)
  }
}

fn report<E>(operation: &'static str) -> impl Fn(&E)
where
  E: std::error::Error + Classify,
{
  move |e| warn!(operation, kind = ?e.kind(), error = %e, "store call failed")
}
