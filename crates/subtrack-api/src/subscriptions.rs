//! Handlers for `/subscriptions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/subscriptions` | Optional `?user_id=<uuid>&service_name=<name>` |
//! | `POST`   | `/subscriptions` | Body: [`CreateBody`]; returns 201 + stored subscription |
//! | `GET`    | `/subscriptions/:id` | 404 if not found |
//! | `PUT`    | `/subscriptions/:id` | Body: sparse [`SubscriptionPatch`]; 400 if empty |
//! | `DELETE` | `/subscriptions/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use subtrack_core::{
  period::MonthYear,
  service::SubscriptionService,
  store::SubscriptionStore,
  subscription::{NewSubscription, Subscription, SubscriptionFilter, SubscriptionPatch},
};
use uuid::Uuid;

use crate::{error::ApiError, non_empty};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub user_id:      Option<String>,
  pub service_name: Option<String>,
}

impl TryFrom<ListParams> for SubscriptionFilter {
  type Error = ApiError;

  fn try_from(p: ListParams) -> Result<Self, ApiError> {
    let user_id = non_empty(p.user_id)
      .map(|s| Uuid::parse_str(&s))
      .transpose()
      .map_err(|e| ApiError::BadRequest(format!("user_id: {e}")))?;
    Ok(SubscriptionFilter { user_id, service_name: non_empty(p.service_name) })
  }
}

/// `GET /subscriptions[?user_id=<uuid>][&service_name=<name>]`
pub async fn list<S>(
  State(service): State<Arc<SubscriptionService<S>>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Subscription>>, ApiError>
where
  S: SubscriptionStore,
{
  let Query(params) = params?;
  let filter = SubscriptionFilter::try_from(params)?;
  let subscriptions = service.list(&filter).await.map_err(ApiError::from_store)?;
  Ok(Json(subscriptions))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /subscriptions`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub service_name: String,
  pub price:        u32,
  pub user_id:      Uuid,
  pub start_date:   MonthYear,
  pub end_date:     Option<MonthYear>,
}

impl From<CreateBody> for NewSubscription {
  fn from(b: CreateBody) -> Self {
    NewSubscription {
      service_name: b.service_name,
      price:        b.price,
      user_id:      b.user_id,
      start_date:   b.start_date,
      end_date:     b.end_date,
    }
  }
}

/// `POST /subscriptions`: returns 201 + the stored [`Subscription`].
pub async fn create<S>(
  State(service): State<Arc<SubscriptionService<S>>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionStore,
{
  let Json(body) = body?;
  let subscription = service
    .create(NewSubscription::from(body))
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(subscription)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subscriptions/:id`
pub async fn get_one<S>(
  State(service): State<Arc<SubscriptionService<S>>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Subscription>, ApiError>
where
  S: SubscriptionStore,
{
  let Path(id) = id?;
  let subscription = service.get(id).await.map_err(ApiError::from_store)?;
  Ok(Json(subscription))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /subscriptions/:id`. Only the fields present in the body change.
pub async fn update<S>(
  State(service): State<Arc<SubscriptionService<S>>>,
  id: Result<Path<Uuid>, PathRejection>,
  patch: Result<Json<SubscriptionPatch>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: SubscriptionStore,
{
  let Path(id) = id?;
  let Json(patch) = patch?;
  service.update(id, patch).await.map_err(ApiError::from_store)?;
  Ok(Json(json!({ "message": "subscription updated successfully" })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /subscriptions/:id`
pub async fn delete<S>(
  State(service): State<Arc<SubscriptionService<S>>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: SubscriptionStore,
{
  let Path(id) = id?;
  service.delete(id).await.map_err(ApiError::from_store)?;
  Ok(Json(json!({ "message": "subscription deleted successfully" })))
}
