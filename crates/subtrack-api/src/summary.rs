//! Handler for `GET /summary`.
//!
//! `start_period` and `end_period` are required `MM-YYYY` values; `user_id`
//! and `service_name` narrow the summary when given and non-empty.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use subtrack_core::{
  period::{MonthYear, Period},
  service::SubscriptionService,
  store::SubscriptionStore,
  subscription::{Summary, SummaryQuery},
};
use uuid::Uuid;

use crate::{error::ApiError, non_empty};

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  pub start_period: String,
  pub end_period:   String,
  pub user_id:      Option<String>,
  pub service_name: Option<String>,
}

impl TryFrom<SummaryParams> for SummaryQuery {
  type Error = ApiError;

  fn try_from(p: SummaryParams) -> Result<Self, ApiError> {
    let start: MonthYear = p.start_period.parse().map_err(ApiError::from_store)?;
    let end: MonthYear = p.end_period.parse().map_err(ApiError::from_store)?;
    let user_id = non_empty(p.user_id)
      .map(|s| Uuid::parse_str(&s))
      .transpose()
      .map_err(|e| ApiError::BadRequest(format!("user_id: {e}")))?;

    Ok(SummaryQuery {
      period: Period::new(start, end).map_err(ApiError::from_store)?,
      user_id,
      service_name: non_empty(p.service_name),
    })
  }
}

/// `GET /summary?start_period=MM-YYYY&end_period=MM-YYYY[&user_id=...][&service_name=...]`
pub async fn handler<S>(
  State(service): State<Arc<SubscriptionService<S>>>,
  params: Result<Query<SummaryParams>, QueryRejection>,
) -> Result<Json<Summary>, ApiError>
where
  S: SubscriptionStore,
{
  let Query(params) = params?;
  let query = SummaryQuery::try_from(params)?;
  let summary = service.summarize(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(summary))
}
