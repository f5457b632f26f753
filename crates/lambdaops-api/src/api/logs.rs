/// Logs endpoint
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::{DateTime, NaiveDate};
use lambdaops_core::{LogPage, LogQuery};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::{context::ApiContext, error::ApiError};

const QUERY_FAILED: &str = "Failed to fetch logs.";

/// A time bound as sent by clients: epoch milliseconds or a date string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TimeBound {
    Millis(i64),
    Text(String),
}

impl TimeBound {
    /// Epoch milliseconds; date-only strings are midnight UTC
    pub fn to_millis(&self) -> Option<i64> {
        match self {
            TimeBound::Millis(ms) => Some(*ms),
            TimeBound::Text(raw) => {
                let raw = raw.trim();
                if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
                    return Some(ts.timestamp_millis());
                }
                if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    return date
                        .and_hms_opt(0, 0, 0)
                        .map(|dt| dt.and_utc().timestamp_millis());
                }
                raw.parse().ok()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsRequest {
    pub start_date: Option<TimeBound>,
    pub end_date: Option<TimeBound>,
    pub keyword: Option<String>,
    pub next_token: Option<String>,
    pub account: Option<String>,
}

fn parse_bound(bound: Option<&TimeBound>, field: &str) -> Result<Option<i64>, ApiError> {
    match bound {
        Some(b) => b
            .to_millis()
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid {}.", field))),
        None => Ok(None),
    }
}

pub async fn query(
    State(ctx): State<Arc<ApiContext>>,
    Path(name): Path<String>,
    body: Result<Json<LogsRequest>, JsonRejection>,
) -> Result<Json<LogPage>, ApiError> {
    let Json(request) = body.map_err(|e| {
        debug!(error = %e, "Rejected logs body");
        ApiError::BadRequest("Invalid log query.".to_string())
    })?;

    let start_time = parse_bound(request.start_date.as_ref(), "startDate")?;
    let end_time = parse_bound(request.end_date.as_ref(), "endDate")?;

    let account = ctx.accounts.resolve(request.account.as_deref());
    let query = LogQuery::new(name)
        .between(start_time, end_time)
        .keyword(request.keyword)
        .cursor(request.next_token);

    let page = ctx.logs.query(&query, account).await.map_err(|e| {
        error!(
            function = %query.function_name,
            account = %account.key,
            error = %e,
            "Failed to fetch logs"
        );
        ApiError::from_gateway(e, QUERY_FAILED, ctx.config.expose_error_details)
    })?;

    Ok(Json(page))
}
