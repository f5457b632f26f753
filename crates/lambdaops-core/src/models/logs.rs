/// Log query models
use crate::constants::{LAMBDA_LOG_GROUP_PREFIX, LOG_PAGE_SIZE};
use crate::error::GatewayError;
use serde::{Deserialize, Serialize};

/// One page request against a function's log group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub function_name: String,
    /// Inclusive lower bound, epoch milliseconds
    pub start_time: Option<i64>,
    /// Upper bound, epoch milliseconds
    pub end_time: Option<i64>,
    /// Upstream filter pattern, passed through untouched
    pub keyword: Option<String>,
    /// Opaque upstream continuation token
    pub cursor: Option<String>,
}

impl LogQuery {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            ..Default::default()
        }
    }

    pub fn between(mut self, start_time: Option<i64>, end_time: Option<i64>) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    pub fn keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword.filter(|k| !k.is_empty());
        self
    }

    pub fn cursor(mut self, cursor: Option<String>) -> Self {
        self.cursor = cursor.filter(|c| !c.is_empty());
        self
    }

    /// Checks the query and lowers it into an upstream filter
    pub fn to_filter(&self) -> Result<LogFilter, GatewayError> {
        if self.function_name.is_empty() {
            return Err(GatewayError::Validation(
                "Function name is required".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time)
            && start > end
        {
            return Err(GatewayError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }

        Ok(LogFilter {
            log_group_name: format!("{}{}", LAMBDA_LOG_GROUP_PREFIX, self.function_name),
            start_time: self.start_time,
            end_time: self.end_time,
            filter_pattern: self.keyword.clone(),
            limit: LOG_PAGE_SIZE,
            next_token: self.cursor.clone(),
        })
    }
}

/// Upstream filter request, one page at a time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    pub log_group_name: String,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub filter_pattern: Option<String>,
    pub limit: i32,
    pub next_token: Option<String>,
}

/// A single log event as provided upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub timestamp: Option<i64>,
    pub message: String,
    pub log_stream_name: Option<String>,
    pub ingestion_time: Option<i64>,
    pub event_id: Option<String>,
}

/// One page of log events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPage {
    pub events: Vec<LogEvent>,
    /// Absent when the matching range is exhausted
    pub next_token: Option<String>,
}

impl LogPage {
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}
