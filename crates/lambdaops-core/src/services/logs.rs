/// CloudWatch Logs service and the log query gateway built on it
use crate::error::GatewayError;
use crate::models::{Account, LogEvent, LogFilter, LogPage, LogQuery};
use crate::services::clients::UpstreamClients;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait LogsPlane: Send + Sync {
    /// Fetches one page of events matching the filter
    async fn filter_events(&self, filter: &LogFilter) -> Result<LogPage, GatewayError>;
}

pub struct CloudWatchLogsPlane {
    client: aws_sdk_cloudwatchlogs::Client,
}

impl CloudWatchLogsPlane {
    pub fn new(client: aws_sdk_cloudwatchlogs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogsPlane for CloudWatchLogsPlane {
    async fn filter_events(&self, filter: &LogFilter) -> Result<LogPage, GatewayError> {
        let result = self
            .client
            .filter_log_events()
            .log_group_name(&filter.log_group_name)
            .set_start_time(filter.start_time)
            .set_end_time(filter.end_time)
            .set_filter_pattern(filter.filter_pattern.clone())
            .limit(filter.limit)
            .set_next_token(filter.next_token.clone())
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(s) if s.is_resource_not_found_exception() => {
                    GatewayError::NotFound(filter.log_group_name.clone())
                }
                _ => GatewayError::upstream("filter_log_events", e),
            })?;

        let events = result
            .events()
            .iter()
            .map(|event| LogEvent {
                timestamp: event.timestamp(),
                message: event.message().unwrap_or("").to_string(),
                log_stream_name: event.log_stream_name().map(|s| s.to_string()),
                ingestion_time: event.ingestion_time(),
                event_id: event.event_id().map(|s| s.to_string()),
            })
            .collect();

        Ok(LogPage {
            events,
            next_token: result.next_token().map(|s| s.to_string()),
        })
    }
}

/// Account-scoped gateway for paginated log queries
///
/// The cursor is handed to the upstream untouched and whatever cursor the
/// upstream returns is handed back untouched.
pub struct LogsGateway {
    upstream: Arc<dyn UpstreamClients>,
}

impl LogsGateway {
    pub fn new(upstream: Arc<dyn UpstreamClients>) -> Self {
        Self { upstream }
    }

    /// Fetches one page of a function's logs.
    ///
    /// A function that has never logged has no log group yet; that reads as
    /// an exhausted, empty range rather than an error.
    pub async fn query(&self, query: &LogQuery, account: &Account) -> Result<LogPage, GatewayError> {
        let filter = query.to_filter()?;

        let page = match self.upstream.logs(account).await.filter_events(&filter).await {
            Ok(page) => page,
            Err(GatewayError::NotFound(group)) => {
                debug!(log_group = %group, account = %account.key, "Log group does not exist");
                LogPage::default()
            }
            Err(e) => return Err(e),
        };

        debug!(
            log_group = %filter.log_group_name,
            account = %account.key,
            count = page.events.len(),
            has_more = !page.is_last(),
            "Fetched log page"
        );
        Ok(page)
    }
}
