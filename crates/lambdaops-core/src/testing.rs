/// In-memory upstream services for testing
///
/// Each account gets its own control plane and logs plane so tests can check
/// that requests never cross accounts.
use crate::error::GatewayError;
use crate::models::{
    Account, AccountKey, CredentialBundle, EnvironmentMap, FunctionSummary, LogEvent, LogFilter,
    LogPage,
};
use crate::services::clients::UpstreamClients;
use crate::services::lambda::FunctionControlPlane;
use crate::services::logs::LogsPlane;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Builds an account with distinct fake credentials per key
pub fn test_account(key: AccountKey) -> Account {
    Account {
        key,
        credentials: CredentialBundle {
            access_key_id: format!("AKIATEST{}", key.as_str().to_uppercase()),
            secret_access_key: format!("secret-{}", key),
            region: "us-east-1".to_string(),
        },
    }
}

/// Mock Lambda control plane
#[derive(Clone, Default)]
pub struct InMemoryControlPlane {
    functions: Arc<Mutex<BTreeMap<String, (FunctionSummary, EnvironmentMap)>>>,
    writes: Arc<AtomicUsize>,
    conflicts_left: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
    latency: Arc<Mutex<Duration>>,
}

impl InMemoryControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_function(&self, name: &str, vars: &[(&str, &str)]) {
        let summary = FunctionSummary {
            function_name: name.to_string(),
            runtime: Some("nodejs20.x".to_string()),
            last_modified: Some("2025-11-03T09:15:23.000+0000".to_string()),
        };
        let env = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.functions
            .lock()
            .unwrap()
            .insert(name.to_string(), (summary, env));
    }

    pub fn environment(&self, name: &str) -> Option<EnvironmentMap> {
        self.functions
            .lock()
            .unwrap()
            .get(name)
            .map(|(_, env)| env.clone())
    }

    /// Number of successful whole-map writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The next `n` writes fail with a conflicting-update error
    pub fn fail_next_writes(&self, n: usize) {
        self.conflicts_left.store(n, Ordering::SeqCst);
    }

    /// Every call fails with an upstream error while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay applied to every read and write
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    async fn simulate(&self, operation: &str) -> Result<(), GatewayError> {
        let latency = *self.latency.lock().unwrap();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::upstream(
                operation,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FunctionControlPlane for InMemoryControlPlane {
    async fn list_functions(&self) -> Result<Vec<FunctionSummary>, GatewayError> {
        self.simulate("list_functions").await?;
        Ok(self
            .functions
            .lock()
            .unwrap()
            .values()
            .map(|(summary, _)| summary.clone())
            .collect())
    }

    async fn get_environment(&self, function_name: &str) -> Result<EnvironmentMap, GatewayError> {
        self.simulate("get_function_configuration").await?;
        self.environment(function_name)
            .ok_or_else(|| GatewayError::NotFound(function_name.to_string()))
    }

    async fn put_environment(
        &self,
        function_name: &str,
        environment: &EnvironmentMap,
    ) -> Result<(), GatewayError> {
        self.simulate("update_function_configuration").await?;

        let pending = self.conflicts_left.load(Ordering::SeqCst);
        if pending > 0 {
            self.conflicts_left.store(pending - 1, Ordering::SeqCst);
            return Err(GatewayError::Conflict(function_name.to_string()));
        }

        let mut functions = self.functions.lock().unwrap();
        let (_, env) = functions
            .get_mut(function_name)
            .ok_or_else(|| GatewayError::NotFound(function_name.to_string()))?;
        *env = environment.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock CloudWatch Logs plane
///
/// Cursors are opaque strings of the form `page-<offset>`.
#[derive(Clone, Default)]
pub struct InMemoryLogsPlane {
    groups: Arc<Mutex<HashMap<String, Vec<LogEvent>>>>,
    filters: Arc<Mutex<Vec<LogFilter>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryLogsPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends events to the function's log group
    pub fn push_events(&self, function_name: &str, events: &[(i64, &str)]) {
        let mut groups = self.groups.lock().unwrap();
        let group = groups
            .entry(format!("/aws/lambda/{}", function_name))
            .or_default();
        let base = group.len();
        group.extend(events.iter().enumerate().map(|(i, (ts, msg))| LogEvent {
            timestamp: Some(*ts),
            message: msg.to_string(),
            log_stream_name: Some("2025/11/03/[$LATEST]0001".to_string()),
            ingestion_time: Some(*ts + 5),
            event_id: Some(format!("evt-{}", base + i)),
        }));
    }

    pub fn last_filter(&self) -> Option<LogFilter> {
        self.filters.lock().unwrap().last().cloned()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl LogsPlane for InMemoryLogsPlane {
    async fn filter_events(&self, filter: &LogFilter) -> Result<LogPage, GatewayError> {
        self.filters.lock().unwrap().push(filter.clone());

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::upstream(
                "filter_log_events",
                std::io::Error::new(std::io::ErrorKind::TimedOut, "operation timed out"),
            ));
        }

        let groups = self.groups.lock().unwrap();
        let events = groups
            .get(&filter.log_group_name)
            .ok_or_else(|| GatewayError::NotFound(filter.log_group_name.clone()))?;

        let offset = match &filter.next_token {
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| {
                    GatewayError::upstream(
                        "filter_log_events",
                        std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            "The specified nextToken is invalid.",
                        ),
                    )
                })?,
            None => 0,
        };

        let matching: Vec<&LogEvent> = events
            .iter()
            .filter(|e| {
                let ts = e.timestamp.unwrap_or_default();
                filter.start_time.is_none_or(|start| ts >= start)
                    && filter.end_time.is_none_or(|end| ts < end)
                    && filter
                        .filter_pattern
                        .as_deref()
                        .is_none_or(|pattern| e.message.contains(pattern))
            })
            .collect();

        let limit = filter.limit.max(1) as usize;
        let page: Vec<LogEvent> = matching
            .iter()
            .skip(offset)
            .take(limit)
            .map(|e| (*e).clone())
            .collect();
        let next = offset + page.len();

        Ok(LogPage {
            events: page,
            next_token: (next < matching.len()).then(|| format!("page-{}", next)),
        })
    }
}

/// Per-account in-memory upstream
#[derive(Clone, Default)]
pub struct InMemoryUpstream {
    lambda: Arc<Mutex<HashMap<AccountKey, InMemoryControlPlane>>>,
    logs: Arc<Mutex<HashMap<AccountKey, InMemoryLogsPlane>>>,
}

impl InMemoryUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn control_plane(&self, key: AccountKey) -> InMemoryControlPlane {
        self.lambda.lock().unwrap().entry(key).or_default().clone()
    }

    pub fn logs_plane(&self, key: AccountKey) -> InMemoryLogsPlane {
        self.logs.lock().unwrap().entry(key).or_default().clone()
    }
}

#[async_trait]
impl UpstreamClients for InMemoryUpstream {
    async fn lambda(&self, account: &Account) -> Arc<dyn FunctionControlPlane> {
        Arc::new(self.control_plane(account.key))
    }

    async fn logs(&self, account: &Account) -> Arc<dyn LogsPlane> {
        Arc::new(self.logs_plane(account.key))
    }
}
