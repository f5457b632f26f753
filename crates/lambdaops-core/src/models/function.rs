/// Lambda function models
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete environment-variable configuration of one function
pub type EnvironmentMap = BTreeMap<String, String>;

/// Read-only projection of an upstream function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FunctionSummary {
    pub function_name: String,
    pub runtime: Option<String>,
    pub last_modified: Option<String>,
}
