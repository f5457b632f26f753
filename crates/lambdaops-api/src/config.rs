/// API configuration - loaded once from environment variables
use crate::auth::UserRecord;
use lambdaops_core::GatewayError;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Default listen port in standalone mode
pub const DEFAULT_PORT: u16 = 5000;

/// Secrets shorter than this are accepted but logged as weak
const MIN_RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct ApiConfig {
    /// HMAC secret used to sign and verify session tokens
    pub jwt_secret: String,
    /// Operators allowed to log in
    pub users: Vec<UserRecord>,
    /// Echo upstream error detail in 500 responses
    pub expose_error_details: bool,
    pub port: u16,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("jwt_secret", &"***")
            .field("users", &self.users.len())
            .field("expose_error_details", &self.expose_error_details)
            .field("port", &self.port)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::Config("Missing JWT_SECRET env var".to_string()))?;

        if jwt_secret.len() < MIN_RECOMMENDED_SECRET_LEN {
            warn!(
                length = jwt_secret.len(),
                "JWT_SECRET is shorter than {} bytes", MIN_RECOMMENDED_SECRET_LEN
            );
        }

        let users_json = lookup("OPERATOR_USERS")
            .ok_or_else(|| GatewayError::Config("Missing OPERATOR_USERS env var".to_string()))?;
        let users: Vec<UserRecord> = serde_json::from_str(&users_json)
            .map_err(|e| GatewayError::Config(format!("Invalid OPERATOR_USERS JSON: {}", e)))?;

        let mut seen = HashSet::new();
        for user in &users {
            if user.username.is_empty() || user.password_hash.is_empty() {
                return Err(GatewayError::Config(
                    "OPERATOR_USERS entries need a username and password_hash".to_string(),
                ));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(GatewayError::Config(format!(
                    "Duplicate user in OPERATOR_USERS: {}",
                    user.username
                )));
            }
        }

        let expose_error_details = match lookup("EXPOSE_ERROR_DETAILS") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                GatewayError::Config(format!("Invalid EXPOSE_ERROR_DETAILS: {}", raw))
            })?,
            None => false,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| GatewayError::Config(format!("Invalid PORT: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            jwt_secret,
            users,
            expose_error_details,
            port,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
