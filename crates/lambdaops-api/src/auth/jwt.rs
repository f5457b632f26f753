/// Session tokens: issuance on login and validation on every guarded call
use super::store::{CredentialStore, UserRecord};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use lambdaops_core::constants::{LOG_TARGET_AUDIT, SESSION_TTL_SECONDS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};

/// Cost used for the dummy comparison on unknown usernames
const DUMMY_HASH_COST: u32 = 10;

/// Hash verified when the username is unknown, so both failure paths do the
/// same amount of work
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| bcrypt::hash("lambdaops-unknown-user", DUMMY_HASH_COST).ok());

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The reason is for server logs only
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    pub username: String,

    /// Issued at time (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// A signed, time-bounded session credential
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub subject: String,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated operator behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub expires_at: i64,
}

/// Verifies operator passwords and issues session tokens
pub struct TokenIssuer {
    store: Arc<dyn CredentialStore>,
    encoding_key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            encoding_key: EncodingKey::from_secret(secret),
        }
    }

    /// Checks a username/password pair and issues a token.
    ///
    /// Unknown users and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionToken, AuthError> {
        let user = self
            .store
            .find_user(username)
            .await
            .map_err(|e| {
                error!(error = %e, "Credential store lookup failed");
                AuthError::Internal(e.to_string())
            })?;

        let hash = match &user {
            Some(user) => Some(user.password_hash.clone()),
            None => (*DUMMY_HASH).clone(),
        };

        let matched = match hash {
            Some(hash) => verify_password(password.to_string(), hash).await?,
            None => false,
        };

        match user {
            Some(user) if matched => {
                let session = self.issue_at(&user, Utc::now())?;
                info!(target: LOG_TARGET_AUDIT, username = %username, "Login successful");
                Ok(session)
            }
            _ => {
                warn!(target: LOG_TARGET_AUDIT, username = %username, "Login failed: invalid credentials");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Issues a token for `user` that expires exactly one session TTL after `now`
    pub fn issue_at(&self, user: &UserRecord, now: DateTime<Utc>) -> Result<SessionToken, AuthError> {
        let issued_at = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let expires_at = issued_at + Duration::seconds(SESSION_TTL_SECONDS);

        let claims = Claims {
            sub: user.id().to_string(),
            username: user.username.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(SessionToken {
            token,
            subject: claims.sub,
            username: claims.username,
            issued_at,
            expires_at,
        })
    }
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("Password check aborted: {}", e)))?
        .map_err(|e| {
            error!(error = %e, "Stored password hash is malformed");
            AuthError::Internal(e.to_string())
        })
}

/// Validates bearer tokens on guarded routes
pub struct AuthGuard {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthGuard {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against our own clock, with no leeway
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Validates the raw Authorization header value
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<Identity, AuthError> {
        self.authenticate_at(auth_header, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        auth_header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        let token = Self::extract_token(auth_header)?;

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::Unauthorized(format!("Failed to validate JWT: {}", e)))?
            .claims;

        // Compared in milliseconds so a sub-second overrun is still expired
        if now.timestamp_millis() > claims.exp.saturating_mul(1000) {
            return Err(AuthError::Unauthorized("Token expired".to_string()));
        }

        Ok(Identity {
            user_id: claims.sub,
            username: claims.username,
            expires_at: claims.exp,
        })
    }

    /// Extract JWT token from Authorization header
    pub fn extract_token(auth_header: Option<&str>) -> Result<&str, AuthError> {
        let auth_header = auth_header
            .ok_or_else(|| AuthError::Unauthorized("Missing Authorization header".to_string()))?;

        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            _ => Err(AuthError::Unauthorized(
                "Authorization header must start with 'Bearer '".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentialStore;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-1234";

    fn user(password: &str) -> UserRecord {
        UserRecord {
            id: Some("u-42".to_string()),
            username: "alice".to_string(),
            password_hash: bcrypt::hash(password, 4).unwrap(),
        }
    }

    fn issuer() -> TokenIssuer {
        let store = StaticCredentialStore::new(vec![user("correct horse")]);
        TokenIssuer::new(SECRET, Arc::new(store))
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(AuthGuard::extract_token(Some("Bearer abc123")).unwrap(), "abc123");
        assert!(AuthGuard::extract_token(Some("abc123")).is_err());
        assert!(AuthGuard::extract_token(Some("Bearer ")).is_err());
        assert!(AuthGuard::extract_token(None).is_err());
    }

    #[test]
    fn test_expiry_is_exactly_thirty_minutes() {
        let now = Utc.with_ymd_and_hms(2025, 11, 3, 9, 0, 0).unwrap();
        let session = issuer().issue_at(&user("pw"), now).unwrap();

        assert_eq!(session.issued_at, now);
        assert_eq!(session.expires_at - session.issued_at, Duration::minutes(30));
        assert_eq!(session.subject, "u-42");
    }

    #[test]
    fn test_token_rejected_after_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 11, 3, 9, 0, 0).unwrap();
        let session = issuer().issue_at(&user("pw"), now).unwrap();
        let guard = AuthGuard::new(SECRET);
        let header = bearer(&session.token);

        let identity = guard
            .authenticate_at(Some(&header), now + Duration::minutes(29))
            .unwrap();
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.user_id, "u-42");

        assert!(guard.authenticate_at(Some(&header), session.expires_at).is_ok());
        assert!(matches!(
            guard.authenticate_at(Some(&header), session.expires_at + Duration::milliseconds(1)),
            Err(AuthError::Unauthorized(_))
        ));
        assert!(matches!(
            guard.authenticate_at(Some(&header), session.expires_at + Duration::milliseconds(900)),
            Err(AuthError::Unauthorized(_))
        ));
        assert!(matches!(
            guard.authenticate_at(Some(&header), session.expires_at + Duration::seconds(1)),
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let now = Utc::now();
        let session = issuer().issue_at(&user("pw"), now).unwrap();
        let guard = AuthGuard::new(b"a-completely-different-secret-value");

        assert!(matches!(
            guard.authenticate_at(Some(&bearer(&session.token)), now),
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let guard = AuthGuard::new(SECRET);
        assert!(guard.authenticate(Some("Bearer not.a.jwt")).is_err());
        assert!(guard.authenticate(Some("Bearer garbage")).is_err());
    }

    #[tokio::test]
    async fn test_login_success() {
        let session = issuer().login("alice", "correct horse").await.unwrap();
        let identity = AuthGuard::new(SECRET)
            .authenticate(Some(&bearer(&session.token)))
            .unwrap();
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let issuer = issuer();
        let wrong_password = issuer.login("alice", "wrong").await.unwrap_err();
        let unknown_user = issuer.login("bob", "wrong").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }
}
