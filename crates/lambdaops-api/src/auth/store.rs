/// Operator credential store
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// A stored operator login
#[derive(Clone, Deserialize)]
pub struct UserRecord {
    /// Stable user id; defaults to the username
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    /// bcrypt hash of the password
    pub password_hash: String,
}

impl UserRecord {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.username)
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_user(&self, username: &str) -> anyhow::Result<Option<UserRecord>>;
}

/// Credential store backed by the startup configuration
pub struct StaticCredentialStore {
    users: HashMap<String, UserRecord>,
}

impl StaticCredentialStore {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.username.clone(), user))
                .collect(),
        }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn find_user(&self, username: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.users.get(username).cloned())
    }
}
