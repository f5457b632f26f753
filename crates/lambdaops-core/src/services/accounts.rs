/// Credential resolution - maps symbolic accounts to credential bundles
use crate::constants::DEFAULT_PROD_REGION;
use crate::error::GatewayError;
use crate::models::{Account, AccountKey, CredentialBundle};
use crate::utils::logging::mask_access_key;
use tracing::info;

/// Immutable table of every account the process can act on
///
/// Loaded once at startup; resolution never touches the network or disk.
#[derive(Debug, Clone)]
pub struct AccountTable {
    default: Account,
    prod: Account,
    alt: Account,
}

impl AccountTable {
    pub fn new(default: CredentialBundle, prod: CredentialBundle, alt: CredentialBundle) -> Self {
        Self {
            default: Account {
                key: AccountKey::Default,
                credentials: default,
            },
            prod: Account {
                key: AccountKey::Prod,
                credentials: prod,
            },
            alt: Account {
                key: AccountKey::Alt,
                credentials: alt,
            },
        }
    }

    /// Loads all account bundles from process environment variables
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Loads all account bundles through a variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| GatewayError::Config(format!("Missing {} env var", name)))
        };

        let default = CredentialBundle {
            access_key_id: required("AWS_ACCESS_KEY_ID")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            region: required("AWS_REGION")?,
        };

        let prod = CredentialBundle {
            access_key_id: required("AWS_ACCESS_KEY_ID_PROD")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY_PROD")?,
            region: lookup("AWS_REGION_PROD")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROD_REGION.to_string()),
        };

        let alt = CredentialBundle {
            access_key_id: required("AWS_ACCESS_KEY_ID_ALT")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY_ALT")?,
            region: required("AWS_REGION_ALT")?,
        };

        let table = Self::new(default, prod, alt);

        for key in AccountKey::ALL {
            let account = table.get(key);
            info!(
                account = %key,
                region = %account.region(),
                access_key = %mask_access_key(&account.credentials.access_key_id),
                "Account loaded"
            );
        }

        Ok(table)
    }

    /// Returns the account for a parsed key
    pub fn get(&self, key: AccountKey) -> &Account {
        match key {
            AccountKey::Default => &self.default,
            AccountKey::Prod => &self.prod,
            AccountKey::Alt => &self.alt,
        }
    }

    /// Resolves a raw account parameter; unrecognized or absent keys map to
    /// the default account
    pub fn resolve(&self, raw: Option<&str>) -> &Account {
        self.get(AccountKey::parse_or_default(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("AWS_ACCESS_KEY_ID", "AKIADEFAULT000000001"),
            ("AWS_SECRET_ACCESS_KEY", "default-secret"),
            ("AWS_REGION", "us-east-1"),
            ("AWS_ACCESS_KEY_ID_PROD", "AKIAPROD00000000001"),
            ("AWS_SECRET_ACCESS_KEY_PROD", "prod-secret"),
            ("AWS_ACCESS_KEY_ID_ALT", "AKIAALT000000000001"),
            ("AWS_SECRET_ACCESS_KEY_ALT", "alt-secret"),
            ("AWS_REGION_ALT", "eu-west-1"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AccountTable, GatewayError> {
        AccountTable::from_vars(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_load_all_accounts() {
        let table = load(&vars()).unwrap();

        assert_eq!(table.get(AccountKey::Default).region(), "us-east-1");
        assert_eq!(table.get(AccountKey::Prod).region(), "ap-south-1");
        assert_eq!(table.get(AccountKey::Alt).region(), "eu-west-1");
        assert_eq!(
            table.get(AccountKey::Prod).credentials.secret_access_key,
            "prod-secret"
        );
    }

    #[test]
    fn test_prod_region_override() {
        let mut vars = vars();
        vars.insert("AWS_REGION_PROD", "us-west-2");
        let table = load(&vars).unwrap();
        assert_eq!(table.get(AccountKey::Prod).region(), "us-west-2");
    }

    #[test]
    fn test_missing_var_names_the_variable() {
        let mut vars = vars();
        vars.remove("AWS_SECRET_ACCESS_KEY_ALT");

        let err = load(&vars).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains("AWS_SECRET_ACCESS_KEY_ALT"));
    }

    #[test]
    fn test_blank_var_is_missing() {
        let mut vars = vars();
        vars.insert("AWS_REGION", "  ");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn test_resolve_fallback_to_default() {
        let table = load(&vars()).unwrap();

        assert_eq!(table.resolve(Some("prod")).key, AccountKey::Prod);
        assert_eq!(table.resolve(Some("nope")), table.get(AccountKey::Default));
        assert_eq!(table.resolve(None), table.get(AccountKey::Default));
    }
}
