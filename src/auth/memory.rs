//! In-memory identity gateway for local development and tests.
//!
//! Accounts and profiles live only as long as the process. Used when no
//! remote service is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::gateway::{AccountId, IdentityGateway, Session};
use crate::error::GatewayError;
use crate::onboarding::model::{AccountMetadata, ProfileRecord};

/// Session lifetime handed out by `verify_credentials`.
const SESSION_TTL_SECS: i64 = 3600;

struct StoredAccount {
    id: AccountId,
    password: String,
    metadata: AccountMetadata,
}

/// Process-local stand-in for the identity/storage service.
#[derive(Default)]
pub struct MemoryGateway {
    /// Keyed by lowercased email.
    accounts: RwLock<HashMap<String, StoredAccount>>,
    profiles: RwLock<HashMap<AccountId, ProfileRecord>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn profile(&self, account_id: &AccountId) -> Option<ProfileRecord> {
        self.profiles.read().await.get(account_id).cloned()
    }

    /// Metadata recorded at sign-up for `email`.
    pub async fn metadata(&self, email: &str) -> Option<AccountMetadata> {
        self.accounts
            .read()
            .await
            .get(&email.to_lowercase())
            .map(|a| a.metadata.clone())
    }
}

#[async_trait]
impl IdentityGateway for MemoryGateway {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        metadata: &AccountMetadata,
    ) -> Result<AccountId, GatewayError> {
        let key = email.to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(GatewayError::rejected("User already registered"));
        }

        let id = AccountId(Uuid::new_v4().to_string());
        accounts.insert(
            key,
            StoredAccount {
                id: id.clone(),
                password: password.to_string(),
                metadata: metadata.clone(),
            },
        );
        info!(account_id = %id, "Account registered (in-memory)");
        Ok(id)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, GatewayError> {
        let accounts = self.accounts.read().await;
        match accounts.get(&email.to_lowercase()) {
            Some(account) if account.password == password => Ok(Session {
                account_id: account.id.clone(),
                access_token: SecretString::from(Uuid::new_v4().to_string()),
                expires_at: Some(Utc::now() + chrono::Duration::seconds(SESSION_TTL_SECS)),
            }),
            _ => {
                debug!("Credential check failed (in-memory)");
                Err(GatewayError::rejected("Invalid login credentials"))
            }
        }
    }

    async fn persist_profile(
        &self,
        account_id: &AccountId,
        profile: &ProfileRecord,
    ) -> Result<(), GatewayError> {
        let known = self
            .accounts
            .read()
            .await
            .values()
            .any(|a| &a.id == account_id);
        if !known {
            return Err(GatewayError::rejected(format!(
                "No account with id {account_id}"
            )));
        }

        let mut profiles = self.profiles.write().await;
        if profiles.contains_key(account_id) {
            return Err(GatewayError::rejected(
                "duplicate key value violates unique constraint \"profiles_pkey\"",
            ));
        }
        profiles.insert(account_id.clone(), profile.clone());
        Ok(())
    }
}
