//! The seam to the external identity/storage service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;

use crate::error::GatewayError;
use crate::onboarding::model::{AccountMetadata, ProfileRecord};

/// Identifier the service assigned to a newly created account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated session returned by a successful sign-in.
#[derive(Debug, Clone)]
pub struct Session {
    pub account_id: AccountId,
    pub access_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Credential registration, verification, and profile storage.
///
/// Implementations own their transport and any timeouts; callers make a
/// single attempt per request.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Register a new account.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        metadata: &AccountMetadata,
    ) -> Result<AccountId, GatewayError>;

    /// Check credentials and open a session.
    async fn verify_credentials(&self, email: &str, password: &str)
        -> Result<Session, GatewayError>;

    /// Store the profile row for an account.
    async fn persist_profile(
        &self,
        account_id: &AccountId,
        profile: &ProfileRecord,
    ) -> Result<(), GatewayError>;
}
