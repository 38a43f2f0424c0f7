//! Data collected during onboarding and sent to the identity service.

use serde::{Deserialize, Serialize};

/// Metadata attached to a new account at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
    pub full_name: String,
    #[serde(rename = "symptoms")]
    pub symptom_ids: Vec<String>,
}

/// Profile row stored once per account after sign-up.
///
/// Same fields as the account metadata; the row is keyed by the account id
/// the gateway returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub full_name: String,
    #[serde(rename = "symptoms")]
    pub symptom_ids: Vec<String>,
}

impl From<AccountMetadata> for ProfileRecord {
    fn from(meta: AccountMetadata) -> Self {
        Self {
            full_name: meta.full_name,
            symptom_ids: meta.symptom_ids,
        }
    }
}
