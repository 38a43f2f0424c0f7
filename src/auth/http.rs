//! HTTP identity gateway — talks to a Supabase-compatible auth + REST API.
//!
//! - sign-up: `POST /auth/v1/signup`
//! - sign-in: `POST /auth/v1/token?grant_type=password`
//! - profile: `POST /rest/v1/{table}`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::gateway::{AccountId, IdentityGateway, Session};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::onboarding::model::{AccountMetadata, ProfileRecord};

const SIGN_UP_FALLBACK: &str = "An error occurred during sign up";
const SIGN_IN_FALLBACK: &str = "An error occurred during login";
const PROFILE_FALLBACK: &str = "An error occurred while saving your profile";

/// Gateway backed by a remote identity service over HTTPS.
pub struct HttpGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct UserBody {
    id: String,
}

/// Sign-up answers with either a bare user or a session wrapping one,
/// depending on whether the service auto-confirms emails.
#[derive(Deserialize)]
struct SignUpBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    user: Option<UserBody>,
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserBody,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Http(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Attach the API key headers every endpoint expects.
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.config.anon_key.expose_secret();
        builder
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
    }

    async fn read_json(response: Response, fallback: &str) -> Result<Value, GatewayError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, "Identity service returned an error");
            return Err(GatewayError::rejected(error_message(&text, fallback)));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl IdentityGateway for HttpGateway {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        metadata: &AccountMetadata,
    ) -> Result<AccountId, GatewayError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": metadata,
        });
        let response = self
            .authorized(self.client.post(self.url("/auth/v1/signup")))
            .json(&body)
            .send()
            .await?;

        let value = Self::read_json(response, SIGN_UP_FALLBACK).await?;
        let id = account_id_from_sign_up(value)?;
        debug!(account_id = %id, "Sign-up accepted");
        Ok(id)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, GatewayError> {
        let response = self
            .authorized(
                self.client
                    .post(self.url("/auth/v1/token"))
                    .query(&[("grant_type", "password")]),
            )
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let value = Self::read_json(response, SIGN_IN_FALLBACK).await?;
        session_from_token(value, Utc::now())
    }

    async fn persist_profile(
        &self,
        account_id: &AccountId,
        profile: &ProfileRecord,
    ) -> Result<(), GatewayError> {
        let row = json!([{
            "id": account_id.as_str(),
            "full_name": profile.full_name,
            "symptoms": profile.symptom_ids,
        }]);
        let path = format!("/rest/v1/{}", self.config.profiles_table);
        let response = self
            .authorized(self.client.post(self.url(&path)))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;

        Self::read_json(response, PROFILE_FALLBACK).await?;
        Ok(())
    }
}

/// Pull the account id out of a sign-up response.
fn account_id_from_sign_up(value: Value) -> Result<AccountId, GatewayError> {
    let body: SignUpBody = serde_json::from_value(value)?;
    body.user
        .map(|u| u.id)
        .or(body.id)
        .filter(|id| !id.is_empty())
        .map(AccountId)
        .ok_or_else(|| GatewayError::InvalidResponse {
            reason: "sign-up response carried no user id".to_string(),
        })
}

fn session_from_token(value: Value, now: DateTime<Utc>) -> Result<Session, GatewayError> {
    let body: TokenBody = serde_json::from_value(value)?;
    let expires_at = match (body.expires_at, body.expires_in) {
        (Some(ts), _) => DateTime::<Utc>::from_timestamp(ts, 0),
        (None, Some(secs)) => Some(now + chrono::Duration::seconds(secs)),
        (None, None) => None,
    };
    Ok(Session {
        account_id: AccountId(body.user.id),
        access_token: SecretString::from(body.access_token),
        expires_at,
    })
}

/// Best human-readable message from an error body.
///
/// Auth endpoints use `msg` or `error_description`, the REST layer uses
/// `message`; anything else falls back to `fallback`.
fn error_message(body: &str, fallback: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return fallback.to_string();
    };
    ["msg", "error_description", "message", "error"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
