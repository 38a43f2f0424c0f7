//! Error types for the onboarding service.

use uuid::Uuid;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors returned by an identity/storage gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The service refused the request (duplicate email, wrong password, ...).
    /// The message is shown to the user verbatim.
    #[error("{message}")]
    Rejected { message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid response from gateway: {reason}")]
    InvalidResponse { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Local form validation failures. No gateway call is made when these occur.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in your {field}")]
    MissingField { field: &'static str },

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Everything that can end a submit attempt without success.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The account exists but its profile record could not be stored.
    #[error("{source}")]
    PartialSuccess {
        account_id: String,
        #[source]
        source: GatewayError,
    },

    #[error("A submission is already in progress")]
    InFlight,

    #[error("The account form is only available on the create-account step")]
    WrongStep,
}

impl SubmitError {
    /// Whether the failure was detected locally (nothing was sent).
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InFlight | Self::WrongStep)
    }
}

/// Onboarding session lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Onboarding session {id} not found")]
    NotFound { id: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_is_verbatim() {
        let err = GatewayError::rejected("User already registered");
        assert_eq!(err.to_string(), "User already registered");
    }

    #[test]
    fn partial_success_displays_underlying_failure() {
        let err = SubmitError::PartialSuccess {
            account_id: "acc-1".to_string(),
            source: GatewayError::rejected("permission denied for table profiles"),
        };
        assert_eq!(err.to_string(), "permission denied for table profiles");
        assert!(!err.is_local());
    }

    #[test]
    fn validation_is_local() {
        let err: SubmitError = ValidationError::MissingField { field: "full name" }.into();
        assert!(err.is_local());
        assert_eq!(err.to_string(), "Please fill in your full name");
        assert!(SubmitError::InFlight.is_local());
    }
}
