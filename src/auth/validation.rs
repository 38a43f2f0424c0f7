//! Form fields and local validation for the account step.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::MIN_PASSWORD_LEN;
use crate::error::ValidationError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("email regex is valid"));

/// Whether the form creates a new account or signs in to an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    SignUp,
    SignIn,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::SignUp => Self::SignIn,
            Self::SignIn => Self::SignUp,
        }
    }
}

impl Default for AuthMode {
    fn default() -> Self {
        Self::SignUp
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignUp => write!(f, "sign_up"),
            Self::SignIn => write!(f, "sign_in"),
        }
    }
}

/// Raw values from the account form, as the user typed them.
#[derive(Clone, Default, Deserialize)]
pub struct FormFields {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl FormFields {
    pub fn sign_up(
        full_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            full_name: Some(full_name.into()),
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn sign_in(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            full_name: None,
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for FormFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormFields")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A validated submission, ready for the gateway.
#[derive(Clone)]
pub struct AccountSubmission {
    pub email: String,
    pub password: String,
    /// Present iff the mode is sign-up.
    pub full_name: Option<String>,
    /// Selection snapshot; only sent for sign-up.
    pub symptom_ids: Vec<String>,
}

impl std::fmt::Debug for AccountSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSubmission")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .field("symptom_ids", &self.symptom_ids)
            .finish()
    }
}

/// Check the fields required by `mode` and build a submission.
///
/// Name and email are trimmed; the password is taken as typed.
pub fn validate(
    mode: AuthMode,
    fields: &FormFields,
    symptom_ids: Vec<String>,
) -> Result<AccountSubmission, ValidationError> {
    let full_name = match mode {
        AuthMode::SignUp => {
            let name = fields.full_name.as_deref().unwrap_or("").trim();
            if name.is_empty() {
                return Err(ValidationError::MissingField { field: "full name" });
            }
            Some(name.to_string())
        }
        AuthMode::SignIn => None,
    };

    let email = fields.email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField { field: "email" });
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }

    if fields.password.is_empty() {
        return Err(ValidationError::MissingField { field: "password" });
    }
    if mode == AuthMode::SignUp && fields.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(AccountSubmission {
        email: email.to_string(),
        password: fields.password.clone(),
        full_name,
        symptom_ids: match mode {
            AuthMode::SignUp => symptom_ids,
            AuthMode::SignIn => Vec::new(),
        },
    })
}
