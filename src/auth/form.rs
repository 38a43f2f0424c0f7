//! Account form controller: sign-up/sign-in mode, submit lifecycle and gateway
//! orchestration for the account step.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{info, warn};

use super::gateway::{AccountId, IdentityGateway, Session};
use super::validation::{validate, AccountSubmission, AuthMode, FormFields};
use crate::error::SubmitError;
use crate::onboarding::model::{AccountMetadata, ProfileRecord};

pub const SIGN_UP_SUCCESS_NOTICE: &str = "Account created successfully! You can now sign in.";
pub const SIGN_IN_SUCCESS_NOTICE: &str = "Login successful!";

/// Observable form status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthFormState {
    pub mode: AuthMode,
    /// True only while a gateway request is outstanding.
    pub submitting: bool,
    pub last_error: Option<String>,
    /// Success message from the most recent submit, if any.
    pub notice: Option<String>,
}

/// Successful end of a submit.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Account and profile were both stored; the form is now in sign-in mode.
    Registered { account_id: AccountId },
    /// Credentials accepted; hand the session to whatever comes next.
    Authenticated(Session),
}

/// Drives one account form. At most one submission is in flight at a time.
///
/// The state lock is never held across a gateway call.
pub struct AuthFormController {
    gateway: Arc<dyn IdentityGateway>,
    state: Mutex<AuthFormState>,
}

impl AuthFormController {
    pub fn new(gateway: Arc<dyn IdentityGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(AuthFormState::default()),
        }
    }

    pub fn state(&self) -> AuthFormState {
        self.lock().clone()
    }

    pub fn mode(&self) -> AuthMode {
        self.lock().mode
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().submitting
    }

    /// Switch between sign-up and sign-in. Clears any error or notice.
    pub fn toggle_mode(&self) -> AuthMode {
        let mut state = self.lock();
        state.mode = state.mode.toggled();
        state.last_error = None;
        state.notice = None;
        info!(mode = %state.mode, "Auth form mode changed");
        state.mode
    }

    /// Validate `fields` for the current mode and run the gateway flow.
    ///
    /// Every failure is also recorded as `last_error`, replacing the previous
    /// one, except `InFlight` which leaves the running submission untouched.
    pub async fn submit(
        &self,
        fields: &FormFields,
        symptom_ids: Vec<String>,
    ) -> Result<SubmitOutcome, SubmitError> {
        // Check, validate and claim the in-flight slot under one lock so the
        // mode that was validated is the mode that runs.
        let (mode, submission) = {
            let mut state = self.lock();
            if state.submitting {
                warn!("Submit ignored: another submission is in flight");
                return Err(SubmitError::InFlight);
            }
            let mode = state.mode;
            let submission = match validate(mode, fields, symptom_ids) {
                Ok(submission) => submission,
                Err(e) => {
                    info!(mode = %mode, error = %e, "Account form rejected locally");
                    state.last_error = Some(e.to_string());
                    state.notice = None;
                    return Err(e.into());
                }
            };
            state.submitting = true;
            state.last_error = None;
            state.notice = None;
            (mode, submission)
        };
        let guard = InFlightGuard { controller: self };

        let result = match mode {
            AuthMode::SignUp => self.sign_up(&submission).await,
            AuthMode::SignIn => self.sign_in(&submission).await,
        };

        let mut state = guard.finish();
        match &result {
            Ok(SubmitOutcome::Registered { .. }) => {
                state.mode = AuthMode::SignIn;
                state.notice = Some(SIGN_UP_SUCCESS_NOTICE.to_string());
            }
            Ok(SubmitOutcome::Authenticated(_)) => {
                state.notice = Some(SIGN_IN_SUCCESS_NOTICE.to_string());
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
            }
        }
        result
    }

    async fn sign_up(&self, submission: &AccountSubmission) -> Result<SubmitOutcome, SubmitError> {
        let metadata = AccountMetadata {
            full_name: submission.full_name.clone().unwrap_or_default(),
            symptom_ids: submission.symptom_ids.clone(),
        };

        let account_id = self
            .gateway
            .create_account(&submission.email, &submission.password, &metadata)
            .await
            .map_err(|e| {
                warn!(error = %e, "Account creation failed");
                SubmitError::Gateway(e)
            })?;
        info!(account_id = %account_id, "Account created");

        let profile = ProfileRecord::from(metadata);
        if let Err(e) = self.gateway.persist_profile(&account_id, &profile).await {
            // The account stays; there is no rollback.
            warn!(account_id = %account_id, error = %e, "Profile persistence failed after account creation");
            return Err(SubmitError::PartialSuccess {
                account_id: account_id.0,
                source: e,
            });
        }
        info!(account_id = %account_id, symptoms = profile.symptom_ids.len(), "Profile stored");

        Ok(SubmitOutcome::Registered { account_id })
    }

    async fn sign_in(&self, submission: &AccountSubmission) -> Result<SubmitOutcome, SubmitError> {
        let session = self
            .gateway
            .verify_credentials(&submission.email, &submission.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Sign-in failed");
                SubmitError::Gateway(e)
            })?;
        info!(account_id = %session.account_id, "Signed in");
        Ok(SubmitOutcome::Authenticated(session))
    }

    fn lock(&self) -> MutexGuard<'_, AuthFormState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears `submitting` when a submit ends, including when its future is
/// dropped mid-request.
struct InFlightGuard<'a> {
    controller: &'a AuthFormController,
}

impl<'a> InFlightGuard<'a> {
    fn finish(self) -> MutexGuard<'a, AuthFormState> {
        let controller = self.controller;
        std::mem::forget(self);
        let mut state = controller.lock();
        state.submitting = false;
        state
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        warn!("Submission dropped before the gateway answered");
        self.controller.lock().submitting = false;
    }
}
