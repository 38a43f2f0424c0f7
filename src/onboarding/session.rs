//! OnboardingSession: one user's pass through the flow, plus a registry of
//! live sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::catalog::SymptomCatalog;
use super::selection::SelectionSet;
use super::state::{OnboardingStateMachine, OnboardingStep};
use super::view::{self, OnboardingView};
use crate::auth::{AuthFormController, AuthMode, FormFields, IdentityGateway, SubmitOutcome};
use crate::error::{SessionError, SubmitError};

#[derive(Debug, Default)]
struct Flow {
    machine: OnboardingStateMachine,
    selection: SelectionSet,
    signed_in: Option<String>,
}

/// Step, selection, and account form for a single user.
///
/// Nothing here is persisted; dropping the session discards the selection.
pub struct OnboardingSession {
    id: Uuid,
    catalog: SymptomCatalog,
    flow: Mutex<Flow>,
    form: AuthFormController,
    created_at: DateTime<Utc>,
}

impl OnboardingSession {
    pub fn new(gateway: Arc<dyn IdentityGateway>) -> Self {
        let catalog = SymptomCatalog::builtin();
        Self {
            id: Uuid::new_v4(),
            catalog,
            flow: Mutex::new(Flow {
                selection: SelectionSet::new(catalog),
                ..Default::default()
            }),
            form: AuthFormController::new(gateway),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn step(&self) -> OnboardingStep {
        self.lock().machine.step()
    }

    pub fn selected(&self) -> Vec<String> {
        self.lock().selection.snapshot()
    }

    pub fn form(&self) -> &AuthFormController {
        &self.form
    }

    /// Move forward if allowed; returns the step afterwards.
    pub fn advance(&self) -> OnboardingStep {
        let mut flow = self.lock();
        let Flow {
            machine, selection, ..
        } = &mut *flow;
        machine.advance(selection);
        machine.step()
    }

    /// Move back if possible; returns the step afterwards.
    pub fn back(&self) -> OnboardingStep {
        let mut flow = self.lock();
        flow.machine.back();
        flow.machine.step()
    }

    /// Toggle a symptom. Only the symptoms step accepts changes; elsewhere
    /// the current membership is returned unchanged.
    pub fn toggle_symptom(&self, id: &str) -> bool {
        let mut flow = self.lock();
        if flow.machine.step() != OnboardingStep::Symptoms {
            debug!(session_id = %self.id, step = %flow.machine.step(), "Symptom toggle outside symptoms step ignored");
            return flow.selection.contains(id);
        }
        flow.selection.toggle(id)
    }

    pub fn toggle_mode(&self) -> Result<AuthMode, SubmitError> {
        self.require_account_step()?;
        Ok(self.form.toggle_mode())
    }

    /// Submit the account form with the current selection.
    pub async fn submit(&self, fields: &FormFields) -> Result<SubmitOutcome, SubmitError> {
        let snapshot = {
            let flow = self.lock();
            if flow.machine.step() != OnboardingStep::CreateAccount {
                return Err(SubmitError::WrongStep);
            }
            flow.selection.snapshot()
        };

        let outcome = self.form.submit(fields, snapshot).await?;
        if let SubmitOutcome::Authenticated(ref session) = outcome {
            info!(session_id = %self.id, account_id = %session.account_id, "Onboarding finished");
            self.lock().signed_in = Some(session.account_id.to_string());
        }
        Ok(outcome)
    }

    pub fn view(&self) -> OnboardingView {
        let form = self.form.state();
        let flow = self.lock();
        view::build(
            self.id,
            &self.catalog,
            &flow.machine,
            &flow.selection,
            form,
            flow.signed_in.clone(),
        )
    }

    fn require_account_step(&self) -> Result<(), SubmitError> {
        if self.step() == OnboardingStep::CreateAccount {
            Ok(())
        } else {
            Err(SubmitError::WrongStep)
        }
    }

    fn lock(&self) -> MutexGuard<'_, Flow> {
        self.flow.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// How long a session lives before the registry drops it.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Live onboarding sessions, keyed by id.
///
/// Sessions older than the TTL are invisible to `get` and are dropped by
/// `expire_old`, so abandoned flows do not accumulate.
pub struct SessionRegistry {
    gateway: Arc<dyn IdentityGateway>,
    sessions: RwLock<HashMap<Uuid, Arc<OnboardingSession>>>,
    ttl: chrono::Duration,
}

impl SessionRegistry {
    pub fn new(gateway: Arc<dyn IdentityGateway>) -> Arc<Self> {
        Self::with_ttl(gateway, DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(gateway: Arc<dyn IdentityGateway>, ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            sessions: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        })
    }

    pub async fn create(&self) -> Arc<OnboardingSession> {
        let session = Arc::new(OnboardingSession::new(Arc::clone(&self.gateway)));
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));
        info!(session_id = %session.id(), "Onboarding session started");
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Arc<OnboardingSession>, SessionError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .filter(|session| !self.is_expired(session, Utc::now()))
            .cloned()
            .ok_or(SessionError::NotFound { id })
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                info!(session_id = %id, "Onboarding session ended");
                Ok(())
            }
            None => Err(SessionError::NotFound { id }),
        }
    }

    /// Drop every session older than the TTL. Returns how many were removed.
    pub async fn expire_old(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        let expired = before - sessions.len();
        if expired > 0 {
            info!(expired, remaining = sessions.len(), "Expired onboarding sessions");
        }
        expired
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn is_expired(&self, session: &OnboardingSession, now: DateTime<Utc>) -> bool {
        now - session.created_at() >= self.ttl
    }
}

/// Periodically drop expired sessions from `registry`.
pub fn spawn_expiry_task(
    registry: Arc<SessionRegistry>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            registry.expire_old().await;
        }
    })
}
