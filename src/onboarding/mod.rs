//! Onboarding flow — welcome, symptom selection, then the account step.
//!
//! The step machine gates the account step on a non-empty symptom
//! selection. `OnboardingSession` ties the machine, the selection, and the
//! account form together and renders an `OnboardingView` for any front end.

pub mod catalog;
pub mod model;
pub mod routes;
pub mod selection;
pub mod session;
pub mod state;
pub mod view;

pub use catalog::{SymptomCatalog, SymptomEntry};
pub use model::{AccountMetadata, ProfileRecord};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use selection::SelectionSet;
pub use session::{DEFAULT_SESSION_TTL, OnboardingSession, SessionRegistry, spawn_expiry_task};
pub use state::{OnboardingStateMachine, OnboardingStep};
pub use view::OnboardingView;
