//! Onboarding state machine — tracks which step the user is on.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::selection::SelectionSet;

/// The steps of the onboarding flow.
///
/// Forward: Welcome → Symptoms → CreateAccount. Each step except Welcome can
/// go back one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    Symptoms,
    CreateAccount,
}

impl OnboardingStep {
    /// Check if a transition from `self` to `target` exists at all,
    /// ignoring the selection gate.
    pub fn can_transition_to(&self, target: OnboardingStep) -> bool {
        use OnboardingStep::*;
        matches!(
            (self, target),
            (Welcome, Symptoms)
                | (Symptoms, CreateAccount)
                | (Symptoms, Welcome)
                | (CreateAccount, Symptoms)
        )
    }

    /// The step `advance()` leads to, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Welcome => Some(Symptoms),
            Symptoms => Some(CreateAccount),
            CreateAccount => None,
        }
    }

    /// The step `back()` leads to, if any.
    pub fn previous(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Welcome => None,
            Symptoms => Some(Welcome),
            CreateAccount => Some(Symptoms),
        }
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Welcome
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::Symptoms => "symptoms",
            Self::CreateAccount => "create_account",
        };
        write!(f, "{s}")
    }
}

/// Owns the current step. Transitions that do not exist, or that are gated
/// off, leave the step unchanged.
#[derive(Debug, Clone, Default)]
pub struct OnboardingStateMachine {
    step: OnboardingStep,
}

impl OnboardingStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    /// Whether `advance()` would move right now.
    ///
    /// Leaving Symptoms requires at least one selected symptom.
    pub fn can_advance(&self, selection: &SelectionSet) -> bool {
        match self.step {
            OnboardingStep::Welcome => true,
            OnboardingStep::Symptoms => !selection.is_empty(),
            OnboardingStep::CreateAccount => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.step.previous().is_some()
    }

    /// Move forward one step. Returns the new step, or `None` if nothing changed.
    pub fn advance(&mut self, selection: &SelectionSet) -> Option<OnboardingStep> {
        if !self.can_advance(selection) {
            debug!(step = %self.step, selected = selection.len(), "Advance ignored");
            return None;
        }
        let next = self.step.next()?;
        self.move_to(next)
    }

    /// Move back one step. Returns the new step, or `None` if nothing changed.
    ///
    /// The selection is not touched, so choices survive a round trip.
    pub fn back(&mut self) -> Option<OnboardingStep> {
        let Some(previous) = self.step.previous() else {
            debug!(step = %self.step, "Back ignored");
            return None;
        };
        self.move_to(previous)
    }

    fn move_to(&mut self, target: OnboardingStep) -> Option<OnboardingStep> {
        if !self.step.can_transition_to(target) {
            return None;
        }
        info!(from = %self.step, to = %target, "Onboarding step changed");
        self.step = target;
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(ids: &[&str]) -> SelectionSet {
        let mut set = SelectionSet::default();
        for id in ids {
            set.toggle(id);
        }
        set
    }

    #[test]
    fn valid_transitions() {
        use OnboardingStep::*;
        let transitions = [
            (Welcome, Symptoms),
            (Symptoms, CreateAccount),
            (Symptoms, Welcome),
            (CreateAccount, Symptoms),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use OnboardingStep::*;
        // Skip a step
        assert!(!Welcome.can_transition_to(CreateAccount));
        assert!(!CreateAccount.can_transition_to(Welcome));
        // Self-transition
        assert!(!Symptoms.can_transition_to(Symptoms));
    }

    #[test]
    fn display_matches_serde() {
        use OnboardingStep::*;
        for step in [Welcome, Symptoms, CreateAccount] {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{display}\""), json, "mismatch for {step:?}");
        }
    }

    #[test]
    fn starts_at_welcome() {
        let machine = OnboardingStateMachine::new();
        assert_eq!(machine.step(), OnboardingStep::Welcome);
        assert!(!machine.can_go_back());
    }

    #[test]
    fn welcome_advances_unconditionally() {
        let mut machine = OnboardingStateMachine::new();
        let empty = SelectionSet::default();
        assert_eq!(machine.advance(&empty), Some(OnboardingStep::Symptoms));
    }

    #[test]
    fn symptoms_advance_is_gated_on_selection() {
        let mut machine = OnboardingStateMachine::new();
        let empty = SelectionSet::default();
        machine.advance(&empty);

        assert!(!machine.can_advance(&empty));
        assert_eq!(machine.advance(&empty), None);
        assert_eq!(machine.step(), OnboardingStep::Symptoms);

        let some = selected(&["anxiety"]);
        assert!(machine.can_advance(&some));
        assert_eq!(machine.advance(&some), Some(OnboardingStep::CreateAccount));
    }

    #[test]
    fn advance_from_create_account_is_noop() {
        let mut machine = OnboardingStateMachine::new();
        let some = selected(&["stress"]);
        machine.advance(&some);
        machine.advance(&some);
        assert_eq!(machine.step(), OnboardingStep::CreateAccount);

        assert_eq!(machine.advance(&some), None);
        assert_eq!(machine.step(), OnboardingStep::CreateAccount);
    }

    #[test]
    fn back_from_welcome_is_noop() {
        let mut machine = OnboardingStateMachine::new();
        assert_eq!(machine.back(), None);
        assert_eq!(machine.step(), OnboardingStep::Welcome);
    }

    #[test]
    fn back_walks_to_welcome_and_keeps_selection() {
        let mut machine = OnboardingStateMachine::new();
        let some = selected(&["anxiety", "ptsd"]);
        let before = some.snapshot();
        machine.advance(&some);
        machine.advance(&some);

        assert_eq!(machine.back(), Some(OnboardingStep::Symptoms));
        assert_eq!(some.snapshot(), before);
        assert!(machine.can_advance(&some));

        assert_eq!(machine.back(), Some(OnboardingStep::Welcome));
    }
}
