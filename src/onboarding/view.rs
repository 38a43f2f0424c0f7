//! Render-agnostic description of what the current step shows.

use serde::Serialize;
use uuid::Uuid;

use super::catalog::SymptomCatalog;
use super::selection::SelectionSet;
use super::state::{OnboardingStateMachine, OnboardingStep};
use crate::auth::{AuthFormState, AuthMode};
use crate::config::{DISCLAIMER, PRODUCT_NAME};

#[derive(Debug, Clone, Serialize)]
pub struct SymptomView {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub mode: AuthMode,
    pub submitting: bool,
    /// Input names in display order.
    pub fields: Vec<&'static str>,
    pub submit_label: &'static str,
    pub password_placeholder: &'static str,
    pub mode_switch_label: &'static str,
    pub last_error: Option<String>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingView {
    pub session_id: Uuid,
    pub product: &'static str,
    pub step: OnboardingStep,
    pub title: String,
    pub subtitle: &'static str,
    /// Label of the forward action, if the step has one.
    pub advance_label: Option<&'static str>,
    pub can_advance: bool,
    pub can_go_back: bool,
    pub symptoms: Vec<SymptomView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormView>,
    /// Account id once sign-in succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_in: Option<String>,
    pub disclaimer: &'static str,
}

pub(crate) fn build(
    session_id: Uuid,
    catalog: &SymptomCatalog,
    machine: &OnboardingStateMachine,
    selection: &SelectionSet,
    form: AuthFormState,
    signed_in: Option<String>,
) -> OnboardingView {
    let step = machine.step();
    let (title, subtitle, advance_label) = match step {
        OnboardingStep::Welcome => (
            format!("Welcome to {PRODUCT_NAME}"),
            "Your personal AI therapist is here to help you on your journey to better \
             mental health. Let's start by understanding how you're feeling.",
            Some("Start Your Journey"),
        ),
        OnboardingStep::Symptoms => (
            "How are you feeling?".to_string(),
            "Select all that apply to you",
            Some("Continue"),
        ),
        OnboardingStep::CreateAccount => match form.mode {
            AuthMode::SignUp => (
                "Create Your Account".to_string(),
                "Let's get you set up with your personal AI therapist",
                None,
            ),
            AuthMode::SignIn => (
                "Welcome Back".to_string(),
                "Sign in to continue your therapy journey",
                None,
            ),
        },
    };

    let symptoms = catalog
        .entries()
        .iter()
        .map(|e| SymptomView {
            id: e.id,
            label: e.label,
            description: e.description,
            selected: selection.contains(e.id),
        })
        .collect();

    let form = (step == OnboardingStep::CreateAccount).then(|| form_view(form));

    OnboardingView {
        session_id,
        product: PRODUCT_NAME,
        step,
        title,
        subtitle,
        advance_label,
        can_advance: machine.can_advance(selection),
        can_go_back: machine.can_go_back(),
        symptoms,
        form,
        signed_in,
        disclaimer: DISCLAIMER,
    }
}

fn form_view(state: AuthFormState) -> FormView {
    let (fields, submit_label, password_placeholder, mode_switch_label) = match state.mode {
        AuthMode::SignUp => (
            vec!["name", "email", "password"],
            if state.submitting {
                "Creating Account..."
            } else {
                "Create Account"
            },
            "Create a password (min. 6 characters)",
            "Already have an account? Sign in",
        ),
        AuthMode::SignIn => (
            vec!["email", "password"],
            if state.submitting {
                "Signing In..."
            } else {
                "Sign In"
            },
            "Enter your password",
            "Need an account? Sign up",
        ),
    };
    FormView {
        mode: state.mode,
        submitting: state.submitting,
        fields,
        submit_label,
        password_placeholder,
        mode_switch_label,
        last_error: state.last_error,
        notice: state.notice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(machine: &OnboardingStateMachine, selection: &SelectionSet, form: AuthFormState) -> OnboardingView {
        build(
            Uuid::nil(),
            &SymptomCatalog::builtin(),
            machine,
            selection,
            form,
            None,
        )
    }

    #[test]
    fn welcome_view() {
        let view = render(
            &OnboardingStateMachine::new(),
            &SelectionSet::default(),
            AuthFormState::default(),
        );
        assert_eq!(view.title, "Welcome to MindfulAI Therapy");
        assert_eq!(view.advance_label, Some("Start Your Journey"));
        assert!(view.can_advance);
        assert!(!view.can_go_back);
        assert!(view.form.is_none());
        assert!(view.disclaimer.contains("emergency services"));
    }

    #[test]
    fn symptoms_view_marks_selection_and_gate() {
        let mut machine = OnboardingStateMachine::new();
        let mut selection = SelectionSet::default();
        machine.advance(&selection);

        let view = render(&machine, &selection, AuthFormState::default());
        assert_eq!(view.step, OnboardingStep::Symptoms);
        assert!(!view.can_advance);
        assert!(view.symptoms.iter().all(|s| !s.selected));

        selection.toggle("depression");
        let view = render(&machine, &selection, AuthFormState::default());
        assert!(view.can_advance);
        let depression = view.symptoms.iter().find(|s| s.id == "depression").unwrap();
        assert!(depression.selected);
    }

    #[test]
    fn form_view_follows_mode_and_status() {
        let mut machine = OnboardingStateMachine::new();
        let mut selection = SelectionSet::default();
        selection.toggle("anxiety");
        machine.advance(&selection);
        machine.advance(&selection);

        let view = render(&machine, &selection, AuthFormState::default());
        assert_eq!(view.title, "Create Your Account");
        let form = view.form.unwrap();
        assert_eq!(form.fields, vec!["name", "email", "password"]);
        assert_eq!(form.submit_label, "Create Account");

        let state = AuthFormState {
            mode: AuthMode::SignIn,
            submitting: true,
            last_error: None,
            notice: None,
        };
        let view = render(&machine, &selection, state);
        assert_eq!(view.title, "Welcome Back");
        let form = view.form.unwrap();
        assert_eq!(form.fields, vec!["email", "password"]);
        assert_eq!(form.submit_label, "Signing In...");
        assert_eq!(form.mode_switch_label, "Need an account? Sign up");
    }
}
