//! MindfulAI onboarding: step machine, symptom selection, and account
//! sign-up/sign-in against an identity service.

pub mod auth;
pub mod config;
pub mod error;
pub mod onboarding;
