//! Account step: form controller and the identity gateway seam.
//!
//! `AuthFormController` validates the form, enforces the single in-flight
//! submission, and runs sign-up (create account, then store profile) or
//! sign-in against an `IdentityGateway`.

pub mod form;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod validation;

pub use form::{AuthFormController, AuthFormState, SubmitOutcome};
pub use gateway::{AccountId, IdentityGateway, Session};
pub use http::HttpGateway;
pub use memory::MemoryGateway;
pub use validation::{AccountSubmission, AuthMode, FormFields};
