//! Application use cases. Orchestrate domain logic via ports.

pub mod auth_service;
pub mod classify_service;
pub mod session_controller;

pub use auth_service::AuthService;
pub use classify_service::ClassifyService;
pub use session_controller::{INVALID_CREDENTIALS, SessionController, SubmitOutcome};
