//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod advice;
pub mod entities;
pub mod errors;
pub mod session;

pub use entities::{
    CHANNELS, Diagnosis, DiseaseLabel, IMAGE_SIZE, ImageTensor, NUM_CLASSES, Prediction,
    RegistrationForm, UserRecord,
};
pub use errors::{DomainError, RegistrationError};
pub use session::{MenuChoice, Screen, Session};
