//! Infrastructure adapters. Implement outbound ports.
//!
//! SQLite, password hashing, model inference, image decoding, terminal UI.
//! Map errors to DomainError.

pub mod imaging;
pub mod model;
pub mod persistence;
pub mod security;
pub mod ui;
