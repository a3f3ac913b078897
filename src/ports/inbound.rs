//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: the interactive front end drives the session until the user quits.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the menu -> auth -> upload loop. Returns when the user quits.
    async fn run(&self) -> Result<(), DomainError>;
}
