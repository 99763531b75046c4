pub mod bootstrap;
pub mod config;
pub mod event_bus;
pub mod handlers;
pub mod models;
pub mod store;

use thiserror::Error;

pub use bootstrap::App;
pub use config::Settings;
pub use event_bus::{Event, EventBus, EventHandler, EventResult, EventSubscriber};
pub use models::DomainEvent;

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum TodobusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TodobusError>;
