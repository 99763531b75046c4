// Domain event handlers
//
// One handler per aggregate topic plus the audit subscriber. Handlers turn
// every outcome into an `EventResult`; store failures and foreign variants are
// logged here and reported as failed results.

mod category;
mod logger;
mod todo;
mod user;

pub use category::CategoryEventHandler;
pub use logger::LoggingSubscriber;
pub use todo::TodoEventHandler;
pub use user::UserEventHandler;

use std::sync::Arc;

use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

use crate::event_bus::{Event, EventResult};
use crate::models::DomainEvent;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown event {name} on topic {topic}")]
    UnknownEvent {
        topic: &'static str,
        name: &'static str,
    },
}

impl HandlerError {
    pub fn unknown(event: &DomainEvent) -> Self {
        HandlerError::UnknownEvent {
            topic: event.topic(),
            name: event.name(),
        }
    }
}

pub type HandlerResult = std::result::Result<Option<Value>, HandlerError>;

/// Convert a handler outcome into the result relayed to subscribers
pub(crate) fn into_event_result(
    event: Arc<DomainEvent>,
    outcome: HandlerResult,
) -> EventResult<DomainEvent> {
    match outcome {
        Ok(Some(response)) => EventResult::success(event).with_response(response),
        Ok(None) => EventResult::success(event),
        Err(e) => {
            error!(
                topic = %event.topic(),
                name = %event.name(),
                error = %e,
                "error during event execution"
            );
            EventResult::failure(event).with_response(json!({ "error": e.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryEvent, DeleteCategory};
    use uuid::Uuid;

    fn event() -> Arc<DomainEvent> {
        Arc::new(CategoryEvent::Delete(DeleteCategory { id: Uuid::nil() }).into())
    }

    #[test]
    fn test_success_keeps_response() {
        let result = into_event_result(event(), Ok(Some(json!({"id": 7}))));
        assert!(result.succeeded);
        assert_eq!(result.response, Some(json!({"id": 7})));
    }

    #[test]
    fn test_failure_carries_error_message() {
        let id = Uuid::new_v4();
        let outcome = Err(StoreError::NotFound { entity: "category", id }.into());
        let result = into_event_result(event(), outcome);

        assert!(!result.succeeded);
        let message = result.response.unwrap()["error"].as_str().unwrap().to_string();
        assert_eq!(message, format!("category {} not found", id));
    }

    #[test]
    fn test_unknown_event_names_the_variant() {
        let err = HandlerError::unknown(&event());
        assert_eq!(err.to_string(), "unknown event DeleteCategory on topic categories");
    }
}
