use async_trait::async_trait;
use tracing::{info, warn};

use crate::event_bus::{Event, EventResult, EventSubscriber};
use crate::models::DomainEvent;

/// Audit sink: logs every handling outcome
#[derive(Debug, Default)]
pub struct LoggingSubscriber;

impl LoggingSubscriber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSubscriber<DomainEvent> for LoggingSubscriber {
    async fn notify(&self, result: &EventResult<DomainEvent>) {
        let response = result
            .response
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_default();

        if result.succeeded {
            info!(
                topic = %result.event.topic(),
                name = %result.event.name(),
                response = %response,
                "subscriber received result"
            );
        } else {
            warn!(
                topic = %result.event.topic(),
                name = %result.event.name(),
                response = %response,
                "subscriber received failed result"
            );
        }
    }

    fn name(&self) -> &'static str {
        "logger"
    }
}
