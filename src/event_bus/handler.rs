use std::sync::Arc;

use async_trait::async_trait;

use super::types::{Event, EventResult};

/// Performs the side-effecting work for an event.
///
/// Handlers never propagate failures to the bus: every outcome, including an
/// event variant the handler does not understand, is reported through
/// [`EventResult::succeeded`].
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync {
    async fn handle(&self, event: Arc<E>) -> EventResult<E>;

    /// Name used in dispatcher logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Read-only observer of handling outcomes.
///
/// A slow subscriber holds the event's handling task, and with it one
/// concurrency permit, for as long as it runs.
#[async_trait]
pub trait EventSubscriber<E: Event>: Send + Sync {
    async fn notify(&self, result: &EventResult<E>);

    /// Name used in dispatcher logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
