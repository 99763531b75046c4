use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::event_bus::{EventBus, EventHandler, EventSubscriber};
use crate::handlers::{CategoryEventHandler, LoggingSubscriber, TodoEventHandler, UserEventHandler};
use crate::models::{DomainEvent, Topic};
use crate::store::MemoryStore;

/// Composition root: the bus with every handler and subscriber wired in
#[derive(Clone)]
pub struct App {
    pub bus: EventBus<DomainEvent>,
    pub store: Arc<MemoryStore>,
}

impl App {
    /// Build the bus from settings and register the domain handlers and the
    /// logging subscriber on their topics. The bus is not started.
    pub async fn build(settings: &Settings) -> Self {
        let bus = EventBus::from_settings(&settings.event);
        let store = Arc::new(MemoryStore::new());

        let todo_handler: Arc<dyn EventHandler<DomainEvent>> =
            Arc::new(TodoEventHandler::new(store.clone()));
        let category_handler: Arc<dyn EventHandler<DomainEvent>> =
            Arc::new(CategoryEventHandler::new(store.clone()));
        let user_handler: Arc<dyn EventHandler<DomainEvent>> =
            Arc::new(UserEventHandler::new(store.clone()));

        bus.register_handler(Topic::TODOS, todo_handler).await;
        bus.register_handler(Topic::CATEGORIES, category_handler).await;
        bus.register_handler(Topic::USERS, user_handler).await;

        let logger: Arc<dyn EventSubscriber<DomainEvent>> = Arc::new(LoggingSubscriber::new());
        for topic in Topic::ALL {
            bus.register_subscriber(topic, logger.clone()).await;
        }

        info!(
            channel_buffer_size = settings.event.channel_buffer_size,
            max_workers = settings.event.max_workers,
            "event bus wired"
        );

        Self { bus, store }
    }
}
