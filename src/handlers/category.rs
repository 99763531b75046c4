use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{HandlerError, HandlerResult, into_event_result};
use crate::event_bus::{EventHandler, EventResult};
use crate::models::{Category, CategoryEvent, DomainEvent};
use crate::store::CategoryStore;

/// Applies category commands to the store
pub struct CategoryEventHandler {
    store: Arc<dyn CategoryStore>,
}

impl CategoryEventHandler {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    async fn apply(&self, command: &CategoryEvent) -> HandlerResult {
        match command {
            CategoryEvent::Create(cmd) => {
                let category = Category {
                    id: cmd.id,
                    name: cmd.name.clone(),
                };
                self.store.create_category(category).await?;
                Ok(Some(json!({ "id": cmd.id })))
            }
            CategoryEvent::Rename(cmd) => {
                let category = self.store.rename_category(cmd.id, &cmd.name).await?;
                Ok(Some(json!({ "id": category.id, "name": category.name })))
            }
            CategoryEvent::Delete(cmd) => {
                self.store.delete_category(cmd.id).await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl EventHandler<DomainEvent> for CategoryEventHandler {
    async fn handle(&self, event: Arc<DomainEvent>) -> EventResult<DomainEvent> {
        let outcome = match event.as_ref() {
            DomainEvent::Category(command) => self.apply(command).await,
            other => Err(HandlerError::unknown(other)),
        };
        into_event_result(event, outcome)
    }

    fn name(&self) -> &'static str {
        "category"
    }
}
