use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{HandlerError, HandlerResult, into_event_result};
use crate::event_bus::{EventHandler, EventResult};
use crate::models::{DomainEvent, User, UserEvent};
use crate::store::UserStore;

/// Applies user commands to the store
pub struct UserEventHandler {
    store: Arc<dyn UserStore>,
}

impl UserEventHandler {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    async fn apply(&self, command: &UserEvent) -> HandlerResult {
        match command {
            UserEvent::Create(cmd) => {
                let user = User {
                    id: cmd.id,
                    username: cmd.username.clone(),
                    password_hash: cmd.password_hash.clone(),
                };
                self.store.create_user(user).await?;
                Ok(Some(json!({ "id": cmd.id, "username": cmd.username })))
            }
            UserEvent::UpdatePassword(cmd) => {
                self.store.update_password(cmd.id, &cmd.password_hash).await?;
                Ok(None)
            }
            UserEvent::Delete(cmd) => {
                self.store.delete_user(cmd.id).await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl EventHandler<DomainEvent> for UserEventHandler {
    async fn handle(&self, event: Arc<DomainEvent>) -> EventResult<DomainEvent> {
        let outcome = match event.as_ref() {
            DomainEvent::User(command) => self.apply(command).await,
            other => Err(HandlerError::unknown(other)),
        };
        into_event_result(event, outcome)
    }

    fn name(&self) -> &'static str {
        "user"
    }
}
