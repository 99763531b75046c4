use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::{HandlerError, HandlerResult, into_event_result};
use crate::event_bus::{EventHandler, EventResult};
use crate::models::{DomainEvent, Todo, TodoEvent};
use crate::store::TodoStore;

/// Applies to-do commands to the store
pub struct TodoEventHandler {
    store: Arc<dyn TodoStore>,
}

impl TodoEventHandler {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    async fn apply(&self, command: &TodoEvent) -> HandlerResult {
        match command {
            TodoEvent::Create(cmd) => {
                let todo = Todo {
                    id: cmd.id,
                    title: cmd.title.clone(),
                    description: cmd.description.clone(),
                    created_at: cmd.created_at,
                    updated_at: None,
                    categories: cmd.categories.clone(),
                };
                self.store.create_todo(todo).await?;
                Ok(Some(json!({ "id": cmd.id })))
            }
            TodoEvent::Update(cmd) => {
                let todo = self
                    .store
                    .update_todo(cmd.id, &cmd.title, &cmd.description, cmd.updated_at)
                    .await?;
                Ok(Some(json!({ "id": todo.id, "updated_at": todo.updated_at })))
            }
            TodoEvent::Delete(cmd) => {
                self.store.delete_todo(cmd.id).await?;
                Ok(None)
            }
            TodoEvent::AddCategories(cmd) => {
                let todo = self.store.add_categories(cmd.todo_id, &cmd.categories).await?;
                Ok(Some(json!({ "id": todo.id, "categories": todo.categories })))
            }
            TodoEvent::RemoveCategories(cmd) => {
                let todo = self
                    .store
                    .remove_categories(cmd.todo_id, &cmd.categories)
                    .await?;
                Ok(Some(json!({ "id": todo.id, "categories": todo.categories })))
            }
        }
    }
}

#[async_trait]
impl EventHandler<DomainEvent> for TodoEventHandler {
    async fn handle(&self, event: Arc<DomainEvent>) -> EventResult<DomainEvent> {
        let outcome = match event.as_ref() {
            DomainEvent::Todo(command) => self.apply(command).await,
            other => Err(HandlerError::unknown(other)),
        };
        into_event_result(event, outcome)
    }

    fn name(&self) -> &'static str {
        "todo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AddCategories, CategoryEvent, CreateCategory, CreateTodo, DeleteTodo, RemoveCategories,
        UpdateTodo,
    };
    use crate::store::MemoryStore;
    use uuid::Uuid;

    fn handler() -> (TodoEventHandler, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (TodoEventHandler::new(store.clone()), store)
    }

    async fn handle(handler: &TodoEventHandler, event: impl Into<DomainEvent>) -> EventResult<DomainEvent> {
        handler.handle(Arc::new(event.into())).await
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let (handler, store) = handler();
        let create = CreateTodo::new("buy milk", "2 litres", vec![]);
        let id = create.id;

        let created = handle(&handler, TodoEvent::Create(create)).await;
        assert!(created.succeeded);
        assert_eq!(created.response, Some(json!({ "id": id })));

        let updated = handle(&handler, TodoEvent::Update(UpdateTodo::new(id, "buy oat milk", ""))).await;
        assert!(updated.succeeded);
        let stored = store.get_todo(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "buy oat milk");

        let deleted = handle(&handler, TodoEvent::Delete(DeleteTodo { id })).await;
        assert!(deleted.succeeded);
        assert_eq!(store.todo_count().await, 0);
    }

    #[tokio::test]
    async fn test_category_links() {
        let (handler, store) = handler();
        let category = Uuid::new_v4();
        let create = CreateTodo::new("laundry", "", vec![]);
        let id = create.id;
        handle(&handler, TodoEvent::Create(create)).await;

        let added = handle(
            &handler,
            TodoEvent::AddCategories(AddCategories { todo_id: id, categories: vec![category] }),
        )
        .await;
        assert!(added.succeeded);
        assert_eq!(store.get_todo(id).await.unwrap().unwrap().categories, vec![category]);

        let removed = handle(
            &handler,
            TodoEvent::RemoveCategories(RemoveCategories { todo_id: id, categories: vec![category] }),
        )
        .await;
        assert!(removed.succeeded);
        assert!(store.get_todo(id).await.unwrap().unwrap().categories.is_empty());
    }

    #[tokio::test]
    async fn test_missing_todo_fails() {
        let (handler, _store) = handler();
        let result = handle(&handler, TodoEvent::Delete(DeleteTodo { id: Uuid::new_v4() })).await;
        assert!(!result.succeeded);
        assert!(result.response.unwrap()["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_foreign_event_is_reported_as_failure() {
        let (handler, store) = handler();
        let result = handle(&handler, CategoryEvent::Create(CreateCategory::new("home"))).await;
        assert!(!result.succeeded);
        assert_eq!(store.category_count().await, 0);
    }
}
