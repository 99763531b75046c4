use std::collections::HashMap;
use std::collections::hash_map::Entry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CategoryStore, StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{Category, Todo, User};

/// In-memory store for all three aggregates
#[derive(Default)]
pub struct MemoryStore {
    todos: RwLock<HashMap<Uuid, Todo>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn todo_count(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn category_count(&self) -> usize {
        self.categories.read().await.len()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

fn insert_new<T>(map: &mut HashMap<Uuid, T>, entity: &'static str, id: Uuid, value: T) -> StoreResult<()> {
    match map.entry(id) {
        Entry::Occupied(_) => Err(StoreError::AlreadyExists { entity, id }),
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
    }
}

fn not_found(entity: &'static str, id: Uuid) -> StoreError {
    StoreError::NotFound { entity, id }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create_todo(&self, todo: Todo) -> StoreResult<()> {
        let mut todos = self.todos.write().await;
        let id = todo.id;
        insert_new(&mut todos, "todo", id, todo)
    }

    async fn update_todo(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos.get_mut(&id).ok_or_else(|| not_found("todo", id))?;
        todo.title = title.to_string();
        todo.description = description.to_string();
        todo.updated_at = Some(updated_at);
        Ok(todo.clone())
    }

    async fn delete_todo(&self, id: Uuid) -> StoreResult<()> {
        let mut todos = self.todos.write().await;
        todos.remove(&id).map(|_| ()).ok_or_else(|| not_found("todo", id))
    }

    async fn add_categories(&self, todo_id: Uuid, categories: &[Uuid]) -> StoreResult<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .get_mut(&todo_id)
            .ok_or_else(|| not_found("todo", todo_id))?;
        for category in categories {
            if !todo.categories.contains(category) {
                todo.categories.push(*category);
            }
        }
        Ok(todo.clone())
    }

    async fn remove_categories(&self, todo_id: Uuid, categories: &[Uuid]) -> StoreResult<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .get_mut(&todo_id)
            .ok_or_else(|| not_found("todo", todo_id))?;
        todo.categories.retain(|c| !categories.contains(c));
        Ok(todo.clone())
    }

    async fn get_todo(&self, id: Uuid) -> StoreResult<Option<Todo>> {
        Ok(self.todos.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn create_category(&self, category: Category) -> StoreResult<()> {
        let mut categories = self.categories.write().await;
        let id = category.id;
        insert_new(&mut categories, "category", id, category)
    }

    async fn rename_category(&self, id: Uuid, name: &str) -> StoreResult<Category> {
        let mut categories = self.categories.write().await;
        let category = categories
            .get_mut(&id)
            .ok_or_else(|| not_found("category", id))?;
        category.name = name.to_string();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<()> {
        let mut categories = self.categories.write().await;
        categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("category", id))
    }

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let id = user.id;
        insert_new(&mut users, "user", id, user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or_else(|| not_found("user", id))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut users = self.users.write().await;
        users.remove(&id).map(|_| ()).ok_or_else(|| not_found("user", id))
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(title: &str) -> Todo {
        Todo {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: None,
            categories: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_todo_lifecycle() {
        let store = MemoryStore::new();
        let item = todo("write tests");
        let id = item.id;

        store.create_todo(item.clone()).await.unwrap();
        assert_eq!(
            store.create_todo(item).await,
            Err(StoreError::AlreadyExists { entity: "todo", id })
        );

        let updated = store.update_todo(id, "ship", "today", Utc::now()).await.unwrap();
        assert_eq!(updated.title, "ship");
        assert!(updated.updated_at.is_some());

        store.delete_todo(id).await.unwrap();
        assert_eq!(store.get_todo(id).await.unwrap(), None);
        assert_eq!(
            store.delete_todo(id).await,
            Err(StoreError::NotFound { entity: "todo", id })
        );
    }

    #[tokio::test]
    async fn test_category_links_are_deduplicated() {
        let store = MemoryStore::new();
        let item = todo("groceries");
        let id = item.id;
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.create_todo(item).await.unwrap();

        store.add_categories(id, &[a, b]).await.unwrap();
        let linked = store.add_categories(id, &[a]).await.unwrap();
        assert_eq!(linked.categories, vec![a, b]);

        let unlinked = store.remove_categories(id, &[a, Uuid::new_v4()]).await.unwrap();
        assert_eq!(unlinked.categories, vec![b]);
    }

    #[tokio::test]
    async fn test_missing_rows_report_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(
            store.rename_category(id, "x").await,
            Err(StoreError::NotFound { entity: "category", .. })
        ));
        assert!(matches!(
            store.update_password(id, "h").await,
            Err(StoreError::NotFound { entity: "user", .. })
        ));
        assert!(matches!(
            store.add_categories(id, &[]).await,
            Err(StoreError::NotFound { entity: "todo", .. })
        ));
    }

    #[tokio::test]
    async fn test_user_password_update() {
        let store = MemoryStore::new();
        let user = User {
            id: Uuid::new_v4(),
            username: "carol".to_string(),
            password_hash: "old".to_string(),
        };
        let id = user.id;
        store.create_user(user).await.unwrap();

        store.update_password(id, "new").await.unwrap();
        let stored = store.get_user(id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new");
        assert_eq!(store.user_count().await, 1);
    }
}
