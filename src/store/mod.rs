mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Category, Todo, User};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: &'static str, id: Uuid },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Write side of the to-do aggregate
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn create_todo(&self, todo: Todo) -> StoreResult<()>;

    /// Replace title and description, returning the updated row
    async fn update_todo(
        &self,
        id: Uuid,
        title: &str,
        description: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<Todo>;

    async fn delete_todo(&self, id: Uuid) -> StoreResult<()>;

    /// Link categories; ids already linked are skipped
    async fn add_categories(&self, todo_id: Uuid, categories: &[Uuid]) -> StoreResult<Todo>;

    /// Unlink categories; ids not linked are ignored
    async fn remove_categories(&self, todo_id: Uuid, categories: &[Uuid]) -> StoreResult<Todo>;

    async fn get_todo(&self, id: Uuid) -> StoreResult<Option<Todo>>;
}

/// Write side of the category aggregate
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create_category(&self, category: Category) -> StoreResult<()>;

    async fn rename_category(&self, id: Uuid, name: &str) -> StoreResult<Category>;

    async fn delete_category(&self, id: Uuid) -> StoreResult<()>;

    async fn get_category(&self, id: Uuid) -> StoreResult<Option<Category>>;
}

/// Write side of the user aggregate
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: User) -> StoreResult<()>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> StoreResult<()>;

    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;
}
