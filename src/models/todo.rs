use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Todo
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Category ids, in insertion order
    pub categories: Vec<Uuid>,
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTodo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<Uuid>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>, description: impl Into<String>, categories: Vec<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            created_at: Utc::now(),
            categories,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTodo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

impl UpdateTodo {
    pub fn new(id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTodo {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddCategories {
    pub todo_id: Uuid,
    pub categories: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveCategories {
    pub todo_id: Uuid,
    pub categories: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TodoEvent {
    Create(CreateTodo),
    Update(UpdateTodo),
    Delete(DeleteTodo),
    AddCategories(AddCategories),
    RemoveCategories(RemoveCategories),
}

impl TodoEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TodoEvent::Create(_) => "CreateTodo",
            TodoEvent::Update(_) => "UpdateTodo",
            TodoEvent::Delete(_) => "DeleteTodo",
            TodoEvent::AddCategories(_) => "AddCategoriesToTodo",
            TodoEvent::RemoveCategories(_) => "RemoveCategoriesFromTodo",
        }
    }
}
