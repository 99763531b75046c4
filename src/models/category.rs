use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCategory {
    pub id: Uuid,
    pub name: String,
}

impl CreateCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameCategory {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteCategory {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CategoryEvent {
    Create(CreateCategory),
    Rename(RenameCategory),
    Delete(DeleteCategory),
}

impl CategoryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryEvent::Create(_) => "CreateCategory",
            CategoryEvent::Rename(_) => "RenameCategory",
            CategoryEvent::Delete(_) => "DeleteCategory",
        }
    }
}
