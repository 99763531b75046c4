use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored user. The hash is produced by the caller before publishing.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUser {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

impl CreateUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserPassword {
    pub id: Uuid,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteUser {
    pub id: Uuid,
}

// Keep hashes out of debug logs
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for UpdateUserPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUserPassword")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserEvent {
    Create(CreateUser),
    UpdatePassword(UpdateUserPassword),
    Delete(DeleteUser),
}

impl UserEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UserEvent::Create(_) => "CreateUser",
            UserEvent::UpdatePassword(_) => "UpdateUserPassword",
            UserEvent::Delete(_) => "DeleteUser",
        }
    }
}
