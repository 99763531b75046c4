pub mod category;
pub mod todo;
pub mod user;

pub use category::{Category, CategoryEvent, CreateCategory, DeleteCategory, RenameCategory};
pub use todo::{AddCategories, CreateTodo, DeleteTodo, RemoveCategories, Todo, TodoEvent, UpdateTodo};
pub use user::{CreateUser, DeleteUser, UpdateUserPassword, User, UserEvent};

use serde::{Deserialize, Serialize};

use crate::event_bus::Event;

/// Event topics, one per aggregate
pub struct Topic;

impl Topic {
    pub const TODOS: &'static str = "todos";
    pub const CATEGORIES: &'static str = "categories";
    pub const USERS: &'static str = "users";

    pub const ALL: [&'static str; 3] = [Self::TODOS, Self::CATEGORIES, Self::USERS];
}

/// Every write command the bus carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "aggregate", content = "command", rename_all = "snake_case")]
pub enum DomainEvent {
    Todo(TodoEvent),
    Category(CategoryEvent),
    User(UserEvent),
}

impl Event for DomainEvent {
    fn topic(&self) -> &'static str {
        match self {
            DomainEvent::Todo(_) => Topic::TODOS,
            DomainEvent::Category(_) => Topic::CATEGORIES,
            DomainEvent::User(_) => Topic::USERS,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DomainEvent::Todo(e) => e.name(),
            DomainEvent::Category(e) => e.name(),
            DomainEvent::User(e) => e.name(),
        }
    }
}

impl From<TodoEvent> for DomainEvent {
    fn from(event: TodoEvent) -> Self {
        DomainEvent::Todo(event)
    }
}

impl From<CategoryEvent> for DomainEvent {
    fn from(event: CategoryEvent) -> Self {
        DomainEvent::Category(event)
    }
}

impl From<UserEvent> for DomainEvent {
    fn from(event: UserEvent) -> Self {
        DomainEvent::User(event)
    }
}
