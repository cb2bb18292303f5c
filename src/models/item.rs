use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Input structure for creating a todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TodoItemInput {
    /// The title of the item. Must not be empty.
    #[validate(length(min = 1))]
    pub title: String,

    /// Free-form description, empty when omitted.
    #[serde(default)]
    pub description: String,
}

/// A todo item as stored in `todo_items` and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TodoItem {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Completion flag; new items start as not done.
    pub done: bool,
}

impl TodoItem {
    pub fn new(id: i32, input: TodoItemInput) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            done: false,
        }
    }
}
