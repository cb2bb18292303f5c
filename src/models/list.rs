use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input structure for creating a todo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TodoListInput {
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}
