pub mod item;
pub mod list;
pub mod user;

pub use item::{TodoItem, TodoItemInput};
pub use list::TodoListInput;
pub use user::{NewUser, UserCredentials};
