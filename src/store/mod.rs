//! Persistence seams.
//!
//! The services depend on these traits only. `postgres` holds the production
//! adapter; tests use mocks or the in-memory store in `memory`.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewUser, TodoItem, TodoItemInput, TodoListInput, UserCredentials};

pub use postgres::{PgStore, PgTransaction};

/// Persists user identities and their password hashes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user and returns its generated id.
    ///
    /// A taken username surfaces as [`AppError::Conflict`].
    async fn create_user(&self, user: NewUser) -> Result<i32, AppError>;

    async fn find_by_username(&self, username: &str)
        -> Result<Option<UserCredentials>, AppError>;
}

/// A database transaction that must be finished explicitly.
///
/// Both finishers consume the handle. A handle dropped without either is
/// rolled back by the implementation.
#[async_trait]
pub trait UnitOfWork: Send + Sized {
    async fn commit(self) -> Result<(), AppError>;
    async fn rollback(self) -> Result<(), AppError>;
}

/// The writes available inside a todo transaction.
///
/// Every failure is reported as [`AppError::Persistence`].
#[async_trait]
pub trait TodoTransaction: UnitOfWork {
    /// Inserts a `todo_items` row and returns its id.
    async fn insert_item(&mut self, item: &TodoItemInput) -> Result<i32, AppError>;
    /// Inserts the `lists_items` association row.
    async fn attach_item(&mut self, list_id: i32, item_id: i32) -> Result<(), AppError>;
    /// Inserts a `todo_lists` row and returns its id.
    async fn insert_list(&mut self, list: &TodoListInput) -> Result<i32, AppError>;
    /// Inserts the `users_lists` association row.
    async fn attach_list(&mut self, user_id: i32, list_id: i32) -> Result<(), AppError>;
}

/// Opens transactions, one pooled connection each.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    type Tx: TodoTransaction;

    async fn begin(&self) -> Result<Self::Tx, AppError>;
}

/// Read-only queries scoped to the owning user.
#[async_trait]
pub trait TodoReader: Send + Sync {
    async fn list_owned_by(&self, user_id: i32, list_id: i32) -> Result<bool, AppError>;

    async fn find_item(&self, user_id: i32, item_id: i32) -> Result<Option<TodoItem>, AppError>;
}
