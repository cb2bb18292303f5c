use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use validator::Validate;

use super::writer::{ItemWriter, ListWriter};
use crate::error::AppError;
use crate::models::{TodoItem, TodoItemInput, TodoListInput};
use crate::store::{TodoReader, TransactionSource};

/// List and item operations on behalf of an authenticated user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoOperations: Send + Sync {
    /// Creates a list owned by `user_id` and returns its id.
    async fn create_list(&self, user_id: i32, list: TodoListInput) -> Result<i32, AppError>;

    /// Creates an item in one of the caller's lists and returns its id.
    async fn create_item(
        &self,
        user_id: i32,
        list_id: i32,
        item: TodoItemInput,
    ) -> Result<i32, AppError>;

    /// Fetches an item reachable through one of the caller's lists.
    async fn get_item(&self, user_id: i32, item_id: i32) -> Result<TodoItem, AppError>;
}

pub struct TodoService<S> {
    reader: S,
    lists: ListWriter<S>,
    items: ItemWriter<S>,
}

impl<S> TodoService<S>
where
    S: TransactionSource + TodoReader + Clone,
{
    pub fn new(store: S, transaction_timeout: Duration) -> Self {
        Self {
            lists: ListWriter::new(store.clone(), transaction_timeout),
            items: ItemWriter::new(store.clone(), transaction_timeout),
            reader: store,
        }
    }
}

#[async_trait]
impl<S> TodoOperations for TodoService<S>
where
    S: TransactionSource + TodoReader + Clone,
{
    async fn create_list(&self, user_id: i32, list: TodoListInput) -> Result<i32, AppError> {
        list.validate()?;
        self.lists.create(user_id, &list).await
    }

    async fn create_item(
        &self,
        user_id: i32,
        list_id: i32,
        item: TodoItemInput,
    ) -> Result<i32, AppError> {
        item.validate()?;

        if !self.reader.list_owned_by(user_id, list_id).await? {
            debug!("user {} does not own list {}", user_id, list_id);
            return Err(AppError::NotFound("list not found".into()));
        }

        self.items.create(list_id, &item).await
    }

    async fn get_item(&self, user_id: i32, item_id: i32) -> Result<TodoItem, AppError> {
        self.reader
            .find_item(user_id, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("item not found".into()))
    }
}
