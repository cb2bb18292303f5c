//! Transactional writers.
//!
//! Each `create` runs one transaction: begin, two dependent inserts, commit.
//! If either insert fails the transaction is rolled back and the insert's
//! error is returned. A failed rollback is logged and never replaces that
//! error. Rows from an unfinished transaction are never visible to others.

use log::{debug, error, warn};
use std::future::Future;
use std::time::Duration;

use crate::error::AppError;
use crate::models::{TodoItemInput, TodoListInput};
use crate::store::{TodoTransaction, TransactionSource, UnitOfWork};

/// Creates a todo item and attaches it to a list atomically.
///
/// The caller is trusted to have validated the item (non-empty title) and to
/// have checked that the list belongs to the requesting user.
#[derive(Clone)]
pub struct ItemWriter<S> {
    source: S,
    timeout: Duration,
}

impl<S: TransactionSource> ItemWriter<S> {
    pub fn new(source: S, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Inserts the `todo_items` row and its `lists_items` row, returning the item id.
    pub async fn create(&self, list_id: i32, item: &TodoItemInput) -> Result<i32, AppError> {
        within(self.timeout, async {
            let mut tx = self.source.begin().await?;
            let outcome = insert_item_into_list(&mut tx, list_id, item).await;
            let item_id = finish(tx, outcome).await?;
            debug!("created item {} in list {}", item_id, list_id);
            Ok(item_id)
        })
        .await
    }
}

/// Creates a todo list and records its owner atomically.
#[derive(Clone)]
pub struct ListWriter<S> {
    source: S,
    timeout: Duration,
}

impl<S: TransactionSource> ListWriter<S> {
    pub fn new(source: S, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Inserts the `todo_lists` row and its `users_lists` row, returning the list id.
    pub async fn create(&self, user_id: i32, list: &TodoListInput) -> Result<i32, AppError> {
        within(self.timeout, async {
            let mut tx = self.source.begin().await?;
            let outcome = insert_list_for_user(&mut tx, user_id, list).await;
            let list_id = finish(tx, outcome).await?;
            debug!("created list {} for user {}", list_id, user_id);
            Ok(list_id)
        })
        .await
    }
}

async fn insert_item_into_list<T: TodoTransaction>(
    tx: &mut T,
    list_id: i32,
    item: &TodoItemInput,
) -> Result<i32, AppError> {
    let item_id = tx.insert_item(item).await?;
    tx.attach_item(list_id, item_id).await?;
    Ok(item_id)
}

async fn insert_list_for_user<T: TodoTransaction>(
    tx: &mut T,
    user_id: i32,
    list: &TodoListInput,
) -> Result<i32, AppError> {
    let list_id = tx.insert_list(list).await?;
    tx.attach_list(user_id, list_id).await?;
    Ok(list_id)
}

/// Commits on success, rolls back otherwise.
async fn finish<T: UnitOfWork, R>(tx: T, outcome: Result<R, AppError>) -> Result<R, AppError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!("rollback failed after \"{}\": {}", err, rollback_err);
            }
            Err(err)
        }
    }
}

/// Bounds a whole transaction. On timeout the in-flight transaction is
/// dropped, which rolls it back.
async fn within<F, R>(timeout: Duration, work: F) -> Result<R, AppError>
where
    F: Future<Output = Result<R, AppError>>,
{
    tokio::time::timeout(timeout, work).await.unwrap_or_else(|_| {
        warn!("transaction timed out after {:?}", timeout);
        Err(AppError::Persistence("transaction timed out".into()))
    })
}
