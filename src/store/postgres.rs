use async_trait::async_trait;
use log::info;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Duration;

use super::{CredentialStore, TodoReader, TodoTransaction, TransactionSource, UnitOfWork};
use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::models::{NewUser, TodoItem, TodoItemInput, TodoListInput, UserCredentials};

/// Postgres adapter for every persistence seam.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool sized by `config` and verifies that a connection can be made.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(config.options.clone())
            .await?;
        info!(
            "connected to database with up to {} connections",
            config.max_connections
        );
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn persistence(error: sqlx::Error) -> AppError {
    AppError::Persistence(error.to_string())
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<i32, AppError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO users (name, username, password_hash) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let user = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl TransactionSource for PgStore {
    type Tx = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, AppError> {
        let tx = self.pool.begin().await.map_err(persistence)?;
        Ok(PgTransaction { tx })
    }
}

#[async_trait]
impl TodoReader for PgStore {
    async fn list_owned_by(&self, user_id: i32, list_id: i32) -> Result<bool, AppError> {
        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users_lists WHERE user_id = $1 AND list_id = $2)",
        )
        .bind(user_id)
        .bind(list_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(owned)
    }

    async fn find_item(&self, user_id: i32, item_id: i32) -> Result<Option<TodoItem>, AppError> {
        let item = sqlx::query_as::<_, TodoItem>(
            "SELECT ti.id, ti.title, ti.description, ti.done
             FROM todo_items ti
             INNER JOIN lists_items li ON li.item_id = ti.id
             INNER JOIN users_lists ul ON ul.list_id = li.list_id
             WHERE ti.id = $1 AND ul.user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }
}

/// An open Postgres transaction.
///
/// `sqlx` rolls the transaction back when it is dropped unfinished, which
/// covers panics and cancelled futures.
pub struct PgTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgTransaction {
    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await.map_err(persistence)
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.tx.rollback().await.map_err(persistence)
    }
}

#[async_trait]
impl TodoTransaction for PgTransaction {
    async fn insert_item(&mut self, item: &TodoItemInput) -> Result<i32, AppError> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO todo_items (title, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&item.title)
        .bind(&item.description)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(persistence)
    }

    async fn attach_item(&mut self, list_id: i32, item_id: i32) -> Result<(), AppError> {
        sqlx::query("INSERT INTO lists_items (list_id, item_id) VALUES ($1, $2)")
            .bind(list_id)
            .bind(item_id)
            .execute(&mut *self.tx)
            .await
            .map_err(persistence)?;
        Ok(())
    }

    async fn insert_list(&mut self, list: &TodoListInput) -> Result<i32, AppError> {
        sqlx::query_scalar::<_, i32>(
            "INSERT INTO todo_lists (title, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(&list.title)
        .bind(&list.description)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(persistence)
    }

    async fn attach_list(&mut self, user_id: i32, list_id: i32) -> Result<(), AppError> {
        sqlx::query("INSERT INTO users_lists (user_id, list_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(list_id)
            .execute(&mut *self.tx)
            .await
            .map_err(persistence)?;
        Ok(())
    }
}
