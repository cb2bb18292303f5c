use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user row ready to be inserted. The password has already been hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
}

/// The subset of a stored user needed to check a sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub password_hash: String,
}
