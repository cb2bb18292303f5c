use crate::error::AppError;
use actix_web::web;
use bcrypt::{hash, verify};

/// Hashes `password` with bcrypt on the blocking thread pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    let hashed = web::block(move || hash(password, cost)).await??;
    Ok(hashed)
}

/// Checks `password` against a stored bcrypt hash on the blocking thread pool.
pub async fn verify_password(password: String, hashed_password: String) -> Result<bool, AppError> {
    let matches = web::block(move || verify(password, &hashed_password)).await??;
    Ok(matches)
}
