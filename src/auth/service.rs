use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::OnceCell;
use validator::Validate;

use super::password::{hash_password, verify_password};
use super::token::TokenCodec;
use super::SignUpRequest;
use crate::error::{AppError, INVALID_CREDENTIALS};
use crate::models::NewUser;
use crate::store::CredentialStore;

/// Sign-up, sign-in and token verification, as seen by the HTTP layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Stores a new user and returns its id.
    async fn register(&self, request: SignUpRequest) -> Result<i32, AppError>;

    /// Checks the credentials and returns a signed token.
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, AppError>;

    /// Resolves a token to the user id it was issued for.
    fn verify(&self, token: &str) -> Result<i32, AppError>;
}

pub struct AuthService<S> {
    store: S,
    codec: TokenCodec,
    bcrypt_cost: u32,
    /// Checked against when the username is unknown, so that path costs the
    /// same bcrypt work as a wrong password.
    dummy_hash: OnceCell<String>,
}

impl<S: CredentialStore> AuthService<S> {
    pub fn new(store: S, codec: TokenCodec, bcrypt_cost: u32) -> Self {
        Self {
            store,
            codec,
            bcrypt_cost,
            dummy_hash: OnceCell::new(),
        }
    }

    async fn load_dummy_hash(&self) -> Result<&str, AppError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| hash_password("dummy-password".to_owned(), self.bcrypt_cost))
            .await?;
        Ok(hash)
    }
}

#[async_trait]
impl<S: CredentialStore> Authenticator for AuthService<S> {
    async fn register(&self, request: SignUpRequest) -> Result<i32, AppError> {
        request.validate()?;

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        let id = self
            .store
            .create_user(NewUser {
                name: request.name,
                username: request.username,
                password_hash,
            })
            .await?;

        info!("registered user {}", id);
        Ok(id)
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<String, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let Some(user) = self.store.find_by_username(username).await? else {
            debug!("sign-in for unknown username");
            let dummy = self.load_dummy_hash().await?.to_owned();
            verify_password(password.to_owned(), dummy).await?;
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        if !verify_password(password.to_owned(), user.password_hash).await? {
            debug!("sign-in with wrong password for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        self.codec.issue(user.id)
    }

    fn verify(&self, token: &str) -> Result<i32, AppError> {
        Ok(self.codec.decode(token)?.sub)
    }
}
