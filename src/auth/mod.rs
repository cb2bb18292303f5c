pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::IdentityMiddleware;
pub use service::{AuthService, Authenticator};
pub use token::{Claims, TokenCodec};

/// Represents the payload for a new user registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Display name.
    #[validate(length(min = 1))]
    pub name: String,
    /// Desired username, unique across all users.
    #[validate(length(min = 1))]
    pub username: String,
    /// Plaintext password; only its bcrypt hash is stored.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a sign-in request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Response structure after a successful sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The JWT for session authentication.
    pub token: String,
}
