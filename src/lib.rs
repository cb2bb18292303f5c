#![doc = "The `todoforge` library crate."]
#![doc = ""]
#![doc = "Multi-user todo backend: password sign-up and sign-in, bearer-token"]
#![doc = "identity for protected routes, and transactional creation of lists and"]
#![doc = "items. The binary (`main.rs`) only wires configuration, the Postgres"]
#![doc = "store and the HTTP server around the pieces defined here."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod todo;

pub use crate::config::Config;
pub use crate::error::AppError;
