pub mod auth;
pub mod health;
pub mod items;
pub mod lists;

use actix_web::{error, web};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{Authenticator, IdentityMiddleware};
use crate::error::{AppError, INVALID_INPUT_BODY};
use crate::todo::TodoOperations;

/// Response body for every create endpoint.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdResponse {
    pub id: i32,
}

/// Registers all routes and their shared state.
///
/// `/auth/*` and `/health` are public; everything under `/api` goes through
/// [`IdentityMiddleware`].
pub fn config(
    auth: Arc<dyn Authenticator>,
    todos: Arc<dyn TodoOperations>,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::from(Arc::clone(&auth)))
            .app_data(web::Data::from(todos))
            .app_data(json_config())
            .app_data(path_config())
            .service(health::health)
            .service(
                web::scope("/auth")
                    .service(auth::sign_up)
                    .service(auth::sign_in),
            )
            .service(
                web::scope("/api")
                    .wrap(IdentityMiddleware::new(auth))
                    .service(
                        web::scope("/lists")
                            .service(lists::create_list)
                            .service(items::create_item),
                    )
                    .service(web::scope("/items").service(items::get_item)),
            );
    }
}

/// Any body that cannot be deserialized is answered with the generic 400 body.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("rejected request body: {}", err);
        error::Error::from(AppError::Validation(INVALID_INPUT_BODY.into()))
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        debug!("rejected path parameter: {}", err);
        error::Error::from(AppError::Validation("invalid id param".into()))
    })
}
