use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use log::{error, info};
use std::io;
use std::process;
use std::sync::Arc;

use todoforge::auth::{AuthService, Authenticator, TokenCodec};
use todoforge::config::Config;
use todoforge::routes;
use todoforge::store::PgStore;
use todoforge::todo::{TodoOperations, TodoService};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("invalid configuration: {}", err);
            process::exit(1);
        }
    };

    let store = PgStore::connect(&config.database).await.map_err(|err| {
        error!("failed to connect to database: {}", err);
        io::Error::new(io::ErrorKind::Other, err)
    })?;

    let codec = TokenCodec::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttl);
    let auth: Arc<dyn Authenticator> = Arc::new(AuthService::new(
        store.clone(),
        codec,
        config.auth.bcrypt_cost,
    ));
    let todos: Arc<dyn TodoOperations> =
        Arc::new(TodoService::new(store.clone(), config.transaction_timeout));

    info!("Starting todoforge server at {}", config.server_url());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config(Arc::clone(&auth), Arc::clone(&todos)))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run();

    let result = server.await;

    info!("todoforge server shutting down");
    store.pool().close().await;
    result
}
