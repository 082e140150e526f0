// src/main.rs
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web};
use log::{error, info};

use yatube_be::AppState;
use yatube_be::config::{self, AppConfig, StoreBackend};
use yatube_be::repositories::{BlogStore, MemoryStore, PgStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let app_config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("JWT secret: {}", config::mask_secret(&app_config.jwt_secret));
    info!("Feed cache TTL: {:?}", app_config.feed_cache_ttl);

    let store: Arc<dyn BlogStore> = match app_config.store {
        StoreBackend::Postgres => {
            let pg_pool = match config::get_pg_pool() {
                Ok(p) => p,
                Err(e) => {
                    error!("Failed to create PG pool: {:#}", e);
                    std::process::exit(1);
                }
            };
            let pg = PgStore::new(pg_pool);
            if let Err(e) = pg.migrate().await {
                error!("Failed to apply schema: {}", e);
                std::process::exit(1);
            }
            Arc::new(pg)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let state = web::Data::new(AppState::new(
        store,
        app_config.jwt_secret.clone(),
        app_config.feed_cache_ttl,
    ));

    let bind_address = app_config.bind_address();
    let allowed_origins = app_config.allowed_origins.clone();
    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                "authorization",
                "content-type",
                "accept",
                "x-requested-with"
            ])
            .supports_credentials()
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(yatube_be::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
