mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{Compress, Logger, NormalizePath},
    web, App, HttpResponse, HttpServer,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::db::Database;
use crate::routes::create_routes;
use crate::services::builder::{HttpIsoBuilder, IsoBuilder};
use crate::services::storage::SharedStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub builder: Arc<dyn IsoBuilder>,
    pub storage: SharedStorage,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    dotenvy::dotenv().ok();

    let log_level = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting OS Maker backend");

    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    info!("Configuration loaded from environment");

    let db = Database::new(&config.database_url, config.database_pool_size).await?;
    info!("Database connected");

    db.run_migrations().await?;
    info!("Database migrations completed");

    tokio::fs::create_dir_all(&config.shared_dir).await?;
    let storage = SharedStorage::new(config.shared_dir.clone());
    info!("Shared directory at {}", storage.root().display());

    let builder = HttpIsoBuilder::new(
        config.builder_url.clone(),
        Duration::from_secs(config.builder_timeout_secs),
    )?;
    info!("Image builder at {}", builder.base_url());

    let state = web::Data::new(AppState {
        db,
        config: Arc::new(config.clone()),
        builder: Arc::new(builder),
        storage,
    });

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    let cors_allow_origin = config.cors_allow_origin.clone();
    let static_dir = config.static_dir.clone();

    info!("Server running at http://{}", addr);

    HttpServer::new(move || {
        let cors = if cors_allow_origin == "*" {
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600)
        } else {
            let mut cors = Cors::default();
            for origin in cors_allow_origin.split(',').map(|s| s.trim()) {
                cors = cors.allowed_origin(origin);
            }
            cors.allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .max_age(3600)
        };

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            // Health checks
            .route("/health", web::get().to(health_check))
            .route("/health/db", web::get().to(health_check_db))
            .service(web::scope("/api").configure(create_routes))
            // Front-end build, must stay last
            .service(routes::spa::service(&static_dir))
    })
    .client_request_timeout(Duration::from_secs(300))
    .bind(addr)?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": true }))
}

async fn health_check_db(state: web::Data<AppState>) -> Result<HttpResponse, crate::error::AppError> {
    sqlx::query("SELECT 1").execute(state.db.pool()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": true })))
}
