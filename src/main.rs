mod api;
mod config;
mod database;
mod models;
mod services;
mod utils;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::database::{DocumentStore, MongoDB};
use crate::services::{CloudinaryClient, MediaStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ {}", e);
        std::io::Error::other(e.to_string())
    })?;

    log::info!("🚀 Starting Media Gallery Service...");
    log::info!("📊 Database: {}", config.redacted_database_url());

    let db = MongoDB::new(&config.database_url, &config.database_name)
        .await
        .map_err(|e| {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            std::io::Error::other(e.to_string())
        })?;
    log::info!("✅ MongoDB connected successfully (database: {})", config.database_name);

    let store: Arc<dyn DocumentStore> = Arc::new(db.clone());
    let media: Arc<dyn MediaStore> = Arc::new(CloudinaryClient::new(config.cloudinary.clone()));
    log::info!("☁️  Media store: cloud '{}'", config.cloudinary.cloud_name);

    let store_data = web::Data::from(store);
    let media_data = web::Data::from(media);
    let limits_data = web::Data::new(config.limits);

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);

    let server = HttpServer::new(move || {
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(media_data.clone())
            .app_data(limits_data.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(format!("{}:{}", config.host, config.port))?
    .run();

    let result = server.await;

    log::info!("🛑 Server stopped, closing MongoDB connection");
    db.close().await;

    result
}
