use actix_web::HttpServer;
use weather_quota_api::{AppState, LoggingConfig, ServerConfig, create_app, init_logging};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_logging(&LoggingConfig::from_env()).map_err(std::io::Error::other)?;

    let server_config = ServerConfig::from_env();
    let state = AppState::from_env().map_err(|e| {
        tracing::error!(error = %e, "Failed to initialise application");
        std::io::Error::other(e)
    })?;

    tracing::info!(bind_address = %server_config.bind_address, "Starting server");

    HttpServer::new(move || create_app(state.clone()))
        .bind(&server_config.bind_address)?
        .run()
        .await
}
