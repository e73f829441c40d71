use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod plot;
mod routes;
mod weather;

use auth::AuthService;
use config::Config;
use routes::{create_router, AppState};
use weather::{MemoryCacheStore, OpenWeatherClient, WeatherService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "celestial_weather_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Cache store and upstream client are injected into the weather service,
    // so tests and future backends can swap either side.
    let cache = Arc::new(MemoryCacheStore::new(1000));
    let upstream = Arc::new(OpenWeatherClient::new(config.clone()));
    let weather_service = Arc::new(WeatherService::new(cache, upstream));

    let auth_service = Arc::new(AuthService::new(
        config.jwt_secret.clone(),
        config.token_expiry_minutes,
    ));

    let state = AppState {
        auth: auth_service,
        weather: weather_service,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server starting on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
