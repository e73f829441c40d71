use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    auth::{AuthError, AuthService, AuthUser},
    plot::render_temperature_chart,
    weather::{WeatherError, WeatherRecord, WeatherService},
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub weather: Arc<WeatherService>,
}

// Request/Response types
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub msg: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

fn weather_status(err: &WeatherError) -> StatusCode {
    match err {
        WeatherError::CityNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_GATEWAY,
    }
}

// Route handlers
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn register(
    State(state): State<AppState>,
    Form(creds): Form<Credentials>,
) -> Result<Json<RegisterResponse>, StatusCode> {
    match state.auth.register(&creds.username, &creds.password) {
        Ok(()) => Ok(Json(RegisterResponse {
            msg: "User registered".to_string(),
        })),
        Err(AuthError::UserExists) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!("Registration failed for {}: {}", creds.username, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Form(creds): Form<Credentials>,
) -> Result<Json<TokenResponse>, StatusCode> {
    match state.auth.login(&creds.username, &creds.password) {
        Ok(token) => Ok(Json(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        })),
        Err(AuthError::InvalidCredentials) => Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            tracing::error!("Login failed for {}: {}", creds.username, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn get_weather(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    Query(params): Query<WeatherQuery>,
) -> Result<Json<WeatherRecord>, StatusCode> {
    tracing::debug!("Weather lookup for {} by {}", params.city, username);

    match state.weather.fetch_weather(&params.city).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!("Weather fetch failed for {}: {}", params.city, e);
            Err(weather_status(&e))
        }
    }
}

pub async fn get_weather_plot(
    State(state): State<AppState>,
    AuthUser(_username): AuthUser,
    Query(params): Query<WeatherQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let record = match state.weather.fetch_weather(&params.city).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Weather fetch failed for {}: {}", params.city, e);
            return Err(weather_status(&e));
        }
    };

    match render_temperature_chart(&record) {
        Ok(png) => Ok(([(header::CONTENT_TYPE, "image/png")], png)),
        Err(e) => {
            tracing::error!("Chart rendering failed for {}: {}", params.city, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/weather", get(get_weather))
        .route("/weather/plot", get(get_weather_plot))
        .with_state(state)
}
