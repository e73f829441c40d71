use super::types::{CurrentResponse, ForecastResponse};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("city not found")]
    CityNotFound,
    #[error("upstream API error: HTTP {0}")]
    UpstreamStatus(reqwest::StatusCode),
}

/// Upstream weather provider: two independent lookups per city.
///
/// No retry logic lives here; a single failed attempt propagates immediately.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_current(&self, city: &str) -> Result<CurrentResponse, WeatherError>;

    async fn fetch_forecast(&self, city: &str) -> Result<ForecastResponse, WeatherError>;
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Self {
        let client = Client::builder()
            .user_agent("CelestialWeatherServer/1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    async fn get_json(&self, path: &str, city: &str) -> Result<Value, WeatherError> {
        let url = format!("{}{}", self.config.openweather_base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", &self.config.openweather_api_key),
                ("units", "metric"),
            ])
            .send()
            .await?;

        match response.status() {
            reqwest::StatusCode::OK => {
                let json: Value = response.json().await?;
                Ok(json)
            }
            reqwest::StatusCode::NOT_FOUND => Err(WeatherError::CityNotFound),
            status => Err(WeatherError::UpstreamStatus(status)),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_current(&self, city: &str) -> Result<CurrentResponse, WeatherError> {
        let json = self
            .get_json(&self.config.openweather_current_path, city)
            .await?;
        let current: CurrentResponse = serde_json::from_value(json)?;
        Ok(current)
    }

    async fn fetch_forecast(&self, city: &str) -> Result<ForecastResponse, WeatherError> {
        let json = self
            .get_json(&self.config.openweather_forecast_path, city)
            .await?;
        let forecast: ForecastResponse = serde_json::from_value(json)?;
        Ok(forecast)
    }
}
