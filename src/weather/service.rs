use super::aggregate::aggregate;
use super::cache::CacheStore;
use super::openweather::{WeatherError, WeatherProvider};
use super::types::WeatherRecord;
use std::sync::Arc;
use std::time::Duration;

/// How long an aggregated record stays servable from the cache.
pub const CACHE_TTL: Duration = Duration::from_secs(600);

/// Public entry point of the weather-fetch path.
///
/// Checks the cache first; on a miss it performs the two upstream calls,
/// aggregates them into a [`WeatherRecord`], and writes the result back with
/// a fixed TTL. Cache failures never fail a request: unreadable entries
/// count as misses and write errors are logged and dropped.
pub struct WeatherService {
    cache: Arc<dyn CacheStore>,
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(cache: Arc<dyn CacheStore>, provider: Arc<dyn WeatherProvider>) -> Self {
        Self { cache, provider }
    }

    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherRecord, WeatherError> {
        match self.cache.get(city).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<WeatherRecord>(&bytes) {
                Ok(record) => {
                    tracing::debug!("Cache hit for {}", city);
                    return Ok(record);
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable cache entry for {}: {}", city, e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Cache read failed for {}, treating as miss: {}", city, e);
            }
        }

        // Not-found on either call short-circuits before any cache write.
        let current = self.provider.fetch_current(city).await?;
        let forecast = self.provider.fetch_forecast(city).await?;

        let record = aggregate(current, forecast);

        match serde_json::to_vec(&record) {
            Ok(bytes) => {
                if let Err(e) = self.cache.set_with_ttl(city, bytes, CACHE_TTL).await {
                    tracing::warn!("Cache write failed for {}: {}", city, e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize record for {}: {}", city, e);
            }
        }

        Ok(record)
    }
}
