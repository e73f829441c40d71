pub mod aggregate;
pub mod cache;
pub mod openweather;
pub mod service;
pub mod types;

pub use cache::{CacheStore, MemoryCacheStore};
pub use openweather::{OpenWeatherClient, WeatherError, WeatherProvider};
pub use service::{WeatherService, CACHE_TTL};
pub use types::WeatherRecord;
