use super::types::*;

/// Merge the two upstream payloads into one canonical record.
///
/// Pure function with no error paths: descriptions are title-cased, numeric
/// fields pass through unmodified (both calls request metric units), and the
/// forecast list is mapped one-to-one in the order the upstream gave it.
pub fn aggregate(current: CurrentResponse, forecast: ForecastResponse) -> WeatherRecord {
    let description = current
        .weather
        .first()
        .map_or_else(String::new, |w| title_case(&w.description));

    let forecast_entries = forecast
        .list
        .iter()
        .map(|item| ForecastEntry {
            datetime: item.dt_txt.clone(),
            temp: item.main.temp,
            description: item
                .weather
                .first()
                .map_or_else(String::new, |w| title_case(&w.description)),
        })
        .collect();

    WeatherRecord {
        city: current.name,
        country: current.sys.country,
        coordinates: Coordinates {
            lat: current.coord.lat,
            lon: current.coord.lon,
        },
        current: CurrentConditions {
            temperature: current.main.temp,
            description,
            humidity: current.main.humidity,
            wind_speed: current.wind.speed,
        },
        forecast: forecast_entries,
    }
}

/// Capitalize the first letter of each word, lowercase the rest.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_current() -> CurrentResponse {
        CurrentResponse {
            name: "London".to_string(),
            sys: CurrentSys {
                country: "GB".to_string(),
            },
            coord: Coord {
                lat: 51.5085,
                lon: -0.1257,
            },
            main: CurrentMain {
                temp: 12.3,
                humidity: 81,
            },
            weather: vec![ConditionDescription {
                description: "light rain".to_string(),
            }],
            wind: Wind { speed: 4.1 },
        }
    }

    fn sample_forecast(descriptions: &[&str]) -> ForecastResponse {
        ForecastResponse {
            list: descriptions
                .iter()
                .enumerate()
                .map(|(i, desc)| ForecastItem {
                    dt_txt: format!("2025-03-0{} 12:00:00", i + 1),
                    main: ForecastMain {
                        temp: 10.0 + i as f64,
                    },
                    weather: vec![ConditionDescription {
                        description: desc.to_string(),
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("light rain"), "Light Rain");
        assert_eq!(title_case("SCATTERED CLOUDS"), "Scattered Clouds");
        assert_eq!(title_case("mist"), "Mist");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_aggregate_maps_current_conditions() {
        let record = aggregate(sample_current(), sample_forecast(&[]));

        assert_eq!(record.city, "London");
        assert_eq!(record.country, "GB");
        assert_eq!(record.coordinates.lat, 51.5085);
        assert_eq!(record.coordinates.lon, -0.1257);
        assert_eq!(record.current.temperature, 12.3);
        assert_eq!(record.current.description, "Light Rain");
        assert_eq!(record.current.humidity, 81);
        assert_eq!(record.current.wind_speed, 4.1);
    }

    #[test]
    fn test_aggregate_preserves_forecast_order_and_length() {
        let forecast = sample_forecast(&["clear sky", "few clouds", "light rain", "clear sky"]);
        let record = aggregate(sample_current(), forecast);

        assert_eq!(record.forecast.len(), 4);
        assert_eq!(record.forecast[0].datetime, "2025-03-01 12:00:00");
        assert_eq!(record.forecast[1].datetime, "2025-03-02 12:00:00");
        assert_eq!(record.forecast[2].datetime, "2025-03-03 12:00:00");
        assert_eq!(record.forecast[3].datetime, "2025-03-04 12:00:00");
        assert_eq!(record.forecast[0].temp, 10.0);
        assert_eq!(record.forecast[3].temp, 13.0);
        // Duplicate conditions are kept, never deduplicated
        assert_eq!(record.forecast[0].description, "Clear Sky");
        assert_eq!(record.forecast[3].description, "Clear Sky");
    }

    #[test]
    fn test_aggregate_title_cases_every_forecast_description() {
        let record = aggregate(sample_current(), sample_forecast(&["broken clouds"]));
        assert_eq!(record.forecast[0].description, "Broken Clouds");
    }

    #[test]
    fn test_aggregate_with_missing_condition_list() {
        let mut current = sample_current();
        current.weather.clear();
        let record = aggregate(current, sample_forecast(&[]));
        assert_eq!(record.current.description, "");
    }
}
