use crate::error::{GodownError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temp_c: f64,
    pub humidity_pct: f64,
    pub description: String,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn get_weather(&self, city: &str) -> Result<Weather>;
}

// ---------------------------------------------------------------------------
// HttpWeather
// ---------------------------------------------------------------------------

/// Client for the gateway weather service:
/// `GET {base_url}/v1/current?city=<name>` returning
/// `{"temp_c": .., "humidity_pct": .., "description": ".."}`.
pub struct HttpWeather {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWeather {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WeatherProvider for HttpWeather {
    async fn get_weather(&self, city: &str) -> Result<Weather> {
        let url = format!("{}/v1/current", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("city", city)])
            .send()
            .await
            .map_err(|e| GodownError::Weather {
                city: city.to_string(),
                reason: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(GodownError::Weather {
                city: city.to_string(),
                reason: format!("status {}", response.status()),
            });
        }
        response
            .json::<Weather>()
            .await
            .map_err(|e| GodownError::Weather {
                city: city.to_string(),
                reason: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// StaticWeather
// ---------------------------------------------------------------------------

/// Deterministic offline fallback. Known cities get fixed typical readings;
/// everything else (including the "Unknown" sentinel) gets a mild default.
pub struct StaticWeather;

const CITY_TABLE: &[(&str, f64, f64, &str)] = &[
    ("nashik", 26.0, 55.0, "clear sky"),
    ("pune", 27.0, 60.0, "partly cloudy"),
    ("mumbai", 30.0, 78.0, "humid"),
    ("nagpur", 33.0, 45.0, "hot and dry"),
    ("indore", 29.0, 50.0, "clear sky"),
    ("delhi", 31.0, 55.0, "haze"),
];

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn get_weather(&self, city: &str) -> Result<Weather> {
        let lower = city.trim().to_lowercase();
        let (temp_c, humidity_pct, description) = CITY_TABLE
            .iter()
            .find(|(name, ..)| *name == lower)
            .map(|(_, t, h, d)| (*t, *h, *d))
            .unwrap_or((28.0, 65.0, "unknown"));
        Ok(Weather {
            temp_c,
            humidity_pct,
            description: description.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_weather_known_city() {
        let w = StaticWeather.get_weather("Nashik").await.unwrap();
        assert_eq!(w.temp_c, 26.0);
        assert_eq!(w.humidity_pct, 55.0);
    }

    #[tokio::test]
    async fn static_weather_unknown_city_uses_default() {
        let w = StaticWeather.get_weather("Atlantis").await.unwrap();
        assert_eq!(w.temp_c, 28.0);
        let sentinel = StaticWeather.get_weather("Unknown").await.unwrap();
        assert_eq!(sentinel.temp_c, 28.0);
    }

    #[tokio::test]
    async fn http_weather_parses_gateway_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/current")
            .match_query(mockito::Matcher::UrlEncoded("city".into(), "Pune".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"temp_c": 24.5, "humidity_pct": 58.0, "description": "clear"}"#)
            .create_async()
            .await;

        let provider = HttpWeather::new(server.url());
        let w = provider.get_weather("Pune").await.unwrap();
        assert_eq!(w.temp_c, 24.5);
        assert_eq!(w.humidity_pct, 58.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_weather_maps_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/current")
            .with_status(503)
            .create_async()
            .await;

        let provider = HttpWeather::new(server.url());
        let err = provider.get_weather("Pune").await.unwrap_err();
        assert!(matches!(err, GodownError::Weather { .. }));
    }
}
