//! Neighborhood names from the Mapbox reverse geocoder.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::GeocoderConfig;
use crate::error::Result;
use crate::http::check_response;

#[async_trait]
pub trait NeighborhoodLookup: Send + Sync {
    async fn neighborhood(&self, latitude: f64, longitude: f64) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    text: Option<String>,
}

impl GeocodeResponse {
    fn first_place(self) -> Option<String> {
        self.features
            .into_iter()
            .next()
            .and_then(|f| f.text)
            .filter(|t| !t.is_empty())
    }
}

pub struct MapboxClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl MapboxClient {
    pub fn new(http: Client, config: &GeocoderConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        }
    }

    /// Mapbox takes coordinates as `longitude,latitude`.
    fn reverse_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{longitude},{latitude}.json",
            self.base_url
        )
    }
}

#[async_trait]
impl NeighborhoodLookup for MapboxClient {
    async fn neighborhood(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let url = self.reverse_url(latitude, longitude);
        let resp = self
            .http
            .get(&url)
            .query(&[("types", "neighborhood"), ("access_token", self.api_key.as_str())])
            .send()
            .await?;
        let data: GeocodeResponse = check_response(resp).await?.json().await?;
        let place = data.first_place();
        debug!(latitude, longitude, neighborhood = ?place, "reverse geocode");
        Ok(place)
    }
}
