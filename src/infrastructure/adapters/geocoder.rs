//! Geocoder Adapter (C5, spec.md §4.5). Forward/reverse geocoding only —
//! the service-area decision belongs to the Session Engine.

use async_trait::async_trait;
use tracing::warn;

use crate::config::GeocoderConfig;
use crate::domain::ports::geocoder::{ForwardGeocodeResult, Geocoder, ReverseGeocodeResult};

pub struct HttpGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl HttpGeocoder {
    pub fn new(config: GeocoderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn extract_city(components: &serde_json::Value) -> Option<String> {
        components.as_array()?.iter().find_map(|c| {
            let types = c.get("types")?.as_array()?;
            let is_city = types
                .iter()
                .any(|t| t.as_str() == Some("locality"));
            if is_city {
                c.get("long_name")?.as_str().map(str::to_string)
            } else {
                None
            }
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn forward(&self, address: &str) -> Option<ForwardGeocodeResult> {
        let response = self
            .client
            .get(format!("{}/json", self.config.api_base_url))
            .query(&[("address", address), ("key", &self.config.api_key)])
            .send()
            .await
            .map_err(|e| warn!(error = %e, "geocoder forward request failed"))
            .ok()?;

        let body: serde_json::Value = response.json().await.ok()?;
        let result = body.get("results")?.as_array()?.first()?;

        let formatted_address = result.get("formatted_address")?.as_str()?.to_string();
        let city = Self::extract_city(result.get("address_components")?)?;
        let location = result.pointer("/geometry/location")?;
        let latitude = location.get("lat")?.as_f64()?;
        let longitude = location.get("lng")?.as_f64()?;

        Some(ForwardGeocodeResult {
            address: formatted_address,
            city,
            latitude,
            longitude,
        })
    }

    async fn reverse(&self, latitude: f64, longitude: f64) -> Option<ReverseGeocodeResult> {
        let response = self
            .client
            .get(format!("{}/json", self.config.api_base_url))
            .query(&[
                ("latlng", format!("{latitude},{longitude}")),
                ("key", self.config.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| warn!(error = %e, "geocoder reverse request failed"))
            .ok()?;

        let body: serde_json::Value = response.json().await.ok()?;
        let result = body.get("results")?.as_array()?.first()?;

        let formatted_address = result.get("formatted_address")?.as_str()?.to_string();
        let city = Self::extract_city(result.get("address_components")?)?;

        Some(ReverseGeocodeResult {
            address: formatted_address,
            city,
        })
    }
}
