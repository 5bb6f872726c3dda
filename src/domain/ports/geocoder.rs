//! Geocoder Adapter port (C5, spec.md §4.5).

use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct ForwardGeocodeResult {
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone)]
pub struct ReverseGeocodeResult {
    pub address: String,
    pub city: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `None` means the geocoder failed or couldn't resolve the address;
    /// §4.5 leaves the service-area decision to the Session Engine.
    async fn forward(&self, address: &str) -> Option<ForwardGeocodeResult>;
    async fn reverse(&self, latitude: f64, longitude: f64) -> Option<ReverseGeocodeResult>;
}
