pub mod client;

pub use client::NasaClient;

use anyhow::Result;
use serde::Deserialize;
use serde_json::Value;

/// Upstream space-data API. Every method returns the decoded JSON body as-is.
#[async_trait::async_trait]
pub trait SpaceDataProvider: Send + Sync {
    async fn neo_feed(&self) -> Result<Value>;

    async fn neo_stats(&self) -> Result<Value>;

    async fn mars_rovers(&self) -> Result<Value>;

    async fn rover_photos(&self, rover: &str, query: &RoverPhotoQuery) -> Result<Value>;

    async fn rover_latest_photos(&self, rover: &str) -> Result<Value>;

    async fn apod(&self, date: Option<&str>) -> Result<Value>;

    async fn apod_random(&self, count: u32) -> Result<Value>;
}

/// Optional filters for a rover photo query. Only the ones that are set and non-empty
/// get forwarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoverPhotoQuery {
    pub sol: Option<u32>,
    pub camera: Option<String>,
    pub earth_date: Option<String>,
}

impl RoverPhotoQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(sol) = self.sol {
            params.push(("sol", sol.to_string()));
        }
        if let Some(earth_date) = non_empty(&self.earth_date) {
            params.push(("earth_date", earth_date.to_string()));
        }
        if let Some(camera) = non_empty(&self.camera) {
            params.push(("camera", camera.to_string()));
        }
        params
    }
}

/// `?camera=` arrives as `Some("")`; a blank value is treated as not supplied.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
