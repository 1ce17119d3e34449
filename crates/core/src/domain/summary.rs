use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MISSING_APOD_TITLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub neo_count: u64,
    pub alerts_count: usize,
    pub mars_photos_count: usize,
    pub apod_title: String,
}

impl DashboardSummary {
    /// Combines the three upstream bodies. Absent keys (including upstream error
    /// payloads) count as zero / "N/A" rather than failing.
    pub fn from_sources(neo_feed: &Value, latest_photos: &Value, apod: &Value) -> Self {
        let apod_title = apod
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(MISSING_APOD_TITLE)
            .to_string();

        Self {
            neo_count: neo_feed
                .get("element_count")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            // One per date bucket in the feed window.
            alerts_count: collection_len(neo_feed.get("near_earth_objects")),
            mars_photos_count: collection_len(latest_photos.get("latest_photos")),
            apod_title,
        }
    }
}

fn collection_len(v: Option<&Value>) -> usize {
    match v {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        _ => 0,
    }
}
