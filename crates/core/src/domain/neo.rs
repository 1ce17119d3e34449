use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of records echoed back as `alerts` alongside the full feed.
pub const ALERT_LIMIT: usize = 3;

/// Flat near-earth-object record built from the first close approach of an upstream object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearEarthObject {
    pub id: String,
    pub name: String,
    pub close_approach_date: NaiveDate,
    pub estimated_diameter_min: f64,
    pub estimated_diameter_max: f64,
    pub relative_velocity_kmh: f64,
    pub miss_distance_km: f64,
    pub is_potentially_hazardous: bool,
}

impl NearEarthObject {
    /// Normalizes one raw object from the NEO feed.
    ///
    /// Every nested key is required; missing keys, an empty approach list or a
    /// non-numeric velocity/distance string are errors, never defaults.
    pub fn from_api(raw: &Value) -> Result<Self> {
        let raw = RawNearEarthObject::deserialize(raw)
            .context("near-earth object does not match the upstream schema")?;
        raw.into_record()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeoFeed {
    pub near_earth_objects: Vec<NearEarthObject>,
    pub alerts: Vec<NearEarthObject>,
}

impl NeoFeed {
    pub fn new(near_earth_objects: Vec<NearEarthObject>) -> Self {
        let alerts = near_earth_objects
            .iter()
            .take(ALERT_LIMIT)
            .cloned()
            .collect();
        Self {
            near_earth_objects,
            alerts,
        }
    }

    /// Flattens the per-date grouping of a feed response and normalizes every record.
    ///
    /// Buckets are visited in the order upstream sent them, which is not sorted by
    /// date. A single bad record fails the whole feed.
    pub fn from_feed(raw: &Value) -> Result<Self> {
        let body = raw.as_object().context("NEO feed response is not a JSON object")?;

        let Some(grouped) = body.get("near_earth_objects") else {
            return Ok(Self::default());
        };
        let grouped = grouped
            .as_object()
            .context("near_earth_objects is not keyed by date")?;

        let mut objects = Vec::new();
        for (date, bucket) in grouped {
            let bucket = bucket
                .as_array()
                .with_context(|| format!("near_earth_objects[{date}] is not an array"))?;
            for (idx, obj) in bucket.iter().enumerate() {
                let neo = NearEarthObject::from_api(obj)
                    .with_context(|| format!("invalid near-earth object at {date}[{idx}]"))?;
                objects.push(neo);
            }
        }

        Ok(Self::new(objects))
    }
}

#[derive(Debug, Deserialize)]
struct RawNearEarthObject {
    id: String,
    name: String,
    estimated_diameter: RawDiameterBuckets,
    is_potentially_hazardous_asteroid: bool,
    close_approach_data: Vec<RawCloseApproach>,
}

#[derive(Debug, Deserialize)]
struct RawDiameterBuckets {
    kilometers: RawDiameterRange,
}

#[derive(Debug, Deserialize)]
struct RawDiameterRange {
    estimated_diameter_min: f64,
    estimated_diameter_max: f64,
}

#[derive(Debug, Deserialize)]
struct RawCloseApproach {
    close_approach_date: NaiveDate,
    relative_velocity: RawRelativeVelocity,
    miss_distance: RawMissDistance,
}

#[derive(Debug, Deserialize)]
struct RawRelativeVelocity {
    kilometers_per_hour: String,
}

#[derive(Debug, Deserialize)]
struct RawMissDistance {
    kilometers: String,
}

impl RawNearEarthObject {
    fn into_record(self) -> Result<NearEarthObject> {
        // Later approach windows are ignored.
        let approach = self
            .close_approach_data
            .into_iter()
            .next()
            .with_context(|| {
                format!("near-earth object {} has no close approach data", self.id)
            })?;

        let relative_velocity_kmh = parse_num(&approach.relative_velocity.kilometers_per_hour)
            .with_context(|| {
                format!("invalid relative velocity for near-earth object {}", self.id)
            })?;
        let miss_distance_km = parse_num(&approach.miss_distance.kilometers).with_context(|| {
            format!("invalid miss distance for near-earth object {}", self.id)
        })?;

        Ok(NearEarthObject {
            id: self.id,
            name: self.name,
            close_approach_date: approach.close_approach_date,
            estimated_diameter_min: self.estimated_diameter.kilometers.estimated_diameter_min,
            estimated_diameter_max: self.estimated_diameter.kilometers.estimated_diameter_max,
            relative_velocity_kmh,
            miss_distance_km,
            is_potentially_hazardous: self.is_potentially_hazardous_asteroid,
        })
    }
}

fn parse_num(s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .with_context(|| format!("not a number: {s:?}"))
}
