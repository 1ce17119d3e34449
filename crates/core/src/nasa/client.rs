use crate::config::Settings;
use crate::nasa::{RoverPhotoQuery, SpaceDataProvider};
use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

const APOD: [&str; 2] = ["planetary", "apod"];

#[derive(Debug, Clone)]
pub struct NasaClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl NasaClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = Url::parse(settings.nasa_base_url())
            .with_context(|| format!("invalid NASA_BASE_URL: {}", settings.nasa_base_url()))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "NASA_BASE_URL must be a hierarchical URL: {base_url}"
        );

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = settings.nasa_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("failed to build NASA http client")?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.nasa_api_key.clone(),
        })
    }

    /// Builds `<base>/<segments...>?api_key=<key>&<params...>`. Segments are
    /// percent-encoded individually, so a rover name can never add path components.
    fn url(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                anyhow::anyhow!("NASA base URL cannot carry a path: {}", self.base_url)
            })?
            .pop_if_empty()
            .extend(segments);

        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        if let Some(api_key) = &self.api_key {
            pairs.push(("api_key", api_key.as_str()));
        }
        pairs.extend(params.iter().map(|(k, v)| (*k, v.as_str())));
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(url)
    }

    async fn get_json(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Value> {
        let url = self.url(segments, params)?;
        // The query carries the API key; only the path goes into logs and errors.
        let path = url.path().to_string();

        let res = self
            .http
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("upstream request to {path} failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("failed to read upstream response from {path}"))?;

        tracing::debug!(%path, %status, bytes = text.len(), "upstream responded");
        if !status.is_success() {
            tracing::warn!(
                %path,
                %status,
                "upstream returned an error status; passing body through"
            );
        }

        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("upstream response from {path} is not valid JSON"))
    }
}

#[async_trait::async_trait]
impl SpaceDataProvider for NasaClient {
    async fn neo_feed(&self) -> Result<Value> {
        self.get_json(&["neo", "rest", "v1", "feed"], &[]).await
    }

    async fn neo_stats(&self) -> Result<Value> {
        self.get_json(&["neo", "rest", "v1", "stats"], &[]).await
    }

    async fn mars_rovers(&self) -> Result<Value> {
        self.get_json(&["mars-photos", "api", "v1", "rovers"], &[]).await
    }

    async fn rover_photos(&self, rover: &str, query: &RoverPhotoQuery) -> Result<Value> {
        self.get_json(
            &["mars-photos", "api", "v1", "rovers", rover, "photos"],
            &query.to_params(),
        )
        .await
    }

    async fn rover_latest_photos(&self, rover: &str) -> Result<Value> {
        self.get_json(
            &["mars-photos", "api", "v1", "rovers", rover, "latest_photos"],
            &[],
        )
        .await
    }

    async fn apod(&self, date: Option<&str>) -> Result<Value> {
        let params: Vec<(&str, String)> = date
            .filter(|d| !d.is_empty())
            .map(|d| ("date", d.to_string()))
            .into_iter()
            .collect();
        self.get_json(&APOD, &params).await
    }

    async fn apod_random(&self, count: u32) -> Result<Value> {
        self.get_json(&APOD, &[("count", count.to_string())]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{StatusCode, Uri},
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    const KEY: &str = "DEMO_KEY";

    async fn echo(uri: Uri) -> Json<Value> {
        Json(json!({"path": uri.path(), "query": uri.query()}))
    }

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String, api_key: Option<&str>) -> NasaClient {
        NasaClient::from_settings(&Settings {
            nasa_api_key: api_key.map(str::to_string),
            nasa_base_url: Some(base_url),
            ..Default::default()
        })
        .unwrap()
    }

    async fn echo_client() -> NasaClient {
        client(spawn_upstream(Router::new().fallback(echo)).await, Some(KEY))
    }

    #[tokio::test]
    async fn apod_forwards_date_after_api_key() {
        let nasa = echo_client().await;

        let v = nasa.apod(Some("2023-01-01")).await.unwrap();
        assert_eq!(v["path"], "/planetary/apod");
        assert_eq!(v["query"], "api_key=DEMO_KEY&date=2023-01-01");

        let v = nasa.apod(None).await.unwrap();
        assert_eq!(v["query"], "api_key=DEMO_KEY");

        let v = nasa.apod(Some("")).await.unwrap();
        assert_eq!(v["query"], "api_key=DEMO_KEY");
    }

    #[tokio::test]
    async fn apod_random_forwards_count() {
        let nasa = echo_client().await;
        let v = nasa.apod_random(4).await.unwrap();
        assert_eq!(v["path"], "/planetary/apod");
        assert_eq!(v["query"], "api_key=DEMO_KEY&count=4");
    }

    #[tokio::test]
    async fn neo_and_rover_paths() {
        let nasa = echo_client().await;

        assert_eq!(nasa.neo_feed().await.unwrap()["path"], "/neo/rest/v1/feed");
        assert_eq!(nasa.neo_stats().await.unwrap()["path"], "/neo/rest/v1/stats");
        assert_eq!(
            nasa.mars_rovers().await.unwrap()["path"],
            "/mars-photos/api/v1/rovers"
        );
        assert_eq!(
            nasa.rover_latest_photos("perseverance").await.unwrap()["path"],
            "/mars-photos/api/v1/rovers/perseverance/latest_photos"
        );
    }

    #[tokio::test]
    async fn rover_photos_forwards_only_present_filters() {
        let nasa = echo_client().await;

        let query = RoverPhotoQuery {
            sol: Some(1000),
            camera: Some("NAVCAM".to_string()),
            earth_date: None,
        };
        let v = nasa.rover_photos("curiosity", &query).await.unwrap();
        assert_eq!(v["path"], "/mars-photos/api/v1/rovers/curiosity/photos");
        assert_eq!(v["query"], "api_key=DEMO_KEY&sol=1000&camera=NAVCAM");

        let v = nasa
            .rover_photos("curiosity", &RoverPhotoQuery::default())
            .await
            .unwrap();
        assert_eq!(v["query"], "api_key=DEMO_KEY");
    }

    #[tokio::test]
    async fn rover_name_stays_one_path_segment() {
        let nasa = echo_client().await;
        let v = nasa.rover_latest_photos("../stats").await.unwrap();
        assert_eq!(
            v["path"],
            "/mars-photos/api/v1/rovers/..%2Fstats/latest_photos"
        );
    }

    #[tokio::test]
    async fn missing_api_key_is_not_sent() {
        let base = spawn_upstream(Router::new().fallback(echo)).await;
        let nasa = client(base, None);

        assert_eq!(nasa.neo_stats().await.unwrap()["query"], Value::Null);
        assert_eq!(nasa.apod_random(1).await.unwrap()["query"], "count=1");
    }

    #[tokio::test]
    async fn error_status_body_is_passed_through() {
        let app = Router::new().route(
            "/neo/rest/v1/stats",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": {"code": "API_KEY_INVALID"}})),
                )
            }),
        );
        let nasa = client(spawn_upstream(app).await, Some(KEY));

        let v = nasa.neo_stats().await.unwrap();
        assert_eq!(v["error"]["code"], "API_KEY_INVALID");
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let app = Router::new().route("/planetary/apod", get(|| async { "<html>oops</html>" }));
        let nasa = client(spawn_upstream(app).await, Some(KEY));

        let err = nasa.apod(None).await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("/planetary/apod is not valid JSON"), "{msg}");
        assert!(!msg.contains(KEY));
    }

    #[tokio::test]
    async fn transport_error_hides_api_key() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let nasa = client(format!("http://{addr}"), Some(KEY));
        let err = nasa.neo_feed().await.unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("upstream request to /neo/rest/v1/feed failed"), "{msg}");
        assert!(!msg.contains(KEY), "{msg}");
    }

    #[test]
    fn rejects_invalid_base_url() {
        let res = NasaClient::from_settings(&Settings {
            nasa_base_url: Some("not a url".to_string()),
            ..Default::default()
        });
        assert!(res.is_err());
    }
}
