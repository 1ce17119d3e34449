pub mod aggregate;
pub mod domain;
pub mod nasa;

pub mod config {
    pub const DEFAULT_NASA_BASE_URL: &str = "https://api.nasa.gov";

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub nasa_api_key: Option<String>,
        pub nasa_base_url: Option<String>,
        pub nasa_timeout_secs: Option<u64>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                nasa_api_key: non_empty_var("NASA_API_KEY"),
                nasa_base_url: non_empty_var("NASA_BASE_URL"),
                nasa_timeout_secs: std::env::var("NASA_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.trim().parse::<u64>().ok()),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn nasa_base_url(&self) -> &str {
            self.nasa_base_url
                .as_deref()
                .unwrap_or(DEFAULT_NASA_BASE_URL)
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }

}
