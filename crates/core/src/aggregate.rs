use crate::domain::neo::NeoFeed;
use crate::domain::summary::DashboardSummary;
use crate::nasa::SpaceDataProvider;
use anyhow::{Context, Result};

/// Rover whose latest photos feed the dashboard summary.
pub const SUMMARY_ROVER: &str = "perseverance";

/// Fans out to the NEO feed, the latest rover photos and today's APOD concurrently.
///
/// Any failing call fails the whole summary; there is no per-source fallback.
pub async fn dashboard_summary(provider: &dyn SpaceDataProvider) -> Result<DashboardSummary> {
    let (neo_feed, latest_photos, apod) = tokio::try_join!(
        async { provider.neo_feed().await.context("summary: NEO feed") },
        async {
            provider
                .rover_latest_photos(SUMMARY_ROVER)
                .await
                .context("summary: latest rover photos")
        },
        async { provider.apod(None).await.context("summary: APOD") },
    )?;

    Ok(DashboardSummary::from_sources(&neo_feed, &latest_photos, &apod))
}

/// Fetches and normalizes the NEO feed. Never fails: any fetch or normalization error
/// is logged and degrades to an empty feed.
pub async fn neo_feed(provider: &dyn SpaceDataProvider) -> NeoFeed {
    match fetch_neo_feed(provider).await {
        Ok(feed) => feed,
        Err(err) => {
            tracing::warn!(
                error = %format!("{err:#}"),
                "NEO feed unavailable; returning empty feed"
            );
            NeoFeed::default()
        }
    }
}

async fn fetch_neo_feed(provider: &dyn SpaceDataProvider) -> Result<NeoFeed> {
    let raw = provider.neo_feed().await?;
    NeoFeed::from_feed(&raw)
}
