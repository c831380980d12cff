//! Keep-alive task — periodically GETs a URL so hosted instances aren't idled.
//!
//! Independent of request handling; the only thing it shares with the server
//! is the process.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::config::KeepaliveConfig;

/// Per-ping request timeout.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Run forever, pinging `config.url` every `config.interval`.
///
/// Returns immediately when no URL is configured or the interval is zero.
pub async fn run_keepalive(config: KeepaliveConfig) {
    let Some(url) = config.url else {
        info!("keep-alive disabled (no URL)");
        return;
    };
    if config.interval.is_zero() {
        warn!("keep-alive disabled (interval=0)");
        return;
    }

    let client = match reqwest::Client::builder().timeout(PING_TIMEOUT).build() {
        Ok(c) => c,
        Err(e) => {
            warn!("keep-alive disabled: failed to build HTTP client: {e}");
            return;
        }
    };

    info!(url = %url, interval_secs = config.interval.as_secs(), "starting keep-alive task");

    let mut ticker = interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick fires immediately; the server may not be listening yet.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match ping(&client, &url).await {
            Ok(status) => debug!("keep-alive: {url} → {status}"),
            Err(e) => warn!("keep-alive ping failed: {e}"),
        }
    }
}

/// One GET against `url`. Non-2xx statuses count as failures.
pub async fn ping(client: &reqwest::Client, url: &str) -> Result<reqwest::StatusCode, reqwest::Error> {
    let resp = client.get(url).send().await?.error_for_status()?;
    Ok(resp.status())
}
