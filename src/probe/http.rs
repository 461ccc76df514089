use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;

use super::ProbeOutcome;

/// Issues a GET against the target URL. The target counts as alive iff the
/// response status is in the 2xx range; redirects are followed by the client
/// before the status is inspected.
pub async fn check(client: &Client, url: &str, timeout: Duration) -> ProbeOutcome {
    let started = Instant::now();
    match client.get(url).timeout(timeout).send().await {
        Ok(response) => {
            let status = response.status();
            let latency_ms = started.elapsed().as_millis() as u64;
            if status.is_success() {
                debug!(url, status = status.as_u16(), latency_ms, "GET success.");
                ProbeOutcome::up()
            } else {
                debug!(url, status = status.as_u16(), latency_ms, "GET returned a failure status.");
                ProbeOutcome::down(format!("Http status: {}", status.as_u16()))
            }
        }
        Err(e) => {
            debug!(url, error = %e, "GET request failed.");
            let detail = if e.is_timeout() {
                "Request timed out".to_string()
            } else {
                e.to_string()
            };
            ProbeOutcome::down(detail)
        }
    }
}
