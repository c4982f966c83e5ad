use std::time::Duration;

use tracing::debug;

/// Header-only request against a stable endpoint. Any HTTP response, even an
/// error status, means the network is reachable; only transport failures
/// (DNS, TLS, refused, timeout) count as offline.
pub(super) fn probe_url(client: &reqwest::blocking::Client, url: &str, timeout: Duration) -> bool {
    match client.head(url).timeout(timeout).send() {
        Ok(resp) => {
            debug!(url, status = %resp.status(), "connectivity probe answered");
            true
        }
        Err(err) => {
            debug!(url, error = %err, "connectivity probe failed");
            false
        }
    }
}
