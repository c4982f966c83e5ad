use tracing::debug;

use super::*;

impl RemoteClient {
    pub(super) fn download_raw(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(self.raw_url(path))
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .context("send raw content request")?;
        let bytes = self
            .ensure_ok(resp, "raw content")?
            .bytes()
            .context("read raw content body")?;
        debug!(path, bytes = bytes.len(), "downloaded");
        Ok(bytes.to_vec())
    }
}
