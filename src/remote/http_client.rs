use super::*;

impl RemoteClient {
    pub(super) fn ensure_ok(
        &self,
        resp: reqwest::blocking::Response,
        label: &str,
    ) -> Result<reqwest::blocking::Response> {
        if resp.status() == reqwest::StatusCode::FORBIDDEN
            || resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            anyhow::bail!("{} rate limited or forbidden ({})", label, resp.status());
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!(
                "{} not found (check owner/repo/ref: {})",
                label,
                self.remote.display_name()
            );
        }
        resp.error_for_status()
            .with_context(|| format!("{} status", label))
    }

    pub(super) fn tree_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.remote.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.remote.owner),
            urlencoding::encode(&self.remote.repo),
            encode_path(&self.remote.git_ref)
        )
    }

    pub(super) fn raw_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.remote.raw_base.trim_end_matches('/'),
            urlencoding::encode(&self.remote.owner),
            urlencoding::encode(&self.remote.repo),
            encode_path(&self.remote.git_ref),
            encode_path(path)
        )
    }
}

/// Percent-encode each `/`-separated segment, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}
