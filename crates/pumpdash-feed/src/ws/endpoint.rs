/*
[INPUT]:  Backend base URL and a relative feed path
[OUTPUT]: Absolute ws:// or wss:// URL
[POS]:    WebSocket layer - endpoint resolution
[UPDATE]: When changing how feed URLs are derived
*/

use url::Url;

use crate::error::{FeedError, Result};

/// Resolve `path` against `base`, switching http(s) to ws(s).
pub fn resolve_endpoint(base: &str, path: &str) -> Result<Url> {
    if path.trim().is_empty() {
        return Err(FeedError::InvalidEndpoint("empty endpoint path".to_string()));
    }

    let base = Url::parse(base)?;
    let mut url = base.join(path)?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(FeedError::InvalidEndpoint(format!(
                "unsupported scheme `{other}`"
            )));
        }
    };

    url.set_scheme(scheme)
        .map_err(|_| FeedError::InvalidEndpoint(format!("cannot switch {url} to {scheme}")))?;
    Ok(url)
}
