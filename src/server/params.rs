use crate::{Error, Result, stream::classifier::has_http_scheme};
use url::Url;

/// The target URL may arrive encoded once or twice.
const MAX_DECODE_PASSES: usize = 2;

/// Query parameters for the proxy endpoint.
#[derive(Debug, Default)]
pub struct ProxyParams {
    /// Raw, still percent-encoded value of `url`.
    pub url: Option<String>,
}

impl ProxyParams {
    /// Pick `url` out of the raw query string without decoding it.
    pub fn from_query(query: Option<&str>) -> Self {
        let url = query.and_then(|q| {
            q.split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "url")
                .map(|(_, value)| value.to_string())
        });
        Self { url }
    }

    /// Resolve the target into an absolute http(s) URL.
    pub fn target(&self) -> Result<Url> {
        match self.url.as_deref().map(str::trim) {
            None | Some("") => Err(Error::MissingUrl),
            Some(raw) => resolve_target(raw),
        }
    }
}

/// Percent-decode `raw` until it looks absolute, stops changing, or the pass
/// budget runs out, then validate it.
pub fn resolve_target(raw: &str) -> Result<Url> {
    let mut candidate = raw.trim().to_string();

    for _ in 0..MAX_DECODE_PASSES {
        if has_http_scheme(&candidate) {
            break;
        }
        let decoded = urlencoding::decode(&candidate)
            .map_err(|_| Error::InvalidUrl("url parameter is not valid UTF-8".to_string()))?;
        if decoded == candidate {
            break;
        }
        candidate = decoded.into_owned();
    }

    if candidate.is_empty() {
        return Err(Error::MissingUrl);
    }

    let url = Url::parse(&candidate).map_err(|e| Error::InvalidUrl(format!("{e}: {candidate}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(Error::InvalidUrl(format!(
                "scheme '{scheme}' not allowed, only http/https"
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidUrl(format!("no host in URL: {candidate}")));
    }

    Ok(url)
}
