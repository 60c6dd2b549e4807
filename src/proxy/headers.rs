use crate::{Error, Result, config::FetchConfig};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use url::Url;

/// Origin response headers relayed with pass-through bodies.
pub const FORWARDED_RESPONSE_HEADERS: [HeaderName; 6] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::CACHE_CONTROL,
    header::ETAG,
];

/// Origin response headers kept on rewritten playlists. The body changed,
/// so length and range no longer apply.
pub const PLAYLIST_RESPONSE_HEADERS: [HeaderName; 2] = [header::CACHE_CONTROL, header::ETAG];

/// Browser identity presented to origins.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    user_agent: HeaderValue,
    /// Fixed `(Referer, Origin)` pair, when configured.
    referer: Option<(HeaderValue, HeaderValue)>,
}

impl HeaderPolicy {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| Error::Internal(format!("Invalid user agent: {e}")))?;

        let referer = config
            .referer_override
            .as_ref()
            .map(|referer| {
                let value = HeaderValue::from_str(referer.as_str())
                    .map_err(|e| Error::Internal(format!("Invalid referer: {e}")))?;
                let origin = HeaderValue::from_str(&referer.origin().ascii_serialization())
                    .map_err(|e| Error::Internal(format!("Invalid referer origin: {e}")))?;
                Ok::<_, Error>((value, origin))
            })
            .transpose()?;

        Ok(Self {
            user_agent,
            referer,
        })
    }

    /// Headers for a request to `target`, forwarding the client's `Range`.
    pub fn request_headers(&self, target: &Url, range: Option<&HeaderValue>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, self.user_agent.clone());
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

        match &self.referer {
            Some((referer, origin)) => {
                headers.insert(header::REFERER, referer.clone());
                headers.insert(header::ORIGIN, origin.clone());
            }
            None => {
                // Same-origin: look like the CDN's own player page.
                let origin = target.origin().ascii_serialization();
                if let Ok(referer) = HeaderValue::from_str(&format!("{origin}/")) {
                    headers.insert(header::REFERER, referer);
                }
                if let Ok(origin) = HeaderValue::from_str(&origin) {
                    headers.insert(header::ORIGIN, origin);
                }
            }
        }

        if let Some(range) = range {
            headers.insert(header::RANGE, range.clone());
        }

        headers
    }
}

/// Copy the allowed subset of `source`.
pub fn copy_allowed(source: &HeaderMap, allowed: &[HeaderName]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in allowed {
        for value in source.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}
