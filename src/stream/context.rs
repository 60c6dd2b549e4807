use crate::Result;
use url::Url;

/// Context for transforming a playlist.
#[derive(Debug, Clone)]
pub struct TransformContext {
    /// URL the playlist was fetched from.
    pub original_url: Url,

    /// Directory of `original_url`; relative references resolve against it.
    pub base_dir: Url,

    /// Externally visible URL of the proxy endpoint.
    pub proxy_base: String,

    /// `{proxy_base}?url=` (or `&url=`), the prefix of every proxied link.
    proxied_prefix: String,
}

impl TransformContext {
    pub fn new(original_url: Url, proxy_base: impl Into<String>) -> Self {
        let proxy_base = proxy_base.into();
        let separator = if proxy_base.contains('?') { '&' } else { '?' };
        let proxied_prefix = format!("{proxy_base}{separator}url=");

        Self {
            base_dir: directory_of(&original_url),
            original_url,
            proxy_base,
            proxied_prefix,
        }
    }

    /// Resolve a reference against the playlist directory (RFC 3986).
    pub fn resolve_url(&self, reference: &str) -> Result<Url> {
        self.base_dir.join(reference.trim()).map_err(Into::into)
    }

    /// Build the proxy URL that fetches `target`.
    pub fn build_proxy_url(&self, target: &Url) -> String {
        format!(
            "{}{}",
            self.proxied_prefix,
            urlencoding::encode(target.as_str())
        )
    }

    /// Whether `reference` already loops back through this proxy.
    pub fn is_proxied(&self, reference: &str) -> bool {
        !self.proxy_base.is_empty() && reference.trim().starts_with(&self.proxied_prefix)
    }
}

/// Truncate a URL after the last `/` of its path, dropping query and fragment.
fn directory_of(url: &Url) -> Url {
    let mut dir = url.clone();
    dir.set_query(None);
    dir.set_fragment(None);

    let path = url.path();
    let cut = path.rfind('/').map_or(0, |i| i + 1);
    let directory = if cut == 0 { "/" } else { &path[..cut] };
    dir.set_path(directory);
    dir
}
