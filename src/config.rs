use anyhow::{Context, bail};
use std::{env, str::FromStr, time::Duration};
use url::Url;

/// Desktop Chrome identity presented to origins.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Complete external URL of the proxy endpoint, e.g.
    /// `https://myproxy.example.com/api/proxy`. When unset the base is
    /// rebuilt from the forwarding headers of each request.
    pub public_base_url: Option<Url>,
    pub fetch: FetchConfig,
    pub rewrite: RewriteConfig,
}

/// How the proxy presents itself to origins.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Referer sent to every origin. `None` makes each request look
    /// same-origin to the CDN it targets.
    pub referer_override: Option<Url>,
    /// Upper bound on the upstream round-trip (and on buffering playlists).
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

/// Playlist rewriting options.
#[derive(Debug, Clone, Default)]
pub struct RewriteConfig {
    /// Also proxy `URI="..."` attributes of key, map and rendition tags.
    pub tag_uris: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer_override: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_base_url: None,
            fetch: FetchConfig::default(),
            rewrite: RewriteConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT", 8080u16)?;

        let public_base_url = optional_url("PUBLIC_BASE_URL")?;
        let referer_override = optional_url("PROXY_REFERER")?;

        let user_agent = env::var("PROXY_USER_AGENT")
            .ok()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let request_timeout = timeout_var("PROXY_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT)?;
        let connect_timeout = timeout_var("PROXY_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT)?;

        let tag_uris = match env::var("REWRITE_TAG_URIS") {
            Ok(value) => parse_flag(&value)
                .with_context(|| format!("REWRITE_TAG_URIS is not a boolean: {value}"))?,
            Err(_) => false,
        };

        Ok(Self {
            host,
            port,
            public_base_url,
            fetch: FetchConfig {
                user_agent,
                referer_override,
                request_timeout,
                connect_timeout,
            },
            rewrite: RewriteConfig { tag_uris },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {value}")),
        Err(_) => Ok(default),
    }
}

fn timeout_var(name: &str, default: Duration) -> anyhow::Result<Duration> {
    let secs = parse_var(name, default.as_secs())?;
    if secs == 0 {
        bail!("{name} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}

fn optional_url(name: &str) -> anyhow::Result<Option<Url>> {
    let Some(value) = env::var(name).ok().filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    let url = Url::parse(value.trim()).with_context(|| format!("{name} is not a URL: {value}"))?;
    match url.scheme() {
        "http" | "https" => Ok(Some(url)),
        scheme => bail!("{name} must use http or https, got {scheme}"),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
