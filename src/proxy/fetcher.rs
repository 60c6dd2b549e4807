use super::{
    headers::HeaderPolicy,
    transport::{ByteStream, OriginRequest, OriginResponse, Transport, collect_body},
};
use crate::{Error, Result, config::FetchConfig};
use axum::http::HeaderValue;
use bytes::Bytes;
use std::{sync::Arc, time::Duration};
use url::Url;

/// Single-hop relay to origins: applies the header policy and the request
/// deadline, and turns non-2xx answers into errors. Never retries.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    policy: HeaderPolicy,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            transport,
            policy: HeaderPolicy::new(config)?,
            timeout: config.request_timeout,
        })
    }

    /// Fetch `target`, returning once the origin has answered with a 2xx.
    /// The body is left unread.
    pub async fn fetch(&self, target: &Url, range: Option<&HeaderValue>) -> Result<OriginResponse> {
        let request = OriginRequest {
            url: target.clone(),
            headers: self.policy.request_headers(target, range),
        };
        tracing::debug!(headers = ?request.headers, "Fetching {}", target);

        let response = tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .map_err(|_| {
                tracing::warn!("Upstream timed out after {:?}: {}", self.timeout, target);
                Error::FetchTimeout(target.to_string())
            })??;

        if !response.status.is_success() {
            tracing::warn!("Upstream returned {} for {}", response.status, target);
            return Err(Error::UpstreamStatus {
                url: target.to_string(),
                status: response.status.as_u16(),
            });
        }

        Ok(response)
    }

    /// Buffer a body within the request deadline.
    pub async fn read_body(&self, url: &Url, body: ByteStream) -> Result<Bytes> {
        match tokio::time::timeout(self.timeout, collect_body(body)).await {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => {
                tracing::warn!("Reading upstream body from {url} failed: {e}");
                Err(Error::FetchFailed {
                    url: url.to_string(),
                    reason: "response body could not be read".to_string(),
                })
            }
            Err(_) => {
                tracing::warn!("Upstream body timed out after {:?}: {url}", self.timeout);
                Err(Error::FetchTimeout(url.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::{HeaderMap, StatusCode, header};
    use futures::{StreamExt, stream};
    use std::sync::Mutex;

    /// Records requests and answers with a fixed status and body.
    struct RecordingTransport {
        status: StatusCode,
        body: &'static [u8],
        delay: Option<Duration>,
        seen: Mutex<Vec<OriginRequest>>,
    }

    impl RecordingTransport {
        fn new(status: StatusCode, body: &'static [u8]) -> Self {
            Self {
                status,
                body,
                delay: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: OriginRequest) -> Result<OriginResponse> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let final_url = request.url.clone();
            self.seen.lock().unwrap().push(request);
            let chunks = self
                .body
                .chunks(3)
                .map(|c| Ok::<_, std::io::Error>(Bytes::from_static(c)))
                .collect::<Vec<_>>();
            Ok(OriginResponse {
                status: self.status,
                final_url,
                headers: HeaderMap::new(),
                body: stream::iter(chunks).boxed(),
            })
        }
    }

    fn target() -> Url {
        Url::parse("https://cdn.example.com/vod/seg1.ts").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_applies_header_policy_and_range() {
        let transport = Arc::new(RecordingTransport::new(StatusCode::PARTIAL_CONTENT, b"abc"));
        let fetcher = Fetcher::new(transport.clone(), &FetchConfig::default()).unwrap();

        let range = HeaderValue::from_static("bytes=1000-1999");
        let response = fetcher.fetch(&target(), Some(&range)).await.unwrap();
        assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url, target());
        assert_eq!(seen[0].headers[header::RANGE], "bytes=1000-1999");
        assert_eq!(seen[0].headers[header::REFERER], "https://cdn.example.com/");
    }

    #[tokio::test]
    async fn test_non_success_is_upstream_status_without_retry() {
        let transport = Arc::new(RecordingTransport::new(StatusCode::NOT_FOUND, b""));
        let fetcher = Fetcher::new(transport.clone(), &FetchConfig::default()).unwrap();

        let err = fetcher.fetch(&target(), None).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamStatus { status: 404, .. }));
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_slow_origin_times_out() {
        let transport = Arc::new(RecordingTransport {
            delay: Some(Duration::from_secs(5)),
            ..RecordingTransport::new(StatusCode::OK, b"")
        });
        let config = FetchConfig {
            request_timeout: Duration::from_millis(50),
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(transport, &config).unwrap();

        let err = fetcher.fetch(&target(), None).await.unwrap_err();
        assert!(matches!(err, Error::FetchTimeout(_)));
        assert_eq!(err.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_read_body_joins_chunks() {
        let transport = Arc::new(RecordingTransport::new(StatusCode::OK, b"#EXTM3U\nseg.ts\n"));
        let fetcher = Fetcher::new(transport, &FetchConfig::default()).unwrap();

        let response = fetcher.fetch(&target(), None).await.unwrap();
        let body = fetcher
            .read_body(&response.final_url, response.body)
            .await
            .unwrap();
        assert_eq!(&body[..], b"#EXTM3U\nseg.ts\n");
    }

    #[tokio::test]
    async fn test_read_body_error_maps_to_fetch_failed() {
        let transport = Arc::new(RecordingTransport::new(StatusCode::OK, b""));
        let fetcher = Fetcher::new(transport, &FetchConfig::default()).unwrap();

        let body: ByteStream = stream::iter(vec![
            Ok(Bytes::from_static(b"#EXTM3U")),
            Err(std::io::Error::other("reset")),
        ])
        .boxed();
        let err = fetcher.read_body(&target(), body).await.unwrap_err();
        assert!(matches!(err, Error::FetchFailed { .. }));
    }
}
