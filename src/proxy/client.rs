use super::transport::{OriginRequest, OriginResponse, Transport};
use crate::{Error, Result, config::FetchConfig};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use std::time::Duration;

/// HTTP client for proxying requests to upstream servers.
#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
}

impl ProxyClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(16)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ProxyClient {
    async fn send(&self, request: OriginRequest) -> Result<OriginResponse> {
        let response = self
            .client
            .get(request.url.clone())
            .headers(request.headers)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Upstream request to {} failed: {e:?}", request.url);
                Error::from(e)
            })?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();

        Ok(OriginResponse {
            status,
            final_url,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
    use url::Url;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> ProxyClient {
        ProxyClient::new(&FetchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_sends_headers_and_streams_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/vod/seg1.ts"))
            .and(header_eq("range", "bytes=0-3"))
            .respond_with(
                ResponseTemplate::new(206)
                    .insert_header("content-range", "bytes 0-3/10")
                    .set_body_bytes(b"\x47\x00\x11\x10".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_static("bytes=0-3"));
        let request = OriginRequest {
            url: Url::parse(&format!("{}/vod/seg1.ts", server.uri())).unwrap(),
            headers,
        };

        let response = client().send(request).await.unwrap();
        assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers["content-range"], "bytes 0-3/10");

        let body = response.into_bytes().await.unwrap();
        assert_eq!(&body[..], b"\x47\x00\x11\x10");
    }

    #[tokio::test]
    async fn test_non_success_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let request = OriginRequest {
            url: Url::parse(&server.uri()).unwrap(),
            headers: HeaderMap::new(),
        };
        let response = client().send(request).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_fetch_failed() {
        // Port 1 (tcpmux) is not listening on test machines.
        let request = OriginRequest {
            url: Url::parse("http://127.0.0.1:1/master.m3u8").unwrap(),
            headers: HeaderMap::new(),
        };
        let err = client().send(request).await.unwrap_err();
        assert!(matches!(err, Error::FetchFailed { .. }), "got {err:?}");
    }
}
