use crate::Result;
use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode, header};
use bytes::{Bytes, BytesMut};
use futures::{TryStreamExt, stream::BoxStream};
use std::fmt;
use url::Url;

/// Lazy, finite, non-restartable sequence of body chunks.
pub type ByteStream = BoxStream<'static, std::io::Result<Bytes>>;

/// A GET request to an origin.
#[derive(Debug, Clone)]
pub struct OriginRequest {
    pub url: Url,
    pub headers: HeaderMap,
}

/// An origin response whose body has not been read yet.
pub struct OriginResponse {
    pub status: StatusCode,
    /// URL that produced the response, after redirects.
    pub final_url: Url,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl OriginResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Buffer the whole body.
    pub async fn into_bytes(self) -> std::io::Result<Bytes> {
        collect_body(self.body).await
    }
}

impl fmt::Debug for OriginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OriginResponse")
            .field("status", &self.status)
            .field("final_url", &self.final_url.as_str())
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

pub async fn collect_body(mut body: ByteStream) -> std::io::Result<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.try_next().await? {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// HTTP capability used to reach origins.
///
/// Implementations perform exactly one request: no retries, no caching.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OriginRequest) -> Result<OriginResponse>;
}
