use axum::{
    body::Body,
    extract::{OriginalUri, RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use url::Url;

use crate::{
    Result,
    hls::{PLAYLIST_CONTENT_TYPE, is_playlist},
    proxy::{
        OriginResponse,
        headers::{FORWARDED_RESPONSE_HEADERS, PLAYLIST_RESPONSE_HEADERS, copy_allowed},
    },
    server::{params::ProxyParams, state::AppState},
    stream::{StreamProcessor, TransformContext, rules},
};

/// Handle GET /proxy requests.
pub async fn handle_proxy(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response> {
    let target = ProxyParams::from_query(query.as_deref()).target()?;
    let range = headers.get(header::RANGE);

    tracing::info!(range = ?range, "Proxy request: {}", target);

    let response = state.fetcher.fetch(&target, range).await?;

    if is_playlist(response.content_type(), &response.final_url) {
        let proxy_base = proxy_base_url(state.config.public_base_url.as_ref(), &headers, uri.path());
        playlist_response(&state, response, proxy_base).await
    } else {
        Ok(passthrough_response(response))
    }
}

/// Buffer, rewrite and return a playlist. Bodies that are not UTF-8 are
/// relayed unchanged.
async fn playlist_response(
    state: &AppState,
    response: OriginResponse,
    proxy_base: String,
) -> Result<Response> {
    let OriginResponse {
        status,
        final_url,
        headers,
        body,
    } = response;

    let bytes = state.fetcher.read_body(&final_url, body).await?;

    let text = match std::str::from_utf8(&bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Playlist from {final_url} is not UTF-8 ({e}), relaying unchanged");
            let headers = copy_allowed(&headers, &FORWARDED_RESPONSE_HEADERS);
            return Ok((status, headers, Body::from(bytes)).into_response());
        }
    };

    let context = TransformContext::new(final_url, proxy_base);
    let processor = StreamProcessor::new(context, rules::rules_for(&state.config.rewrite));
    let rewritten = processor.process(text);

    let mut out = copy_allowed(&headers, &PLAYLIST_RESPONSE_HEADERS);
    out.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(PLAYLIST_CONTENT_TYPE),
    );

    Ok((StatusCode::OK, out, rewritten).into_response())
}

/// Relay the origin body chunk by chunk.
fn passthrough_response(response: OriginResponse) -> Response {
    let headers = copy_allowed(&response.headers, &FORWARDED_RESPONSE_HEADERS);
    (response.status, headers, Body::from_stream(response.body)).into_response()
}

/// Externally visible URL of this endpoint, used as the prefix of rewritten
/// links: the configured public URL, else `{proto}://{host}{path}` from the
/// forwarding headers, else just the path.
pub fn proxy_base_url(configured: Option<&Url>, headers: &HeaderMap, path: &str) -> String {
    if let Some(url) = configured {
        return url.as_str().to_string();
    }

    let first_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let host = first_value("x-forwarded-host").or_else(|| first_value(header::HOST.as_str()));
    match host {
        Some(host) => {
            let proto = first_value("x-forwarded-proto").unwrap_or("http");
            format!("{proto}://{host}{path}")
        }
        None => path.to_string(),
    }
}
