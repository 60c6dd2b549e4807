use url::Url;

/// Content type forced onto every rewritten playlist.
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Decide whether an origin response is an HLS playlist.
///
/// Any `*mpegurl` media type counts. CDNs also serve playlists as
/// `text/plain`, `application/octet-stream` or with no type at all, so those
/// are accepted when the path carries a playlist extension.
pub fn is_playlist(content_type: Option<&str>, url: &Url) -> bool {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if essence.contains("mpegurl") {
        return true;
    }

    let generic = matches!(
        essence.as_str(),
        "" | "text/plain" | "application/octet-stream" | "binary/octet-stream"
    );
    generic && has_playlist_extension(url)
}

fn has_playlist_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    path.ends_with(".m3u8") || path.ends_with(".m3u")
}
