//! Video identifier extraction.

use url::Url;

use crate::error::AnalysisError;

fn is_youtube_host(host: &str) -> bool {
    matches!(
        host.to_ascii_lowercase().as_str(),
        "youtube.com" | "www.youtube.com" | "m.youtube.com" | "music.youtube.com"
    )
}

/// Pulls the video id out of a watch, short-link, shorts or embed URL.
///
/// Anything that is not a recognised YouTube URL, or one that carries an empty id,
/// is an input error and no fetch may be attempted.
pub fn extract_video_id(raw: &str) -> Result<String, AnalysisError> {
    let invalid = || AnalysisError::InvalidUrl(raw.to_string());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    let host = url.host_str().ok_or_else(invalid)?;

    let id = if host.eq_ignore_ascii_case("youtu.be") {
        url.path_segments()
            .and_then(|mut segs| segs.next())
            .map(str::to_string)
    } else if is_youtube_host(host) {
        if url.path() == "/watch" {
            url.query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
        } else {
            let mut segs = url.path_segments().ok_or_else(invalid)?;
            match (segs.next(), segs.next()) {
                (Some("shorts"), Some(id)) | (Some("embed"), Some(id)) => Some(id.to_string()),
                _ => None,
            }
        }
    } else {
        None
    };

    id.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(invalid)
}
