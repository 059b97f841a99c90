//! Best-effort extraction of a YouTube video id from a tutorial link.
//!
//! The id is only used to look up a preview image. The link the user opens
//! is always the raw URL the service sent, untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use url::Url;

const ID_LEN: usize = 11;

static LOOSE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|/|embed/|youtu\.be/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)")
        .expect("static video id pattern")
});

/// An 11-character YouTube video id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Accepts only the exact id shape: 11 chars of `[A-Za-z0-9_-]`.
    pub fn parse(candidate: &str) -> Option<Self> {
        let valid = candidate.len() == ID_LEN
            && candidate
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        valid.then(|| VideoId(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve a video id from a raw link. Returns `None` on anything it cannot
/// make sense of; never panics.
pub fn resolve_video_id(url: Option<&str>) -> Option<VideoId> {
    let url = url.map(str::trim).filter(|u| !u.is_empty())?;

    let candidate = if url.contains("youtube.com/watch") {
        Url::parse(url).ok().and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
        })
    } else if url.contains("youtu.be/") {
        Url::parse(url).ok().and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next())
                .map(str::to_string)
        })
    } else if url.contains("youtube.com/embed/") {
        url.split("embed/")
            .nth(1)
            .and_then(|rest| rest.split('?').next())
            .map(str::to_string)
    } else {
        LOOSE_ID
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    };

    let id = candidate.as_deref().and_then(VideoId::parse);
    if id.is_none() {
        tracing::debug!(url = %url, "No video id found for tutorial link");
    }
    id
}
