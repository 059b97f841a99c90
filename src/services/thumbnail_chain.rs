use crate::services::video_id::VideoId;
use serde::Serialize;

pub const NO_VIDEO_ID_TEXT: &str = "No Video ID Found";
pub const THUMBNAIL_UNAVAILABLE_TEXT: &str = "Thumbnail Unavailable";

/// Candidate thumbnail URLs, best quality first. `{id}` is substituted.
const CANDIDATES: [&str; 4] = [
    "https://img.youtube.com/vi/{id}/hqdefault.jpg",
    "https://img.youtube.com/vi/{id}/mqdefault.jpg",
    "https://img.youtube.com/vi/{id}/default.jpg",
    "https://i.ytimg.com/vi/{id}/hqdefault.jpg",
];

/// What the view should render in a tutorial card's image slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThumbnailSource {
    Remote { url: String },
    Placeholder { text: &'static str },
}

/// Ordered fallback over [`CANDIDATES`] for one video.
///
/// Advances only on a load failure reported by the view. Once every
/// candidate failed the chain sits on the placeholder for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailChain {
    video_id: Option<VideoId>,
    cursor: usize,
    exhausted: bool,
}

impl ThumbnailChain {
    pub fn new(video_id: Option<VideoId>) -> Self {
        let exhausted = video_id.is_none();
        Self {
            video_id,
            cursor: 0,
            exhausted,
        }
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub fn current(&self) -> ThumbnailSource {
        match (&self.video_id, self.exhausted) {
            (None, _) => ThumbnailSource::Placeholder {
                text: NO_VIDEO_ID_TEXT,
            },
            (Some(_), true) => ThumbnailSource::Placeholder {
                text: THUMBNAIL_UNAVAILABLE_TEXT,
            },
            (Some(id), false) => ThumbnailSource::Remote {
                url: CANDIDATES[self.cursor].replace("{id}", id.as_str()),
            },
        }
    }

    /// The current candidate failed to load. Returns the next source to show.
    pub fn on_load_failed(&mut self) -> ThumbnailSource {
        if !self.exhausted {
            if self.cursor + 1 < CANDIDATES.len() {
                self.cursor += 1;
            } else {
                self.exhausted = true;
                tracing::debug!(video_id = ?self.video_id, "All thumbnail candidates failed");
            }
        }
        self.current()
    }

    /// A thumbnail at `url` failed to load. Only a failure of the candidate
    /// currently shown advances the chain; reports for earlier candidates
    /// or for a chain that was rebuilt since are ignored.
    pub fn on_source_failed(&mut self, url: &str) -> ThumbnailSource {
        match self.current() {
            ThumbnailSource::Remote { url: ref current } if current == url => self.on_load_failed(),
            other => {
                tracing::debug!(failed = %url, "Ignoring failure of a thumbnail no longer shown");
                other
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.exhausted
    }

    /// Number of remote sources handed out so far.
    pub fn attempts(&self) -> usize {
        if self.video_id.is_none() {
            0
        } else if self.exhausted {
            CANDIDATES.len()
        } else {
            self.cursor + 1
        }
    }
}
