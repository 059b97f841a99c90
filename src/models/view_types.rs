use crate::services::thumbnail_chain::ThumbnailSource;
use crate::services::video_id::VideoId;
use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadingKind {
    /// Waiting on `/predict` for a fresh capture.
    Analyzing,
    /// Waiting on `/update` after the user picked a different label.
    Updating,
}

/// Top-level screen of the view.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "step", content = "kind", rename_all = "snake_case")]
pub enum ViewStep {
    Upload,
    Loading(LoadingKind),
    Result,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    SubmitFailed,
    CorrectionFailed,
    InvalidSelection,
}

/// Transient message the view shows once and then discards.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn submit_failed() -> Self {
        Notice {
            kind: NoticeKind::SubmitFailed,
            message: "Failed to analyze image. Please try again.".to_string(),
        }
    }

    pub fn correction_failed() -> Self {
        Notice {
            kind: NoticeKind::CorrectionFailed,
            message: "Failed to update product. Please try again.".to_string(),
        }
    }

    pub fn invalid_selection(detail: &str) -> Self {
        Notice {
            kind: NoticeKind::InvalidSelection,
            message: format!("Please choose an image file ({}).", detail),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TutorialCard {
    /// Raw link as received; this is what "Watch Tutorial" opens.
    pub url: String,
    pub video_id: Option<VideoId>,
    pub thumbnail: ThumbnailSource,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LocationCard {
    pub url: String,
    pub label: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct AlternateOption {
    pub label: String,
    pub confidence: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResultView {
    pub id: String,
    pub product: String,
    pub confidence: String,
    pub description: String,
    pub recyclable: bool,
    pub verdict_headline: &'static str,
    pub verdict_guidance: &'static str,
    pub tutorials: Vec<TutorialCard>,
    pub locations: Vec<LocationCard>,
    pub alternates: Vec<AlternateOption>,
}

/// Everything the view needs to render itself at one instant.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ViewSnapshot {
    #[serde(flatten)]
    pub step: ViewStep,
    pub upload_options_open: bool,
    pub alternatives_open: bool,
    pub custom_input: String,
    pub can_submit_custom: bool,
    /// Data URI of the captured photo, once decoded.
    pub preview: Option<String>,
    /// Only present while the result screen is showing.
    pub result: Option<ResultView>,
}

/// The free-text "Get" action needs something other than whitespace.
pub fn can_submit_custom(input: &str) -> bool {
    !input.trim().is_empty()
}

/// Pointer interaction state of a pressable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Hovered,
    Pressed,
}

/// Scale factor for an animated pressable: pressed wins over hovered.
pub fn press_scale(interaction: Interaction, hover_scale: Option<f32>, tap_scale: Option<f32>) -> f32 {
    match interaction {
        Interaction::Pressed => tap_scale.or(hover_scale).unwrap_or(1.0),
        Interaction::Hovered => hover_scale.unwrap_or(1.0),
        Interaction::Idle => 1.0,
    }
}
