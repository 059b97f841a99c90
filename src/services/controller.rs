use crate::error::AppError;
use crate::models::prediction_types::{confidence_label, PredictionResult};
use crate::models::view_types::{
    can_submit_custom, AlternateOption, LocationCard, Notice, ResultView, TutorialCard, ViewSnapshot,
    ViewStep,
};
use crate::services::api_client::ClassifierApi;
use crate::services::capture_service::{captured_from_bytes, captured_from_path, CaptureSource, CapturedImage};
use crate::services::preview_service::render_preview;
use crate::services::session::ClassificationSession;
use crate::services::thumbnail_chain::{ThumbnailChain, ThumbnailSource};
use crate::services::video_id::resolve_video_id;
use crate::services::view_machine::ViewStateMachine;
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Turns a capture into the preview data URI. Runs on a blocking thread.
pub type PreviewRenderer = Arc<dyn Fn(&CapturedImage) -> String + Send + Sync>;

/// What subscribers hear after every change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ViewEvent {
    Changed(ViewSnapshot),
    Notice(Notice),
}

struct ViewInner {
    machine: ViewStateMachine,
    preview: Option<String>,
    /// One per tutorial of the current result, same order.
    thumbnails: Vec<ThumbnailChain>,
    /// Bumped on every new capture and on reset; stale preview decodes
    /// compare against it and drop their output.
    capture_generation: u64,
}

/// Drives one view: user intents in, snapshots out.
pub struct ViewController {
    session: ClassificationSession,
    inner: Mutex<ViewInner>,
    events: broadcast::Sender<ViewEvent>,
    renderer: PreviewRenderer,
}

impl ViewController {
    pub fn new(api: Arc<dyn ClassifierApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            session: ClassificationSession::new(api),
            inner: Mutex::new(ViewInner {
                machine: ViewStateMachine::new(),
                preview: None,
                thumbnails: Vec::new(),
                capture_generation: 0,
            }),
            events,
            renderer: Arc::new(render_preview),
        }
    }

    /// Swap the preview renderer, e.g. for a smaller target size.
    pub fn with_preview_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&CapturedImage) -> String + Send + Sync + 'static,
    {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &ClassificationSession {
        &self.session
    }

    fn lock(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshot_of(&self.lock())
    }

    fn snapshot_of(&self, inner: &ViewInner) -> ViewSnapshot {
        let state = inner.machine.state();
        let result = match state.step {
            ViewStep::Result => self
                .session
                .current()
                .map(|r| build_result_view(&r, &inner.thumbnails)),
            _ => None,
        };

        ViewSnapshot {
            step: state.step,
            upload_options_open: state.upload_options_open,
            alternatives_open: state.alternatives_open,
            can_submit_custom: can_submit_custom(&state.custom_input),
            custom_input: state.custom_input.clone(),
            preview: inner.preview.clone(),
            result,
        }
    }

    /// Push pending notices and the fresh snapshot to subscribers. Called
    /// with the view lock held so events leave in the order the state changed.
    fn publish_locked(&self, inner: &mut ViewInner) -> ViewSnapshot {
        for notice in inner.machine.take_notices() {
            tracing::info!(kind = ?notice.kind, message = %notice.message, "Notice");
            let _ = self.events.send(ViewEvent::Notice(notice));
        }
        let snapshot = self.snapshot_of(inner);
        let _ = self.events.send(ViewEvent::Changed(snapshot.clone()));
        snapshot
    }

    fn apply<F>(&self, intent: F) -> Result<ViewSnapshot, AppError>
    where
        F: FnOnce(&mut ViewInner) -> Result<(), AppError>,
    {
        let mut inner = self.lock();
        intent(&mut inner)?;
        Ok(self.publish_locked(&mut inner))
    }

    pub fn open_upload_options(&self) -> Result<ViewSnapshot, AppError> {
        self.apply(|inner| Ok(inner.machine.open_upload_options()?))
    }

    pub fn close_upload_options(&self) -> Result<ViewSnapshot, AppError> {
        self.apply(|inner| Ok(inner.machine.close_upload_options()?))
    }

    pub fn open_alternatives(&self) -> Result<ViewSnapshot, AppError> {
        self.apply(|inner| Ok(inner.machine.open_alternatives()?))
    }

    pub fn close_alternatives(&self) -> Result<ViewSnapshot, AppError> {
        self.apply(|inner| Ok(inner.machine.close_alternatives()?))
    }

    pub fn set_custom_input(&self, text: String) -> Result<ViewSnapshot, AppError> {
        self.apply(|inner| Ok(inner.machine.set_custom_input(text)?))
    }

    /// Camera or file input handed over raw bytes.
    pub async fn submit_bytes(
        &self,
        file_name: Option<String>,
        bytes: Vec<u8>,
        source: CaptureSource,
    ) -> Result<ViewSnapshot, AppError> {
        let captured = captured_from_bytes(file_name, bytes, source);
        self.accept_selection(captured).await
    }

    /// A native file picker returned a path.
    pub async fn submit_path(&self, path: &Path, source: CaptureSource) -> Result<ViewSnapshot, AppError> {
        let captured = captured_from_path(path, source).await;
        self.accept_selection(captured).await
    }

    async fn accept_selection(
        &self,
        captured: Result<CapturedImage, AppError>,
    ) -> Result<ViewSnapshot, AppError> {
        match captured {
            Ok(image) => self.select_image(Some(image)).await,
            Err(e) => {
                tracing::warn!(error = %e, "Selection rejected");
                {
                    let mut inner = self.lock();
                    inner
                        .machine
                        .selection_rejected(Notice::invalid_selection(&e.message))?;
                    self.publish_locked(&mut inner);
                }
                Err(e)
            }
        }
    }

    /// Start classifying a selection. `None` means the user cancelled the
    /// picker, which changes nothing.
    ///
    /// The preview decode and the upload run side by side; each applies its
    /// own outcome as soon as it lands.
    pub async fn select_image(&self, selection: Option<CapturedImage>) -> Result<ViewSnapshot, AppError> {
        let Some(image) = selection else {
            return Ok(self.snapshot());
        };

        let generation = {
            let mut inner = self.lock();
            inner.machine.begin_submit()?;
            inner.capture_generation += 1;
            inner.preview = None;
            inner.thumbnails.clear();
            self.publish_locked(&mut inner);
            inner.capture_generation
        };

        let image = Arc::new(image);
        futures::join!(
            self.decode_preview(image.clone(), generation),
            self.upload(image)
        );

        Ok(self.snapshot())
    }

    async fn decode_preview(&self, image: Arc<CapturedImage>, generation: u64) {
        let renderer = self.renderer.clone();
        let preview = match tokio::task::spawn_blocking(move || renderer(&image)).await {
            Ok(preview) => preview,
            Err(e) => {
                tracing::error!(error = %e, "Preview task failed");
                return;
            }
        };

        let mut inner = self.lock();
        if inner.capture_generation != generation {
            tracing::debug!(generation, "Dropping preview for a discarded capture");
            return;
        }
        inner.preview = Some(preview);
        self.publish_locked(&mut inner);
    }

    async fn upload(&self, image: Arc<CapturedImage>) {
        let outcome = self.session.submit(&image).await;

        let mut inner = self.lock();
        let applied = match outcome {
            Ok(result) => {
                inner.thumbnails = thumbnails_for(&result);
                inner.machine.submit_succeeded()
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "Analysis failed");
                inner.machine.submit_failed()
            }
        };
        if let Err(e) = applied {
            tracing::error!(error = %e, "Submit outcome arrived in an unexpected state");
        }
        self.publish_locked(&mut inner);
    }

    /// Correct the result to one of the offered alternates (or any label).
    pub async fn select_alternate(&self, label: &str) -> Result<ViewSnapshot, AppError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(AppError::input("product name is empty"));
        }

        {
            let mut inner = self.lock();
            inner.machine.begin_correction()?;
            self.publish_locked(&mut inner);
        }

        let outcome = self.session.correct(label).await;

        let mut inner = self.lock();
        let applied = match outcome {
            Ok(result) => {
                inner.thumbnails = thumbnails_for(&result);
                inner.machine.correction_succeeded()
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), label, "Correction failed");
                inner.machine.correction_failed()
            }
        };
        if let Err(e) = applied {
            tracing::error!(error = %e, "Correction outcome arrived in an unexpected state");
        }
        Ok(self.publish_locked(&mut inner))
    }

    /// Correct the result to whatever the user typed.
    pub async fn submit_custom_label(&self) -> Result<ViewSnapshot, AppError> {
        let label = self.lock().machine.state().custom_input.trim().to_string();
        if label.is_empty() {
            return Err(AppError::input("product name is empty"));
        }
        self.select_alternate(&label).await
    }

    /// The view failed to load `url` as the thumbnail of tutorial `index`.
    /// Reports for a candidate that is no longer shown change nothing.
    pub fn thumbnail_failed(&self, index: usize, url: &str) -> Result<ThumbnailSource, AppError> {
        let mut inner = self.lock();
        let chain = inner
            .thumbnails
            .get_mut(index)
            .ok_or_else(|| AppError::input(format!("no tutorial at index {}", index)))?;
        let before = chain.current();
        let source = chain.on_source_failed(url);
        if source != before {
            self.publish_locked(&mut inner);
        }
        Ok(source)
    }

    /// Start over: forget the photo, the result and anything typed.
    pub fn reset(&self) -> Result<ViewSnapshot, AppError> {
        let mut inner = self.lock();
        inner.machine.reset()?;
        inner.preview = None;
        inner.thumbnails.clear();
        inner.capture_generation += 1;
        self.session.clear();
        tracing::info!("View reset");
        Ok(self.publish_locked(&mut inner))
    }
}

fn thumbnails_for(result: &PredictionResult) -> Vec<ThumbnailChain> {
    result
        .tutorials
        .iter()
        .map(|video| ThumbnailChain::new(resolve_video_id(Some(video.url()))))
        .collect()
}

fn build_result_view(result: &PredictionResult, thumbnails: &[ThumbnailChain]) -> ResultView {
    let tutorials = result
        .tutorials
        .iter()
        .zip(thumbnails)
        .map(|(video, chain)| TutorialCard {
            url: video.url().to_string(),
            video_id: chain.video_id().cloned(),
            thumbnail: chain.current(),
        })
        .collect();

    ResultView {
        id: result.id.clone(),
        product: result.product.clone(),
        confidence: confidence_label(result.probability),
        description: result.description.clone(),
        recyclable: result.recyclable.is_recyclable(),
        verdict_headline: result.recyclable.headline(),
        verdict_guidance: result.recyclable.guidance(),
        tutorials,
        locations: result
            .disposal_locations
            .iter()
            .map(|location| LocationCard {
                url: location.url().to_string(),
                label: location.label(),
            })
            .collect(),
        alternates: result
            .alternates
            .iter()
            .map(|alt| AlternateOption {
                label: alt.object.clone(),
                confidence: confidence_label(alt.probability),
            })
            .collect(),
    }
}
