use crate::models::prediction_types::PredictionResult;
use crate::services::api_client::{ClassifierApi, ClientError};
use crate::services::capture_service::CapturedImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Owns the current result and talks to the classifier.
///
/// One request at a time: a call made while another is outstanding fails
/// with [`ClientError::Busy`] and never reaches the network.
#[derive(Clone)]
pub struct ClassificationSession {
    api: Arc<dyn ClassifierApi>,
    current: Arc<Mutex<Option<PredictionResult>>>,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the call finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ClassificationSession {
    pub fn new(api: Arc<dyn ClassifierApi>) -> Self {
        Self {
            api,
            current: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<PredictionResult>> {
        // Nothing panics while holding this lock; recover the value if it ever did.
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn acquire(&self) -> Result<InFlight<'_>, ClientError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::Busy)?;
        Ok(InFlight(&self.in_flight))
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn current(&self) -> Option<PredictionResult> {
        self.lock_current().clone()
    }

    pub fn clear(&self) {
        *self.lock_current() = None;
    }

    /// Classify a fresh photo. On success the result replaces whatever was
    /// there; on failure nothing is kept.
    pub async fn submit(&self, image: &CapturedImage) -> Result<PredictionResult, ClientError> {
        let _guard = self.acquire()?;

        match self.api.predict(image).await {
            Ok(result) => {
                *self.lock_current() = Some(result.clone());
                Ok(result)
            }
            Err(e) => {
                *self.lock_current() = None;
                Err(e)
            }
        }
    }

    /// Replace the label of the current result. On failure the previous
    /// result stays in place.
    pub async fn correct(&self, label: &str) -> Result<PredictionResult, ClientError> {
        let _guard = self.acquire()?;

        let id = self
            .lock_current()
            .as_ref()
            .map(|r| r.id.clone())
            .ok_or(ClientError::NoResult)?;

        let result = self.api.update(&id, label).await?;
        *self.lock_current() = Some(result.clone());
        Ok(result)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Predict { file_name: String },
        Update { id: String, product: String },
    }

    /// Scripted classifier: hands out queued responses in order and records calls.
    #[derive(Default)]
    pub struct FakeApi {
        responses: Mutex<VecDeque<Result<PredictionResult, ClientError>>>,
        calls: Mutex<Vec<Call>>,
        /// When set, every call parks until notified.
        gate: Option<Arc<Notify>>,
    }

    impl FakeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::default()
            }
        }

        pub fn respond(self, response: Result<PredictionResult, ClientError>) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        async fn next(&self, call: Call) -> Result<PredictionResult, ClientError> {
            self.calls.lock().unwrap().push(call);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Transport("no scripted response".into())))
        }
    }

    #[async_trait]
    impl ClassifierApi for FakeApi {
        async fn predict(&self, image: &CapturedImage) -> Result<PredictionResult, ClientError> {
            self.next(Call::Predict {
                file_name: image.file_name.clone(),
            })
            .await
        }

        async fn update(&self, id: &str, product: &str) -> Result<PredictionResult, ClientError> {
            self.next(Call::Update {
                id: id.to_string(),
                product: product.to_string(),
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{Call, FakeApi};
    use super::*;
    use crate::services::capture_service::{captured_from_bytes, CaptureSource};
    use crate::test_support::{png_bytes, result};
    use tokio::sync::Notify;

    fn image() -> CapturedImage {
        captured_from_bytes(Some("bottle.png".into()), png_bytes(), CaptureSource::File).unwrap()
    }

    #[tokio::test]
    async fn submit_then_correct_replaces_result() {
        let api = Arc::new(
            FakeApi::new()
                .respond(Ok(result("r1", "Plastic Bottle")))
                .respond(Ok(result("r1", "Glass Bottle"))),
        );
        let session = ClassificationSession::new(api.clone());

        let first = session.submit(&image()).await.unwrap();
        assert_eq!(first.product, "Plastic Bottle");

        let corrected = session.correct("Glass Bottle").await.unwrap();
        assert_eq!(corrected.product, "Glass Bottle");
        assert_eq!(session.current().unwrap().product, "Glass Bottle");

        assert_eq!(
            api.calls(),
            vec![
                Call::Predict {
                    file_name: "bottle.png".into()
                },
                Call::Update {
                    id: "r1".into(),
                    product: "Glass Bottle".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn failed_correction_keeps_previous_result() {
        let api = Arc::new(
            FakeApi::new()
                .respond(Ok(result("r1", "Plastic Bottle")))
                .respond(Err(ClientError::Status {
                    status: 502,
                    body: "bad gateway".into(),
                })),
        );
        let session = ClassificationSession::new(api);

        session.submit(&image()).await.unwrap();
        assert!(session.correct("Can").await.is_err());
        assert_eq!(session.current().unwrap().product, "Plastic Bottle");
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn failed_submit_keeps_nothing() {
        let api = Arc::new(FakeApi::new().respond(Err(ClientError::Payload("not json".into()))));
        let session = ClassificationSession::new(api);

        let err = session.submit(&image()).await.unwrap_err();
        assert!(matches!(err, ClientError::Payload(_)));
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn correct_without_result_makes_no_request() {
        let api = Arc::new(FakeApi::new());
        let session = ClassificationSession::new(api.clone());

        assert!(matches!(session.correct("Can").await, Err(ClientError::NoResult)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn second_call_while_busy_is_refused() {
        let gate = Arc::new(Notify::new());
        let api = Arc::new(FakeApi::gated(gate.clone()).respond(Ok(result("r1", "Can"))));
        let session = ClassificationSession::new(api.clone());

        let background = session.clone();
        let pending = tokio::spawn(async move { background.submit(&image()).await });

        while !session.is_busy() {
            tokio::task::yield_now().await;
        }
        assert!(matches!(session.submit(&image()).await, Err(ClientError::Busy)));
        assert_eq!(api.calls().len(), 1);

        gate.notify_one();
        pending.await.unwrap().unwrap();
        assert!(!session.is_busy());
    }
}
