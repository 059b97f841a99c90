//! Stand-in for the classification service, bound on an ephemeral port.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use eco_capture_lib::ClientConfig;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UploadSeen {
    pub content_type: String,
    pub body: Vec<u8>,
}

pub struct StubState {
    pub predict_status: Mutex<StatusCode>,
    pub predict_body: Mutex<Option<String>>,
    pub update_status: Mutex<StatusCode>,
    pub delay: Mutex<Option<Duration>>,
    pub uploads: Mutex<Vec<UploadSeen>>,
    pub updates: Mutex<Vec<Value>>,
}

impl StubState {
    pub fn fail_predict(&self, status: StatusCode) {
        *self.predict_status.lock().unwrap() = status;
    }

    pub fn fail_update(&self, status: StatusCode) {
        *self.update_status.lock().unwrap() = status;
    }

    pub fn raw_predict_body(&self, body: &str) {
        *self.predict_body.lock().unwrap() = Some(body.to_string());
    }

    pub fn delay_responses(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

pub struct Stub {
    pub state: Arc<StubState>,
    pub base_url: String,
}

impl Stub {
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone()).unwrap()
    }
}

pub fn prediction(id: &str, product: &str) -> Value {
    json!({
        "id": id,
        "product": product,
        "probability": 0.873,
        "description": format!("{} description", product),
        "recyclable": "yes",
        "yt": [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/abcdefghijk?si=share"
        ],
        "maps": ["https://www.google.com/maps/place/Green+Depot/@51.5,-0.1,15z"],
        "other_predictions": [
            {"object": "Glass Bottle", "probability": 0.08},
            {"object": "Jar", "probability": 0.03}
        ]
    })
}

async fn predict(State(state): State<Arc<StubState>>, headers: HeaderMap, body: Bytes) -> Response {
    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.uploads.lock().unwrap().push(UploadSeen {
        content_type,
        body: body.to_vec(),
    });

    let status = *state.predict_status.lock().unwrap();
    if !status.is_success() {
        return (status, "internal error").into_response();
    }
    if let Some(raw) = state.predict_body.lock().unwrap().clone() {
        return (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], raw).into_response();
    }
    Json(prediction("r-1", "Plastic Bottle")).into_response()
}

async fn update(State(state): State<Arc<StubState>>, Json(request): Json<Value>) -> Response {
    state.updates.lock().unwrap().push(request.clone());

    let status = *state.update_status.lock().unwrap();
    if !status.is_success() {
        return (status, "update failed").into_response();
    }
    let id = request["id"].as_str().unwrap_or_default();
    let product = request["product"].as_str().unwrap_or_default();
    Json(prediction(id, product)).into_response()
}

pub async fn spawn_stub() -> Stub {
    let state = Arc::new(StubState {
        predict_status: Mutex::new(StatusCode::OK),
        predict_body: Mutex::new(None),
        update_status: Mutex::new(StatusCode::OK),
        delay: Mutex::new(None),
        uploads: Mutex::new(Vec::new()),
        updates: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/predict", post(predict))
        .route("/update", post(update))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Stub {
        state,
        base_url: format!("http://{}", addr),
    }
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(8, 6, image::Rgb([120, 80, 40])));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
