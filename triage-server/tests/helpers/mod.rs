//! Shared test utilities: audio fixtures, a scripted model, and multipart
//! request construction.

pub mod audio;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use triage_server::model::{EmotionModel, ModelError, Prediction};
use triage_server::services::ClassificationService;
use triage_server::AppState;

pub const BOUNDARY: &str = "triage-test-boundary";

/// Model that always returns the same scripted prediction.
pub struct ScriptedModel {
    labels: Vec<String>,
    index: usize,
    scores: Vec<f32>,
}

impl ScriptedModel {
    pub fn new(labels: &[&str], index: usize, scores: &[f32]) -> Arc<Self> {
        assert_eq!(labels.len(), scores.len());
        Arc::new(Self {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            index,
            scores: scores.to_vec(),
        })
    }

    /// Shorthand for a model with one certain class.
    pub fn single(label: &str) -> Arc<Self> {
        Self::new(&[label], 0, &[1.0])
    }
}

impl EmotionModel for ScriptedModel {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, image: &[u8]) -> Result<Prediction, ModelError> {
        assert!(!image.is_empty(), "model received an empty image");
        Ok(Prediction {
            label: self.labels[self.index].clone(),
            index: self.index,
            scores: self.scores.clone(),
        })
    }
}

/// App state around a scripted model.
pub fn scripted_state(model: Arc<ScriptedModel>) -> AppState {
    AppState::new(Arc::new(ClassificationService::with_model(model)))
}

/// App state whose model load failed (nonexistent paths).
pub fn broken_model_state() -> AppState {
    let service = ClassificationService::start(
        std::path::Path::new("/nonexistent/model.onnx"),
        std::path::Path::new("/nonexistent/labels.json"),
    );
    AppState::new(Arc::new(service))
}

/// Build a multipart POST request carrying one file field.
pub fn multipart_request(uri: &str, field_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"clip.wav\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Build a multipart POST request with a single plain text field (no file).
pub fn multipart_text_request(uri: &str, field_name: &str, value: &str) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field_name}\"\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
