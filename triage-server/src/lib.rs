//! triage-server - Audio emotion triage service
//!
//! Accepts an uploaded audio clip, renders a mel-spectrogram image from it,
//! classifies the image with a pretrained emotion model and returns the
//! emotion, a priority tier and a confidence score.

pub mod api;
pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;
pub mod model;
pub mod render;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};

use crate::services::ClassificationService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The classification service; immutable after startup, shared by all
    /// in-flight requests.
    pub classifier: Arc<ClassificationService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(classifier: Arc<ClassificationService>) -> Self {
        Self {
            classifier,
            startup_time: Utc::now(),
        }
    }
}

/// Maximum accepted upload size in bytes. Axum's 2 MB default is smaller
/// than an ordinary uncompressed call recording.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::classify_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
