//! Emotion classification model abstraction.
//!
//! The service only depends on the [`EmotionModel`] trait; the production
//! implementation wraps an ONNX Runtime session, and tests substitute a
//! scripted model.

pub mod onnx;

use thiserror::Error;

pub use onnx::OnnxEmotionModel;

/// Model errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A model file could not be read.
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    /// The label manifest is missing or malformed.
    #[error("invalid label manifest: {0}")]
    Manifest(String),

    /// The inference session could not be created.
    #[error("failed to create inference session: {0}")]
    Session(String),

    /// The input image could not be prepared for the model.
    #[error("invalid model input image: {0}")]
    Image(#[from] image::ImageError),

    /// Model invocation failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The model's output does not match the label manifest.
    #[error("model returned {scores} scores for {labels} labels")]
    ShapeMismatch { scores: usize, labels: usize },
}

/// One classification outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// The model's native class name for the predicted class.
    pub label: String,
    /// Index of the predicted class in `scores`.
    pub index: usize,
    /// Per-class score vector, ordered like the label manifest.
    pub scores: Vec<f32>,
}

/// A loaded emotion classifier.
///
/// Implementations must be immutable after construction so a single handle
/// can be shared by concurrent requests.
pub trait EmotionModel: Send + Sync {
    /// The model's class vocabulary, in score order.
    fn labels(&self) -> &[String];

    /// Classify one spectrogram image (JPEG bytes).
    fn predict(&self, image: &[u8]) -> Result<Prediction, ModelError>;
}
