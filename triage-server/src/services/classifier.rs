//! Classification orchestration and label mapping.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::model::{EmotionModel, ModelError, OnnxEmotionModel};
use crate::services::spectrogram::{self, SpectrogramError};

/// Classification errors.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The model never loaded; carries the startup diagnostics.
    #[error("Modelo no disponible")]
    ModelUnavailable(ModelDiagnostics),

    /// Audio preprocessing failed.
    #[error("{0}")]
    Preprocessing(#[from] SpectrogramError),

    /// Model invocation failed.
    #[error("{0}")]
    Inference(#[from] ModelError),
}

/// Diagnostic record of a failed model load, captured once at startup and
/// surfaced on every request until the deployment is fixed.
#[derive(Debug, Clone, Serialize)]
pub struct ModelDiagnostics {
    /// The path the loader resolved and attempted.
    pub model_path: PathBuf,
    /// Whether that path existed on the filesystem at startup.
    pub model_exists: bool,
    /// Top-level failure message.
    pub load_error: String,
    /// Full failure chain.
    pub load_traceback: String,
}

/// Call priority derived from the predicted emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriorityTier {
    #[serde(rename = "ALTA")]
    Alta,
    #[serde(rename = "MEDIA")]
    Media,
    #[serde(rename = "BAJA")]
    Baja,
}

impl PriorityTier {
    /// Map a normalized (lowercase) raw label to its priority tier.
    pub fn from_label(label: &str) -> Self {
        match label {
            "angry" | "fearful" | "disgust" => Self::Alta,
            "sad" | "surprised" => Self::Media,
            _ => Self::Baja,
        }
    }
}

/// The reduced emotion vocabulary the frontend displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontendEmotion {
    Happy,
    Neutral,
    Angry,
}

impl FrontendEmotion {
    /// Map a normalized (lowercase) raw label to the frontend vocabulary.
    ///
    /// Lossy by design: the frontend only distinguishes three moods, and
    /// anything unrecognized reads as neutral.
    pub fn from_label(label: &str) -> Self {
        match label {
            "happy" | "happiness" => Self::Happy,
            "neutral" | "calm" | "surprised" => Self::Neutral,
            "angry" | "sad" | "fearful" | "disgust" => Self::Angry,
            _ => Self::Neutral,
        }
    }
}

/// Composed classification outcome returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct TriageResult {
    /// Frontend-facing emotion bucket.
    pub emotion: FrontendEmotion,
    /// The model's own (normalized) class name, kept for debuggability.
    pub emotion_str: String,
    /// Triage priority tier.
    pub priority: PriorityTier,
    /// Score of the predicted class, in [0.0, 1.0].
    pub confidence: f32,
}

enum ModelState {
    Ready(Arc<dyn EmotionModel>),
    Failed(ModelDiagnostics),
}

/// Owns the long-lived model handle and runs the per-request pipeline.
///
/// Construction never fails: a broken deployment yields a service that
/// answers every request with its startup diagnostics instead of refusing
/// to start.
pub struct ClassificationService {
    state: ModelState,
}

impl ClassificationService {
    /// Attempt the one-time model load.
    pub fn start(model_path: &Path, labels_path: &Path) -> Self {
        match OnnxEmotionModel::load(model_path, labels_path) {
            Ok(model) => {
                info!(classes = model.labels().len(), "classification service ready");
                Self {
                    state: ModelState::Ready(Arc::new(model)),
                }
            }
            Err(err) => {
                let diagnostics = ModelDiagnostics {
                    model_path: model_path.to_path_buf(),
                    model_exists: model_path.exists(),
                    load_error: err.to_string(),
                    load_traceback: format!("{:#}", anyhow::Error::from(err)),
                };
                error!(
                    model_path = %diagnostics.model_path.display(),
                    model_exists = diagnostics.model_exists,
                    load_error = %diagnostics.load_error,
                    "model failed to load; serving diagnostics"
                );
                Self {
                    state: ModelState::Failed(diagnostics),
                }
            }
        }
    }

    /// Build a service around an already loaded model.
    pub fn with_model(model: Arc<dyn EmotionModel>) -> Self {
        Self {
            state: ModelState::Ready(model),
        }
    }

    pub fn model_loaded(&self) -> bool {
        matches!(self.state, ModelState::Ready(_))
    }

    /// Startup diagnostics, present only when the load failed.
    pub fn diagnostics(&self) -> Option<&ModelDiagnostics> {
        match &self.state {
            ModelState::Ready(_) => None,
            ModelState::Failed(diag) => Some(diag),
        }
    }

    /// Classify one audio upload.
    ///
    /// Synchronous CPU-bound work; callers on an async runtime should run
    /// this on a blocking thread.
    pub fn classify(&self, audio: &[u8]) -> Result<TriageResult, ClassifyError> {
        let model = match &self.state {
            ModelState::Ready(model) => model,
            ModelState::Failed(diag) => {
                return Err(ClassifyError::ModelUnavailable(diag.clone()))
            }
        };

        let image = spectrogram::extract(audio)?;
        let prediction = model.predict(&image)?;

        // Normalize once; both mappings are defined on the lowercase form.
        let label = prediction.label.to_lowercase();
        let confidence = prediction
            .scores
            .get(prediction.index)
            .copied()
            .unwrap_or(0.0);

        info!(
            emotion = %label,
            confidence = format!("{confidence:.3}"),
            "classified upload"
        );

        Ok(TriageResult {
            emotion: FrontendEmotion::from_label(&label),
            priority: PriorityTier::from_label(&label),
            emotion_str: label,
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Prediction;

    /// Scripted model that always returns the same prediction.
    struct FixedModel {
        labels: Vec<String>,
        index: usize,
        scores: Vec<f32>,
    }

    impl FixedModel {
        fn new(labels: &[&str], index: usize, scores: &[f32]) -> Arc<Self> {
            Arc::new(Self {
                labels: labels.iter().map(|s| s.to_string()).collect(),
                index,
                scores: scores.to_vec(),
            })
        }
    }

    impl EmotionModel for FixedModel {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn predict(&self, _image: &[u8]) -> Result<Prediction, ModelError> {
            Ok(Prediction {
                label: self.labels[self.index].clone(),
                index: self.index,
                scores: self.scores.clone(),
            })
        }
    }

    fn test_wav() -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Vec::new();
        {
            let mut writer =
                hound::WavWriter::new(std::io::Cursor::new(&mut bytes), spec).unwrap();
            for i in 0..22050 {
                let t = i as f32 / 22050.0;
                let sample = (0.4 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
                    * i16::MAX as f32) as i16;
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }
        bytes
    }

    #[test]
    fn priority_mapping_table() {
        for label in ["angry", "fearful", "disgust"] {
            assert_eq!(PriorityTier::from_label(label), PriorityTier::Alta);
        }
        for label in ["sad", "surprised"] {
            assert_eq!(PriorityTier::from_label(label), PriorityTier::Media);
        }
        for label in ["happy", "calm", "neutral", "xyz"] {
            assert_eq!(PriorityTier::from_label(label), PriorityTier::Baja);
        }
    }

    #[test]
    fn frontend_mapping_is_total() {
        assert_eq!(FrontendEmotion::from_label("happy"), FrontendEmotion::Happy);
        assert_eq!(
            FrontendEmotion::from_label("happiness"),
            FrontendEmotion::Happy
        );
        for label in ["neutral", "calm", "surprised"] {
            assert_eq!(FrontendEmotion::from_label(label), FrontendEmotion::Neutral);
        }
        for label in ["angry", "sad", "fearful", "disgust"] {
            assert_eq!(FrontendEmotion::from_label(label), FrontendEmotion::Angry);
        }
        // Unknown labels fall back to neutral.
        assert_eq!(FrontendEmotion::from_label("xyz"), FrontendEmotion::Neutral);
        assert_eq!(FrontendEmotion::from_label(""), FrontendEmotion::Neutral);
    }

    #[test]
    fn labels_are_normalized_before_mapping() {
        let model = FixedModel::new(&["ANGRY", "Calm"], 0, &[0.9, 0.1]);
        let service = ClassificationService::with_model(model);
        let result = service.classify(&test_wav()).unwrap();
        assert_eq!(result.emotion_str, "angry");
        assert_eq!(result.priority, PriorityTier::Alta);
        assert_eq!(result.emotion, FrontendEmotion::Angry);
    }

    #[test]
    fn confidence_comes_from_predicted_index() {
        // Index 1 is not the maximum score; the model's own choice wins.
        let model = FixedModel::new(&["angry", "sad"], 1, &[0.7, 0.3]);
        let service = ClassificationService::with_model(model);
        let result = service.classify(&test_wav()).unwrap();
        assert_eq!(result.emotion_str, "sad");
        assert!((result.confidence - 0.3).abs() < 1e-6);
    }

    #[test]
    fn priority_tiers_for_known_labels() {
        for (label, expected) in [
            ("angry", PriorityTier::Alta),
            ("sad", PriorityTier::Media),
            ("happy", PriorityTier::Baja),
        ] {
            let model = FixedModel::new(&[label], 0, &[1.0]);
            let service = ClassificationService::with_model(model);
            let result = service.classify(&test_wav()).unwrap();
            assert_eq!(result.priority, expected, "label {label}");
        }
    }

    #[test]
    fn undecodable_audio_is_preprocessing_error() {
        let model = FixedModel::new(&["angry"], 0, &[1.0]);
        let service = ClassificationService::with_model(model);
        let result = service.classify(b"not audio at all");
        assert!(matches!(result, Err(ClassifyError::Preprocessing(_))));
    }

    #[test]
    fn missing_model_reports_diagnostics() {
        let service = ClassificationService::start(
            Path::new("/nonexistent/model.onnx"),
            Path::new("/nonexistent/labels.json"),
        );
        assert!(!service.model_loaded());
        let diag = service.diagnostics().unwrap();
        assert!(!diag.model_exists);
        assert!(!diag.load_error.is_empty());

        let result = service.classify(&test_wav());
        assert!(matches!(result, Err(ClassifyError::ModelUnavailable(_))));
    }

    #[test]
    fn classification_is_deterministic() {
        let model = FixedModel::new(&["happy"], 0, &[0.8, 0.2]);
        let service = ClassificationService::with_model(model);
        let wav = test_wav();
        let a = service.classify(&wav).unwrap();
        let b = service.classify(&wav).unwrap();
        assert_eq!(a.emotion_str, b.emotion_str);
        assert_eq!(a.confidence, b.confidence);
    }
}
