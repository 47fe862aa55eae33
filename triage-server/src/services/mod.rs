//! Business logic: the spectrogram pipeline and the classification service.

pub mod classifier;
pub mod silence;
pub mod spectrogram;

pub use classifier::{
    ClassificationService, ClassifyError, FrontendEmotion, ModelDiagnostics, PriorityTier,
    TriageResult,
};
pub use spectrogram::SpectrogramError;
