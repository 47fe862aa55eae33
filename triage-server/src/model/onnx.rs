//! ONNX Runtime backed emotion model.
//!
//! Loads an image-classification network exported to ONNX together with a
//! JSON label manifest (`["angry", "calm", ...]`) sitting beside it. ONNX is
//! OS-agnostic, so a model exported on any platform loads on any other
//! without compatibility shims.

use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;
use tracing::info;

use super::{EmotionModel, ModelError, Prediction};

/// Square input edge the spectrogram image is resized to before inference.
const INPUT_EDGE: u32 = 224;

/// Per-channel normalization constants (ImageNet statistics, matching the
/// pretrained backbone the classifier was fine-tuned from).
const CHANNEL_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const CHANNEL_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Emotion classifier backed by an ONNX Runtime session.
///
/// The session is behind a mutex because ONNX Runtime requires exclusive
/// access while running; the handle itself is immutable after load and safe
/// to share across requests.
pub struct OnnxEmotionModel {
    session: Mutex<ort::session::Session>,
    labels: Vec<String>,
}

impl OnnxEmotionModel {
    /// Load the model and its label manifest from disk.
    pub fn load(model_path: &Path, labels_path: &Path) -> Result<Self, ModelError> {
        let labels = load_labels(labels_path)?;

        let session = ort::session::Session::builder()
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| ModelError::Session(e.to_string()))?;

        info!(
            model = %model_path.display(),
            classes = labels.len(),
            "ONNX model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            labels,
        })
    }
}

impl EmotionModel for OnnxEmotionModel {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict(&self, image: &[u8]) -> Result<Prediction, ModelError> {
        let input = prepare_input(image)?;
        let shape = vec![1i64, 3, INPUT_EDGE as i64, INPUT_EDGE as i64];

        let tensor = ort::value::Tensor::from_array((shape, input))
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| ModelError::Inference(e.to_string()))?;

        let (_, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError::Inference(e.to_string()))?;
        check_output_shape(data.len(), self.labels.len())?;

        let scores = normalize_scores(data);
        let index = argmax(&scores);

        Ok(Prediction {
            label: self.labels[index].clone(),
            index,
            scores,
        })
    }
}

fn check_output_shape(scores: usize, labels: usize) -> Result<(), ModelError> {
    if scores != labels {
        return Err(ModelError::ShapeMismatch { scores, labels });
    }
    Ok(())
}

/// Read the JSON label manifest (an ordered array of class names).
fn load_labels(path: &Path) -> Result<Vec<String>, ModelError> {
    let raw = std::fs::read_to_string(path)?;
    let labels: Vec<String> =
        serde_json::from_str(&raw).map_err(|e| ModelError::Manifest(e.to_string()))?;
    if labels.is_empty() {
        return Err(ModelError::Manifest("label manifest is empty".into()));
    }
    Ok(labels)
}

/// Decode the spectrogram JPEG and lay it out as a normalized NCHW buffer.
fn prepare_input(image: &[u8]) -> Result<Vec<f32>, ModelError> {
    let decoded = image::load_from_memory(image)?;
    let resized = decoded
        .resize_exact(INPUT_EDGE, INPUT_EDGE, FilterType::Triangle)
        .to_rgb8();

    let plane = (INPUT_EDGE * INPUT_EDGE) as usize;
    let mut input = vec![0.0f32; 3 * plane];
    for (i, pixel) in resized.pixels().enumerate() {
        for ch in 0..3 {
            let value = pixel.0[ch] as f32 / 255.0;
            input[ch * plane + i] = (value - CHANNEL_MEAN[ch]) / CHANNEL_STD[ch];
        }
    }
    Ok(input)
}

/// Turn raw model outputs into a probability-like score vector.
///
/// Exported classifiers may or may not end in a softmax layer; logits are
/// detected (values outside [0, 1] or not summing to ~1) and softmaxed,
/// while already normalized outputs pass through untouched.
fn normalize_scores(raw: &[f32]) -> Vec<f32> {
    let sum: f32 = raw.iter().sum();
    let in_range = raw.iter().all(|&v| (0.0..=1.0).contains(&v));
    if in_range && (sum - 1.0).abs() < 1e-3 {
        return raw.to_vec();
    }

    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = raw.iter().map(|&v| (v - max).exp()).collect();
    let denom: f32 = exp.iter().sum();
    exp.iter().map(|&v| v / denom).collect()
}

fn argmax(scores: &[f32]) -> usize {
    scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
