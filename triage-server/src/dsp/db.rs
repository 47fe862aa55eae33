//! Logarithmic (decibel) scaling of power spectrograms.

use super::MelSpectrogram;

/// Smallest power considered non-zero.
const AMIN: f32 = 1e-10;

/// Dynamic range below the reference retained in the output, in dB.
pub const TOP_DB: f32 = 80.0;

/// Convert a power spectrogram to dB, referenced to its own maximum.
///
/// The loudest cell always maps to 0 dB and everything below
/// `-TOP_DB` is clamped, so every clip is normalized to its own peak
/// rather than an absolute level. A degenerate all-zero input maps
/// entirely to the floor.
pub fn power_to_db(spec: &MelSpectrogram) -> MelSpectrogram {
    let reference = spec
        .data
        .iter()
        .copied()
        .fold(0.0f32, f32::max)
        .max(AMIN);
    let ref_db = 10.0 * reference.log10();

    let data: Vec<f32> = spec
        .data
        .iter()
        .map(|&p| {
            let db = 10.0 * p.max(AMIN).log10() - ref_db;
            db.max(-TOP_DB)
        })
        .collect();

    MelSpectrogram {
        n_bands: spec.n_bands,
        n_frames: spec.n_frames,
        data,
    }
}
