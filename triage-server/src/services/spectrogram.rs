//! Audio-to-spectrogram-image extraction.
//!
//! The fixed pipeline behind every classification request: decode, trim
//! silence, compute the mel spectrogram, scale to dB and rasterize. All
//! intermediate state lives in memory; nothing touches the filesystem.

use thiserror::Error;

use crate::audio::{decode_bytes, DecodeError};
use crate::dsp;
use crate::render::{self, RenderError};
use crate::services::silence;

/// Spectrogram extraction errors.
#[derive(Debug, Error)]
pub enum SpectrogramError {
    /// The upload could not be decoded as audio.
    #[error("could not decode audio: {0}")]
    Decode(#[from] DecodeError),

    /// The spectrogram image could not be produced.
    #[error("could not render spectrogram: {0}")]
    Render(#[from] RenderError),
}

/// Convert raw audio bytes into a spectrogram JPEG.
///
/// A clip that trims down to pure silence still produces a valid
/// degenerate (single-frame) image rather than an error; only undecodable
/// input or a rasterization failure is reported.
pub fn extract(audio: &[u8]) -> Result<Vec<u8>, SpectrogramError> {
    let decoded = decode_bytes(audio)?;
    tracing::debug!(
        sample_rate = decoded.sample_rate,
        duration_seconds = format!("{:.2}", decoded.duration_seconds()),
        "decoded upload"
    );

    let trimmed = silence::trim_edges(&decoded.samples);
    if trimmed.is_empty() {
        tracing::debug!("clip is entirely below the trim threshold");
    }

    let mel = dsp::mel_spectrogram(trimmed, decoded.sample_rate);
    let mel_db = dsp::power_to_db(&mel);

    let jpeg = render::render_jpeg(&mel_db)?;
    tracing::debug!(
        frames = mel_db.n_frames,
        image_bytes = jpeg.len(),
        "spectrogram rendered"
    );
    Ok(jpeg)
}
