//! Spectrogram rasterization.
//!
//! Renders a dB-scaled mel spectrogram as a color-mapped JPEG held entirely
//! in memory. The output dimensions and colormap are part of the model's
//! input contract and must match whatever produced its training images.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;

use crate::dsp::db::TOP_DB;
use crate::dsp::MelSpectrogram;

/// Output raster width in pixels (4 in at 100 dpi equivalent).
pub const IMAGE_WIDTH: u32 = 400;

/// Output raster height in pixels (3 in at 100 dpi equivalent).
pub const IMAGE_HEIGHT: u32 = 300;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The spectrogram has no cells to draw.
    #[error("spectrogram has no frames")]
    EmptySpectrogram,

    /// JPEG encoding failed.
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Render a dB-scaled mel spectrogram to JPEG bytes.
///
/// One source pixel per (band, frame) cell, low frequencies at the bottom,
/// values mapped through the magma colormap over [-TOP_DB, 0], then resized
/// to the fixed output dimensions. No axes, borders or padding.
pub fn render_jpeg(mel_db: &MelSpectrogram) -> Result<Vec<u8>, RenderError> {
    if mel_db.n_frames == 0 || mel_db.n_bands == 0 {
        return Err(RenderError::EmptySpectrogram);
    }

    let gradient = colorgrad::magma();

    let mut raster = RgbImage::new(mel_db.n_frames as u32, mel_db.n_bands as u32);
    for y in 0..mel_db.n_bands {
        // Row 0 is the top of the image, so it shows the highest band.
        let band = mel_db.n_bands - 1 - y;
        for x in 0..mel_db.n_frames {
            let db = mel_db.value(band, x);
            let t = ((db + TOP_DB) / TOP_DB).clamp(0.0, 1.0);
            let [r, g, b, _] = gradient.at(t as f64).to_rgba8();
            raster.put_pixel(x as u32, y as u32, Rgb([r, g, b]));
        }
    }

    let resized = image::imageops::resize(&raster, IMAGE_WIDTH, IMAGE_HEIGHT, FilterType::Triangle);

    let mut bytes = Vec::new();
    resized.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)?;
    Ok(bytes)
}
