//! Spectrogram feature extraction.
//!
//! Fixed-parameter pipeline: Hann-windowed power STFT, 128-band mel
//! filterbank, and per-clip dB scaling. None of the parameters are
//! user-configurable; they are part of the model's input contract.

pub mod db;
pub mod mel;
pub mod stft;

pub use db::power_to_db;
pub use mel::MelFilterBank;
pub use stft::power_frames;

/// FFT window length in samples.
pub const N_FFT: usize = 2048;

/// Hop between successive analysis frames in samples.
pub const HOP_LENGTH: usize = 512;

/// Number of mel bands.
pub const N_MELS: usize = 128;

/// A mel-scaled spectrogram, band-major: `data[band * n_frames + frame]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MelSpectrogram {
    pub n_bands: usize,
    pub n_frames: usize,
    pub data: Vec<f32>,
}

impl MelSpectrogram {
    pub fn value(&self, band: usize, frame: usize) -> f32 {
        self.data[band * self.n_frames + frame]
    }
}

/// Compute the mel power spectrogram of a mono signal.
///
/// An empty signal yields a single all-zero frame so that downstream
/// scaling and rendering always have something to work with.
pub fn mel_spectrogram(samples: &[f32], sample_rate: u32) -> MelSpectrogram {
    let frames = power_frames(samples, N_FFT, HOP_LENGTH);
    let bank = MelFilterBank::new(sample_rate, N_FFT, N_MELS);

    let n_frames = frames.len();
    let mut data = vec![0.0f32; N_MELS * n_frames];
    for (frame_idx, power) in frames.iter().enumerate() {
        let mel = bank.apply(power);
        for (band, value) in mel.iter().enumerate() {
            data[band * n_frames + frame_idx] = *value;
        }
    }

    MelSpectrogram {
        n_bands: N_MELS,
        n_frames,
        data,
    }
}
