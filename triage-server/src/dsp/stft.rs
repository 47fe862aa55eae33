//! Short-time Fourier transform with Hann windowing.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Compute power spectra (bins 0..=Nyquist) for centered, Hann-windowed
/// frames of `samples`.
///
/// Frames are centered: the signal is reflect-padded by `n_fft / 2` on both
/// sides, so frame `i` is centered on sample `i * hop`. The frame count is
/// `1 + len / hop`. An empty signal yields one all-zero frame.
pub fn power_frames(samples: &[f32], n_fft: usize, hop: usize) -> Vec<Vec<f32>> {
    let n_bins = n_fft / 2 + 1;
    if samples.is_empty() {
        return vec![vec![0.0; n_bins]];
    }

    let pad = n_fft / 2;
    let padded = reflect_pad(samples, pad);
    let window = hann_window(n_fft);

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);

    let n_frames = 1 + samples.len() / hop;
    let mut frames = Vec::with_capacity(n_frames);
    let mut buf = vec![Complex::new(0.0f32, 0.0); n_fft];

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop;
        for (i, cell) in buf.iter_mut().enumerate() {
            let sample = padded.get(start + i).copied().unwrap_or(0.0);
            *cell = Complex::new(sanitize(sample) * window[i], 0.0);
        }
        fft.process(&mut buf);

        let mut power = Vec::with_capacity(n_bins);
        for bin in buf.iter().take(n_bins) {
            power.push((bin.re * bin.re + bin.im * bin.im).max(0.0));
        }
        frames.push(power);
    }

    frames
}

/// Periodic Hann window of length `n`.
pub fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let phase = 2.0 * std::f32::consts::PI * i as f32 / n as f32;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// Pad `samples` with `pad` reflected samples on both sides.
///
/// Reflection excludes the edge sample itself. Signals shorter than the pad
/// clamp the reflected index instead of failing.
fn reflect_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let n = samples.len();
    let mut padded = Vec::with_capacity(n + 2 * pad);
    for i in 0..pad {
        let idx = (pad - i).min(n - 1);
        padded.push(samples[idx]);
    }
    padded.extend_from_slice(samples);
    for i in 0..pad {
        let idx = n.saturating_sub(2 + i).min(n - 1);
        padded.push(samples[idx]);
    }
    padded
}

fn sanitize(sample: f32) -> f32 {
    if sample.is_finite() {
        sample.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
