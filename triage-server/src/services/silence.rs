//! Leading/trailing silence trimming.

/// Frames quieter than this many dB below the clip's peak are silence.
pub const TRIM_THRESHOLD_DB: f32 = 25.0;

/// RMS analysis frame length in samples.
const FRAME_LENGTH: usize = 2048;

/// Hop between RMS analysis frames in samples.
const HOP_LENGTH: usize = 512;

/// Trim leading and trailing near-silence from a signal.
///
/// The threshold is relative to the clip's own loudest frame, not an
/// absolute level, so quiet recordings keep their content. Returns an empty
/// slice when the whole clip sits below the threshold; callers must accept
/// a degenerate signal.
pub fn trim_edges(samples: &[f32]) -> &[f32] {
    if samples.is_empty() {
        return samples;
    }

    let rms: Vec<f32> = frame_starts(samples.len())
        .map(|start| {
            let end = (start + FRAME_LENGTH).min(samples.len());
            frame_rms(&samples[start..end])
        })
        .collect();

    let peak = rms.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return &samples[..0];
    }
    let threshold = peak * 10f32.powf(-TRIM_THRESHOLD_DB / 20.0);

    let first = rms.iter().position(|&r| r > threshold);
    let last = rms.iter().rposition(|&r| r > threshold);
    match (first, last) {
        (Some(first), Some(last)) => {
            let start = first * HOP_LENGTH;
            let end = (last * HOP_LENGTH + FRAME_LENGTH).min(samples.len());
            &samples[start..end]
        }
        _ => &samples[..0],
    }
}

fn frame_starts(len: usize) -> impl Iterator<Item = usize> {
    let n_frames = len / HOP_LENGTH + 1;
    (0..n_frames).map(|i| i * HOP_LENGTH).filter(move |&s| s < len)
}

fn frame_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = frame.iter().map(|s| s * s).sum();
    (sum_sq / frame.len() as f32).sqrt()
}
