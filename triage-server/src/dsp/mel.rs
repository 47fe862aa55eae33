//! Mel filterbank construction and application.

/// Triangular mel filterbank over FFT power bins.
///
/// Uses the Slaney mel scale (linear below 1 kHz, logarithmic above) with
/// per-filter area normalization, spanning 0 Hz to Nyquist.
pub struct MelFilterBank {
    filters: Vec<Vec<(usize, f32)>>,
}

impl MelFilterBank {
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let sr = sample_rate.max(1) as f32;
        let nyquist = sr / 2.0;
        let n_bins = n_fft / 2 + 1;

        // n_mels + 2 equally spaced points on the mel scale.
        let mel_min = hz_to_mel(0.0);
        let mel_max = hz_to_mel(nyquist);
        let hz_points: Vec<f32> = (0..n_mels + 2)
            .map(|i| {
                let t = i as f32 / (n_mels + 1) as f32;
                mel_to_hz(mel_min + (mel_max - mel_min) * t)
            })
            .collect();

        let bin_hz = |bin: usize| bin as f32 * sr / n_fft as f32;

        let mut filters = Vec::with_capacity(n_mels);
        for m in 0..n_mels {
            let (lo, center, hi) = (hz_points[m], hz_points[m + 1], hz_points[m + 2]);
            // Slaney normalization keeps filter response independent of width.
            let norm = 2.0 / (hi - lo).max(f32::EPSILON);

            let mut weights = Vec::new();
            for bin in 0..n_bins {
                let f = bin_hz(bin);
                let rising = (f - lo) / (center - lo).max(f32::EPSILON);
                let falling = (hi - f) / (hi - center).max(f32::EPSILON);
                let w = rising.min(falling);
                if w > 0.0 {
                    weights.push((bin, w * norm));
                }
            }
            filters.push(weights);
        }

        Self { filters }
    }

    pub fn n_bands(&self) -> usize {
        self.filters.len()
    }

    /// Apply the filterbank to one frame of FFT power bins.
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|filter| {
                let mut sum = 0.0f64;
                for &(bin, weight) in filter {
                    let p = power.get(bin).copied().unwrap_or(0.0).max(0.0) as f64;
                    sum += p * weight as f64;
                }
                sum as f32
            })
            .collect()
    }
}

/// Slaney-scale Hz to mel conversion.
fn hz_to_mel(hz: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    if hz < MIN_LOG_HZ {
        hz / F_SP
    } else {
        let logstep = (6.4f32).ln() / 27.0;
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep
    }
}

/// Slaney-scale mel to Hz conversion.
fn mel_to_hz(mel: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    if mel < MIN_LOG_MEL {
        mel * F_SP
    } else {
        let logstep = (6.4f32).ln() / 27.0;
        MIN_LOG_HZ * ((mel - MIN_LOG_MEL) * logstep).exp()
    }
}
