//! In-memory WAV fixture generation.

use std::io::Cursor;

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub amplitude: f32,
    pub frequency: f32,
    /// Seconds of silence prepended and appended to the tone.
    pub edge_silence_seconds: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 1.0,
            sample_rate: 22050,
            channels: 1,
            amplitude: 0.4,
            frequency: 440.0,
            edge_silence_seconds: 0.0,
        }
    }
}

/// Generate a WAV byte buffer with the given configuration.
pub fn generate_wav(config: &AudioConfig) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let tone_samples = (config.duration_seconds * config.sample_rate as f64) as usize;
    let silence_samples = (config.edge_silence_seconds * config.sample_rate as f64) as usize;

    let mut bytes = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();

        let mut write_frame = |sample: i16| {
            for _ in 0..config.channels {
                writer.write_sample(sample).unwrap();
            }
        };

        for _ in 0..silence_samples {
            write_frame(0);
        }
        for i in 0..tone_samples {
            let t = i as f32 / config.sample_rate as f32;
            let value = config.amplitude
                * (2.0 * std::f32::consts::PI * config.frequency * t).sin();
            write_frame((value * i16::MAX as f32) as i16);
        }
        for _ in 0..silence_samples {
            write_frame(0);
        }

        writer.finalize().unwrap();
    }
    bytes
}

/// One second of a 440 Hz mono tone.
pub fn tone_wav() -> Vec<u8> {
    generate_wav(&AudioConfig::default())
}

/// One second of digital silence.
pub fn silent_wav() -> Vec<u8> {
    generate_wav(&AudioConfig {
        amplitude: 0.0,
        ..AudioConfig::default()
    })
}
