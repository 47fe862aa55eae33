//! In-memory audio decoding.
//!
//! Decodes an uploaded byte buffer to mono f32 PCM at the container's native
//! sample rate using symphonia (WAV, MP3, FLAC, OGG, AAC, ...). The buffer is
//! wrapped in a cursor so no temporary file is ever written.

use std::io::Cursor;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use thiserror::Error;

/// Audio decode errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized audio container.
    #[error("unrecognized audio format: {0}")]
    Format(symphonia::core::errors::Error),

    /// The container holds no decodable audio track.
    #[error("no audio track found")]
    NoAudioTrack,

    /// The track does not declare a sample rate.
    #[error("sample rate unknown")]
    UnknownSampleRate,

    /// The codec could not be instantiated for this track.
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(symphonia::core::errors::Error),

    /// A packet failed to decode.
    #[error("corrupt audio data: {0}")]
    Corrupt(symphonia::core::errors::Error),
}

/// Decoded audio signal.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Native sample rate in Hz. Carried unchanged through the pipeline.
    pub sample_rate: u32,
    /// Channel count before downmix.
    pub channels: usize,
}

impl DecodedAudio {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode an in-memory audio buffer to mono f32 PCM samples.
///
/// Multi-channel audio is averaged down to mono. No resampling is performed;
/// the decoder's native rate is returned alongside the samples.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(DecodeError::Format)?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::UnknownSampleRate)?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(DecodeError::UnsupportedCodec)?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(DecodeError::Corrupt(e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(DecodeError::Corrupt)?;
        downmix_into(&decoded, &mut samples);
    }

    tracing::debug!(
        total_samples = samples.len(),
        sample_rate,
        channels,
        "audio decoded"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Average all channels of a decoded buffer into mono f32 samples.
fn downmix_into(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => downmix_planes(buf, out),
        AudioBufferRef::U16(buf) => downmix_planes(buf, out),
        AudioBufferRef::U24(buf) => downmix_planes(buf, out),
        AudioBufferRef::U32(buf) => downmix_planes(buf, out),
        AudioBufferRef::S8(buf) => downmix_planes(buf, out),
        AudioBufferRef::S16(buf) => downmix_planes(buf, out),
        AudioBufferRef::S24(buf) => downmix_planes(buf, out),
        AudioBufferRef::S32(buf) => downmix_planes(buf, out),
        AudioBufferRef::F32(buf) => downmix_planes(buf, out),
        AudioBufferRef::F64(buf) => downmix_planes(buf, out),
    }
}

fn downmix_planes<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample,
    f32: FromSample<S>,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    out.reserve(frames);
    for frame in 0..frames {
        let mut sum = 0.0f32;
        for ch in 0..channels {
            sum += f32::from_sample(buf.chan(ch)[frame]);
        }
        out.push(sum / channels as f32);
    }
}
