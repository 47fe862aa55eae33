//! Audio decoding.

pub mod decoder;

pub use decoder::{decode_bytes, DecodeError, DecodedAudio};
