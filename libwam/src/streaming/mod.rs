//! incremental encode/decode for interleaved audio
//!
//! the encoder takes pushes of any size (recorders, workers), the decoder
//! fills device-sized interleaved buffers
mod decoder;
mod encoder;

pub use decoder::StreamingDecoder;
pub use encoder::{encode_interleaved, StreamingEncoder};
