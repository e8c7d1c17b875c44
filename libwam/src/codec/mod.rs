//! SMD0 frame codec: quantization, coefficient selection, encoder and decoder.

pub mod decoder;
pub mod encoder;
pub mod quantize;
pub mod selection;

pub use decoder::{decode_interleaved, Decoder, FrameInfo};
pub use encoder::{encode_planar, Encoder};
pub use selection::select_coefficients;
