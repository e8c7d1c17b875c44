//! Fast DCT and MDCT kernels.
//!
//! Every function here expects a power-of-two length and does not check it;
//! the encoder and decoder reject other sizes when they are built.

pub mod dct;
pub mod mdct;

pub use dct::{dct_ii, dct_iii};
pub use mdct::{imdct, mdct, vorbis_window, Mdct};
