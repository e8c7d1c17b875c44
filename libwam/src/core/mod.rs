pub mod audio_constants;
pub mod error;
pub mod layout;
pub mod nibble;
pub mod types;

pub use audio_constants::*;
pub use error::{WamError, WamResult};
pub use layout::FrameLayout;
pub use types::*;
