//! Pure decode layer: no I/O, everything testable in isolation.
pub mod decode;
pub mod error;
pub mod spectrum;
pub mod timebase;

pub use decode::{FrameDecoder, FrameGeometry};
pub use error::DecodeError;
pub use spectrum::PowerSpectrum;
pub use timebase::{normalize, MICROS_PER_MILLI};
