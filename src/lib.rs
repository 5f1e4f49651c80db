//! Live acquisition and spectral display for a serial ADC data logger.
//!
//! The logger streams fixed-geometry frames of comma-separated samples per
//! acquisition window. Each cycle is synchronized with a one-byte
//! handshake, decoded into per-channel series, and rendered as a time
//! trace plus the power spectrum of the data channel.
pub mod dataset;
pub mod live;
pub mod plot;
pub mod session;
pub mod sim;
pub mod stream;
pub mod transport;

pub use dataset::{CollisionPolicy, Dataset, DatasetStore};
pub use live::{interrupt_flag, run_live, CancelFlag, TimeTrace, TraceView};
pub use plot::{PlotStyle, SnapshotView};
pub use session::{AcquisitionConfig, AcquisitionSession, HandshakePolicy};
pub use sim::SimSettings;
pub use stream::{DecodeError, FrameDecoder, FrameGeometry, PowerSpectrum};
pub use transport::{Connect, Link, SerialSettings};
