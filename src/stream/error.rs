use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("channel count and frame length must both be at least 1")]
    InvalidGeometry,
    #[error("token {index} ({token:?}) is not a number")]
    BadToken { index: usize, token: String },
    #[error("{samples} samples do not form whole frames of {frame_samples}")]
    Framing { samples: usize, frame_samples: usize },
    #[error("payload contains no samples")]
    EmptyPayload,
    #[error("cannot rebase an empty time channel")]
    EmptyChannel,
}
