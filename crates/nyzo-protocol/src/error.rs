use thiserror::Error;

use nyzo_codec::CodecError;

/// Failures reading a framed peer message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("framing error: {0}")]
    Framing(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
