use thiserror::Error;

/// Malformed-input failures reported by record decoders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),

    #[error("unknown transaction type: {0}")]
    InvalidTransactionType(u8),

    #[error("cannot deserialize {0} blocks")]
    UnsupportedBlockCount(i16),

    #[error("unknown message type: {0}")]
    UnknownMessageType(u16),

    #[error("invalid {what} count: {count}")]
    InvalidCount { what: &'static str, count: i64 },
}

pub type CodecResult<T> = Result<T, CodecError>;
