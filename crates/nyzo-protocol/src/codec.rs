use tracing::debug;

use nyzo_codec::{Decode, Encode};

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{Message, EMPTY_MESSAGE_LEN, LENGTH_PREFIX_LEN};

/// Largest frame accepted from a peer.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Length-prefixed framing for [`Message`] over an already received buffer.
///
/// The prefix is a big-endian `u32` holding the total frame length,
/// itself included. Reading from and writing to sockets is left to the
/// transport.
pub struct MessageFrame;

impl MessageFrame {
    /// Encode a message with its length prefix.
    pub fn encode(msg: &Message) -> Vec<u8> {
        msg.to_bytes()
    }

    /// Total frame length declared by the prefix at the start of `data`, or
    /// `None` if fewer than four bytes are available.
    pub fn peek_len(data: &[u8]) -> Option<usize> {
        let prefix: [u8; LENGTH_PREFIX_LEN] = data.get(..LENGTH_PREFIX_LEN)?.try_into().ok()?;
        Some(u32::from_be_bytes(prefix) as usize)
    }

    /// Decode the frame at the start of `data`. Returns (message,
    /// bytes_consumed); anything after the frame is left for the next call.
    pub fn decode(data: &[u8]) -> ProtocolResult<(Message, usize)> {
        let len = Self::peek_len(data).ok_or_else(|| ProtocolError::Framing("too short".into()))?;
        if len < EMPTY_MESSAGE_LEN {
            return Err(ProtocolError::Framing(format!(
                "declared length {len} below minimum {EMPTY_MESSAGE_LEN}"
            )));
        }
        if len > MAX_FRAME_LEN {
            return Err(ProtocolError::FrameTooLarge {
                size: len,
                max: MAX_FRAME_LEN,
            });
        }
        if data.len() < len {
            return Err(ProtocolError::Framing(format!(
                "incomplete: have {}, need {}",
                data.len(),
                len
            )));
        }

        let msg = Message::from_bytes(&data[LENGTH_PREFIX_LEN..len])?;
        debug!(len, message_type = %msg.message_type, "decoded frame");
        Ok((msg, len))
    }
}
