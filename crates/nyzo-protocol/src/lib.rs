//! Peer message envelope for the Nyzo record layer.
//!
//! Every message peers exchange is a [`Message`]: a timestamp, a
//! [`MessageType`] discriminant, opaque content and the sender's ed25519
//! signature. Content is never interpreted here.
//!
//! [`MessageFrame`] handles the length prefix on an in-memory buffer;
//! socket I/O belongs to the transport.

pub mod codec;
pub mod error;
pub mod message;
pub mod message_type;

pub use codec::{MessageFrame, MAX_FRAME_LEN};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{Message, EMPTY_MESSAGE_LEN, LENGTH_PREFIX_LEN};
pub use message_type::MessageType;
