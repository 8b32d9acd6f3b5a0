use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use nyzo_codec::{CodecError, CodecResult, Decode, Encode, WireReader, WireWriter};
use nyzo_crypto::{verify, PrivateKey};
use nyzo_types::{PublicKey, Signature, Timestamp};

use crate::message_type::MessageType;

/// Size of the big-endian `u32` that opens every serialized message.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Serialized size of a message with empty content: length prefix,
/// timestamp, type, sender and signature.
pub const EMPTY_MESSAGE_LEN: usize = LENGTH_PREFIX_LEN + 8 + 2 + PublicKey::LEN + Signature::LEN;

/// Sender and signature, the fixed tail after the content.
const TAIL_LEN: usize = PublicKey::LEN + Signature::LEN;

/// Signed envelope for everything peers exchange.
///
/// `content` is opaque here; its layout depends on `message_type` and is
/// interpreted elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Send time; milliseconds on the wire.
    pub timestamp: Timestamp,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Type-specific body, sized by the frame length.
    #[serde(with = "nyzo_types::hex_bytes")]
    pub content: Vec<u8>,
    /// Signer of the message.
    pub sender_id: PublicKey,
    /// ed25519 signature over [`Message::signing_payload`].
    pub signature: Signature,
    /// Address the message arrived from, set by the transport after
    /// decoding. Never serialized.
    #[serde(skip)]
    pub source_ip: Option<IpAddr>,
}

impl Message {
    /// An unsigned message stamped with the current time.
    pub fn new(message_type: MessageType, content: Vec<u8>) -> Self {
        Self {
            timestamp: Timestamp::now(),
            message_type,
            content,
            sender_id: PublicKey::zero(),
            signature: Signature::zero(),
            source_ip: None,
        }
    }

    /// Attach the transport-level source address.
    pub fn with_source_ip(mut self, ip: IpAddr) -> Self {
        self.source_ip = Some(ip);
        self
    }

    /// Total serialized size, length prefix included: `110 + len(content)`.
    pub fn serialized_len(&self) -> usize {
        EMPTY_MESSAGE_LEN + self.content.len()
    }

    /// timestamp-ms ‖ type ‖ content ‖ sender.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(self.serialized_len() - LENGTH_PREFIX_LEN);
        self.encode_unsigned(&mut w);
        w.into_bytes()
    }

    fn encode_unsigned(&self, w: &mut WireWriter) {
        w.put_timestamp(self.timestamp);
        w.put_u16(self.message_type.as_u16());
        w.put_slice(&self.content);
        w.put_public_key(&self.sender_id);
    }

    /// Set the sender to the key's public key and sign.
    pub fn sign(&mut self, key: &PrivateKey) {
        self.sender_id = key.public_key();
        self.signature = key.sign(&self.signing_payload());
    }

    pub fn verify(&self) -> bool {
        verify(&self.sender_id, &self.signing_payload(), &self.signature)
    }
}

impl Encode for Message {
    /// Length prefix, signing payload, signature.
    /// Content beyond `u32::MAX` cannot be framed; [`crate::MAX_FRAME_LEN`]
    /// keeps real messages far below it.
    fn encode(&self, w: &mut WireWriter) {
        debug_assert!(u32::try_from(self.serialized_len()).is_ok());
        w.put_u32(self.serialized_len() as u32);
        self.encode_unsigned(w);
        w.put_signature(&self.signature);
    }

    fn encoded_len(&self) -> usize {
        self.serialized_len()
    }
}

impl Decode for Message {
    /// Reads a message body. The input starts immediately after the 4-byte
    /// length prefix, which the caller has already consumed (see
    /// [`crate::MessageFrame`]), so `from_bytes(&msg.to_bytes()[4..])` is the
    /// inverse of encoding.
    ///
    /// The content has no length of its own: it is everything between the
    /// type field and the 96-byte sender and signature tail, so a message
    /// always extends to the end of the reader.
    fn decode(r: &mut WireReader<'_>) -> CodecResult<Self> {
        let timestamp = r.read_timestamp()?;
        let raw_type = r.read_u16()?;
        let message_type =
            MessageType::from_u16(raw_type).ok_or(CodecError::UnknownMessageType(raw_type))?;

        let remaining = r.remaining();
        let content_len = remaining
            .checked_sub(TAIL_LEN)
            .ok_or(CodecError::UnexpectedEof {
                needed: TAIL_LEN,
                remaining,
            })?;
        let content = r.take(content_len)?.to_vec();
        let sender_id = r.read_public_key()?;
        let signature = r.read_signature()?;

        debug!(
            message_type = %message_type,
            content_len,
            sender = %sender_id.short_hex(),
            "decoded message"
        );
        Ok(Self {
            timestamp,
            message_type,
            content,
            sender_id,
            signature,
            source_ip: None,
        })
    }
}
