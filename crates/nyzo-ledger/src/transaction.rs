use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use nyzo_codec::{CodecError, CodecResult, Decode, Encode, WireReader, WireWriter};
use nyzo_crypto::{double_sha256, PrivateKey};
use nyzo_types::{Hash, PublicKey, Signature, Timestamp};

/// Longest sender data carried on the wire. Longer declared lengths are
/// clamped to this value when decoding.
pub const MAX_SENDER_DATA_LEN: usize = 32;

/// Encoded size of a coin-generation transaction (type, timestamp, amount,
/// recipient), the shortest transaction on the wire.
pub const COIN_GENERATION_LEN: usize = 1 + 8 + 8 + 32;

/// Fixed part of a seed or standard transaction: the coin-generation prefix
/// plus prev-hash height, sender, data length byte and signature.
const SIGNED_FIXED_LEN: usize = COIN_GENERATION_LEN + 8 + 32 + 1 + 64;

/// Transaction discriminant, the first byte on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    /// Mints new supply. Carries no sender fields and no signature.
    CoinGeneration = 0,
    /// Self-transfer: sender and recipient must match.
    Seed = 1,
    /// Ordinary transfer between two distinct accounts.
    Standard = 2,
}

impl TransactionType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::CoinGeneration),
            1 => Some(Self::Seed),
            2 => Some(Self::Standard),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CoinGeneration => "coin-generation",
            Self::Seed => "seed",
            Self::Standard => "standard",
        };
        f.write_str(name)
    }
}

/// A transfer of µNyzos.
///
/// Only `tx_type`, `timestamp`, `amount` and `recipient_id` exist for a
/// coin-generation transaction; its remaining fields keep their zero values
/// and are neither encoded nor decoded.
///
/// `prev_hash` is signed but never transmitted: the wire carries only
/// `prev_hash_height`, and a receiver must look the hash up itself before
/// the signature can verify. A decoded transaction has a zero `prev_hash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Creation time; milliseconds on the wire.
    pub timestamp: Timestamp,
    /// µNyzos moved to the recipient.
    pub amount: i64,
    pub recipient_id: PublicKey,
    /// Height of the block the sender anchored to.
    pub prev_hash_height: i64,
    /// Hash of that block. Signed, not transmitted.
    pub prev_hash: Hash,
    pub sender_id: PublicKey,
    /// Free-form memo, at most 32 bytes on the wire.
    #[serde(with = "nyzo_types::hex_bytes")]
    pub sender_data: Vec<u8>,
    pub sender_sig: Signature,
}

impl Transaction {
    fn unsigned(tx_type: TransactionType, amount: i64, recipient_id: PublicKey) -> Self {
        Self {
            tx_type,
            timestamp: Timestamp::now(),
            amount,
            recipient_id,
            prev_hash_height: 0,
            prev_hash: Hash::zero(),
            sender_id: PublicKey::zero(),
            sender_data: Vec::new(),
            sender_sig: Signature::zero(),
        }
    }

    /// A coin-generation transaction stamped with the current time.
    pub fn coin_generation(amount: i64, recipient_id: PublicKey) -> Self {
        Self::unsigned(TransactionType::CoinGeneration, amount, recipient_id)
    }

    /// An unsigned seed transaction paying `owner` from its own account.
    pub fn seed(amount: i64, owner: PublicKey, sender_data: &[u8]) -> Self {
        let mut tx = Self::unsigned(TransactionType::Seed, amount, owner);
        tx.sender_id = owner;
        tx.sender_data = truncate_sender_data(sender_data);
        tx
    }

    /// An unsigned standard transaction stamped with the current time.
    pub fn standard(amount: i64, recipient_id: PublicKey, sender_data: &[u8]) -> Self {
        let mut tx = Self::unsigned(TransactionType::Standard, amount, recipient_id);
        tx.sender_data = truncate_sender_data(sender_data);
        tx
    }

    /// Anchor the transaction to a previous block.
    pub fn with_previous_block(mut self, height: i64, hash: Hash) -> Self {
        self.prev_hash_height = height;
        self.prev_hash = hash;
        self
    }

    pub fn is_coin_generation(&self) -> bool {
        self.tx_type == TransactionType::CoinGeneration
    }

    /// The sender data as it goes on the wire, at most 32 bytes.
    pub fn wire_sender_data(&self) -> &[u8] {
        let len = self.sender_data.len().min(MAX_SENDER_DATA_LEN);
        &self.sender_data[..len]
    }

    /// Historical buffer size hint: `186 + len(sender_data)`.
    ///
    /// It counts the 32-byte previous hash, which the wire omits, so it is
    /// an upper bound. Use [`Encode::encoded_len`] for the exact size.
    pub fn declared_len(&self) -> usize {
        186 + self.wire_sender_data().len()
    }

    /// The bytes the sender signs.
    ///
    /// Differs from the wire encoding: `prev_hash` replaces
    /// `prev_hash_height`, the double SHA-256 of the sender data replaces
    /// the data and its length byte, and the signature is left out.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(1 + 8 + 8 + 32 + 32 + 32 + 32);
        w.put_u8(self.tx_type.as_u8());
        w.put_timestamp(self.timestamp);
        w.put_i64(self.amount);
        w.put_public_key(&self.recipient_id);
        w.put_hash(&self.prev_hash);
        w.put_public_key(&self.sender_id);
        w.put_hash(&double_sha256(self.wire_sender_data()));
        w.into_bytes()
    }

    /// Set the sender to the key's public key and sign.
    pub fn sign(&mut self, key: &PrivateKey) {
        self.sender_id = key.public_key();
        self.sender_sig = key.sign(&self.signing_payload());
    }

    /// Double SHA-256 of the full encoding, signature included.
    pub fn hash(&self) -> Hash {
        double_sha256(&self.to_bytes())
    }
}

fn truncate_sender_data(data: &[u8]) -> Vec<u8> {
    data[..data.len().min(MAX_SENDER_DATA_LEN)].to_vec()
}

impl Encode for Transaction {
    fn encode(&self, w: &mut WireWriter) {
        w.put_u8(self.tx_type.as_u8());
        w.put_timestamp(self.timestamp);
        w.put_i64(self.amount);
        w.put_public_key(&self.recipient_id);
        if self.is_coin_generation() {
            return;
        }
        let data = self.wire_sender_data();
        w.put_i64(self.prev_hash_height);
        w.put_public_key(&self.sender_id);
        w.put_u8(data.len() as u8);
        w.put_slice(data);
        w.put_signature(&self.sender_sig);
    }

    fn encoded_len(&self) -> usize {
        if self.is_coin_generation() {
            COIN_GENERATION_LEN
        } else {
            SIGNED_FIXED_LEN + self.wire_sender_data().len()
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(self.declared_len());
        self.encode(&mut w);
        w.into_bytes()
    }
}

impl Decode for Transaction {
    fn decode(r: &mut WireReader<'_>) -> CodecResult<Self> {
        let raw_type = r.read_u8()?;
        let tx_type =
            TransactionType::from_u8(raw_type).ok_or(CodecError::InvalidTransactionType(raw_type))?;
        let timestamp = r.read_timestamp()?;
        let amount = r.read_i64()?;
        let recipient_id = r.read_public_key()?;

        let mut tx = Self {
            tx_type,
            timestamp,
            amount,
            recipient_id,
            prev_hash_height: 0,
            prev_hash: Hash::zero(),
            sender_id: PublicKey::zero(),
            sender_data: Vec::new(),
            sender_sig: Signature::zero(),
        };
        if tx.is_coin_generation() {
            return Ok(tx);
        }

        tx.prev_hash_height = r.read_i64()?;
        tx.sender_id = r.read_public_key()?;

        // An oversized length byte is clamped rather than rejected; peers on
        // the historical format rely on it.
        let declared = r.read_u8()? as usize;
        if declared > MAX_SENDER_DATA_LEN {
            warn!(
                declared,
                max = MAX_SENDER_DATA_LEN,
                "sender data length clamped"
            );
        }
        let len = declared.min(MAX_SENDER_DATA_LEN);
        tx.sender_data = r.take(len)?.to_vec();
        tx.sender_sig = r.read_signature()?;
        Ok(tx)
    }
}
