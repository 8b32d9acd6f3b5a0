use serde::{Deserialize, Serialize};
use tracing::debug;

use nyzo_codec::{CodecError, CodecResult, Decode, Encode, WireReader, WireWriter};
use nyzo_crypto::{double_sha256, verify, PrivateKey};
use nyzo_types::{Hash, PublicKey, Signature, Timestamp};

use crate::balance_list::BalanceList;
use crate::transaction::{Transaction, COIN_GENERATION_LEN};

/// Everything in a block besides its transactions and signature: height,
/// previous hash, both timestamps, transaction count, balance list hash and
/// verifier.
const HEADER_LEN: usize = 8 + 32 + 8 + 8 + 4 + 32 + 32;

/// The only block count a bundle may carry today.
const SUPPORTED_BLOCK_COUNT: i16 = 1;

/// A block as signed by its verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: i64,
    /// Hash of the block at `height - 1`.
    pub prev_block_hash: Hash,
    /// Opening of the block's time window.
    pub start_timestamp: Timestamp,
    /// When the verifier produced the block.
    pub verification_timestamp: Timestamp,
    /// Embedded in full, signatures included.
    pub transactions: Vec<Transaction>,
    /// Hash of the balance list after applying this block.
    pub balancelist_hash: Hash,
    pub verifier_id: PublicKey,
    pub verifier_sig: Signature,
}

impl Block {
    /// An unsigned, empty block.
    pub fn new(
        height: i64,
        start_timestamp: Timestamp,
        prev_block_hash: Hash,
        balancelist_hash: Hash,
    ) -> Self {
        Self {
            height,
            prev_block_hash,
            start_timestamp,
            verification_timestamp: Timestamp::zero(),
            transactions: Vec::new(),
            balancelist_hash,
            verifier_id: PublicKey::zero(),
            verifier_sig: Signature::zero(),
        }
    }

    /// Everything [`Encode::encode`] writes except the trailing signature.
    /// Transactions are embedded in full, signatures included.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut w = WireWriter::with_capacity(self.size());
        self.encode_unsigned(&mut w);
        w.into_bytes()
    }

    fn encode_unsigned(&self, w: &mut WireWriter) {
        w.put_i64(self.height);
        w.put_hash(&self.prev_block_hash);
        w.put_timestamp(self.start_timestamp);
        w.put_timestamp(self.verification_timestamp);
        // The count field is an i32; no real block comes near that.
        debug_assert!(i32::try_from(self.transactions.len()).is_ok());
        w.put_i32(self.transactions.len() as i32);
        for tx in &self.transactions {
            tx.encode(w);
        }
        w.put_hash(&self.balancelist_hash);
        w.put_public_key(&self.verifier_id);
    }

    /// Set the verifier to the key's public key and sign.
    pub fn sign(&mut self, key: &PrivateKey) {
        self.verifier_id = key.public_key();
        self.verifier_sig = key.sign(&self.signing_payload());
    }

    pub fn verify_signature(&self) -> bool {
        verify(&self.verifier_id, &self.signing_payload(), &self.verifier_sig)
    }

    /// Double SHA-256 of the verifier signature alone.
    ///
    /// Blocks link to their predecessor through this value, so it must not
    /// cover the rest of the block.
    pub fn hash(&self) -> Hash {
        double_sha256(self.verifier_sig.as_bytes())
    }

    /// Buffer size for this block: the signing payload, plus the signature
    /// once one is present.
    ///
    /// Transactions count at their exact encoded length, not the larger
    /// [`Transaction::declared_len`] hint.
    pub fn size(&self) -> usize {
        let body = HEADER_LEN + self.transactions.iter().map(Encode::encoded_len).sum::<usize>();
        if self.verifier_sig.is_zero() {
            body
        } else {
            body + Signature::LEN
        }
    }

    /// `height - 1`, wrapping for a hostile `i64::MIN` height.
    pub fn prev_height(&self) -> i64 {
        self.height.wrapping_sub(1)
    }
}

impl Encode for Block {
    /// Signing payload followed by the verifier signature.
    fn encode(&self, w: &mut WireWriter) {
        self.encode_unsigned(w);
        w.put_signature(&self.verifier_sig);
    }

    fn encoded_len(&self) -> usize {
        HEADER_LEN
            + self.transactions.iter().map(Encode::encoded_len).sum::<usize>()
            + Signature::LEN
    }
}

impl Decode for Block {
    /// One block body, the inverse of [`Encode::encode`]. Use
    /// [`BlockBundle`] for the count-prefixed form peers exchange.
    fn decode(r: &mut WireReader<'_>) -> CodecResult<Self> {
        let height = r.read_i64()?;
        let prev_block_hash = r.read_hash()?;
        let start_timestamp = r.read_timestamp()?;
        let verification_timestamp = r.read_timestamp()?;

        let raw_count = r.read_i32()?;
        let tx_count = r.check_count("transaction", raw_count.into(), COIN_GENERATION_LEN)?;
        let mut transactions = Vec::with_capacity(tx_count);
        for _ in 0..tx_count {
            transactions.push(Transaction::decode(r)?);
        }

        let block = Self {
            height,
            prev_block_hash,
            start_timestamp,
            verification_timestamp,
            transactions,
            balancelist_hash: r.read_hash()?,
            verifier_id: r.read_public_key()?,
            verifier_sig: r.read_signature()?,
        };
        debug!(
            height,
            transactions = tx_count,
            verifier = %block.verifier_id.short_hex(),
            "decoded block"
        );
        Ok(block)
    }
}

/// A block together with the balance list that followed it on the wire.
///
/// This is the form a peer sends in a block response: a 16-bit block count
/// (only `1` is supported), the block, then the balance list at the
/// block's height filling the rest of the buffer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBundle {
    pub block: Block,
    pub balance_list: Option<BalanceList>,
}

impl BlockBundle {
    pub fn new(block: Block, balance_list: Option<BalanceList>) -> Self {
        Self {
            block,
            balance_list,
        }
    }

    /// Whether the carried balance list hashes to the block's
    /// `balancelist_hash`. `None` when no list was carried.
    ///
    /// Decoding never runs this check; it is left to the ledger.
    pub fn balance_list_matches(&self) -> Option<bool> {
        self.balance_list
            .as_ref()
            .map(|list| list.hash() == self.block.balancelist_hash)
    }
}

impl Encode for BlockBundle {
    fn encode(&self, w: &mut WireWriter) {
        w.put_i16(SUPPORTED_BLOCK_COUNT);
        self.block.encode(w);
        if let Some(list) = &self.balance_list {
            list.encode(w);
        }
    }

    fn encoded_len(&self) -> usize {
        2 + self.block.encoded_len()
            + self.balance_list.as_ref().map_or(0, Encode::encoded_len)
    }
}

impl Decode for BlockBundle {
    /// Reads the block count, one block, then a balance list from whatever
    /// remains. The list is `None` only when nothing remains.
    fn decode(r: &mut WireReader<'_>) -> CodecResult<Self> {
        let count = r.read_i16()?;
        if count != SUPPORTED_BLOCK_COUNT {
            return Err(CodecError::UnsupportedBlockCount(count));
        }
        let block = Block::decode(r)?;
        let balance_list = if r.is_empty() {
            None
        } else {
            Some(BalanceList::decode(r)?)
        };
        Ok(Self {
            block,
            balance_list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance_list::BalanceListItem;
    use nyzo_types::MAX_EXACT_MILLIS;
    use proptest::prelude::*;

    fn verifier() -> PrivateKey {
        PrivateKey::from_seed([0x33; 32])
    }

    fn transfer(amount: i64) -> Transaction {
        let mut tx = Transaction::standard(amount, PublicKey::from_bytes([0x44; 32]), b"hi");
        tx.timestamp = Timestamp::from_millis(1_600_000_000_500);
        tx.sign(&PrivateKey::from_seed([0x55; 32]));
        tx
    }

    fn balance_list() -> BalanceList {
        BalanceList {
            height: 7,
            rollover_fees: 1,
            prev_verifiers: (0..7).map(|i| PublicKey::from_bytes([i; 32])).collect(),
            items: vec![BalanceListItem::new(PublicKey::from_bytes([0x44; 32]), 100, 0)],
        }
    }

    fn signed_block() -> Block {
        let list = balance_list();
        let mut block = Block::new(
            7,
            Timestamp::from_millis(1_600_000_000_000),
            Hash::from_bytes([0x66; 32]),
            list.hash(),
        );
        block.verification_timestamp = Timestamp::from_millis(1_600_000_007_000);
        let mut coin = Transaction::coin_generation(5, PublicKey::from_bytes([1; 32]));
        coin.timestamp = Timestamp::from_millis(1_600_000_000_001);
        block.transactions = vec![coin, transfer(100), transfer(200)];
        block.sign(&verifier());
        block
    }

    #[test]
    fn sign_and_verify() {
        let mut block = signed_block();
        assert_eq!(block.verifier_id, verifier().public_key());
        assert!(block.verify_signature());

        block.transactions.pop();
        assert!(!block.verify_signature());
    }

    #[test]
    fn body_roundtrip() {
        let block = signed_block();
        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), block.encoded_len());
        let decoded = Block::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, block);
        assert!(decoded.verify_signature());
    }

    #[test]
    fn serialize_is_payload_then_signature() {
        let block = signed_block();
        let bytes = block.to_bytes();
        let payload = block.signing_payload();
        assert_eq!(&bytes[..payload.len()], payload.as_slice());
        assert_eq!(&bytes[payload.len()..], block.verifier_sig.as_bytes());
    }

    #[test]
    fn size_tracks_signature_presence() {
        let mut block = signed_block();
        assert_eq!(block.size(), block.to_bytes().len());

        block.verifier_sig = Signature::zero();
        assert_eq!(block.size(), block.signing_payload().len());
        assert_eq!(Block::new(0, Timestamp::zero(), Hash::zero(), Hash::zero()).size(), 124);
    }

    #[test]
    fn hash_depends_only_on_signature() {
        let a = signed_block();
        let mut b = a.clone();
        b.transactions.clear();
        b.height = 99;
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash(), double_sha256(a.verifier_sig.as_bytes()));

        b.verifier_sig = Signature::from_bytes([7; 64]);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn prev_height() {
        assert_eq!(signed_block().prev_height(), 6);
    }

    #[test]
    fn prev_height_of_minimum_height_wraps() {
        let mut block = Block::new(i64::MIN, Timestamp::zero(), Hash::zero(), Hash::zero());
        block.sign(&verifier());
        let decoded = Block::from_bytes(&block.to_bytes()).unwrap();
        assert_eq!(decoded.height, i64::MIN);
        assert_eq!(decoded.prev_height(), i64::MAX);
    }

    #[test]
    fn many_coin_generations_roundtrip() {
        let mut block = Block::new(
            3,
            Timestamp::from_millis(1_600_000_000_000),
            Hash::zero(),
            Hash::zero(),
        );
        block.transactions = (0..20u8)
            .map(|i| {
                let mut tx = Transaction::coin_generation(i as i64 + 1, PublicKey::from_bytes([i; 32]));
                tx.timestamp = Timestamp::from_millis(1_600_000_000_000 + i as i64);
                tx
            })
            .collect();
        block.sign(&verifier());

        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), 124 + 20 * COIN_GENERATION_LEN + 64);
        let decoded = Block::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, block);
        assert!(decoded.verify_signature());
    }

    #[test]
    fn bundle_roundtrip_with_balance_list() {
        let bundle = BlockBundle::new(signed_block(), Some(balance_list()));
        let bytes = bundle.to_bytes();
        assert_eq!(&bytes[..2], &[0, 1]);
        assert_eq!(bytes.len(), bundle.encoded_len());
        let decoded = BlockBundle::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, bundle);
        assert_eq!(decoded.balance_list_matches(), Some(true));
    }

    #[test]
    fn bundle_without_balance_list() {
        let bundle = BlockBundle::new(signed_block(), None);
        let decoded = BlockBundle::from_bytes(&bundle.to_bytes()).unwrap();
        assert_eq!(decoded.balance_list, None);
        assert_eq!(decoded.balance_list_matches(), None);
    }

    #[test]
    fn mismatched_balance_list_is_reported_not_rejected() {
        let mut list = balance_list();
        list.rollover_fees = 2;
        let bundle = BlockBundle::new(signed_block(), Some(list));
        let decoded = BlockBundle::from_bytes(&bundle.to_bytes()).unwrap();
        assert_eq!(decoded.balance_list_matches(), Some(false));
    }

    #[test]
    fn block_count_must_be_one() {
        let mut bytes = BlockBundle::new(signed_block(), None).to_bytes();
        for count in [0i16, 2, -1] {
            bytes[..2].copy_from_slice(&count.to_be_bytes());
            assert_eq!(
                BlockBundle::from_bytes(&bytes).unwrap_err(),
                CodecError::UnsupportedBlockCount(count)
            );
        }
    }

    #[test]
    fn bad_embedded_transaction_fails_block() {
        let block = signed_block();
        let mut bytes = block.to_bytes();
        // First transaction type byte sits right after the fixed header fields.
        bytes[8 + 32 + 8 + 8 + 4] = 9;
        assert_eq!(
            Block::from_bytes(&bytes).unwrap_err(),
            CodecError::InvalidTransactionType(9)
        );
    }

    #[test]
    fn negative_transaction_count_is_rejected() {
        let mut bytes = signed_block().to_bytes();
        bytes[56..60].copy_from_slice(&(-3i32).to_be_bytes());
        assert!(matches!(
            Block::from_bytes(&bytes),
            Err(CodecError::InvalidCount { count: -3, .. })
        ));
    }

    #[test]
    fn timestamps_floor_to_millis() {
        let mut block = signed_block();
        block.start_timestamp = Timestamp::from_nanos(1_600_000_000_000_123_456);
        let decoded = Block::from_bytes(&block.to_bytes()).unwrap();
        assert_eq!(decoded.start_timestamp, block.start_timestamp.truncated_to_millis());
    }

    proptest! {
        #[test]
        fn bundle_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..600)) {
            let _ = BlockBundle::from_bytes(&bytes);
        }

        #[test]
        fn body_roundtrip_any_header(
            height in any::<i64>(),
            start_ms in -MAX_EXACT_MILLIS..=MAX_EXACT_MILLIS,
            verification_ms in -MAX_EXACT_MILLIS..=MAX_EXACT_MILLIS,
            prev in any::<[u8; 32]>(),
            list_hash in any::<[u8; 32]>(),
        ) {
            let mut block = Block::new(
                height,
                Timestamp::from_millis(start_ms),
                Hash::from_bytes(prev),
                Hash::from_bytes(list_hash),
            );
            block.verification_timestamp = Timestamp::from_millis(verification_ms);
            block.sign(&verifier());
            prop_assert_eq!(Block::from_bytes(&block.to_bytes()).unwrap(), block);
        }
    }
}
