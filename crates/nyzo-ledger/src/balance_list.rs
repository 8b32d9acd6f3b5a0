use serde::{Deserialize, Serialize};
use tracing::debug;

use nyzo_codec::{CodecResult, Decode, Encode, WireReader, WireWriter};
use nyzo_crypto::double_sha256;
use nyzo_types::{Hash, PublicKey};

/// Number of previous verifiers a balance list carries once the chain is
/// at least this tall.
pub const MAX_PREV_VERIFIERS: usize = 9;

/// height + rollover fees + item count.
const FIXED_LEN: usize = 8 + 1 + 4;

/// One account in a balance list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceListItem {
    pub id: PublicKey,
    /// µNyzos held.
    pub balance: i64,
    /// Blocks left before the next account maintenance fee.
    pub blocks_until_fee: i16,
}

impl BalanceListItem {
    pub const ENCODED_LEN: usize = 32 + 8 + 2;

    pub fn new(id: PublicKey, balance: i64, blocks_until_fee: i16) -> Self {
        Self {
            id,
            balance,
            blocks_until_fee,
        }
    }
}

impl Encode for BalanceListItem {
    fn encode(&self, w: &mut WireWriter) {
        w.put_public_key(&self.id);
        w.put_i64(self.balance);
        w.put_i16(self.blocks_until_fee);
    }

    fn encoded_len(&self) -> usize {
        Self::ENCODED_LEN
    }
}

impl Decode for BalanceListItem {
    fn decode(r: &mut WireReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            id: r.read_public_key()?,
            balance: r.read_i64()?,
            blocks_until_fee: r.read_i16()?,
        })
    }
}

/// Snapshot of every account balance and fee countdown at one height.
///
/// Item ids are not required to be unique here; that is a ledger concern.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceList {
    /// Height of the block this list follows.
    pub height: i64,
    /// Fees carried over to the next block.
    pub rollover_fees: u8,
    /// Verifiers of the preceding blocks, [`expected_prev_verifiers`] of them.
    pub prev_verifiers: Vec<PublicKey>,
    pub items: Vec<BalanceListItem>,
}

/// How many previous verifiers a list at `height` carries: `min(9, height)`,
/// and none for a negative height.
///
/// The chain's first blocks had fewer than nine predecessors, so short
/// lists near genesis are expected rather than malformed.
pub fn expected_prev_verifiers(height: i64) -> usize {
    height.clamp(0, MAX_PREV_VERIFIERS as i64) as usize
}

impl BalanceList {
    pub fn new(height: i64) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    /// Double SHA-256 of the encoded list, the value a block commits to
    /// in its balance list hash.
    pub fn hash(&self) -> Hash {
        double_sha256(&self.to_bytes())
    }

    /// Sum of all item balances, saturating.
    pub fn total_balance(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.balance))
    }
}

impl Encode for BalanceList {
    /// Writes every entry of `prev_verifiers` as given. A list whose
    /// verifier count disagrees with its height encodes, but will not decode
    /// back to the same value.
    fn encode(&self, w: &mut WireWriter) {
        w.put_i64(self.height);
        w.put_u8(self.rollover_fees);
        for verifier in &self.prev_verifiers {
            w.put_public_key(verifier);
        }
        debug_assert!(i32::try_from(self.items.len()).is_ok());
        w.put_i32(self.items.len() as i32);
        for item in &self.items {
            item.encode(w);
        }
    }

    fn encoded_len(&self) -> usize {
        FIXED_LEN
            + PublicKey::LEN * self.prev_verifiers.len()
            + BalanceListItem::ENCODED_LEN * self.items.len()
    }
}

impl Decode for BalanceList {
    fn decode(r: &mut WireReader<'_>) -> CodecResult<Self> {
        let height = r.read_i64()?;
        let rollover_fees = r.read_u8()?;

        let verifier_count = expected_prev_verifiers(height);
        let mut prev_verifiers = Vec::with_capacity(verifier_count);
        for _ in 0..verifier_count {
            prev_verifiers.push(r.read_public_key()?);
        }

        let raw_count = r.read_i32()?;
        let item_count =
            r.check_count("balance list item", raw_count.into(), BalanceListItem::ENCODED_LEN)?;
        let mut items = Vec::with_capacity(item_count);
        for _ in 0..item_count {
            items.push(BalanceListItem::decode(r)?);
        }

        debug!(height, verifiers = verifier_count, items = item_count, "decoded balance list");
        Ok(Self {
            height,
            rollover_fees,
            prev_verifiers,
            items,
        })
    }
}
