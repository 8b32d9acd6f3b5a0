//! Ledger records for the Nyzo record layer.
//!
//! This crate defines the byte-exact encodings that travel between peers and
//! land in the ledger:
//! - [`Transaction`] with its signing payload and structural validation
//! - [`BalanceList`], the per-height snapshot of account balances
//! - [`Block`], signed by its verifier, and [`BlockBundle`], the
//!   block-plus-balance-list form a peer sends in a block response
//!
//! Encoding goes through [`nyzo_codec::Encode`] / [`nyzo_codec::Decode`],
//! which are re-exported here. Nothing in this crate checks balances,
//! resolves previous-block hashes or touches storage.

pub mod balance_list;
pub mod block;
pub mod error;
pub mod transaction;
pub mod validation;

pub use balance_list::{expected_prev_verifiers, BalanceList, BalanceListItem, MAX_PREV_VERIFIERS};
pub use block::{Block, BlockBundle};
pub use error::InvalidTransaction;
pub use nyzo_codec::{CodecError, CodecResult, Decode, Encode};
pub use transaction::{Transaction, TransactionType, COIN_GENERATION_LEN, MAX_SENDER_DATA_LEN};
pub use validation::MIN_AMOUNT;
