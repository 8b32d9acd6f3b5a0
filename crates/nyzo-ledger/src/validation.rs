use tracing::debug;

use nyzo_crypto::verify;

use crate::error::InvalidTransaction;
use crate::transaction::{Transaction, TransactionType};

/// Smallest amount a post-genesis transaction may move, in µNyzos.
pub const MIN_AMOUNT: i64 = 1;

impl Transaction {
    /// Structural validation of a post-genesis transaction.
    ///
    /// Checks run in order and stop at the first failure: the type is seed
    /// or standard, the signature verifies over [`Transaction::signing_payload`],
    /// the amount is at least µ1, and the sender/recipient rule for the type
    /// holds.
    ///
    /// Balance sufficiency and whether `prev_hash` matches the chain are
    /// left to the ledger.
    pub fn validate(&self) -> Result<(), InvalidTransaction> {
        let result = self.check();
        if let Err(reason) = &result {
            debug!(
                tx_type = %self.tx_type,
                sender = %self.sender_id.short_hex(),
                %reason,
                "transaction rejected"
            );
        }
        result
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn check(&self) -> Result<(), InvalidTransaction> {
        if !matches!(self.tx_type, TransactionType::Seed | TransactionType::Standard) {
            return Err(InvalidTransaction::UnsupportedType);
        }
        if !verify(&self.sender_id, &self.signing_payload(), &self.sender_sig) {
            return Err(InvalidTransaction::BadSignature);
        }
        if self.amount < MIN_AMOUNT {
            return Err(InvalidTransaction::AmountTooSmall(self.amount));
        }
        match self.tx_type {
            TransactionType::Seed if self.sender_id != self.recipient_id => {
                Err(InvalidTransaction::SeedRecipientMismatch)
            }
            TransactionType::Standard if self.sender_id == self.recipient_id => {
                Err(InvalidTransaction::StandardSelfTransfer)
            }
            _ => Ok(()),
        }
    }
}
