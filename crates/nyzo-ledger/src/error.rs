/// Reasons a post-genesis transaction fails structural validation.
///
/// The `Display` text is the human-readable reason reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTransaction {
    #[error("only seed (1) and standard (2) transactions are valid after block 0")]
    UnsupportedType,

    #[error("signature is not valid")]
    BadSignature,

    #[error("transaction amount must be at least µ1, got {0}")]
    AmountTooSmall(i64),

    #[error("sender and recipient must match for a seed transaction")]
    SeedRecipientMismatch,

    #[error("sender and recipient must be different for a standard transaction")]
    StandardSelfTransfer,
}
