fixed_bytes!(
    /// 32-byte digest produced by double SHA-256.
    ///
    /// Block hashes, transaction hashes and balance-list hashes all share this
    /// type. The zero hash stands in for "no previous block" at genesis.
    Hash,
    32
);
