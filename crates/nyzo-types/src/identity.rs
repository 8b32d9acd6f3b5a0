fixed_bytes!(
    /// ed25519 public key identifying a node, verifier or wallet.
    ///
    /// On the wire a public key is its raw 32 bytes; there is no separate
    /// address derivation in this protocol.
    PublicKey,
    32
);

impl PublicKey {
    /// Hex split into four dash-separated groups of 16 characters.
    pub fn to_dashed_hex(&self) -> String {
        let h = self.to_hex();
        format!("{}-{}-{}-{}", &h[..16], &h[16..32], &h[32..48], &h[48..])
    }

    /// First and last four hex characters, e.g. `abcd...7890`.
    pub fn compact_hex(&self) -> String {
        let h = self.to_hex();
        format!("{}...{}", &h[..4], &h[60..])
    }
}
