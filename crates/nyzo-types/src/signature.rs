fixed_bytes!(
    /// 64-byte ed25519 signature.
    ///
    /// An unsigned record carries the zero signature.
    Signature,
    64
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unsigned() {
        assert!(Signature::default().is_zero());
        assert!(!Signature::from_bytes([1; 64]).is_zero());
    }

    #[test]
    fn serde_roundtrip() {
        let sig = Signature::from_bytes([0x5A; 64]);
        let json = serde_json::to_string(&sig).unwrap();
        let parsed: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, parsed);
    }

    #[test]
    fn serde_rejects_short_hex() {
        let json = format!("\"{}\"", "ab".repeat(32));
        assert!(serde_json::from_str::<Signature>(&json).is_err());
    }
}
