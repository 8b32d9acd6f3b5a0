use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use nyzo_types::{PublicKey, Signature, TypeError};

/// ed25519 private key: 32-byte seed followed by the 32-byte public key.
///
/// The public half acts as a cache. A key built from a bare seed leaves it
/// zeroed and [`PrivateKey::public_key`] derives the value on demand; a key
/// whose public half is non-zero returns that half verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey([u8; 64]);

impl PrivateKey {
    /// Generate a new key from the operating system's CSPRNG.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self::from_seed(seed).with_public_key()
    }

    /// Create from a 32-byte seed. The public half stays zero until derived.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&seed);
        Self(bytes)
    }

    /// Create from the full 64-byte representation, public half as given.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parse a hex seed (64 characters) or a full key (128 characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s.trim()).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        match bytes.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                Ok(Self::from_seed(seed))
            }
            64 => {
                let mut full = [0u8; 64];
                full.copy_from_slice(&bytes);
                Ok(Self(full))
            }
            actual => Err(TypeError::InvalidLength {
                expected: 32,
                actual,
            }),
        }
    }

    /// The 32-byte seed.
    pub fn seed(&self) -> [u8; 32] {
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&self.0[..32]);
        seed
    }

    /// Raw 64-byte representation.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }

    /// Hex of the seed only. The public half is never exported.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0[..32])
    }

    /// The public key: the cached half when present, otherwise derived.
    pub fn public_key(&self) -> PublicKey {
        let cached = &self.0[32..];
        if cached.iter().any(|b| *b != 0) {
            let mut out = [0u8; 32];
            out.copy_from_slice(cached);
            return PublicKey::from_bytes(out);
        }
        self.derive_public_key()
    }

    /// A copy of this key with the public half filled in.
    pub fn with_public_key(mut self) -> Self {
        let public = self.public_key();
        self.0[32..].copy_from_slice(public.as_bytes());
        self
    }

    /// Deterministic ed25519 signature over exactly `message`.
    ///
    /// The signing key is always expanded from the seed, so a stale or
    /// zeroed public half cannot produce an unverifiable signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from_bytes(self.signing_key().sign(message).to_bytes())
    }

    fn derive_public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.signing_key().verifying_key().to_bytes())
    }

    fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.seed())
    }
}

/// Verify an ed25519 signature.
///
/// Returns `false` for a bad signature and for a public key that does not
/// decode to a curve point. Never errors.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    key.verify(message, &signature).is_ok()
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
