use nyzo_types::Hash;
use sha2::{Digest, Sha256};

/// Single SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// `SHA-256(SHA-256(data))`, the digest behind every record hash.
pub fn double_sha256(data: &[u8]) -> Hash {
    Hash::from_bytes(sha256(&sha256(data)))
}
