//! Cryptographic primitives for the Nyzo record layer.
//!
//! Provides ed25519 key generation, signing and verification, and the
//! double SHA-256 digest used for every record hash.
//!
//! All crypto operations wrap established libraries; there is no custom cryptography.

pub mod hasher;
pub mod keys;

pub use hasher::{double_sha256, sha256};
pub use keys::{verify, PrivateKey};
