//! Foundation types for the Nyzo record layer.
//!
//! Every record crate in the workspace depends on `nyzo-types`. The types
//! here are fixed-size and `Copy`: they compare, hash and move by value and
//! never allocate.
//!
//! # Key Types
//!
//! - [`Hash`]: 32-byte double-SHA-256 digest
//! - [`PublicKey`]: 32-byte ed25519 public key, the identity of a node or wallet
//! - [`Signature`]: 64-byte ed25519 signature
//! - [`Timestamp`]: nanosecond instant, carried on the wire at millisecond resolution

#[macro_use]
mod fixed;

pub mod error;
pub mod hash;
pub mod hex_bytes;
pub mod identity;
pub mod signature;
pub mod temporal;

pub use error::TypeError;
pub use hash::Hash;
pub use identity::PublicKey;
pub use signature::Signature;
pub use temporal::{Timestamp, MAX_EXACT_MILLIS, NANOS_PER_MILLI};
