use bytes::BufMut;

use nyzo_types::{Hash, PublicKey, Signature, Timestamp};

/// Append-only big-endian output buffer.
#[derive(Debug, Default, Clone)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    pub fn put_i16(&mut self, v: i16) {
        self.buf.put_i16(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    pub fn put_i64(&mut self, v: i64) {
        self.buf.put_i64(v);
    }

    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn put_hash(&mut self, hash: &Hash) {
        self.put_slice(hash.as_bytes());
    }

    pub fn put_public_key(&mut self, key: &PublicKey) {
        self.put_slice(key.as_bytes());
    }

    pub fn put_signature(&mut self, sig: &Signature) {
        self.put_slice(sig.as_bytes());
    }

    /// Write a timestamp at millisecond resolution.
    pub fn put_timestamp(&mut self, ts: Timestamp) {
        self.put_i64(ts.as_millis());
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
