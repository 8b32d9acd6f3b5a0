use bytes::Buf;

use nyzo_types::{Hash, PublicKey, Signature, Timestamp};

use crate::error::{CodecError, CodecResult};

/// Bounds-checked big-endian cursor over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    start_len: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            start_len: buf.len(),
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.start_len - self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn ensure(&self, needed: usize) -> CodecResult<()> {
        if self.buf.len() < needed {
            return Err(CodecError::UnexpectedEof {
                needed,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_i16(&mut self) -> CodecResult<i16> {
        self.ensure(2)?;
        Ok(self.buf.get_i16())
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_i32(&mut self) -> CodecResult<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn read_u32(&mut self) -> CodecResult<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_i64(&mut self) -> CodecResult<i64> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    /// Borrow the next `n` bytes.
    pub fn take(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        self.ensure(n)?;
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    /// Borrow everything left.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }

    pub fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_hash(&mut self) -> CodecResult<Hash> {
        Ok(Hash::from_bytes(self.read_array()?))
    }

    pub fn read_public_key(&mut self) -> CodecResult<PublicKey> {
        Ok(PublicKey::from_bytes(self.read_array()?))
    }

    pub fn read_signature(&mut self) -> CodecResult<Signature> {
        Ok(Signature::from_bytes(self.read_array()?))
    }

    /// Read a millisecond wire timestamp and widen it to nanoseconds.
    pub fn read_timestamp(&mut self) -> CodecResult<Timestamp> {
        Ok(Timestamp::from_millis(self.read_i64()?))
    }

    /// Validate an element count read from the wire before allocating for it.
    ///
    /// Negative counts are rejected, and so are counts whose minimum encoded
    /// size exceeds what is left in the buffer.
    pub fn check_count(
        &self,
        what: &'static str,
        count: i64,
        min_element_len: usize,
    ) -> CodecResult<usize> {
        let n = usize::try_from(count).map_err(|_| CodecError::InvalidCount { what, count })?;
        let needed = n
            .checked_mul(min_element_len)
            .ok_or(CodecError::InvalidCount { what, count })?;
        self.ensure(needed)?;
        Ok(n)
    }

    /// Succeeds only if the whole buffer was consumed.
    pub fn finish(self) -> CodecResult<()> {
        if !self.buf.is_empty() {
            return Err(CodecError::TrailingBytes(self.buf.len()));
        }
        Ok(())
    }
}
