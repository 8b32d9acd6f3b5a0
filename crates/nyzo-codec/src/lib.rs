//! Wire codec plumbing for the Nyzo record layer.
//!
//! Every record decoder reads through a single [`WireReader`] cursor, so a
//! record can be decoded on its own or embedded inside another record without
//! a separate entry point. All integers are big-endian and every read is
//! bounds-checked: malformed input surfaces as a [`CodecError`], never a
//! panic.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{CodecError, CodecResult};
pub use reader::WireReader;
pub use writer::WireWriter;

/// A record with a canonical wire encoding.
pub trait Encode {
    /// Append the encoding to `writer`.
    fn encode(&self, writer: &mut WireWriter);

    /// Exact number of bytes [`Encode::encode`] appends.
    fn encoded_len(&self) -> usize;

    /// Encode into a fresh, exactly sized buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(self.encoded_len());
        self.encode(&mut writer);
        writer.into_bytes()
    }
}

/// A record that can be read from a [`WireReader`].
pub trait Decode: Sized {
    /// Read one record, leaving the cursor just past it.
    fn decode(reader: &mut WireReader<'_>) -> CodecResult<Self>;

    /// Decode a buffer holding exactly one record.
    fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let mut reader = WireReader::new(bytes);
        let value = Self::decode(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}
