//! Big-endian fixed-width packing shared by every payload layout.
//!
//! All integers are written in network byte order. Strings and byte strings are
//! prefixed with a `u16` length. Values that do not fit their field are rejected
//! with [`TokenError::Encoding`] instead of being truncated.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::TokenError;

#[derive(Debug, Default)]
pub(crate) struct Packer {
    buf: BytesMut,
}

impl Packer {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn put_u16(&mut self, field: &'static str, value: u64) -> Result<(), TokenError> {
        let value = u16::try_from(value)
            .map_err(|_| TokenError::encoding(field, value, u16::MAX as u64))?;
        self.buf.put_u16(value);
        Ok(())
    }

    pub fn put_u32(&mut self, field: &'static str, value: u64) -> Result<(), TokenError> {
        let value = u32::try_from(value)
            .map_err(|_| TokenError::encoding(field, value, u32::MAX as u64))?;
        self.buf.put_u32(value);
        Ok(())
    }

    /// Writes a signed quantity (timestamps) into an unsigned 32-bit field
    pub fn put_timestamp(&mut self, field: &'static str, value: i64) -> Result<(), TokenError> {
        let unsigned =
            u64::try_from(value).map_err(|_| TokenError::encoding(field, value, u32::MAX as u64))?;
        self.put_u32(field, unsigned)
    }

    pub fn put_bytes(&mut self, field: &'static str, value: &[u8]) -> Result<(), TokenError> {
        self.put_u16(field, value.len() as u64)?;
        self.buf.put_slice(value);
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

pub(crate) struct Unpacker<'a> {
    reader: untrusted::Reader<'a>,
}

impl<'a> Unpacker<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            reader: untrusted::Reader::new(untrusted::Input::from(buf)),
        }
    }

    fn take(&mut self, field: &'static str, len: usize) -> Result<&'a [u8], TokenError> {
        self.reader
            .read_bytes(len)
            .map(|input| input.as_slice_less_safe())
            .map_err(|_: untrusted::EndOfInput| {
                TokenError::malformed(format!("payload truncated while reading {}", field))
            })
    }

    pub fn get_u16(&mut self, field: &'static str) -> Result<u16, TokenError> {
        let mut bytes = self.take(field, 2)?;
        Ok(bytes.get_u16())
    }

    pub fn get_u32(&mut self, field: &'static str) -> Result<u32, TokenError> {
        let mut bytes = self.take(field, 4)?;
        Ok(bytes.get_u32())
    }

    pub fn get_string(&mut self, field: &'static str) -> Result<String, TokenError> {
        let len = self.get_u16(field)? as usize;
        let bytes = self.take(field, len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| TokenError::malformed(format!("{} is not valid UTF-8", field)))
    }

    /// Fails unless every byte of the payload was consumed
    pub fn finish(mut self) -> Result<(), TokenError> {
        if self.reader.at_end() {
            return Ok(());
        }
        let trailing = self.reader.read_bytes_to_end().len();
        Err(TokenError::malformed(format!(
            "{} trailing bytes after payload",
            trailing
        )))
    }
}
