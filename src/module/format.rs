//! Little-endian byte codec primitives shared by the packer and loader.
//!
//! Every multi-byte integer and float on disk is little-endian; strings
//! are one length byte followed by UTF-8 (so 0-255 bytes). All reads and
//! writes route through these helpers to keep the format in one place.

use std::fmt;

/// Stable codec error categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The byte stream ended inside a value.
    UnexpectedEnd,
    /// A length-prefixed string holds invalid UTF-8.
    InvalidUtf8,
    /// A string exceeds the one-byte length prefix.
    StringTooLong(usize),
    /// An opcode or tag byte has no defined meaning.
    BadTag(u8),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "unexpected end of module bytes"),
            Self::InvalidUtf8 => write!(f, "length-prefixed string is not valid UTF-8"),
            Self::StringTooLong(len) => {
                write!(f, "string of {len} bytes exceeds the 255-byte limit")
            }
            Self::BadTag(tag) => write!(f, "undefined tag byte 0x{tag:02X}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the full slice.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Returns the current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns `true` once every byte is consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// Returns the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, FormatError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(FormatError::UnexpectedEnd)
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> Result<u8, FormatError> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Ok(b)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FormatError> {
        let end = self.pos.checked_add(N).ok_or(FormatError::UnexpectedEnd)?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(FormatError::UnexpectedEnd)?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, FormatError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, FormatError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `f32`.
    pub fn read_f32(&mut self) -> Result<f32, FormatError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads a one-byte-length-prefixed UTF-8 string.
    pub fn read_str8(&mut self) -> Result<String, FormatError> {
        let len = self.read_u8()? as usize;
        let end = self
            .pos
            .checked_add(len)
            .ok_or(FormatError::UnexpectedEnd)?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(FormatError::UnexpectedEnd)?;
        self.pos = end;
        String::from_utf8(slice.to_vec()).map_err(|_| FormatError::InvalidUtf8)
    }
}

/// Appends a little-endian `u32`.
pub fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends a little-endian `i32`.
pub fn push_i32(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends a little-endian `f32`.
pub fn push_f32(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Appends a one-byte-length-prefixed UTF-8 string.
pub fn push_str8(out: &mut Vec<u8>, text: &str) -> Result<(), FormatError> {
    let len = text.len();
    if len > u8::MAX as usize {
        return Err(FormatError::StringTooLong(len));
    }
    out.push(len as u8);
    out.extend_from_slice(text.as_bytes());
    Ok(())
}

/// Overwrites a previously emitted little-endian `i32` in place.
///
/// Backpatching always goes through this helper so the patched slot's
/// position stays an explicit, reviewable offset.
pub fn patch_i32(blob: &mut [u8], offset: usize, value: i32) {
    blob[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
