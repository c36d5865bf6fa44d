//! Whole-module binary layout.
//!
//! ```text
//! [include instructions] 0xFF [runtime instructions ... EOF] [data segment] 0xFF
//! ```
//!
//! The runtime section is terminated by its own EOF instruction (byte
//! `0xF0`), so no separator precedes the data segment.

use crate::module::data_segment::DataSegment;
use crate::module::format::{FormatError, Reader};
use crate::module::instr::{RawInclude, RawInstr};

/// Separator after the include section; also the data-segment terminator.
pub const SECTION_END: u8 = 0xFF;

/// A decoded binary module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleImage {
    /// Include instructions, processed before any runtime instruction.
    pub includes: Vec<RawInclude>,
    /// Runtime instructions; the final one is always `Eof`.
    pub code: Vec<RawInstr>,
    /// Symbol descriptions.
    pub data: DataSegment,
}

impl ModuleImage {
    /// Decodes a module from its on-disk bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut r = Reader::new(bytes);

        let mut includes = Vec::new();
        while r.peek_u8()? != SECTION_END {
            includes.push(RawInclude::read(&mut r)?);
        }
        r.read_u8()?;

        let mut code = Vec::new();
        loop {
            let instr = RawInstr::read(&mut r)?;
            let done = instr == RawInstr::Eof;
            code.push(instr);
            if done {
                break;
            }
        }

        let data = DataSegment::read(&mut r)?;

        log::debug!(
            "decoded module: {} include(s), {} instruction(s), {} symbol(s)",
            includes.len(),
            code.len(),
            data.entries.len()
        );

        Ok(Self {
            includes,
            code,
            data,
        })
    }
}

/// Assembles the on-disk bytes from packed instruction blobs.
pub fn encode_module(
    include_blobs: &[Vec<u8>],
    code_blobs: &[Vec<u8>],
    data: &DataSegment,
) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::new();
    for blob in include_blobs {
        out.extend_from_slice(blob);
    }
    out.push(SECTION_END);
    for blob in code_blobs {
        out.extend_from_slice(blob);
    }
    data.write(&mut out)?;
    Ok(out)
}
