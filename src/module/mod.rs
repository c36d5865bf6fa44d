//! Binary module format: byte codec, instruction wire layout, data
//! segment, and whole-file assembly. This is the toolchain's stable
//! boundary; identical source input must produce byte-identical modules.

mod data_segment;
mod format;
mod image;
mod instr;

pub use data_segment::{DataEntry, DataSegment, SEGMENT_END};
pub use format::{FormatError, Reader, patch_i32, push_f32, push_i32, push_str8, push_u32};
pub use image::{ModuleImage, SECTION_END, encode_module};
pub use instr::{RawCond, RawInclude, RawInstr, flag, op};
