//! Data-segment codec: the serialized description of a module's declared
//! and imported symbols.

use crate::module::format::{FormatError, Reader, push_str8, push_u32};

/// Segment terminator. Preamble bytes use at most three low bits, so the
/// sentinel can never collide with an entry.
pub const SEGMENT_END: u8 = 0xFF;

const PREAMBLE_PROCEDURE: u8 = 0b001;
const PREAMBLE_MEETS: u8 = 0b010;
const PREAMBLE_IMPORTED: u8 = 0b100;

/// One data-segment entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEntry {
    /// `true` for a procedure, `false` for a variable.
    pub is_procedure: bool,
    /// Local symbol id, dense per kind.
    pub id: u32,
    /// Symbol name.
    pub name: String,
    /// `(include_index, remote_id)` pairs for a locally owned variable
    /// whose name also appears in includes.
    pub intersections: Vec<(u32, u32)>,
    /// Owning include index for an imported symbol.
    pub owner_include: Option<u32>,
}

impl DataEntry {
    /// Creates a locally owned entry.
    pub fn local(is_procedure: bool, id: u32, name: impl Into<String>) -> Self {
        Self {
            is_procedure,
            id,
            name: name.into(),
            intersections: Vec::new(),
            owner_include: None,
        }
    }

    /// Creates an imported entry.
    pub fn imported(is_procedure: bool, id: u32, name: impl Into<String>, include: u32) -> Self {
        Self {
            is_procedure,
            id,
            name: name.into(),
            intersections: Vec::new(),
            owner_include: Some(include),
        }
    }

    fn preamble(&self) -> u8 {
        let mut bits = 0;
        if self.is_procedure {
            bits |= PREAMBLE_PROCEDURE;
        }
        if !self.intersections.is_empty() {
            bits |= PREAMBLE_MEETS;
        }
        if self.owner_include.is_some() {
            bits |= PREAMBLE_IMPORTED;
        }
        bits
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<(), FormatError> {
        out.push(self.preamble());
        push_u32(out, self.id);
        push_str8(out, &self.name)?;
        if !self.intersections.is_empty() {
            push_u32(out, self.intersections.len() as u32);
            for (include, remote) in &self.intersections {
                push_u32(out, *include);
                push_u32(out, *remote);
            }
        }
        if let Some(include) = self.owner_include {
            push_u32(out, include);
        }
        Ok(())
    }

    fn read(r: &mut Reader<'_>, preamble: u8) -> Result<Self, FormatError> {
        let id = r.read_u32()?;
        let name = r.read_str8()?;

        let mut intersections = Vec::new();
        if preamble & PREAMBLE_MEETS != 0 {
            let count = r.read_u32()? as usize;
            intersections.reserve(count);
            for _ in 0..count {
                let include = r.read_u32()?;
                let remote = r.read_u32()?;
                intersections.push((include, remote));
            }
        }

        let owner_include = if preamble & PREAMBLE_IMPORTED != 0 {
            Some(r.read_u32()?)
        } else {
            None
        };

        Ok(Self {
            is_procedure: preamble & PREAMBLE_PROCEDURE != 0,
            id,
            name,
            intersections,
            owner_include,
        })
    }
}

/// A module's full data segment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataSegment {
    /// Entries, variables in id order followed by procedures in id order.
    pub entries: Vec<DataEntry>,
}

impl DataSegment {
    /// Looks up a variable entry by name.
    pub fn find_variable(&self, name: &str) -> Option<&DataEntry> {
        self.entries
            .iter()
            .find(|e| !e.is_procedure && e.name == name)
    }

    /// Looks up a procedure entry by name.
    pub fn find_procedure(&self, name: &str) -> Option<&DataEntry> {
        self.entries
            .iter()
            .find(|e| e.is_procedure && e.name == name)
    }

    /// Serializes all entries plus the terminator.
    pub fn write(&self, out: &mut Vec<u8>) -> Result<(), FormatError> {
        for entry in &self.entries {
            entry.write(out)?;
        }
        out.push(SEGMENT_END);
        Ok(())
    }

    /// Reads entries up to and including the terminator.
    pub fn read(r: &mut Reader<'_>) -> Result<Self, FormatError> {
        let mut entries = Vec::new();
        loop {
            let preamble = r.read_u8()?;
            if preamble == SEGMENT_END {
                break;
            }
            if preamble & !(PREAMBLE_PROCEDURE | PREAMBLE_MEETS | PREAMBLE_IMPORTED) != 0 {
                return Err(FormatError::BadTag(preamble));
            }
            entries.push(DataEntry::read(r, preamble)?);
        }
        Ok(Self { entries })
    }
}
