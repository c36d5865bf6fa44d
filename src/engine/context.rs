//! Per-module execution contexts.

use std::collections::BTreeMap;

use crate::engine::error::{EngineError, EngineErrorKind};
use crate::engine::instr::Instr;
use crate::module::{DataSegment, ModuleImage};
use crate::value::{ProcDescriptor, VarCell};

/// Resolution of a local id to another context's symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportRef {
    /// Owning context id.
    pub context: u32,
    /// Symbol id inside the owning context.
    pub remote: u32,
}

/// Runtime state of one loaded module.
#[derive(Debug)]
pub struct Context {
    /// Globally unique context id, assigned in creation order.
    pub id: u32,
    /// Module base name.
    pub module: String,
    /// Loaded code segment.
    pub code: Vec<Instr>,
    /// Instruction pointer.
    pub ip: usize,
    /// Set once the context's EOF instruction ran.
    pub eof: bool,
    /// Variable cells by local id.
    pub cells: BTreeMap<u32, VarCell>,
    /// Procedure directory by local id.
    pub procs: BTreeMap<u32, ProcDescriptor>,
    /// Imported variables: local id to owning context symbol.
    pub imports_vars: BTreeMap<u32, ImportRef>,
    /// Imported procedures: local id to owning context symbol.
    pub imports_procs: BTreeMap<u32, ImportRef>,
    /// Include index to loaded context id.
    pub includes: BTreeMap<u32, u32>,
    /// Intersection tables: neighbor context id to `(local, remote)`
    /// variable-id pairs, iterated on every switch to or from it.
    pub intersections: BTreeMap<u32, Vec<(u32, u32)>>,
    /// The module's data segment, kept for import resolution by later
    /// includers.
    pub data: DataSegment,
}

impl Context {
    /// Materializes a context from a decoded image.
    ///
    /// `includes` maps the image's include indexes to loaded context ids;
    /// `neighbors` resolves imported names against those contexts' data
    /// segments.
    pub fn materialize(
        id: u32,
        module: impl Into<String>,
        image: &ModuleImage,
        includes: BTreeMap<u32, u32>,
        neighbors: &BTreeMap<u32, DataSegment>,
    ) -> Result<Self, EngineError> {
        let module = module.into();

        let mut code = Vec::with_capacity(image.code.len());
        for raw in &image.code {
            code.push(Instr::from_raw(raw.clone())?);
        }

        let mut imports_vars = BTreeMap::new();
        let mut imports_procs = BTreeMap::new();
        let mut intersections: BTreeMap<u32, Vec<(u32, u32)>> = BTreeMap::new();

        for entry in &image.data.entries {
            for &(include, remote) in &entry.intersections {
                let context = *includes.get(&include).ok_or_else(|| {
                    EngineError::new(
                        EngineErrorKind::MalformedModule,
                        format!("{module}: intersection names unknown include {include}"),
                    )
                })?;
                intersections
                    .entry(context)
                    .or_default()
                    .push((entry.id, remote));
            }

            if let Some(include) = entry.owner_include {
                let context = *includes.get(&include).ok_or_else(|| {
                    EngineError::new(
                        EngineErrorKind::MalformedModule,
                        format!("{module}: import names unknown include {include}"),
                    )
                })?;
                let segment = neighbors
                    .get(&context)
                    .ok_or_else(|| EngineError::unknown_context(context))?;

                let found = if entry.is_procedure {
                    segment.find_procedure(&entry.name)
                } else {
                    segment.find_variable(&entry.name)
                };
                let Some(remote) = found else {
                    // The include no longer exports the name; a runtime
                    // use surfaces as UndefinedObject.
                    log::warn!(
                        "{module}: imported {} not found in include {include}",
                        entry.name
                    );
                    continue;
                };

                let import = ImportRef {
                    context,
                    remote: remote.id,
                };
                if entry.is_procedure {
                    imports_procs.insert(entry.id, import);
                } else {
                    imports_vars.insert(entry.id, import);
                }
            }
        }

        Ok(Self {
            id,
            module,
            code,
            ip: 0,
            eof: false,
            cells: BTreeMap::new(),
            procs: BTreeMap::new(),
            imports_vars,
            imports_procs,
            includes,
            intersections,
            data: image.data.clone(),
        })
    }
}
