//! Post-pass over the built blobs: include intersection, deferred-name
//! resolution, and expression finalization, followed by data-segment
//! assembly.

use std::collections::{BTreeMap, BTreeSet};

use crate::build::builder::BuilderOutput;
use crate::build::error::{BuildError, Diagnostic, DiagnosticKind};
use crate::expr;
use crate::lexical::is_reserved;
use crate::module::{DataEntry, DataSegment, flag, op, push_str8, push_u32};

/// Post-pass product, ready for module encoding.
#[derive(Debug)]
pub struct PostPassResult {
    /// Include-section blobs, unchanged from the builder.
    pub include_blobs: Vec<Vec<u8>>,
    /// Runtime blobs with every deferred payload slot filled.
    pub code: Vec<Vec<u8>>,
    /// Assembled data segment.
    pub data: DataSegment,
    /// Builder diagnostics plus resolution diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

struct PostPass {
    module: String,
    code: Vec<Vec<u8>>,
    include_segments: Vec<DataSegment>,
    vars: BTreeMap<String, u32>,
    var_order: Vec<String>,
    owned: BTreeSet<String>,
    procs: BTreeMap<String, u32>,
    proc_order: Vec<String>,
    imported_vars: BTreeMap<u32, u32>,
    imported_procs: BTreeMap<u32, u32>,
    intersections: BTreeMap<u32, Vec<(u32, u32)>>,
    diagnostics: Vec<Diagnostic>,
}

/// Runs the three post-pass stages and assembles the data segment.
pub fn run(output: BuilderOutput) -> Result<PostPassResult, BuildError> {
    let BuilderOutput {
        module,
        code,
        include_blobs,
        include_segments,
        vars,
        var_order,
        owned_vars,
        procs,
        proc_order,
        expressions,
        unresolved,
        diagnostics,
    } = output;

    let mut pass = PostPass {
        module,
        code,
        include_segments,
        vars,
        var_order,
        owned: owned_vars,
        procs,
        proc_order,
        imported_vars: BTreeMap::new(),
        imported_procs: BTreeMap::new(),
        intersections: BTreeMap::new(),
        diagnostics,
    };

    pass.intersect_includes();
    pass.resolve_names(&unresolved);
    pass.finalize_expressions(&expressions)?;
    let data = pass.assemble_data_segment();

    log::debug!(
        "{}: post-pass complete, {} variable(s), {} procedure(s)",
        pass.module,
        pass.var_order.len(),
        pass.proc_order.len()
    );

    Ok(PostPassResult {
        include_blobs,
        code: pass.code,
        data,
        diagnostics: pass.diagnostics,
    })
}

impl PostPass {
    /// Stage 1: records, for every locally owned variable, the same-named
    /// variable of each include.
    fn intersect_includes(&mut self) {
        for (id, name) in self.var_order.iter().enumerate() {
            if !self.owned.contains(name) {
                continue;
            }
            let pairs: Vec<(u32, u32)> = self
                .include_segments
                .iter()
                .enumerate()
                .filter_map(|(include, segment)| {
                    segment
                        .find_variable(name)
                        .map(|entry| (include as u32, entry.id))
                })
                .collect();
            if !pairs.is_empty() {
                self.intersections.insert(id as u32, pairs);
            }
        }
    }

    fn resolve_var(&mut self, name: &str) -> Option<u32> {
        if let Some(&id) = self.vars.get(name) {
            return Some(id);
        }
        for (include, segment) in self.include_segments.iter().enumerate() {
            if segment.find_variable(name).is_some() {
                let id = self.var_order.len() as u32;
                self.vars.insert(name.to_string(), id);
                self.var_order.push(name.to_string());
                self.imported_vars.insert(id, include as u32);
                return Some(id);
            }
        }
        None
    }

    fn resolve_proc(&mut self, name: &str) -> Option<u32> {
        if let Some(&id) = self.procs.get(name) {
            return Some(id);
        }
        for (include, segment) in self.include_segments.iter().enumerate() {
            if segment.find_procedure(name).is_some() {
                let id = self.proc_order.len() as u32;
                self.procs.insert(name.to_string(), id);
                self.proc_order.push(name.to_string());
                self.imported_procs.insert(id, include as u32);
                return Some(id);
            }
        }
        None
    }

    fn unresolved_diagnostic(&mut self, name: &str) {
        log::warn!("{}: object {name} not found", self.module);
        self.diagnostics.push(Diagnostic {
            kind: DiagnosticKind::Unresolved,
            module: self.module.clone(),
            line: None,
            message: format!("object {name} not found"),
        });
    }

    /// Stage 2: appends the resolved id to every deferred payload slot.
    /// The instruction's opcode decides which namespace the name is
    /// looked up in; PUSH tries variables first, then procedures, and
    /// records the outcome in its flag bit.
    fn resolve_names(&mut self, unresolved: &BTreeMap<String, Vec<u32>>) {
        for (name, indexes) in unresolved {
            for &index in indexes {
                let opcode = self.code[index as usize][0] >> 4;
                let id = match opcode {
                    op::CALL => self.resolve_proc(name),
                    op::PUSH => match self.resolve_var(name) {
                        Some(id) => Some(id),
                        None => self.resolve_proc(name).map(|id| {
                            self.code[index as usize][0] |= flag::PUSH_PROC;
                            id
                        }),
                    },
                    _ => self.resolve_var(name),
                };

                let id = match id {
                    Some(id) => id,
                    None => {
                        self.unresolved_diagnostic(name);
                        0
                    }
                };
                push_u32(&mut self.code[index as usize], id);
            }
        }
    }

    /// Stage 3: rewrites bare variable names to `@id`, compiles each
    /// finalized string once so type errors fail the pack, and appends it
    /// to the owning instruction.
    fn finalize_expressions(
        &mut self,
        expressions: &BTreeMap<u32, String>,
    ) -> Result<(), BuildError> {
        for (&index, raw) in expressions {
            let finalized = self.substitute_names(raw);
            expr::compile(&finalized).map_err(|err| {
                BuildError::from(expr::ExprError::new(
                    err.kind,
                    format!("{}: in {raw}: {}", self.module, err.message),
                ))
            })?;
            push_str8(&mut self.code[index as usize], &finalized)?;
        }
        Ok(())
    }

    fn substitute_names(&mut self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            if !(c.is_ascii_alphabetic() || c == '_') {
                out.push(c);
                continue;
            }
            let mut end = start + c.len_utf8();
            while let Some(&(i, c2)) = chars.peek() {
                if c2.is_ascii_alphanumeric() || c2 == '_' {
                    chars.next();
                    end = i + c2.len_utf8();
                } else {
                    break;
                }
            }
            let word = &raw[start..end];
            if is_reserved(word) {
                out.push_str(word);
                continue;
            }
            match self.resolve_var(word) {
                Some(id) => {
                    out.push('@');
                    out.push_str(&id.to_string());
                }
                None => {
                    self.unresolved_diagnostic(word);
                    out.push_str("@0");
                }
            }
        }

        out
    }

    /// Writes variables then procedures, each in id order.
    fn assemble_data_segment(&self) -> DataSegment {
        let mut entries = Vec::with_capacity(self.var_order.len() + self.proc_order.len());

        for (id, name) in self.var_order.iter().enumerate() {
            let id = id as u32;
            let mut entry = match self.imported_vars.get(&id) {
                Some(&include) => DataEntry::imported(false, id, name, include),
                None => DataEntry::local(false, id, name),
            };
            if let Some(pairs) = self.intersections.get(&id) {
                entry.intersections = pairs.clone();
            }
            entries.push(entry);
        }

        for (id, name) in self.proc_order.iter().enumerate() {
            let id = id as u32;
            entries.push(match self.imported_procs.get(&id) {
                Some(&include) => DataEntry::imported(true, id, name, include),
                None => DataEntry::local(true, id, name),
            });
        }

        DataSegment { entries }
    }
}
