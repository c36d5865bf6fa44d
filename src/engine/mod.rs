//! Execution engine: loads binary modules into execution contexts and
//! runs them, one instruction per step.
//!
//! One context exists per loaded module. Cross-module state flows two
//! ways: imported symbols read through to their owning context lazily,
//! and intersecting owned variables are written back on every context
//! switch.

mod console;
mod context;
mod error;
mod instr;

pub use console::{BufferConsole, Console, OutputHandle, StdConsole};
pub use context::{Context, ImportRef};
pub use error::{EngineError, EngineErrorKind};
pub use instr::{Condition, Instr};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::build::{BuildError, Compiler, PackReport, module_base_name};
use crate::expr::{self, EvalError, EvalErrorKind, VarResolver};
use crate::module::ModuleImage;
use crate::value::{CellSlot, ProcDescriptor, Value, ValueType, VarCell};

/// Bound on linked-cell chains, which the format cannot forbid from
/// forming a cycle.
const MAX_LINK_DEPTH: usize = 64;

/// The multi-context interpreter.
pub struct Engine {
    contexts: BTreeMap<u32, Context>,
    next_context_id: u32,
    current: Option<u32>,
    loaded: BTreeMap<String, u32>,
    return_stack: Vec<(u32, usize)>,
    search_root: PathBuf,
    console: Box<dyn Console>,
}

impl Engine {
    /// Creates an engine using the process console, resolving relative
    /// include paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_console(root, Box::new(StdConsole))
    }

    /// Creates an engine with a custom console.
    pub fn with_console(root: impl Into<PathBuf>, console: Box<dyn Console>) -> Self {
        Self {
            contexts: BTreeMap::new(),
            next_context_id: 0,
            current: None,
            loaded: BTreeMap::new(),
            return_stack: Vec::new(),
            search_root: root.into(),
            console,
        }
    }

    /// Compiles a source module; the harness-facing packing entry point.
    pub fn pack(&self, source: &Path, output: &Path) -> Result<PackReport, BuildError> {
        Compiler::new(&self.search_root).pack(source, output)
    }

    /// Loads a binary module and runs it to its EOF.
    pub fn execute(&mut self, path: &Path) -> Result<(), EngineError> {
        let context = self.load_module(path)?;
        self.switch_to(context)?;
        self.run_until_eof(context)
    }

    /// Returns the loaded context id for a module base name.
    pub fn loaded_context(&self, module: &str) -> Option<u32> {
        self.loaded.get(module).copied()
    }

    /// Returns a loaded context.
    pub fn context(&self, id: u32) -> Option<&Context> {
        self.contexts.get(&id)
    }

    /// Returns the active context id.
    pub fn current_context(&self) -> Option<u32> {
        self.current
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.search_root.join(candidate)
        }
    }

    /// Maps a module path to its binary form, packing a source file whose
    /// binary does not exist yet.
    fn ensure_binary(&self, path: &Path) -> Result<PathBuf, EngineError> {
        let is_binary = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"));
        if is_binary {
            return Ok(path.to_path_buf());
        }

        let binary = path.with_extension("bin");
        if !binary.exists() {
            let report = Compiler::new(&self.search_root).pack(path, &binary)?;
            for diagnostic in &report.diagnostics {
                log::warn!("{diagnostic}");
            }
        }
        Ok(binary)
    }

    /// Loads a module, creating its context and executing its includes.
    ///
    /// A module whose base name is already loaded reuses the cached
    /// context and is not re-executed.
    pub fn load_module(&mut self, path: &Path) -> Result<u32, EngineError> {
        let binary = self.ensure_binary(path)?;
        let module = module_base_name(&binary);
        if let Some(&context) = self.loaded.get(&module) {
            log::debug!("module {module} already loaded as context {context}");
            return Ok(context);
        }

        let bytes = fs::read(&binary)
            .map_err(|err| EngineError::io(format!("cannot read {}: {err}", binary.display())))?;
        let image = ModuleImage::decode(&bytes)?;

        let id = self.next_context_id;
        self.next_context_id += 1;
        self.loaded.insert(module.clone(), id);

        // Includes run before the includer's first instruction; their
        // side effects are part of loading.
        let mut includes = BTreeMap::new();
        let mut neighbors = BTreeMap::new();
        for include in &image.includes {
            let include_path = self.resolve(&include.path);
            let include_module = module_base_name(&include_path);

            let context = match self.loaded.get(&include_module) {
                Some(&context) => context,
                None => {
                    let context = self.load_module(&include_path)?;
                    self.switch_to(context)?;
                    self.run_until_eof(context)?;
                    context
                }
            };
            includes.insert(include.index, context);

            let segment = self
                .contexts
                .get(&context)
                .ok_or_else(|| EngineError::unknown_context(context))?
                .data
                .clone();
            neighbors.insert(context, segment);
        }

        let context = Context::materialize(id, &module, &image, includes, &neighbors)?;
        self.contexts.insert(id, context);
        log::debug!("loaded module {module} as context {id}");
        Ok(id)
    }

    /// Switches the active context, writing intersecting variables from
    /// the context being left into the context being entered. The
    /// includer's table drives the copy whichever side it is on.
    fn switch_to(&mut self, target: u32) -> Result<(), EngineError> {
        let Some(current) = self.current else {
            self.current = Some(target);
            return Ok(());
        };
        if current == target {
            return Ok(());
        }

        let mut copies: Vec<(u32, Value)> = Vec::new();
        if let Some(pairs) = self
            .contexts
            .get(&current)
            .and_then(|ctx| ctx.intersections.get(&target))
        {
            // Leaving the includer: local ids map onto the include.
            for (local, remote) in pairs.clone() {
                if let Some(value) = self.local_value(current, local)? {
                    copies.push((remote, value));
                }
            }
        } else if let Some(pairs) = self
            .contexts
            .get(&target)
            .and_then(|ctx| ctx.intersections.get(&current))
        {
            // Entering the includer: its table reads the include's side.
            for (local, remote) in pairs.clone() {
                if let Some(value) = self.local_value(current, remote)? {
                    copies.push((local, value));
                }
            }
        }

        let ctx = self
            .contexts
            .get_mut(&target)
            .ok_or_else(|| EngineError::unknown_context(target))?;
        for (id, value) in copies {
            match ctx.cells.get_mut(&id) {
                Some(cell) => {
                    cell.slot = CellSlot::Immediate(value.coerce(cell.ty)?);
                }
                None => {
                    let ty = value.value_type();
                    ctx.cells.insert(id, VarCell::immediate(ty, value)?);
                }
            }
        }

        log::trace!("context switch {current} -> {target}");
        self.current = Some(target);
        Ok(())
    }

    /// Reads the current value of a variable, coerced to its declared
    /// type, following imports and links.
    pub fn read_var(&self, context: u32, id: u32) -> Result<Value, EngineError> {
        self.read_var_at(context, id, 0)
    }

    fn read_var_at(&self, context: u32, id: u32, depth: usize) -> Result<Value, EngineError> {
        if depth > MAX_LINK_DEPTH {
            return Err(EngineError::new(
                EngineErrorKind::TypeMismatch,
                format!("variable link chain through {id} exceeds depth {MAX_LINK_DEPTH}"),
            ));
        }
        let ctx = self
            .contexts
            .get(&context)
            .ok_or_else(|| EngineError::unknown_context(context))?;

        if let Some(import) = ctx.imports_vars.get(&id) {
            return self.read_var_at(import.context, import.remote, depth + 1);
        }

        let cell = ctx
            .cells
            .get(&id)
            .ok_or_else(|| EngineError::undefined_object(&ctx.module, "variable", id))?;
        let value = match &cell.slot {
            CellSlot::Immediate(value) => value.clone(),
            CellSlot::Expr { last, .. } => last.clone(),
            CellSlot::Linked(target) => self.read_var_at(context, *target, depth + 1)?,
        };
        Ok(value.coerce(cell.ty)?)
    }

    /// Reads a cell's own current value without import resolution; absent
    /// cells report as `None` (intersection writeback skips them).
    fn local_value(&self, context: u32, id: u32) -> Result<Option<Value>, EngineError> {
        let ctx = self
            .contexts
            .get(&context)
            .ok_or_else(|| EngineError::unknown_context(context))?;
        let Some(cell) = ctx.cells.get(&id) else {
            return Ok(None);
        };
        let value = match &cell.slot {
            CellSlot::Immediate(value) => value.clone(),
            CellSlot::Expr { last, .. } => last.clone(),
            CellSlot::Linked(target) => self.read_var(context, *target)?,
        };
        Ok(Some(value.coerce(cell.ty)?))
    }

    fn evaluate(&self, context: u32, tree: &expr::ExprNode) -> Result<Value, EngineError> {
        let vars = ContextVars {
            engine: self,
            context,
        };
        Ok(expr::evaluate(tree, &vars)?)
    }

    fn evaluate_condition(&self, context: u32, cond: &Condition) -> Result<bool, EngineError> {
        let value = match cond {
            Condition::Var(id) => self.read_var(context, *id)?,
            Condition::Expr(tree) => self.evaluate(context, tree)?,
        };
        match value.coerce(ValueType::Bool)? {
            Value::Bool(b) => Ok(b),
            _ => unreachable!("coerce to BOOL yields Bool"),
        }
    }

    fn upsert_cell(
        &mut self,
        context: u32,
        var: u32,
        cell: VarCell,
    ) -> Result<(), EngineError> {
        let ctx = self
            .contexts
            .get_mut(&context)
            .ok_or_else(|| EngineError::unknown_context(context))?;
        ctx.cells.insert(var, cell);
        Ok(())
    }

    /// Runs instructions until the context the run was started for halts.
    pub fn run_until_eof(&mut self, start: u32) -> Result<(), EngineError> {
        loop {
            let current = self
                .current
                .ok_or_else(|| EngineError::unknown_context(start))?;
            let ctx = self
                .contexts
                .get_mut(&current)
                .ok_or_else(|| EngineError::unknown_context(current))?;
            if ctx.eof {
                break;
            }

            // Running past the code segment is an implicit halt.
            if ctx.ip >= ctx.code.len() {
                ctx.eof = true;
                break;
            }

            let instr = ctx.code[ctx.ip].clone();
            ctx.ip += 1;

            if !self.step(current, instr)? {
                break;
            }
            if self
                .contexts
                .get(&start)
                .is_some_and(|ctx| ctx.eof)
            {
                break;
            }
        }
        Ok(())
    }

    /// Executes one instruction. Returns `false` when the active context
    /// halted.
    fn step(&mut self, current: u32, instr: Instr) -> Result<bool, EngineError> {
        match instr {
            Instr::Nop | Instr::Marker => {}

            Instr::SetImmediate { var, ty, value } => {
                self.upsert_cell(current, var, VarCell::immediate(ty, value)?)?;
            }

            Instr::SetLinked { var, ty, target } => {
                self.upsert_cell(current, var, VarCell::linked(ty, target))?;
            }

            Instr::SetExpr { var, ty, tree } => {
                // Evaluated against pre-assignment state, so the target's
                // previous value stays visible to the expression.
                let value = self.evaluate(current, &tree)?;
                self.upsert_cell(current, var, VarCell::expression(ty, tree, value)?)?;
            }

            Instr::Push { id, procedure } => {
                let ctx = self
                    .contexts
                    .get_mut(&current)
                    .ok_or_else(|| EngineError::unknown_context(current))?;
                if procedure {
                    ctx.procs.remove(&id);
                } else {
                    ctx.cells.remove(&id);
                }
            }

            Instr::WriteLiteral(text) => {
                self.console.write_line(&text)?;
            }

            Instr::WriteVar(id) => {
                let value = self.read_var(current, id)?;
                self.console.write_line(&value.to_string())?;
            }

            Instr::Input { var, ty } => {
                let line = self.console.read_line()?;
                let value = parse_input(&line, ty)?;
                self.upsert_cell(current, var, VarCell::immediate(ty, value)?)?;
            }

            Instr::Jump(target) => {
                self.set_ip(current, target)?;
            }

            Instr::If { else_target, cond } => {
                if !self.evaluate_condition(current, &cond)? {
                    self.set_ip(current, else_target)?;
                }
            }

            Instr::Define { proc, start } => {
                if start < 0 {
                    return Err(EngineError::invalid_jump_target(start));
                }
                let descriptor = ProcDescriptor {
                    context_id: current,
                    proc_id: proc,
                    start: start as u32,
                };
                let ctx = self
                    .contexts
                    .get_mut(&current)
                    .ok_or_else(|| EngineError::unknown_context(current))?;
                ctx.procs.insert(proc, descriptor);
            }

            Instr::Call(proc) => {
                let ctx = self
                    .contexts
                    .get(&current)
                    .ok_or_else(|| EngineError::unknown_context(current))?;
                let descriptor = match ctx.imports_procs.get(&proc) {
                    Some(import) => self
                        .contexts
                        .get(&import.context)
                        .and_then(|owner| owner.procs.get(&import.remote))
                        .copied(),
                    None => ctx.procs.get(&proc).copied(),
                };
                let Some(descriptor) = descriptor else {
                    return Err(EngineError::undefined_object(
                        &ctx.module,
                        "procedure",
                        proc,
                    ));
                };

                let resume_ip = ctx.ip;
                self.return_stack.push((current, resume_ip));
                if descriptor.context_id != current {
                    self.switch_to(descriptor.context_id)?;
                }
                self.contexts
                    .get_mut(&descriptor.context_id)
                    .ok_or_else(|| EngineError::unknown_context(descriptor.context_id))?
                    .ip = descriptor.start as usize;
            }

            Instr::Ret => {
                let (context, ip) = self
                    .return_stack
                    .pop()
                    .ok_or_else(EngineError::return_stack_underflow)?;
                if context != current {
                    self.switch_to(context)?;
                }
                self.contexts
                    .get_mut(&context)
                    .ok_or_else(|| EngineError::unknown_context(context))?
                    .ip = ip;
            }

            Instr::Eof => {
                let ctx = self
                    .contexts
                    .get_mut(&current)
                    .ok_or_else(|| EngineError::unknown_context(current))?;
                ctx.eof = true;
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn set_ip(&mut self, context: u32, target: i32) -> Result<(), EngineError> {
        let ctx = self
            .contexts
            .get_mut(&context)
            .ok_or_else(|| EngineError::unknown_context(context))?;
        if target < 0 || target as usize > ctx.code.len() {
            return Err(EngineError::invalid_jump_target(target));
        }
        ctx.ip = target as usize;
        Ok(())
    }
}

struct ContextVars<'a> {
    engine: &'a Engine,
    context: u32,
}

impl VarResolver for ContextVars<'_> {
    fn fetch(&self, id: u32) -> Result<Value, EvalError> {
        self.engine.read_var(self.context, id).map_err(|err| {
            let kind = match err.kind {
                EngineErrorKind::TypeMismatch => EvalErrorKind::TypeMismatch,
                _ => EvalErrorKind::Undefined,
            };
            EvalError::new(kind, err.message)
        })
    }
}

/// Parses one console line against the declared input type. Floats accept
/// `,` as well as `.` for the fraction separator.
pub fn parse_input(line: &str, ty: ValueType) -> Result<Value, EngineError> {
    let text = line.trim();
    match ty {
        ValueType::Bool => match text.to_ascii_uppercase().as_str() {
            "TRUE" => Ok(Value::Bool(true)),
            "FALSE" => Ok(Value::Bool(false)),
            _ => Err(EngineError::input_parse(format!(
                "{text:?} is not a BOOL (expected TRUE or FALSE)"
            ))),
        },
        ValueType::Int => text
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|_| EngineError::input_parse(format!("{text:?} is not an INT"))),
        ValueType::Float => text
            .replace(',', ".")
            .parse::<f32>()
            .map(Value::Float)
            .map_err(|_| EngineError::input_parse(format!("{text:?} is not a FLOAT"))),
        ValueType::Str => Ok(Value::Str(text.to_string())),
    }
}
