//! Line-by-line front end: turns recognized commands into per-line
//! instruction byte blobs while tracking symbols, bracketed constructs,
//! and forward jumps.

use std::collections::{BTreeMap, BTreeSet};

use crate::build::error::{BuildError, Diagnostic, DiagnosticKind};
use crate::lexical::{Command, CondSource, Recognized, SetSource, is_reserved, recognize};
use crate::module::{DataSegment, flag, op, patch_i32, push_f32, push_i32, push_str8, push_u32};
use crate::value::{Value, ValueType};

/// Build-time access to included modules' data segments.
pub trait IncludeLoader {
    /// Compiles (for `.txt`) or loads (for `.bin`) the module at `path`
    /// and returns its data-segment descriptor.
    fn load(&mut self, path: &str) -> Result<DataSegment, BuildError>;
}

/// One open bracketed construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    /// Open DEFINE; `jump_index` is its companion forward JUMP.
    Define { jump_index: u32 },
    /// Open IF awaiting its false target.
    If { if_index: u32 },
    /// IF that has met its `END ?`; both patch slots are now pending.
    Else {
        if_index: u32,
        jump_index: u32,
        marker_index: u32,
    },
}

/// Everything the post-pass needs from the line walk.
#[derive(Debug)]
pub struct BuilderOutput {
    /// Module base name, used in diagnostics.
    pub module: String,
    /// Runtime instruction blobs, ending with EOF.
    pub code: Vec<Vec<u8>>,
    /// Include-section blobs.
    pub include_blobs: Vec<Vec<u8>>,
    /// Include data segments, by include index.
    pub include_segments: Vec<DataSegment>,
    /// Variable name to local id.
    pub vars: BTreeMap<String, u32>,
    /// Variable names in id order.
    pub var_order: Vec<String>,
    /// Names that are SET/INPUT targets, hence owned by this module.
    pub owned_vars: BTreeSet<String>,
    /// Procedure name to local id.
    pub procs: BTreeMap<String, u32>,
    /// Procedure names in id order.
    pub proc_order: Vec<String>,
    /// Instruction index to raw expression string.
    pub expressions: BTreeMap<u32, String>,
    /// Name to instruction indexes awaiting an appended id.
    pub unresolved: BTreeMap<String, Vec<u32>>,
    /// Recoverable diagnostics gathered during the walk.
    pub diagnostics: Vec<Diagnostic>,
}

/// The line walker.
#[derive(Debug)]
pub struct ModuleBuilder {
    module: String,
    line_no: u32,
    code: Vec<Vec<u8>>,
    include_blobs: Vec<Vec<u8>>,
    include_segments: Vec<DataSegment>,
    line_index: BTreeMap<u32, u32>,
    forward_jumps: BTreeMap<u32, Vec<u32>>,
    brackets: Vec<Bracket>,
    vars: BTreeMap<String, u32>,
    var_order: Vec<String>,
    owned_vars: BTreeSet<String>,
    procs: BTreeMap<String, u32>,
    proc_order: Vec<String>,
    expressions: BTreeMap<u32, String>,
    unresolved: BTreeMap<String, Vec<u32>>,
    diagnostics: Vec<Diagnostic>,
}

impl ModuleBuilder {
    /// Creates a builder for the named module.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            line_no: 0,
            code: Vec::new(),
            include_blobs: Vec::new(),
            include_segments: Vec::new(),
            line_index: BTreeMap::new(),
            forward_jumps: BTreeMap::new(),
            brackets: Vec::new(),
            vars: BTreeMap::new(),
            var_order: Vec::new(),
            owned_vars: BTreeSet::new(),
            procs: BTreeMap::new(),
            proc_order: Vec::new(),
            expressions: BTreeMap::new(),
            unresolved: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Current instruction index, i.e. the count of emitted blobs.
    fn ip(&self) -> u32 {
        self.code.len() as u32
    }

    fn diagnostic(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            kind,
            module: self.module.clone(),
            line: Some(self.line_no),
            message: message.into(),
        });
    }

    fn var_id(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.vars.get(name) {
            return id;
        }
        let id = self.var_order.len() as u32;
        self.vars.insert(name.to_string(), id);
        self.var_order.push(name.to_string());
        id
    }

    fn proc_id(&mut self, name: &str) -> u32 {
        if let Some(&id) = self.procs.get(name) {
            return id;
        }
        let id = self.proc_order.len() as u32;
        self.procs.insert(name.to_string(), id);
        self.proc_order.push(name.to_string());
        id
    }

    fn defer_name(&mut self, name: &str, index: u32) {
        self.unresolved
            .entry(name.to_string())
            .or_default()
            .push(index);
    }

    /// Processes one raw source line.
    pub fn add_line(
        &mut self,
        raw: &str,
        loader: &mut dyn IncludeLoader,
    ) -> Result<(), BuildError> {
        self.line_no += 1;

        // Forward-jump requests targeting this line patch to the index the
        // line is about to occupy.
        if let Some(pending) = self.forward_jumps.remove(&self.line_no) {
            let target = self.ip() as i32;
            for index in pending {
                patch_i32(&mut self.code[index as usize], 1, target);
            }
        }
        self.line_index.insert(self.line_no, self.ip());

        match recognize(raw) {
            Recognized::Blank => {
                self.emit_nop();
                Ok(())
            }
            Recognized::Unrecognized => {
                self.diagnostic(DiagnosticKind::Parse, format!("unrecognized line: {raw}"));
                self.emit_nop();
                Ok(())
            }
            Recognized::Command(command) => self.emit_command(command, loader),
        }
    }

    fn emit_command(
        &mut self,
        command: Command,
        loader: &mut dyn IncludeLoader,
    ) -> Result<(), BuildError> {
        match command {
            Command::Set { name, source, ty } => self.emit_set(&name, source, ty),
            Command::Push { name } => self.emit_push(&name),
            Command::WriteLiteral { text } => self.emit_write_literal(&text),
            Command::WriteVar { name } => self.emit_write_var(&name),
            Command::Input { name, ty } => self.emit_input(&name, ty),
            Command::Jump { line } => self.emit_jump(line),
            Command::Define { name } => self.emit_define(&name),
            Command::Ret => self.emit_plain(op::RET),
            Command::Call { name } => self.emit_call(&name),
            Command::End => self.emit_end(),
            Command::IfBlock { cond } => {
                let index = self.emit_if(cond, -1);
                self.brackets.push(Bracket::If { if_index: index });
            }
            Command::ElseMarker => self.emit_else_marker(),
            Command::IfInline { cond, left, right } => self.emit_if_inline(cond, left, right),
            Command::Include { path } => self.emit_include(&path, loader)?,
        }
        Ok(())
    }

    fn emit_nop(&mut self) {
        self.code.push(vec![0x00]);
    }

    fn emit_plain(&mut self, opcode: u8) {
        self.code.push(vec![opcode << 4]);
    }

    fn emit_set(&mut self, name: &str, source: SetSource, ty: ValueType) {
        if is_reserved(name) {
            self.diagnostic(
                DiagnosticKind::Parse,
                format!("{name} is reserved and cannot be assigned"),
            );
            self.emit_nop();
            return;
        }

        let index = self.ip();
        self.owned_vars.insert(name.to_string());
        let var = self.var_id(name);

        match source {
            SetSource::Literal(text) => {
                let Some(value) = parse_literal(&text, ty) else {
                    self.diagnostic(
                        DiagnosticKind::Parse,
                        format!("literal {text} does not parse as {ty}"),
                    );
                    self.emit_nop();
                    return;
                };
                let mut blob = vec![op::SET << 4 | ty.tag()];
                push_u32(&mut blob, var);
                if let Err(err) = push_value(&mut blob, &value) {
                    self.diagnostic(DiagnosticKind::Parse, err.to_string());
                    self.emit_nop();
                    return;
                }
                self.code.push(blob);
            }
            SetSource::Linked(target) => {
                let mut blob = vec![op::SET << 4 | ty.tag() | flag::SET_LINKED];
                push_u32(&mut blob, var);
                self.code.push(blob);
                self.defer_name(&target, index);
            }
            SetSource::Expression(text) => {
                let mut blob = vec![op::SET << 4 | ty.tag() | flag::SET_EXPR];
                push_u32(&mut blob, var);
                self.code.push(blob);
                self.expressions.insert(index, text);
            }
        }
    }

    fn emit_push(&mut self, name: &str) {
        let index = self.ip();
        self.code.push(vec![op::PUSH << 4]);
        self.defer_name(name, index);
    }

    fn emit_write_literal(&mut self, text: &str) {
        let mut blob = vec![op::WRITE << 4];
        if let Err(err) = push_str8(&mut blob, text) {
            self.diagnostic(DiagnosticKind::Parse, err.to_string());
            self.emit_nop();
            return;
        }
        self.code.push(blob);
    }

    fn emit_write_var(&mut self, name: &str) {
        let index = self.ip();
        self.code.push(vec![op::WRITE << 4 | flag::WRITE_VAR]);
        self.defer_name(name, index);
    }

    fn emit_input(&mut self, name: &str, ty: ValueType) {
        if is_reserved(name) {
            self.diagnostic(
                DiagnosticKind::Parse,
                format!("{name} is reserved and cannot be assigned"),
            );
            self.emit_nop();
            return;
        }
        self.owned_vars.insert(name.to_string());
        let var = self.var_id(name);
        let mut blob = vec![op::INPUT << 4 | ty.tag()];
        push_u32(&mut blob, var);
        self.code.push(blob);
    }

    fn emit_jump(&mut self, line: u32) {
        let target = match self.line_index.get(&line) {
            Some(&index) => index as i32,
            None => {
                let index = self.ip();
                self.forward_jumps.entry(line).or_default().push(index);
                -1
            }
        };
        let mut blob = vec![op::JUMP << 4];
        push_i32(&mut blob, target);
        self.code.push(blob);
    }

    fn emit_define(&mut self, name: &str) {
        if is_reserved(name) {
            self.diagnostic(
                DiagnosticKind::Parse,
                format!("{name} is reserved and cannot name a procedure"),
            );
            self.emit_nop();
            return;
        }
        let index = self.ip();
        let proc = self.proc_id(name);

        let mut blob = vec![op::DEFINE << 4];
        push_u32(&mut blob, proc);
        push_i32(&mut blob, (index + 2) as i32);
        self.code.push(blob);

        // Companion jump over the body; patched when the END arrives.
        let mut jump = vec![op::JUMP << 4];
        push_i32(&mut jump, -1);
        self.code.push(jump);
        self.brackets.push(Bracket::Define {
            jump_index: index + 1,
        });
    }

    fn emit_call(&mut self, name: &str) {
        let index = self.ip();
        self.code.push(vec![op::CALL << 4]);
        self.defer_name(name, index);
    }

    fn emit_if(&mut self, cond: CondSource, target: i32) -> u32 {
        let index = self.ip();
        match cond {
            CondSource::Var(name) => {
                let mut blob = vec![op::IF << 4];
                push_i32(&mut blob, target);
                self.code.push(blob);
                self.defer_name(&name, index);
            }
            CondSource::Expression(text) => {
                let mut blob = vec![op::IF << 4 | flag::IF_EXPR];
                push_i32(&mut blob, target);
                self.code.push(blob);
                self.expressions.insert(index, text);
            }
        }
        index
    }

    fn emit_else_marker(&mut self) {
        match self.brackets.pop() {
            Some(Bracket::If { if_index }) => {
                let jump_index = self.ip();
                let mut jump = vec![op::JUMP << 4];
                push_i32(&mut jump, -1);
                self.code.push(jump);
                self.emit_plain(op::ELSE);
                self.brackets.push(Bracket::Else {
                    if_index,
                    jump_index,
                    marker_index: jump_index + 1,
                });
            }
            other => {
                if let Some(entry) = other {
                    self.brackets.push(entry);
                }
                self.diagnostic(DiagnosticKind::Parse, "END ? without an open IF");
                self.emit_nop();
            }
        }
    }

    fn emit_end(&mut self) {
        match self.brackets.pop() {
            None => self.emit_plain(op::EOF),
            Some(Bracket::Define { jump_index }) => {
                let ret_index = self.ip();
                self.emit_plain(op::RET);
                patch_i32(
                    &mut self.code[jump_index as usize],
                    1,
                    (ret_index + 1) as i32,
                );
            }
            Some(Bracket::If { if_index }) => {
                let end_index = self.ip() as i32;
                self.emit_plain(op::END);
                patch_i32(&mut self.code[if_index as usize], 1, end_index);
            }
            Some(Bracket::Else {
                if_index,
                jump_index,
                marker_index,
            }) => {
                let end_index = self.ip() as i32;
                self.emit_plain(op::END);
                patch_i32(&mut self.code[if_index as usize], 1, marker_index as i32);
                patch_i32(&mut self.code[jump_index as usize], 1, end_index);
            }
        }
    }

    /// Expands `IF cond : left ? right` in place:
    /// IF / left / JUMP / right / END.
    fn emit_if_inline(&mut self, cond: CondSource, left: String, right: Option<String>) {
        let index = self.ip();
        self.emit_if(cond, (index + 3) as i32);
        self.emit_inline_arm(&left);

        let mut jump = vec![op::JUMP << 4];
        push_i32(&mut jump, (index + 4) as i32);
        self.code.push(jump);

        match right {
            Some(text) => self.emit_inline_arm(&text),
            None => self.emit_nop(),
        }
        self.emit_plain(op::END);
    }

    fn emit_inline_arm(&mut self, text: &str) {
        match recognize(text) {
            Recognized::Command(command) if inline_allowed(&command) => {
                // Inline arms never open brackets or include, so the
                // loader seam is unreachable here.
                struct NoIncludes;
                impl IncludeLoader for NoIncludes {
                    fn load(&mut self, path: &str) -> Result<DataSegment, BuildError> {
                        Err(BuildError::include(format!(
                            "include of {path} inside an inline IF"
                        )))
                    }
                }
                // emit_command only errs through the loader.
                let _ = self.emit_command(command, &mut NoIncludes);
            }
            Recognized::Blank => self.emit_nop(),
            _ => {
                self.diagnostic(
                    DiagnosticKind::Parse,
                    format!("inline IF arm is not a simple command: {text}"),
                );
                self.emit_nop();
            }
        }
    }

    fn emit_include(
        &mut self,
        path: &str,
        loader: &mut dyn IncludeLoader,
    ) -> Result<(), BuildError> {
        let segment = loader.load(path)?;
        let index = self.include_segments.len() as u32;

        let mut blob = vec![op::INCLUDE << 4];
        push_u32(&mut blob, index);
        push_str8(&mut blob, path).map_err(BuildError::from)?;
        self.include_blobs.push(blob);
        self.include_segments.push(segment);
        log::debug!("{}: include[{index}] = {path}", self.module);
        Ok(())
    }

    /// Finishes the walk: drains open brackets, guarantees the trailing
    /// EOF, and patches leftover forward jumps to it.
    pub fn finish(mut self) -> BuilderOutput {
        while let Some(bracket) = self.brackets.pop() {
            let message = match bracket {
                Bracket::Define { .. } => "DEFINE without END",
                Bracket::If { .. } | Bracket::Else { .. } => "IF without END",
            };
            self.diagnostic(DiagnosticKind::Parse, message);
        }

        if self.code.last().map(|blob| blob[0]) != Some(op::EOF << 4) {
            self.emit_plain(op::EOF);
        }
        let eof_index = (self.code.len() - 1) as i32;

        let leftover: Vec<u32> = self.forward_jumps.values().flatten().copied().collect();
        for index in leftover {
            patch_i32(&mut self.code[index as usize], 1, eof_index);
        }

        BuilderOutput {
            module: self.module,
            code: self.code,
            include_blobs: self.include_blobs,
            include_segments: self.include_segments,
            vars: self.vars,
            var_order: self.var_order,
            owned_vars: self.owned_vars,
            procs: self.procs,
            proc_order: self.proc_order,
            expressions: self.expressions,
            unresolved: self.unresolved,
            diagnostics: self.diagnostics,
        }
    }
}

fn inline_allowed(command: &Command) -> bool {
    matches!(
        command,
        Command::Set { .. }
            | Command::Push { .. }
            | Command::WriteLiteral { .. }
            | Command::WriteVar { .. }
            | Command::Input { .. }
            | Command::Jump { .. }
            | Command::Ret
            | Command::Call { .. }
    )
}

/// Parses a SET literal against its declared type.
pub fn parse_literal(text: &str, ty: ValueType) -> Option<Value> {
    match ty {
        ValueType::Bool => match text {
            "TRUE" => Some(Value::Bool(true)),
            "FALSE" => Some(Value::Bool(false)),
            _ => None,
        },
        ValueType::Int => text.parse::<i32>().ok().map(Value::Int),
        ValueType::Float => text.parse::<f32>().ok().map(Value::Float),
        ValueType::Str => {
            let inner = text
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .unwrap_or(text);
            Some(Value::Str(inner.to_string()))
        }
    }
}

fn push_value(blob: &mut Vec<u8>, value: &Value) -> Result<(), crate::module::FormatError> {
    match value {
        Value::Bool(b) => blob.push(u8::from(*b)),
        Value::Int(n) => push_i32(blob, *n),
        Value::Float(x) => push_f32(blob, *x),
        Value::Str(s) => push_str8(blob, s)?,
        // Doubles exist only inside expression evaluation.
        Value::Double(x) => push_f32(blob, *x as f32),
    }
    Ok(())
}
