//! Per-emission mutable state (§4.E "SSA and name generation", §9 "Global mutable
//! state"): temp/label counters, the string-literal table, and the variable→slot
//! map are threaded through a single [`EmitterContext`] rather than kept as process
//! globals, so two emissions in the same process never interfere.
use crate::trace::CompileTrace;
use crate::types::Type;
use std::collections::HashMap;

/// A local variable's IR storage: the `alloca`'d slot name plus the DataLang type
/// it was declared with (needed to pick the right `load`/`store` IR type and to
/// drive the emitter's own structural type inference over later expressions).
#[derive(Debug, Clone)]
pub struct VarSlot {
    pub slot: String,
    pub ty: Type,
    /// `true` when `slot` is already an SSA value (an inlined lambda parameter
    /// bound directly to its argument) rather than an `alloca`'d address that
    /// reads need to `load` through.
    pub is_value: bool,
}

#[derive(Default, Clone)]
struct Scope {
    vars: HashMap<String, VarSlot>,
}

/// Saved SSA-numbering and scope state for a nested function (a top-level
/// lambda rendered into its own `define` block mid-expression); restoring it
/// resumes the enclosing function's own numbering and locals exactly where
/// they left off.
pub struct FunctionFrame {
    next_temp: usize,
    next_label: usize,
    scopes: Vec<Scope>,
}

pub struct EmitterContext {
    next_temp: usize,
    next_label: usize,
    next_lambda: usize,
    strings: Vec<String>,
    scopes: Vec<Scope>,
    /// Fully rendered `define ...` text for lambdas emitted as private helper
    /// functions, collected here so `ir::mod` can append them after the
    /// function that triggered their creation (§4.E "Lambda lowering").
    lambda_defs: Vec<String>,
    trace: CompileTrace,
}

impl EmitterContext {
    pub fn new() -> Self {
        Self {
            next_temp: 0,
            next_label: 0,
            next_lambda: 0,
            strings: Vec::new(),
            scopes: vec![Scope::default()],
            lambda_defs: Vec::new(),
            trace: CompileTrace::silent(),
        }
    }

    /// Attach the trace sink the emitter should log diagnostics-as-logging
    /// through (e.g. an unresolved symbol falling back to `0`).
    pub fn with_trace(mut self, trace: CompileTrace) -> Self {
        self.trace = trace;
        self
    }

    pub fn trace(&self) -> &CompileTrace {
        &self.trace
    }

    pub fn fresh_temp(&mut self) -> String {
        let id = self.next_temp;
        self.next_temp += 1;
        format!("%t{}", id)
    }

    pub fn fresh_label(&mut self, hint: &str) -> String {
        let id = self.next_label;
        self.next_label += 1;
        format!("L{}.{}", id, hint)
    }

    pub fn fresh_lambda_name(&mut self) -> String {
        let id = self.next_lambda;
        self.next_lambda += 1;
        format!("@lambda.{}", id)
    }

    /// Intern a string literal by content, returning the global name that holds it
    /// (`@.str.N`); repeated literals with identical content share one global.
    pub fn intern_string(&mut self, value: &str) -> String {
        if let Some(pos) = self.strings.iter().position(|s| s == value) {
            return format!("@.str.{}", pos);
        }
        self.strings.push(value.to_string());
        format!("@.str.{}", self.strings.len() - 1)
    }

    pub fn string_table(&self) -> &[String] {
        &self.strings
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn declare_var(&mut self, name: impl Into<String>, slot: impl Into<String>, ty: Type) {
        self.scopes
            .last_mut()
            .expect("emitter context has no scope")
            .vars
            .insert(
                name.into(),
                VarSlot {
                    slot: slot.into(),
                    ty,
                    is_value: false,
                },
            );
    }

    /// Bind `name` directly to the SSA value `operand` (no backing `alloca`),
    /// used for inlined lambda parameters (§4.E "Lambda lowering").
    pub fn declare_value(&mut self, name: impl Into<String>, operand: impl Into<String>, ty: Type) {
        self.scopes
            .last_mut()
            .expect("emitter context has no scope")
            .vars
            .insert(
                name.into(),
                VarSlot {
                    slot: operand.into(),
                    ty,
                    is_value: true,
                },
            );
    }

    pub fn push_lambda_def(&mut self, rendered: String) {
        self.lambda_defs.push(rendered);
    }

    pub fn take_lambda_defs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lambda_defs)
    }

    pub fn lookup_var(&self, name: &str) -> Option<&VarSlot> {
        self.scopes.iter().rev().find_map(|s| s.vars.get(name))
    }

    /// Reset temp/label counters for a fresh function body while keeping the
    /// string table (shared across the whole module) and starting a fresh,
    /// single-scope variable map (a function body never sees an enclosing
    /// function's locals).
    pub fn begin_function(&mut self) {
        self.next_temp = 0;
        self.next_label = 0;
        self.scopes = vec![Scope::default()];
    }

    /// Suspend the enclosing function's numbering/locals and start a fresh
    /// frame for a nested `define` block (a lambda rendered mid-expression).
    /// Labels and temporaries are local to each IR function, so the nested
    /// frame is free to renumber from zero; only the caller's own state needs
    /// preserving across the call.
    pub fn enter_function_frame(&mut self) -> FunctionFrame {
        let frame = FunctionFrame {
            next_temp: self.next_temp,
            next_label: self.next_label,
            scopes: std::mem::replace(&mut self.scopes, vec![Scope::default()]),
        };
        self.next_temp = 0;
        self.next_label = 0;
        frame
    }

    pub fn exit_function_frame(&mut self, frame: FunctionFrame) {
        self.next_temp = frame.next_temp;
        self.next_label = frame.next_label;
        self.scopes = frame.scopes;
    }
}
