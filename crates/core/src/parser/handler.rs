//! The boundary between the parser driver and semantic callbacks.

use crate::parser::ParseContext;
use crate::parser::stack::{Value, ValueStack};
use lattice_cfg_diagnostics::{Diagnostic, Severity};
use lattice_cfg_grammar::{CallId, State};

/// What a handler sees during a `call` edge: read access to the captured
/// values plus the writable slots it may use — the diagnostic stream, the
/// parse context flags, and the follow state.
pub struct HandlerCtx<'p> {
    pub(crate) stack: &'p ValueStack,
    /// The caller-supplied parse context.
    pub context: &'p mut ParseContext,
    /// Diagnostic stream for this parse.
    pub diagnostics: &'p mut Vec<Diagnostic>,
    /// The state the driver commits after the handler returns. Pre-set to
    /// the descriptor's declared follow state; overwrite it to redirect the
    /// driver (e.g. to pop out of a nested context early).
    pub next_state: State,
}

impl HandlerCtx<'_> {
    /// The string captured under `identifier`, if any.
    pub fn string(&self, identifier: &str) -> Option<&str> {
        self.stack.get_string(identifier)
    }

    /// The integer captured under `identifier`, or 0 when absent.
    pub fn long(&self, identifier: &str) -> i64 {
        self.stack.get_long(identifier)
    }

    /// Captured `(identifier, value)` pairs in push order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.stack.entries()
    }

    /// Record a diagnostic, raising the context flag its severity implies.
    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Error => self.context.has_errors = true,
            Severity::Warn => self.context.has_warnings = true,
        }
        self.diagnostics.push(diagnostic);
    }
}

/// Semantic callbacks invoked on `call` edges.
///
/// Captured values are valid only for the duration of the call; a handler
/// that needs one later must copy it out (the borrows on [`HandlerCtx`]
/// enforce this).
pub trait Handlers {
    /// Invoked when a `call` edge is taken; `call` selects the directive
    /// handler.
    fn call(&mut self, call: CallId, ctx: &mut HandlerCtx<'_>);

    /// Invoked after every `end` token, once a directive (or blank line)
    /// has been terminated, so the semantic side can reinitialize any
    /// per-directive matching context. The default does nothing.
    fn end_of_directive(&mut self) {}
}
