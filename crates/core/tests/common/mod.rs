//! Shared test helpers for `lattice_cfg_core` integration tests.

#![allow(unreachable_pub)]

use lattice_cfg_core::parser::stack::Value;
use lattice_cfg_core::{HandlerCtx, Handlers, ParseContext, ParseResult, parse_with_handlers};
use lattice_cfg_grammar::{CallId, State};

/// A snapshot of the captured-value stack at the moment of a call.
pub type Snapshot = Vec<(&'static str, Value)>;

/// Records every handler invocation together with a snapshot of the
/// captured values, for asserting on driver behavior without real
/// semantics.
#[derive(Debug, Default)]
pub struct RecordingHandlers {
    /// `(handler, captured values)` per invocation, in order.
    pub calls: Vec<(CallId, Snapshot)>,
    /// How many `end` tokens fired the per-directive reset.
    pub resets: usize,
    /// When set, redirect the named call to the given state.
    pub override_next: Option<(CallId, State)>,
}

impl Handlers for RecordingHandlers {
    fn call(&mut self, call: CallId, ctx: &mut HandlerCtx<'_>) {
        let snapshot: Snapshot = ctx.entries().map(|(id, v)| (id, v.clone())).collect();
        self.calls.push((call, snapshot));
        if let Some((target, state)) = self.override_next {
            if target == call {
                ctx.next_state = state;
            }
        }
    }

    fn end_of_directive(&mut self) {
        self.resets += 1;
    }
}

/// Parse `input` with recording handlers and return everything needed for
/// assertions.
#[allow(dead_code)]
pub fn parse_recorded(input: &str) -> (RecordingHandlers, ParseResult, ParseContext) {
    let mut context = ParseContext::new("<test>");
    let mut handlers = RecordingHandlers::default();
    let result = parse_with_handlers(input, &mut context, &mut handlers);
    (handlers, result, context)
}

/// The string captured under `identifier` in a snapshot.
#[allow(dead_code)]
pub fn str_value<'a>(snapshot: &'a Snapshot, identifier: &str) -> Option<&'a str> {
    snapshot.iter().find_map(|(id, value)| match value {
        Value::Str(s) if *id == identifier => Some(s.as_str()),
        _ => None,
    })
}

/// The integer captured under `identifier` in a snapshot.
#[allow(dead_code)]
pub fn long_value(snapshot: &Snapshot, identifier: &str) -> Option<i64> {
    snapshot.iter().find_map(|(id, value)| match value {
        Value::Long(n) if *id == identifier => Some(*n),
        _ => None,
    })
}
