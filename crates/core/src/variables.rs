//! Variable preprocessing.
//!
//! Configuration files may declare textual variables with
//! `set $name value`; every later occurrence of `$name` is replaced before
//! the parser sees the input. Substitution is purely textual and
//! case-insensitive — the `set` lines themselves stay in the buffer and
//! are skipped by the grammar.

use crate::parser::ParseContext;
use lattice_cfg_diagnostics::{Code, Diagnostic};

#[derive(Debug)]
struct Variable {
    key: String,
    value: String,
}

/// Collect `set $name value` assignments from `input` and return the text
/// with every occurrence substituted.
///
/// Malformed assignments produce warning diagnostics and are skipped. When
/// the same variable is assigned twice, the later assignment wins.
pub fn expand_variables(
    input: &str,
    context: &mut ParseContext,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let variables = collect_assignments(input, context, diagnostics);
    substitute(input, &variables)
}

fn collect_assignments(
    input: &str,
    context: &mut ParseContext,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Variable> {
    let mut warn = |code: Code, line_number: usize, message: String| {
        context.has_warnings = true;
        diagnostics.push(Diagnostic::new(code, message).at_line(line_number));
    };

    let mut variables: Vec<Variable> = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line_number = idx + 1;
        let trimmed = line.trim_start_matches([' ', '\t']);
        let (head, rest) = match trimmed.split_once([' ', '\t']) {
            Some(parts) => parts,
            None => (trimmed, ""),
        };
        if !head.eq_ignore_ascii_case("set") {
            continue;
        }

        let assignment = rest.trim_start_matches([' ', '\t']);
        if !assignment.starts_with('$') {
            warn(
                Code::VarBadName,
                line_number,
                format!("malformed variable assignment {line:?}: name has to start with $"),
            );
            continue;
        }

        let (key, value) = match assignment.split_once([' ', '\t']) {
            Some((key, value)) => (key, value.trim_start_matches([' ', '\t'])),
            None => {
                warn(
                    Code::VarMissingValue,
                    line_number,
                    format!("malformed variable assignment {line:?}: need a value"),
                );
                continue;
            }
        };

        match variables
            .iter_mut()
            .find(|v| v.key.eq_ignore_ascii_case(key))
        {
            Some(existing) => existing.value = value.to_string(),
            None => variables.push(Variable {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }
    variables
}

/// Replace every case-insensitive occurrence of a variable key. At each
/// position the longest matching key wins, so `$mode` is never clobbered
/// by a shorter `$mod`.
fn substitute(input: &str, variables: &[Variable]) -> String {
    if variables.is_empty() {
        return input.to_string();
    }

    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut segment_start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        let matched = variables
            .iter()
            .filter(|v| matches_at(bytes, pos, &v.key))
            .max_by_key(|v| v.key.len());
        match matched {
            Some(variable) => {
                out.push_str(&input[segment_start..pos]);
                out.push_str(&variable.value);
                pos += variable.key.len();
                segment_start = pos;
            }
            None => pos += 1,
        }
    }
    out.push_str(&input[segment_start..]);
    out
}

fn matches_at(bytes: &[u8], pos: usize, key: &str) -> bool {
    bytes
        .get(pos..pos + key.len())
        .is_some_and(|window| window.eq_ignore_ascii_case(key.as_bytes()))
}
