//! Error reporting: the expected-token message, source context rendering,
//! and the machine-readable reply record.

use lattice_cfg_grammar::{TokenDescriptor, TokenMatch};
use serde::{Deserialize, Serialize};

/// Machine-readable record emitted for each syntax error.
///
/// The field names are part of the wire format consumed by IPC clients;
/// do not rename them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Always `false` for parse errors.
    pub success: bool,
    /// Distinguishes parse errors from other failures.
    pub parse_error: bool,
    /// The human-readable message.
    pub error: String,
    /// The entire original input.
    pub input: String,
    /// Caret underline for the offending line.
    pub errorposition: String,
}

/// Render the expected-token list for a state's table, in descriptor
/// order. Literals are single-quoted, token kinds angle-bracketed, and the
/// internal `error` descriptor is elided.
pub(crate) fn expected_tokens(table: &[TokenDescriptor]) -> String {
    let names: Vec<String> = table
        .iter()
        .filter(|d| d.token != TokenMatch::Error)
        .map(|d| d.token.display_name())
        .collect();
    format!("Expected one of these tokens: {}", names.join(", "))
}

/// Start of the line containing `pos`: the byte after the most recent CR
/// or LF at or before `pos`, or the start of input.
pub(crate) fn start_of_line(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos.min(bytes.len());
    loop {
        if i < bytes.len() && (bytes[i] == b'\n' || bytes[i] == b'\r') {
            return i + 1;
        }
        if i == 0 {
            return 0;
        }
        i -= 1;
    }
}

/// The line starting at `sol`, cut at the next line terminator.
pub(crate) fn single_line(input: &str, sol: usize) -> &str {
    let rest = &input[sol.min(input.len())..];
    let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
    &rest[..end]
}

/// The caret underline for the line starting at `sol`: tab bytes are
/// preserved so columns stay aligned, every other pre-cursor byte becomes
/// a space, and the cursor position through end of line becomes `^`.
pub(crate) fn caret_underline(bytes: &[u8], sol: usize, cursor: usize) -> String {
    let mut out = String::new();
    let mut i = sol;
    while i < bytes.len() && bytes[i] != b'\n' && bytes[i] != b'\r' {
        out.push(if i >= cursor {
            '^'
        } else if bytes[i] == b'\t' {
            '\t'
        } else {
            ' '
        });
        i += 1;
    }
    out
}
