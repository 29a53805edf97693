//! Grammar tables for the lattice configuration language.
//!
//! The configuration parser is table-driven: for every state there is an
//! ordered list of [`TokenDescriptor`]s describing which tokens are
//! acceptable and where each one leads. The tables, the [`State`] enum, and
//! the [`CallId`] handler enum are generated at build time from the
//! declarative grammar in `spec/config.grammar`; the descriptor types below
//! are the hand-written runtime surface they are expressed in.
//!
//! Descriptor order within a table is semantically significant: the parser
//! tries descriptors in order and the first match wins, with no
//! longest-match rule across descriptors.

#![warn(missing_docs)]

/// A recognizable token within a state's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMatch {
    /// Case-insensitive literal spelling.
    Literal(&'static str),
    /// Bareword: terminated by whitespace, `]`, `,`, `;`, or end of line.
    /// May be double-quoted, in which case it follows string quoting rules.
    Word,
    /// Quoted string, or the unquoted remainder of the line.
    Str,
    /// Signed decimal integer.
    Number,
    /// The rest of the current line including its terminator.
    Line,
    /// End of directive: newline, carriage return, or end of input.
    End,
    /// Recovery marker. Never matched against input; consulted only when
    /// the recovery engine searches for a resynchronization point.
    Error,
}

impl TokenMatch {
    /// How this token is rendered in "Expected one of these tokens"
    /// messages: literals single-quoted, token kinds angle-bracketed.
    pub fn display_name(&self) -> String {
        match self {
            TokenMatch::Literal(spelling) => format!("'{spelling}'"),
            TokenMatch::Word => "<word>".to_string(),
            TokenMatch::Str => "<string>".to_string(),
            TokenMatch::Number => "<number>".to_string(),
            TokenMatch::Line => "<line>".to_string(),
            TokenMatch::End => "<end>".to_string(),
            TokenMatch::Error => "<error>".to_string(),
        }
    }
}

/// Where a matched descriptor sends the parser next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState {
    /// Transition directly to a state.
    Go(State),
    /// Invoke a handler. The handler receives `then` as the default follow
    /// state and may override it before the transition commits.
    Call {
        /// The handler to invoke.
        call: CallId,
        /// Default follow state handed to the handler.
        then: State,
    },
}

/// One entry in a state's token table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDescriptor {
    /// The token to recognize.
    pub token: TokenMatch,
    /// Capture identifier for the matched value; `None` matches without
    /// capturing.
    pub identifier: Option<&'static str>,
    /// Transition taken when the token matches.
    pub next: NextState,
}

include!(concat!(env!("OUT_DIR"), "/generated_tables.rs"));
