//! Diagnostics for the lattice configuration toolchain.
//!
//! Everything the toolchain can complain about is one of a closed set of
//! [`Code`]s, and each code has a fixed severity and help text: a syntax
//! error is always an error, an out-of-range directive value is always a
//! warning that leaves the built-in default in place. [`Diagnostic`] pairs
//! a code with the specifics of one occurrence — the rendered message, the
//! 1-based source line when the reporter knows it, and the byte span of
//! the offending region when one exists.
//!
//! Severity is two-valued on purpose: it mirrors the parse context's
//! `has_errors` / `has_warnings` flags, which are the only distinction the
//! window manager acts on after a reload.

#![warn(missing_docs)]

use serde::Serialize;
use serde::ser::SerializeMap;
use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration is broken; the caller should surface it.
    Error,
    /// The configuration loads, but part of it was ignored or defaulted.
    Warn,
}

impl Severity {
    /// Lowercase name used in output and serialization.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of diagnostic codes.
///
/// `CFG1xxx` codes come from the parser, `CFG2xxx` from the semantic
/// layer, `CFG3xxx` from the variable preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// No token accepted in the current grammar state matched; the rest of
    /// the line was skipped.
    Syntax,
    /// A directive carried a value outside its accepted set.
    InvalidValue,
    /// The same key combination is bound more than once in one scope.
    DuplicateBinding,
    /// A `set` assignment whose variable name does not start with `$`.
    VarBadName,
    /// A `set` assignment with a name but no value.
    VarMissingValue,
}

impl Code {
    /// Every code. Tests use this to keep `id`/`explain` exhaustive.
    pub const ALL: &'static [Code] = &[
        Code::Syntax,
        Code::InvalidValue,
        Code::DuplicateBinding,
        Code::VarBadName,
        Code::VarMissingValue,
    ];

    /// Stable identifier, e.g. `CFG1001`.
    pub fn id(self) -> &'static str {
        match self {
            Code::Syntax => "CFG1001",
            Code::InvalidValue => "CFG2001",
            Code::DuplicateBinding => "CFG2002",
            Code::VarBadName => "CFG3001",
            Code::VarMissingValue => "CFG3002",
        }
    }

    /// The severity every occurrence of this code carries.
    ///
    /// A syntax error means a directive was lost, and a duplicate binding
    /// means one of the bindings is dead weight; both are errors. The
    /// remaining codes describe input the toolchain recovered from by
    /// ignoring it.
    pub fn severity(self) -> Severity {
        match self {
            Code::Syntax | Code::DuplicateBinding => Severity::Error,
            Code::InvalidValue | Code::VarBadName | Code::VarMissingValue => Severity::Warn,
        }
    }

    /// Help text explaining the code and what the toolchain did about it.
    pub fn explain(self) -> &'static str {
        match self {
            Code::Syntax => {
                "the parser could not match any token accepted in the current \
                 grammar state; the rest of the line was skipped and parsing \
                 resumed at the next directive"
            }
            Code::InvalidValue => {
                "the directive was recognized but its value is not in the \
                 accepted set; the built-in default is kept instead"
            }
            Code::DuplicateBinding => {
                "the same key combination is bound more than once in the same \
                 scope, so only one of the bindings can take effect"
            }
            Code::VarBadName => {
                "variable names must start with a dollar sign, e.g. \
                 `set $mod Mod4`; the assignment was ignored"
            }
            Code::VarMissingValue => {
                "a `set` assignment needs a name and a value separated by \
                 whitespace; the assignment was ignored"
            }
        }
    }
}

/// Byte span of the offending region, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// First byte of the region.
    pub start: usize,
    /// One past the last byte.
    pub end: usize,
}

/// One reported problem: a [`Code`] plus the specifics of the occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Which problem this is. Severity and help text follow from it.
    pub code: Code,
    /// Occurrence-specific message.
    pub message: String,
    /// 1-based source line, when the reporter knows it.
    pub line: Option<usize>,
    /// Byte span of the offending region, when one exists.
    pub span: Option<Span>,
}

impl Diagnostic {
    /// A diagnostic for `code` with no position attached.
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            line: None,
            span: None,
        }
    }

    /// Attach the 1-based source line.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach the byte span of the offending region.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// The code's fixed severity.
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// The code's stable identifier.
    pub fn id(&self) -> &'static str {
        self.code.id()
    }

    /// The code's help text.
    pub fn explain(&self) -> &'static str {
        self.code.explain()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(
                f,
                "{}[{}] line {line}: {}",
                self.severity(),
                self.id(),
                self.message
            ),
            None => write!(f, "{}[{}]: {}", self.severity(), self.id(), self.message),
        }
    }
}

// Serialized by hand so consumers see the id and the derived severity as
// plain fields, and absent positions disappear instead of nulling.
impl Serialize for Diagnostic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", self.id())?;
        map.serialize_entry("severity", self.severity().as_str())?;
        map.serialize_entry("message", &self.message)?;
        if let Some(line) = self.line {
            map.serialize_entry("line", &line)?;
        }
        if let Some(span) = &self.span {
            map.serialize_entry("span", span)?;
        }
        map.end()
    }
}
