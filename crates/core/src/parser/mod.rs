//! The parser driver: the table-driven match loop, transitions with
//! handler dispatch, and line-granular error recovery.

pub mod handler;
pub mod report;
pub mod stack;
pub mod trail;

use crate::scan;
use handler::{HandlerCtx, Handlers};
use report::ErrorReply;
use stack::ValueStack;
use trail::StateTrail;

use lattice_cfg_diagnostics::{Code, Diagnostic, Span};
use lattice_cfg_grammar::{NextState, State, TokenDescriptor, TokenMatch, tokens};
use serde::Serialize;
use tracing::{debug, error};

/// Caller-supplied parse context: diagnostics metadata plus the aggregate
/// flags the caller reacts to once the parse is over.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseContext {
    /// Source filename, shown in diagnostics output.
    pub filename: String,
    /// Set when any syntax or semantic error was recorded.
    pub has_errors: bool,
    /// Set when any warning was recorded.
    pub has_warnings: bool,
    /// Snapshot of the most recent offending line, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_copy: Option<String>,
}

impl ParseContext {
    /// A fresh context for input read from `filename`.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Default::default()
        }
    }
}

/// Raw outcome of a parse: the diagnostic stream and the wire-format error
/// replies. Semantic output accumulates in the caller's [`Handlers`].
#[derive(Debug, Serialize)]
pub struct ParseResult {
    /// Diagnostics in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// One reply record per syntax error, in source order.
    pub replies: Vec<ErrorReply>,
}

/// Parse `input`, dispatching directive callbacks into `handlers`.
///
/// Never gives up on malformed input: every unparseable line produces one
/// diagnostic (and one [`ErrorReply`]) and parsing resumes at the next
/// line. Panics only on grammar bugs — capture or nesting capacity
/// exhausted, or no recovery state reachable.
pub fn parse_with_handlers(
    input: &str,
    context: &mut ParseContext,
    handlers: &mut dyn Handlers,
) -> ParseResult {
    Parser::new(input, context, handlers).run()
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    cursor: usize,
    /// 1-based line number of the cursor, advanced by `end` and `line`
    /// tokens.
    line: usize,
    state: State,
    stack: ValueStack,
    trail: StateTrail,
    context: &'a mut ParseContext,
    handlers: &'a mut dyn Handlers,
    diagnostics: Vec<Diagnostic>,
    replies: Vec<ErrorReply>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, context: &'a mut ParseContext, handlers: &'a mut dyn Handlers) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            cursor: 0,
            line: 1,
            state: State::Initial,
            stack: ValueStack::default(),
            trail: StateTrail::new(),
            context,
            handlers,
            diagnostics: Vec::new(),
            replies: Vec::new(),
        }
    }

    fn run(mut self) -> ParseResult {
        for (idx, text) in self.input.lines().enumerate() {
            debug!("config line {:>3}: {}", idx + 1, text);
        }

        // The "<=" is intentional: the one-past-the-end position is where
        // the `end` token matches for input without a trailing newline.
        while self.cursor <= self.bytes.len() {
            self.skip_blanks();
            if !self.step() {
                self.recover();
            }
        }

        ParseResult {
            diagnostics: self.diagnostics,
            replies: self.replies,
        }
    }

    /// Skip horizontal whitespace. Newlines are meaningful — they separate
    /// directives — and are left for the `end` token.
    fn skip_blanks(&mut self) {
        while self.cursor < self.bytes.len() && matches!(self.bytes[self.cursor], b' ' | b'\t') {
            self.cursor += 1;
        }
    }

    /// Try every descriptor of the current state in order; the first match
    /// wins. Returns `false` when none matched.
    fn step(&mut self) -> bool {
        for descriptor in tokens(self.state) {
            match descriptor.token {
                TokenMatch::Literal(spelling) => {
                    if let Some(consumed) = scan::literal(self.input, self.cursor, spelling) {
                        if let Some(identifier) = descriptor.identifier {
                            self.stack.push_string(identifier, spelling);
                        }
                        self.cursor += consumed;
                        self.transition(descriptor);
                        return true;
                    }
                }
                TokenMatch::Number => {
                    if let Some((consumed, value)) = scan::number(self.input, self.cursor) {
                        if let Some(identifier) = descriptor.identifier {
                            self.stack.push_long(identifier, value);
                        }
                        self.cursor += consumed;
                        self.transition(descriptor);
                        return true;
                    }
                }
                TokenMatch::Str | TokenMatch::Word => {
                    let matched = if descriptor.token == TokenMatch::Word {
                        scan::word(self.input, self.cursor)
                    } else {
                        scan::string(self.input, self.cursor)
                    };
                    if let Some((consumed, value)) = matched {
                        if let Some(identifier) = descriptor.identifier {
                            self.stack.push_string(identifier, &value);
                        }
                        self.cursor += consumed;
                        self.transition(descriptor);
                        return true;
                    }
                }
                TokenMatch::Line => {
                    self.cursor += scan::line_rest(self.input, self.cursor);
                    self.transition(descriptor);
                    self.line += 1;
                    self.cursor += 1;
                    return true;
                }
                TokenMatch::End => {
                    if scan::at_end(self.input, self.cursor) {
                        self.transition(descriptor);
                        // A directive just ended: let the semantic side
                        // reset its per-directive matching context.
                        self.handlers.end_of_directive();
                        self.line += 1;
                        self.cursor += 1;
                        return true;
                    }
                }
                // Recovery-only; never matched against input.
                TokenMatch::Error => {}
            }
        }
        false
    }

    /// Commit the transition a matched descriptor prescribes, invoking the
    /// handler on `call` edges.
    fn transition(&mut self, descriptor: &TokenDescriptor) {
        let next = match descriptor.next {
            NextState::Go(state) => state,
            NextState::Call { call, then } => {
                let mut ctx = HandlerCtx {
                    stack: &self.stack,
                    context: &mut *self.context,
                    diagnostics: &mut self.diagnostics,
                    next_state: then,
                };
                self.handlers.call(call, &mut ctx);
                let next = ctx.next_state;
                self.stack.clear();
                next
            }
        };

        self.state = next;
        if next == State::Initial {
            self.stack.clear();
        }
        self.trail.record(next);
    }

    /// No descriptor matched: report the error, then resynchronize at the
    /// nearest enclosing state that admits an `error` token and skip to
    /// the next newline.
    fn recover(&mut self) {
        self.report();

        // Skip the rest of this line. The newline itself is left in place
        // for the recovery state's `end` token.
        while self.cursor <= self.bytes.len() {
            if self.cursor < self.bytes.len() && self.bytes[self.cursor] == b'\n' {
                break;
            }
            self.cursor += 1;
        }

        self.stack.clear();

        let descriptor = self
            .trail
            .states()
            .iter()
            .rev()
            .find_map(|&state| tokens(state).iter().find(|d| d.token == TokenMatch::Error));
        match descriptor {
            Some(d) => self.transition(d),
            None => panic!(
                "grammar bug: no <error> token reachable from state {}",
                self.state.name()
            ),
        }
    }

    /// Build the expected-token message, log it with source context, and
    /// record the diagnostic and the wire-format reply.
    fn report(&mut self) {
        let len = self.bytes.len();
        let message = report::expected_tokens(tokens(self.state));

        let sol = report::start_of_line(self.bytes, self.cursor.min(len));
        let position = report::caret_underline(self.bytes, sol, self.cursor);
        let error_line = report::single_line(self.input, sol);

        error!("{message}");
        error!("(in file {})", self.context.filename);
        if self.line > 1 {
            let prev = if sol >= 2 {
                report::start_of_line(self.bytes, sol - 2)
            } else {
                0
            };
            if self.line > 2 {
                let prev2 = if prev >= 2 {
                    report::start_of_line(self.bytes, prev - 2)
                } else {
                    0
                };
                error!(
                    "Line {:>3}: {}",
                    self.line - 2,
                    report::single_line(self.input, prev2)
                );
            }
            error!(
                "Line {:>3}: {}",
                self.line - 1,
                report::single_line(self.input, prev)
            );
        }
        error!("Line {:>3}: {}", self.line, error_line);
        error!("          {position}");
        let mut after = sol;
        for offset in 0..2 {
            let Some(nl) = self.input[after.min(len)..].find('\n').map(|i| after + i) else {
                break;
            };
            if nl + 1 >= len {
                break;
            }
            after = nl + 1;
            error!(
                "Line {:>3}: {}",
                self.line + offset + 1,
                report::single_line(self.input, after)
            );
        }

        self.context.has_errors = true;
        self.context.line_copy = Some(error_line.to_string());

        let eol = sol + position.len();
        self.diagnostics.push(
            Diagnostic::new(Code::Syntax, message.clone())
                .at_line(self.line)
                .with_span(Span {
                    start: self.cursor.min(eol),
                    end: eol,
                }),
        );
        self.replies.push(ErrorReply {
            success: false,
            parse_error: true,
            error: message,
            input: self.input.to_string(),
            errorposition: position,
        });
    }
}
