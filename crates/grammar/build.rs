//! Build script that compiles `spec/config.grammar` into Rust tables.
//!
//! The grammar file declares, per state, an ordered list of token
//! productions. This script generates `generated_tables.rs` containing the
//! closed `State` enum, the closed `CallId` handler enum, one static
//! descriptor array per state, and the `tokens()` dispatch function. The
//! file is `include!`d at the bottom of `src/lib.rs`.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// A token production as written in the grammar file.
struct Production {
    identifier: Option<String>,
    token: Token,
    target: Target,
}

enum Token {
    Literal(String),
    Word,
    Str,
    Number,
    Line,
    End,
    Error,
}

enum Target {
    Go(String),
    Call { handler: String, then: String },
}

struct StateDef {
    name: String,
    productions: Vec<Production>,
}

fn main() {
    let spec_path = Path::new("spec/config.grammar");
    println!("cargo:rerun-if-changed={}", spec_path.display());

    let text = fs::read_to_string(spec_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", spec_path.display()));

    let states = parse_grammar(&text);
    validate(&states);

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let generated = generate(&states);
    fs::write(Path::new(&out_dir).join("generated_tables.rs"), generated)
        .expect("failed to write generated_tables.rs");
}

// ── Grammar file parsing ────────────────────────────────────────────────

fn parse_grammar(text: &str) -> Vec<StateDef> {
    let mut states: Vec<StateDef> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("state ") {
            let name = rest
                .strip_suffix(':')
                .unwrap_or_else(|| panic!("line {lineno}: state declaration must end with ':'"))
                .trim()
                .to_string();
            assert!(
                states.iter().all(|s| s.name != name),
                "line {lineno}: duplicate state {name}"
            );
            states.push(StateDef {
                name,
                productions: Vec::new(),
            });
            continue;
        }

        let state = states
            .last_mut()
            .unwrap_or_else(|| panic!("line {lineno}: production outside of a state block"));
        state.productions.push(parse_production(line, lineno));
    }

    states
}

fn parse_production(line: &str, lineno: usize) -> Production {
    let (lhs, rhs) = line
        .split_once("->")
        .unwrap_or_else(|| panic!("line {lineno}: production is missing '->'"));
    let (lhs, rhs) = (lhs.trim(), rhs.trim());

    let (identifier, token_text) = match lhs.split_once('=') {
        Some((ident, tok)) => (Some(ident.trim().to_string()), tok.trim()),
        None => (None, lhs),
    };

    let token = if let Some(stripped) = token_text.strip_prefix('\'') {
        let spelling = stripped
            .strip_suffix('\'')
            .unwrap_or_else(|| panic!("line {lineno}: unterminated literal {token_text}"));
        assert!(!spelling.is_empty(), "line {lineno}: empty literal");
        Token::Literal(spelling.to_string())
    } else {
        match token_text {
            "word" => Token::Word,
            "string" => Token::Str,
            "number" => Token::Number,
            "line" => Token::Line,
            "end" => Token::End,
            "error" => Token::Error,
            other => panic!("line {lineno}: unknown token kind {other:?}"),
        }
    };

    let target = if let Some(call) = rhs.strip_prefix("call ") {
        let (handler, then) = call
            .split_once("->")
            .unwrap_or_else(|| panic!("line {lineno}: call target is missing a follow state"));
        Target::Call {
            handler: handler.trim().to_string(),
            then: then.trim().to_string(),
        }
    } else {
        Target::Go(rhs.to_string())
    };

    Production {
        identifier,
        token,
        target,
    }
}

// ── Validation ──────────────────────────────────────────────────────────

fn validate(states: &[StateDef]) {
    assert!(
        states.iter().any(|s| s.name == "INITIAL"),
        "grammar must declare an INITIAL state"
    );

    let initial = states.iter().find(|s| s.name == "INITIAL").unwrap();
    assert!(
        initial
            .productions
            .iter()
            .any(|p| matches!(p.token, Token::Error)),
        "INITIAL must carry an error production for recovery"
    );

    let known: Vec<&str> = states.iter().map(|s| s.name.as_str()).collect();
    for state in states {
        for p in &state.productions {
            let target = match &p.target {
                Target::Go(s) => s,
                Target::Call { then, .. } => then,
            };
            assert!(
                known.contains(&target.as_str()),
                "state {}: transition to undeclared state {target}",
                state.name
            );
        }
    }
}

// ── Code generation ─────────────────────────────────────────────────────

/// `SCREAMING_SNAKE` or `snake_case` → `CamelCase`.
fn camel(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

fn generate(states: &[StateDef]) -> String {
    let mut handlers: Vec<&str> = Vec::new();
    for state in states {
        for p in &state.productions {
            if let Target::Call { handler, .. } = &p.target {
                if !handlers.contains(&handler.as_str()) {
                    handlers.push(handler);
                }
            }
        }
    }

    let mut out = String::from("// Auto-generated from spec/config.grammar — DO NOT EDIT.\n\n");

    // State enum
    out.push_str("/// Parser state, one variant per `state` block in the grammar.\n");
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\n");
    out.push_str("pub enum State {\n");
    for s in states {
        let _ = writeln!(out, "    /// `{}`", s.name);
        let _ = writeln!(out, "    {},", camel(&s.name));
    }
    out.push_str("}\n\n");

    out.push_str("impl State {\n");
    out.push_str("    /// Every state, in grammar declaration order.\n");
    out.push_str("    pub const ALL: &'static [State] = &[\n");
    for s in states {
        let _ = writeln!(out, "        State::{},", camel(&s.name));
    }
    out.push_str("    ];\n\n");
    out.push_str("    /// The grammar-spec spelling of this state.\n");
    out.push_str("    pub fn name(self) -> &'static str {\n");
    out.push_str("        match self {\n");
    for s in states {
        let _ = writeln!(out, "            State::{} => {:?},", camel(&s.name), s.name);
    }
    out.push_str("        }\n    }\n}\n\n");

    // CallId enum
    out.push_str("/// Handler selector for `call` edges, one variant per handler.\n");
    out.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]\n");
    out.push_str("pub enum CallId {\n");
    for h in &handlers {
        let _ = writeln!(out, "    /// `{h}`");
        let _ = writeln!(out, "    {},", camel(h));
    }
    out.push_str("}\n\n");

    out.push_str("impl CallId {\n");
    out.push_str("    /// The grammar-spec spelling of this handler.\n");
    out.push_str("    pub fn name(self) -> &'static str {\n");
    out.push_str("        match self {\n");
    for h in &handlers {
        let _ = writeln!(out, "            CallId::{} => {:?},", camel(h), h);
    }
    out.push_str("        }\n    }\n}\n\n");

    // Per-state descriptor arrays
    for s in states {
        let _ = writeln!(out, "static TOKENS_{}: &[TokenDescriptor] = &[", s.name);
        for p in &s.productions {
            let token = match &p.token {
                Token::Literal(sp) => format!("TokenMatch::Literal({sp:?})"),
                Token::Word => "TokenMatch::Word".to_string(),
                Token::Str => "TokenMatch::Str".to_string(),
                Token::Number => "TokenMatch::Number".to_string(),
                Token::Line => "TokenMatch::Line".to_string(),
                Token::End => "TokenMatch::End".to_string(),
                Token::Error => "TokenMatch::Error".to_string(),
            };
            let identifier = match &p.identifier {
                Some(id) => format!("Some({id:?})"),
                None => "None".to_string(),
            };
            let next = match &p.target {
                Target::Go(t) => format!("NextState::Go(State::{})", camel(t)),
                Target::Call { handler, then } => format!(
                    "NextState::Call {{ call: CallId::{}, then: State::{} }}",
                    camel(handler),
                    camel(then)
                ),
            };
            let _ = writeln!(
                out,
                "    TokenDescriptor {{ token: {token}, identifier: {identifier}, next: {next} }},"
            );
        }
        out.push_str("];\n\n");
    }

    // Dispatch function
    out.push_str("/// The ordered token table for `state`.\n");
    out.push_str("pub fn tokens(state: State) -> &'static [TokenDescriptor] {\n");
    out.push_str("    match state {\n");
    for s in states {
        let _ = writeln!(
            out,
            "        State::{} => TOKENS_{},",
            camel(&s.name),
            s.name
        );
    }
    out.push_str("    }\n}\n");

    out
}
