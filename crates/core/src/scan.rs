//! Lexer primitives.
//!
//! Each recognizer inspects the input at a byte position and reports how
//! many bytes it would consume, together with any captured value, or `None`
//! when it does not match. Which recognizer runs is decided by the parser
//! driver from the current state's token table; there is no free-running
//! tokenizer.
//!
//! Positions at or past the end of the input read as a NUL byte, so the
//! one-past-the-end position is a legitimate place for [`at_end`] to match.

/// Byte at `pos`, with positions at or past the end reading as NUL.
fn byte_at(bytes: &[u8], pos: usize) -> u8 {
    bytes.get(pos).copied().unwrap_or(0)
}

/// Case-insensitive literal prefix match. Returns the consumed byte count.
pub fn literal(input: &str, pos: usize, spelling: &str) -> Option<usize> {
    let rest = input.as_bytes().get(pos..)?;
    let lit = spelling.as_bytes();
    if rest.len() >= lit.len() && rest[..lit.len()].eq_ignore_ascii_case(lit) {
        Some(lit.len())
    } else {
        None
    }
}

/// Signed decimal integer. Requires at least one digit; overflow is no
/// match.
pub fn number(input: &str, pos: usize) -> Option<(usize, i64)> {
    let bytes = input.as_bytes();
    let mut i = pos;
    let negative = match byte_at(bytes, i) {
        b'-' => {
            i += 1;
            true
        }
        b'+' => {
            i += 1;
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    let mut digits = 0usize;
    while byte_at(bytes, i).is_ascii_digit() {
        let digit = i64::from(byte_at(bytes, i) - b'0');
        value = value.checked_mul(10)?;
        value = if negative {
            value.checked_sub(digit)?
        } else {
            value.checked_add(digit)?
        };
        digits += 1;
        i += 1;
    }

    if digits == 0 {
        return None;
    }
    Some((i - pos, value))
}

/// Quoted string, or the unquoted remainder of the line.
pub fn string(input: &str, pos: usize) -> Option<(usize, String)> {
    text(input, pos, false)
}

/// Quoted string, or a bareword terminated by whitespace, `]`, `,`, `;`,
/// or end of line.
pub fn word(input: &str, pos: usize) -> Option<(usize, String)> {
    text(input, pos, true)
}

fn is_word_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b']' | b',' | b';' | b'\r' | b'\n' | 0)
}

fn text(input: &str, pos: usize, bareword: bool) -> Option<(usize, String)> {
    let bytes = input.as_bytes();
    if byte_at(bytes, pos) == b'"' {
        // Scan for the closing quote, looking one byte back to honor the
        // \" escape. A quote preceded by a backslash never closes the
        // string, even when that backslash is itself escaped; a string
        // ending in `\\"` therefore stays open until the next quote or
        // end of input.
        let start = pos + 1;
        let mut i = start;
        while i < bytes.len() && !(bytes[i] == b'"' && bytes[i - 1] != b'\\') {
            i += 1;
        }
        if i == start {
            return None;
        }
        let consumed = (i - pos) + usize::from(i < bytes.len());
        Some((consumed, unescape(&input[start..i])))
    } else {
        let mut i = pos;
        if bareword {
            while !is_word_delimiter(byte_at(bytes, i)) {
                i += 1;
            }
        } else {
            while !matches!(byte_at(bytes, i), 0 | b'\r' | b'\n') {
                i += 1;
            }
        }
        if i == pos {
            return None;
        }
        Some((i - pos, unescape(&input[pos..i])))
    }
}

/// Collapse `\"` to `"`. Every other backslash is preserved verbatim so
/// that regex-bearing values (`\w` and friends) survive untouched.
fn unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut seg = 0usize;
    let mut i = 0usize;
    while i + 1 < bytes.len() {
        if bytes[i] == b'\\' && bytes[i + 1] == b'"' {
            out.push_str(&raw[seg..i]);
            seg = i + 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    out.push_str(&raw[seg..]);
    out
}

/// Byte count from `pos` to (not including) the next CR, LF, or end of
/// input.
pub fn line_rest(input: &str, pos: usize) -> usize {
    let bytes = input.as_bytes();
    let mut i = pos;
    while !matches!(byte_at(bytes, i), 0 | b'\r' | b'\n') {
        i += 1;
    }
    i - pos
}

/// True when the cursor sits on a directive terminator: newline, carriage
/// return, or end of input.
pub fn at_end(input: &str, pos: usize) -> bool {
    matches!(byte_at(input.as_bytes(), pos), 0 | b'\r' | b'\n')
}
