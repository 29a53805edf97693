//! Terminal rendering for diagnostics.
//!
//! Pretty mode draws one ariadne report per spanned diagnostic, so the
//! offending region of the (variable-expanded) config is underlined in
//! place. Diagnostics without a span — the semantic checks and the
//! preprocessor warnings — print as single lines, carrying their source
//! line when the reporter knew it. JSON consumers never come through this
//! module; they get the diagnostics' own serialization.

use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use lattice_cfg_diagnostics::{Code, Diagnostic, Severity};

/// What the underline label says for each code. The report header already
/// shows the occurrence message, so the label names the region itself.
fn label_text(code: Code) -> &'static str {
    match code {
        Code::Syntax => "no accepted token matches from here",
        Code::InvalidValue => "this value is not accepted",
        Code::DuplicateBinding => "this combination is already bound",
        Code::VarBadName => "variable names start with $",
        Code::VarMissingValue => "assignment is missing a value",
    }
}

fn palette(severity: Severity) -> (ReportKind<'static>, Color) {
    match severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warn => (ReportKind::Warning, Color::Yellow),
    }
}

/// Render diagnostics against the expanded source on stderr.
pub(crate) fn render_pretty(source: &str, filename: &str, diagnostics: &[Diagnostic]) {
    let mut cache = (filename, Source::from(source));
    for diag in diagnostics {
        let Some(span) = diag.span else {
            eprintln!("{diag}");
            continue;
        };

        let (kind, color) = palette(diag.severity());
        let end = span.end.min(source.len());
        let start = span.start.min(end);
        Report::build(kind, (filename, start..end))
            .with_code(diag.id())
            .with_message(&diag.message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(label_text(diag.code))
                    .with_color(color),
            )
            .with_help(diag.explain())
            .finish()
            .eprint(&mut cache)
            .ok();
    }
}

/// One closing verdict line for `check`, on stderr.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    let errors = diagnostics
        .iter()
        .filter(|d| d.severity() == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;

    let verdict = if errors > 0 {
        format!("config has problems ({})", tally(errors, warnings)).fg(Color::Red)
    } else if warnings > 0 {
        format!("config loads with {}", tally(errors, warnings)).fg(Color::Yellow)
    } else {
        "config OK".to_string().fg(Color::Green)
    };
    eprintln!("{verdict}");
}

fn tally(errors: usize, warnings: usize) -> String {
    fn count(n: usize, noun: &str) -> String {
        if n == 1 {
            format!("1 {noun}")
        } else {
            format!("{n} {noun}s")
        }
    }
    match (errors, warnings) {
        (e, 0) => count(e, "error"),
        (0, w) => count(w, "warning"),
        (e, w) => format!("{}, {}", count(e, "error"), count(w, "warning")),
    }
}
