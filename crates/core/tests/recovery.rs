//! Error reporting and recovery: message formatting, caret underlines,
//! reply records, and resynchronization inside nested contexts.

mod common;

use common::{long_value, parse_recorded, str_value};
use lattice_cfg_diagnostics::Code;
use lattice_cfg_grammar::CallId;

#[test]
fn error_line_is_skipped_and_parsing_resumes() {
    let input = "bogus line here\nworkspace 7\n";
    let (handlers, result, context) = parse_recorded(input);

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.replies.len(), 1);
    assert!(context.has_errors);

    let reply = &result.replies[0];
    assert!(!reply.success);
    assert!(reply.parse_error);
    assert_eq!(reply.input, input);
    // The whole offending line is underlined, from column 0.
    assert_eq!(reply.errorposition, "^^^^^^^^^^^^^^^");
    assert_eq!(result.diagnostics[0].line, Some(1));

    assert_eq!(handlers.calls.len(), 1);
    let (call, snapshot) = &handlers.calls[0];
    assert_eq!(*call, CallId::Workspace);
    assert_eq!(long_value(snapshot, "workspace"), Some(7));
}

#[test]
fn caret_underline_starts_at_the_cursor() {
    let (_, result, _) = parse_recorded("workspace abc\n");
    let reply = &result.replies[0];
    assert_eq!(reply.error, "Expected one of these tokens: <number>");
    assert_eq!(reply.errorposition, "          ^^^");
}

#[test]
fn caret_underline_preserves_tabs() {
    let (_, result, _) = parse_recorded("\tworkspace abc\n");
    assert_eq!(result.replies[0].errorposition, "\t          ^^^");
}

#[test]
fn one_diagnostic_per_offending_line() {
    let (_, result, context) = parse_recorded("bad1\nbad2\nbad3\n");
    assert_eq!(result.diagnostics.len(), 3);
    assert_eq!(result.replies.len(), 3);
    assert!(context.has_errors);
    assert!(
        result
            .diagnostics
            .iter()
            .all(|d| d.code == Code::Syntax && d.span.is_some())
    );
    let lines: Vec<_> = result.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![Some(1), Some(2), Some(3)]);
}

#[test]
fn error_flag_stays_clear_without_errors() {
    let (_, result, context) = parse_recorded("workspace 1\n");
    assert!(result.diagnostics.is_empty());
    assert!(!context.has_errors);
    assert!(context.line_copy.is_none());
}

#[test]
fn offending_line_is_snapshotted() {
    let (_, _, context) = parse_recorded("font x\nbroken $here\n");
    assert_eq!(context.line_copy.as_deref(), Some("broken $here"));
}

#[test]
fn recovery_inside_a_mode_block_keeps_the_context() {
    let input = "mode \"x\" {\n  garbage\n  bindsym a nop\n}\n";
    let (handlers, result, context) = parse_recorded(input);

    assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
    assert!(context.has_errors);

    // The binding after the bad line still lands inside the mode.
    let calls: Vec<_> = handlers.calls.iter().map(|(c, _)| *c).collect();
    assert_eq!(
        calls,
        vec![CallId::EnterMode, CallId::ModeBinding, CallId::LeaveMode]
    );
    let (_, binding) = &handlers.calls[1];
    assert_eq!(str_value(binding, "key"), Some("a"));
    assert_eq!(str_value(binding, "command"), Some("nop"));
}

#[test]
fn expected_tokens_elide_error_and_join_cleanly() {
    let input = "mode \"m\" {\n]\n}\n";
    let (_, result, _) = parse_recorded(input);
    assert_eq!(
        result.replies[0].error,
        "Expected one of these tokens: <end>, '#', 'bindsym', 'bindcode', '}'"
    );
}

#[test]
fn expected_tokens_follow_descriptor_order() {
    let (_, result, _) = parse_recorded("bogus\n");
    let message = &result.replies[0].error;
    assert!(
        message.starts_with("Expected one of these tokens: <end>, '#', 'set '"),
        "{message}"
    );
    assert!(!message.contains("<error>"), "{message}");
    assert!(!message.ends_with(", "), "{message}");
    // Prefix-overlapping literals keep their declared order.
    let layout = message.find("'workspace_layout'").unwrap();
    let workspace = message.find("'workspace'").unwrap();
    assert!(layout < workspace, "{message}");
}

#[test]
fn error_at_end_of_input_without_newline() {
    let (_, result, context) = parse_recorded("exec");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(
        result.replies[0].error,
        "Expected one of these tokens: <string>"
    );
    // Nothing after the cursor to underline: the prefix is blanked and no
    // caret is emitted.
    assert_eq!(result.replies[0].errorposition, "    ");
    assert!(context.has_errors);
}

#[test]
fn directive_state_does_not_leak_after_recovery() {
    // The first line dies inside WORKSPACE; the second must parse from a
    // clean INITIAL with an empty capture stack.
    let (handlers, result, _) = parse_recorded("workspace nope\nexec ok\n");
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(handlers.calls.len(), 1);
    let (call, snapshot) = &handlers.calls[0];
    assert_eq!(*call, CallId::Exec);
    assert!(long_value(snapshot, "workspace").is_none());
}

#[test]
fn reply_serializes_with_wire_format_keys() {
    let (_, result, _) = parse_recorded("bogus\n");
    let json = serde_json::to_value(&result.replies[0]).unwrap();
    assert_eq!(json["success"], serde_json::json!(false));
    assert_eq!(json["parse_error"], serde_json::json!(true));
    assert!(json["error"].is_string());
    assert_eq!(json["input"], serde_json::json!("bogus\n"));
    assert!(json["errorposition"].is_string());
}
