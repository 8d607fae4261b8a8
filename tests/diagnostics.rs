mod common;

use common::check;
use fin_lang::diagnostics::{render, sort_by_position, Diagnostic, Severity};
use fin_lang::span::Span;

#[test]
fn one_line_form() {
    let diag = Diagnostic::error(Span::new(3, 7), "E003", "undefined variable 'x'");
    assert_eq!(
        diag.render_line("script.fin"),
        "error: script.fin:3:7 undefined variable 'x'"
    );
}

#[test]
fn caret_render_points_at_the_column() {
    let source = "set x 1\necho $nope\n";
    let diag = Diagnostic::error(Span::new(2, 6), "E003", "undefined variable 'nope'");
    let rendered = render(source, &diag, "script.fin");
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(
        lines[0],
        "error[E003]: script.fin:2:6 undefined variable 'nope'"
    );
    assert_eq!(lines[1], "echo $nope");
    assert_eq!(lines[2], "     ^");
}

#[test]
fn diagnostics_sort_into_source_order() {
    let mut diags = vec![
        Diagnostic::error(Span::new(2, 1), "E003", "b"),
        Diagnostic::error(Span::new(1, 9), "E003", "a2"),
        Diagnostic::warning(Span::new(1, 2), "W001", "a1"),
    ];
    sort_by_position(&mut diags);
    let messages: Vec<&str> = diags.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["a1", "a2", "b"]);
}

#[test]
fn pipeline_diagnostics_arrive_in_source_order() {
    let diagnostics = check("echo $a\necho $b\n");
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics[0].span.line < diagnostics[1].span.line);
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
}

#[test]
fn stable_codes_survive_multiple_kinds() {
    let diagnostics = check("set if 1\nbreak\nfoo\n");
    let codes: Vec<&str> = diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec!["E006", "E009", "E003"]);
}
