use crate::span::Span;
use std::fmt;

/// Stable diagnostic codes. Tools match on these, so they never change.
pub mod codes {
    pub const SYNTAX: &str = "E001";
    pub const UNEXPECTED_TOKEN: &str = "E002";
    pub const UNDECLARED_VAR: &str = "E003";
    pub const REDECLARED: &str = "E004";
    pub const TYPE_MISMATCH: &str = "E005";
    pub const INVALID_TYPE: &str = "E006";
    pub const TOO_FEW_ARGS: &str = "E007";
    pub const TOO_MANY_ARGS: &str = "E008";
    pub const BREAK_OUTSIDE: &str = "E009";
    pub const CONTINUE_OUTSIDE: &str = "E010";
    pub const RETURN_OUTSIDE: &str = "E011";
    pub const DIV_BY_ZERO: &str = "E012";
    pub const DEPTH_EXCEEDED: &str = "E013";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A structured problem report tied to a source position.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub span: Span,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn error(span: Span, code: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            span,
            code,
            message: message.into(),
        }
    }

    pub fn warning(span: Span, code: &'static str, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            span,
            code,
            message: message.into(),
        }
    }

    /// One-line form used by the CLI: `error: FILE:LINE:COL MESSAGE`.
    pub fn render_line(&self, file: &str) -> String {
        format!(
            "{}: {}:{}:{} {}",
            self.severity, file, self.span.line, self.span.col, self.message
        )
    }
}

/// Sort diagnostics into source order (line, then column).
pub fn sort_by_position(diagnostics: &mut [Diagnostic]) {
    diagnostics.sort_by_key(|d| (d.span.line, d.span.col));
}

/// Render a diagnostic with the offending source line and a caret pointer.
pub fn render(source: &str, diag: &Diagnostic, file: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let line_idx = diag.span.line.saturating_sub(1);
    let source_line = lines.get(line_idx).copied().unwrap_or("");

    let mut out = String::new();

    out.push_str(&format!(
        "{}[{}]: {}:{}:{} {}\n",
        diag.severity, diag.code, file, diag.span.line, diag.span.col, diag.message
    ));

    if !source_line.is_empty() {
        out.push_str(source_line);
        out.push('\n');

        // Tabs stay tabs so the caret lines up in a terminal
        let padding: String = source_line
            .chars()
            .take(diag.span.col.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        out.push_str(&padding);
        out.push_str("^\n");
    }

    out
}
