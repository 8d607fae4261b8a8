pub mod context;
pub mod expr;

use crate::generator::context::{
    fn_label, fn_return_label, fn_return_out, fn_return_temp, loop_break_label,
    loop_continue_label, while_end_label, while_start_label, Context, ReturnTarget,
};
use crate::generator::expr::{
    interpolate, is_arithmetic, lower_echo_arg, lower_expr, lower_expr_arith,
};
use crate::parser::ast::{Expr, ExprKind, Program, Stmt, StmtKind};
use crate::span::Span;

/// Failure while lowering; the AST should be semantically valid by the time
/// it reaches the generator, so any of these aborts the compilation.
#[derive(Debug, thiserror::Error)]
#[error("generator error at {span}: {message}")]
pub struct GeneratorError {
    pub span: Span,
    pub message: String,
}

impl GeneratorError {
    fn new(span: Span, message: impl Into<String>) -> Self {
        GeneratorError {
            span,
            message: message.into(),
        }
    }
}

/// Emits a Windows Batch script from a validated AST. Output is
/// deterministic: labels come from one monotonic counter and list/map
/// entries keep source order.
pub struct BatchGenerator {
    ctx: Context,
}

impl BatchGenerator {
    pub fn new() -> Self {
        BatchGenerator {
            ctx: Context::new(),
        }
    }

    pub fn generate(mut self, program: &Program) -> Result<String, GeneratorError> {
        self.ctx.emit_line("@echo off");
        self.ctx.emit_line("setlocal EnableDelayedExpansion");

        // Function bodies are appended after the top-level code so control
        // never falls through into them.
        let mut functions = Vec::new();
        for stmt in &program.statements {
            if matches!(stmt.kind, StmtKind::Fn { .. }) {
                functions.push(stmt);
                continue;
            }
            self.stmt(stmt)?;
        }

        if !functions.is_empty() {
            self.ctx.emit_line("goto :eof");
            for function in functions {
                self.fn_decl(function)?;
            }
        }

        self.ctx.emit_line("endlocal");
        Ok(self.ctx.into_string())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), GeneratorError> {
        match &stmt.kind {
            StmtKind::Set { name, value } | StmtKind::Assign { name, value } => {
                self.lower_set(name, value);
                Ok(())
            }
            StmtKind::Echo { value } => {
                match value {
                    Some(value) => {
                        let arg = lower_echo_arg(value);
                        self.ctx.emit_line(format!("echo {}", arg));
                    }
                    None => self.ctx.emit_line("echo."),
                }
                Ok(())
            }
            StmtKind::Run { command } => self.lower_run(command, stmt.span),
            StmtKind::Call { name, args } => {
                let mut lowered = String::new();
                for arg in args {
                    lowered.push(' ');
                    let quoted = matches!(arg.kind, ExprKind::Str(_));
                    lowered.push_str(&escape_call_arg(&lower_expr(arg), quoted));
                }
                self.ctx
                    .emit_line(format!("call :{}{}", fn_label(name), lowered));
                Ok(())
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.ctx
                    .emit_line(format!("if {} (", lower_condition(cond)));
                self.ctx.push_indent();
                for inner in then_branch {
                    self.stmt(inner)?;
                }
                self.ctx.pop_indent();
                if !else_branch.is_empty() {
                    self.ctx.emit_line(") else (");
                    self.ctx.push_indent();
                    for inner in else_branch {
                        self.stmt(inner)?;
                    }
                    self.ctx.pop_indent();
                }
                self.ctx.emit_line(")");
                Ok(())
            }
            StmtKind::For {
                var,
                start,
                end,
                body,
            } => {
                let id = self.ctx.next_label();
                let continue_label = loop_continue_label(id);
                let break_label = loop_break_label(id);

                self.ctx
                    .emit_line(format!("set /a {}={}", var, lower_expr_arith(start)));
                self.ctx.emit_line(format!(":{}", continue_label));
                self.ctx.emit_line(format!(
                    "if !{}! GTR {} goto {}",
                    var,
                    lower_expr(end),
                    break_label
                ));

                self.ctx
                    .push_loop(break_label.clone(), continue_label.clone());
                self.ctx.push_indent();
                for inner in body {
                    self.stmt(inner)?;
                }
                self.ctx.pop_indent();
                self.ctx.pop_loop();

                self.ctx.emit_line(format!("set /a {}={}+1", var, var));
                self.ctx.emit_line(format!("goto {}", continue_label));
                self.ctx.emit_line(format!(":{}", break_label));
                Ok(())
            }
            StmtKind::While { cond, body } => {
                let id = self.ctx.next_label();
                let start_label = while_start_label(id);
                let end_label = while_end_label(id);

                self.ctx.emit_line(format!(":{}", start_label));
                if let Some(guard) = while_guard(cond, &end_label) {
                    self.ctx.emit_line(guard);
                }

                self.ctx.push_loop(end_label.clone(), start_label.clone());
                for inner in body {
                    self.stmt(inner)?;
                }
                self.ctx.pop_loop();

                self.ctx.emit_line(format!("goto {}", start_label));
                self.ctx.emit_line(format!(":{}", end_label));
                Ok(())
            }
            StmtKind::Break => match self.ctx.current_loop() {
                Some(labels) => {
                    let target = labels.break_label.clone();
                    self.ctx.emit_line(format!("goto {}", target));
                    Ok(())
                }
                None => Err(GeneratorError::new(stmt.span, "break outside loop")),
            },
            StmtKind::Continue => match self.ctx.current_loop() {
                Some(labels) => {
                    let target = labels.continue_label.clone();
                    self.ctx.emit_line(format!("goto {}", target));
                    Ok(())
                }
                None => Err(GeneratorError::new(stmt.span, "continue outside loop")),
            },
            StmtKind::Return(value) => match self.ctx.current_return() {
                Some(target) => {
                    let target = target.clone();
                    if let Some(value) = value {
                        self.ctx
                            .emit_line(format!("set {}={}", target.temp_var, lower_expr(value)));
                    }
                    self.ctx.emit_line(format!("goto {}", target.label));
                    Ok(())
                }
                None => Err(GeneratorError::new(stmt.span, "return outside function")),
            },
            StmtKind::Fn { name, .. } => Err(GeneratorError::new(
                stmt.span,
                format!("function '{}' declared outside the top level", name),
            )),
        }
    }

    fn fn_decl(&mut self, stmt: &Stmt) -> Result<(), GeneratorError> {
        let StmtKind::Fn { name, params, body } = &stmt.kind else {
            return Err(GeneratorError::new(stmt.span, "expected function declaration"));
        };

        let id = self.ctx.next_label();
        let target = ReturnTarget {
            label: fn_return_label(name),
            temp_var: fn_return_temp(name, id),
            out_var: fn_return_out(name),
        };

        self.ctx.emit_line(format!(":{}", fn_label(name)));
        self.ctx.emit_line("setlocal EnableDelayedExpansion");
        for (i, param) in params.iter().enumerate() {
            self.ctx.emit_line(format!("set {}=%{}", param, i + 1));
        }
        self.ctx.emit_line(format!("set {}=", target.temp_var));

        self.ctx.push_return(target.clone());
        self.ctx.push_indent();
        for inner in body {
            self.stmt(inner)?;
        }
        self.ctx.pop_indent();
        self.ctx.pop_return();

        self.ctx.emit_line(format!(":{}", target.label));
        self.ctx.emit_line(format!(
            "endlocal & set {}=%{}%",
            target.out_var, target.temp_var
        ));
        self.ctx.emit_line("goto :eof");
        Ok(())
    }

    fn lower_set(&mut self, name: &str, value: &Expr) {
        match &value.kind {
            ExprKind::List(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    self.ctx
                        .emit_line(format!("set {}_{}={}", name, i, lower_expr(element)));
                }
                self.ctx
                    .emit_line(format!("set {}_len={}", name, elements.len()));
            }
            ExprKind::Map(pairs) => {
                for pair in pairs {
                    self.ctx.emit_line(format!(
                        "set {}_{}={}",
                        name,
                        pair.key,
                        lower_expr(&pair.value)
                    ));
                }
            }
            ExprKind::Index { left, index } => {
                let base = strip_expansion(&lower_expr(left)).to_string();
                match &index.kind {
                    // Literal index resolves at a fixed name
                    ExprKind::Number(n) => {
                        self.ctx.emit_line(format!("set {}=!{}_{}!", name, base, n));
                    }
                    ExprKind::Str(s) => {
                        self.ctx.emit_line(format!("set {}=!{}_{}!", name, base, s));
                    }
                    // Variable index needs call-set double expansion
                    _ => {
                        self.ctx.emit_line(format!(
                            "call set {}=%%{}_{}%%",
                            name,
                            base,
                            lower_expr(index)
                        ));
                    }
                }
            }
            _ if is_arithmetic(value) => {
                self.ctx
                    .emit_line(format!("set /a {}={}", name, lower_expr_arith(value)));
            }
            _ => {
                self.ctx
                    .emit_line(format!("set {}={}", name, lower_expr(value)));
            }
        }
    }

    fn lower_run(&mut self, command: &Expr, span: Span) -> Result<(), GeneratorError> {
        let ExprKind::Str(raw) = &command.kind else {
            return Err(GeneratorError::new(span, "run requires a command string"));
        };
        let mut cmd = raw.trim();
        if cmd.len() >= 2 && cmd.starts_with('"') && cmd.ends_with('"') {
            cmd = &cmd[1..cmd.len() - 1];
        }
        self.ctx.emit_line(interpolate(cmd));
        Ok(())
    }
}

impl Default for BatchGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render an `if` condition. Numeric comparisons use the batch mnemonics,
/// equality compares quoted strings, `exists` maps to `exist`, and anything
/// else is evaluated and compared against the literal string "true".
fn lower_condition(cond: &Expr) -> String {
    match &cond.kind {
        ExprKind::Exists(path) => format!("exist {}", lower_expr(path)),
        ExprKind::Binary { left, op, right } => {
            let l = lower_expr(left);
            let r = lower_expr(right);
            match op.as_str() {
                "<" => format!("{} LSS {}", l, r),
                "<=" => format!("{} LEQ {}", l, r),
                ">" => format!("{} GTR {}", l, r),
                ">=" => format!("{} GEQ {}", l, r),
                "==" => format!("\"{}\"==\"{}\"", l, r),
                "!=" => format!("\"{}\" NEQ \"{}\"", l, r),
                _ => format!("\"{}\"==\"true\"", lower_expr(cond)),
            }
        }
        _ => format!("\"{}\"==\"true\"", lower_expr(cond)),
    }
}

/// Render the inverted guard for a `while` loop: jump to `end_label` when
/// the condition is false. `while true` needs no guard at all and
/// `while false` jumps unconditionally.
fn while_guard(cond: &Expr, end_label: &str) -> Option<String> {
    match &cond.kind {
        ExprKind::Bool(true) => None,
        ExprKind::Bool(false) => Some(format!("goto {}", end_label)),
        ExprKind::Exists(path) => Some(format!(
            "if not exist {} goto {}",
            lower_expr(path),
            end_label
        )),
        ExprKind::Binary { left, op, right } => {
            let l = lower_expr(left);
            let r = lower_expr(right);
            let guard = match op.as_str() {
                "<" => format!("if {} GEQ {} goto {}", l, r, end_label),
                "<=" => format!("if {} GTR {} goto {}", l, r, end_label),
                ">" => format!("if {} LEQ {} goto {}", l, r, end_label),
                ">=" => format!("if {} LSS {} goto {}", l, r, end_label),
                "==" => format!("if \"{}\" NEQ \"{}\" goto {}", l, r, end_label),
                "!=" => format!("if \"{}\"==\"{}\" goto {}", l, r, end_label),
                _ => format!(
                    "if not \"{}\"==\"true\" goto {}",
                    lower_expr(cond),
                    end_label
                ),
            };
            Some(guard)
        }
        _ => Some(format!(
            "if not \"{}\"==\"true\" goto {}",
            lower_expr(cond),
            end_label
        )),
    }
}

/// Escape a lowered call argument: batch specials get a caret prefix, and
/// the argument is quoted when it carries whitespace or specials (string
/// literal arguments are always quoted).
fn escape_call_arg(arg: &str, force_quote: bool) -> String {
    const SPECIALS: &[char] = &['^', '&', '|', '>', '<', '(', ')', '"'];

    let mut needs_quote = force_quote;
    let mut out = String::new();
    for ch in arg.chars() {
        if ch.is_whitespace() {
            needs_quote = true;
        }
        if SPECIALS.contains(&ch) {
            out.push('^');
            needs_quote = true;
        }
        out.push(ch);
    }

    if needs_quote {
        format!("\"{}\"", out)
    } else {
        out
    }
}

fn strip_expansion(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('!') && s.ends_with('!') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
