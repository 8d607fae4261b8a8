use crate::parser::ast::{Expr, ExprKind, Program, Stmt, StmtKind};

/// Format a program into canonical Fin source. Formatting the result again
/// yields the same bytes.
pub fn format_program(program: &Program) -> String {
    let mut out = String::new();
    let mut prev_was_fn = false;
    let mut first = true;

    for stmt in &program.statements {
        let is_fn = matches!(stmt.kind, StmtKind::Fn { .. });
        // A blank line separates two adjacent function declarations.
        if !first && prev_was_fn && is_fn {
            out.push('\n');
        }
        write_stmt(&mut out, stmt, 0);
        out.push('\n');
        prev_was_fn = is_fn;
        first = false;
    }

    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, level: usize) {
    indent(out, level);
    match &stmt.kind {
        StmtKind::Set { name, value } => {
            out.push_str(&format!("set {} {}", name, format_expr(value)));
        }
        StmtKind::Assign { name, value } => {
            out.push_str(&format!("{} = {}", name, format_expr(value)));
        }
        StmtKind::Call { name, args } => {
            out.push_str(name);
            for arg in args {
                out.push(' ');
                out.push_str(&format_expr(arg));
            }
        }
        StmtKind::Echo { value } => match value {
            Some(value) => out.push_str(&format!("echo {}", format_expr(value))),
            None => out.push_str("echo"),
        },
        StmtKind::Run { command } => {
            out.push_str(&format!("run {}", format_expr(command)));
        }
        StmtKind::Return(value) => match value {
            Some(value) => out.push_str(&format!("return {}", format_expr(value))),
            None => out.push_str("return"),
        },
        StmtKind::Break => out.push_str("break"),
        StmtKind::Continue => out.push_str("continue"),
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            out.push_str(&format!("if {}\n", format_expr(cond)));
            for inner in then_branch {
                write_stmt(out, inner, level + 1);
                out.push('\n');
            }
            if !else_branch.is_empty() {
                indent(out, level);
                out.push_str("else\n");
                for inner in else_branch {
                    write_stmt(out, inner, level + 1);
                    out.push('\n');
                }
            }
            indent(out, level);
            out.push_str("end");
        }
        StmtKind::For {
            var,
            start,
            end,
            body,
        } => {
            out.push_str(&format!(
                "for {} in {} .. {}\n",
                var,
                format_expr(start),
                format_expr(end)
            ));
            for inner in body {
                write_stmt(out, inner, level + 1);
                out.push('\n');
            }
            indent(out, level);
            out.push_str("end");
        }
        StmtKind::While { cond, body } => {
            out.push_str(&format!("while {}\n", format_expr(cond)));
            for inner in body {
                write_stmt(out, inner, level + 1);
                out.push('\n');
            }
            indent(out, level);
            out.push_str("end");
        }
        StmtKind::Fn { name, params, body } => {
            out.push_str(&format!("fn {}", name));
            for param in params {
                out.push(' ');
                out.push_str(param);
            }
            out.push('\n');
            for inner in body {
                write_stmt(out, inner, level + 1);
                out.push('\n');
            }
            indent(out, level);
            out.push_str("end");
        }
    }
}

fn format_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Str(value) => quote_string(value),
        ExprKind::Number(value) => value.clone(),
        ExprKind::Bool(value) => {
            if *value {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        ExprKind::Identifier(name) => format!("${}", name),
        ExprKind::List(elements) => {
            let parts: Vec<String> = elements.iter().map(format_expr).collect();
            format!("[{}]", parts.join(", "))
        }
        ExprKind::Map(pairs) => {
            let parts: Vec<String> = pairs
                .iter()
                .map(|p| format!("{}: {}", p.key, format_expr(&p.value)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        ExprKind::Index { left, index } => {
            format!("{}[{}]", format_expr(left), format_expr(index))
        }
        ExprKind::Property { object, field } => {
            format!("{}.{}", format_expr(object), field)
        }
        ExprKind::Unary { op, operand } => format!("{}{}", op, format_expr(operand)),
        ExprKind::Binary { left, op, right } => {
            format!("({} {} {})", format_expr(left), op, format_expr(right))
        }
        ExprKind::Exists(path) => format!("exists {}", format_expr(path)),
    }
}

/// Re-quote a string value so the formatted source scans back to the same
/// literal.
fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
