use crate::parser::ast::{Expr, ExprKind, Program, Stmt, StmtKind};

/// Render a human-readable, indented dump of the AST with source positions.
/// Debugging aid behind the `ast` command; not a stable format.
pub fn pretty(program: &Program) -> String {
    let mut p = Printer { buf: String::new() };
    p.buf.push_str("Program\n");
    for stmt in &program.statements {
        p.print_stmt(stmt, 1);
    }
    p.buf
}

struct Printer {
    buf: String,
}

impl Printer {
    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.buf.push_str("  ");
        }
    }

    fn line(&mut self, level: usize, text: String) {
        self.indent(level);
        self.buf.push_str(&text);
        self.buf.push('\n');
    }

    fn print_stmt(&mut self, stmt: &Stmt, level: usize) {
        let at = stmt.span;
        match &stmt.kind {
            StmtKind::Set { name, value } => {
                self.line(level, format!("Set name={} @{}", name, at));
                self.print_expr(value, level + 1, "value");
            }
            StmtKind::Assign { name, value } => {
                self.line(level, format!("Assign name={} @{}", name, at));
                self.print_expr(value, level + 1, "value");
            }
            StmtKind::Call { name, args } => {
                self.line(level, format!("Call name={} @{}", name, at));
                for (i, arg) in args.iter().enumerate() {
                    self.print_expr(arg, level + 1, &format!("arg[{}]", i));
                }
            }
            StmtKind::Echo { value } => {
                self.line(level, format!("Echo @{}", at));
                if let Some(value) = value {
                    self.print_expr(value, level + 1, "value");
                }
            }
            StmtKind::Run { command } => {
                self.line(level, format!("Run @{}", at));
                self.print_expr(command, level + 1, "command");
            }
            StmtKind::Fn { name, params, body } => {
                self.line(level, format!("Fn name={} params={:?} @{}", name, params, at));
                for stmt in body {
                    self.print_stmt(stmt, level + 1);
                }
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.line(level, format!("If @{}", at));
                self.print_expr(cond, level + 1, "cond");
                self.line(level + 1, "then:".to_string());
                for stmt in then_branch {
                    self.print_stmt(stmt, level + 2);
                }
                if !else_branch.is_empty() {
                    self.line(level + 1, "else:".to_string());
                    for stmt in else_branch {
                        self.print_stmt(stmt, level + 2);
                    }
                }
            }
            StmtKind::For {
                var,
                start,
                end,
                body,
            } => {
                self.line(level, format!("For var={} @{}", var, at));
                self.print_expr(start, level + 1, "start");
                self.print_expr(end, level + 1, "end");
                for stmt in body {
                    self.print_stmt(stmt, level + 1);
                }
            }
            StmtKind::While { cond, body } => {
                self.line(level, format!("While @{}", at));
                self.print_expr(cond, level + 1, "cond");
                for stmt in body {
                    self.print_stmt(stmt, level + 1);
                }
            }
            StmtKind::Return(value) => {
                self.line(level, format!("Return @{}", at));
                if let Some(value) = value {
                    self.print_expr(value, level + 1, "value");
                }
            }
            StmtKind::Break => self.line(level, format!("Break @{}", at)),
            StmtKind::Continue => self.line(level, format!("Continue @{}", at)),
        }
    }

    fn print_expr(&mut self, expr: &Expr, level: usize, label: &str) {
        let at = expr.span;
        match &expr.kind {
            ExprKind::Str(value) => {
                self.line(level, format!("{}: Str {:?} @{}", label, value, at));
            }
            ExprKind::Number(value) => {
                self.line(level, format!("{}: Number {} @{}", label, value, at));
            }
            ExprKind::Bool(value) => {
                self.line(level, format!("{}: Bool {} @{}", label, value, at));
            }
            ExprKind::Identifier(name) => {
                self.line(level, format!("{}: Identifier {} @{}", label, name, at));
            }
            ExprKind::List(elements) => {
                self.line(level, format!("{}: List @{}", label, at));
                for (i, el) in elements.iter().enumerate() {
                    self.print_expr(el, level + 1, &format!("elem[{}]", i));
                }
            }
            ExprKind::Map(pairs) => {
                self.line(level, format!("{}: Map @{}", label, at));
                for (i, pair) in pairs.iter().enumerate() {
                    self.line(
                        level + 1,
                        format!("pair[{}] key={} @{}", i, pair.key, pair.span),
                    );
                    self.print_expr(&pair.value, level + 2, "value");
                }
            }
            ExprKind::Index { left, index } => {
                self.line(level, format!("{}: Index @{}", label, at));
                self.print_expr(left, level + 1, "left");
                self.print_expr(index, level + 1, "index");
            }
            ExprKind::Property { object, field } => {
                self.line(level, format!("{}: Property field={} @{}", label, field, at));
                self.print_expr(object, level + 1, "object");
            }
            ExprKind::Binary { left, op, right } => {
                self.line(level, format!("{}: Binary op={} @{}", label, op, at));
                self.print_expr(left, level + 1, "left");
                self.print_expr(right, level + 1, "right");
            }
            ExprKind::Unary { op, operand } => {
                self.line(level, format!("{}: Unary op={} @{}", label, op, at));
                self.print_expr(operand, level + 1, "operand");
            }
            ExprKind::Exists(path) => {
                self.line(level, format!("{}: Exists @{}", label, at));
                self.print_expr(path, level + 1, "path");
            }
        }
    }
}
