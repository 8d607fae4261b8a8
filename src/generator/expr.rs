use crate::parser::ast::{Expr, ExprKind};

/// Lower an expression into a batch fragment for value context: every
/// identifier comes out delayed-expanded as `!name!`.
pub fn lower_expr(expr: &Expr) -> String {
    lower(expr, false)
}

/// Lower an expression for `set /a` arithmetic context, where identifiers
/// must be emitted bare.
pub fn lower_expr_arith(expr: &Expr) -> String {
    lower(expr, true)
}

/// Lower an echo argument: like value context, but literal string text is
/// batch-escaped while `!name!` expansions stay untouched.
pub fn lower_echo_arg(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Str(value) => interpolate_with(value, true),
        _ => lower(expr, false),
    }
}

fn lower(expr: &Expr, arithmetic: bool) -> String {
    match &expr.kind {
        ExprKind::Str(value) => interpolate(value),
        ExprKind::Number(value) => value.clone(),
        ExprKind::Bool(value) => {
            if *value {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        ExprKind::Identifier(name) => {
            if arithmetic {
                name.clone()
            } else {
                format!("!{}!", name)
            }
        }
        ExprKind::Property { object, field } => {
            let object = lower(object, arithmetic);
            let base = strip_expansion(&object);
            if arithmetic {
                format!("{}_{}", base, field)
            } else {
                format!("!{}_{}!", base, field)
            }
        }
        ExprKind::Index { left, index } => {
            // Inner !index! resolves first, naming base_<value>; the outer
            // !...! then resolves that variable.
            let left = lower(left, false);
            let base = strip_expansion(&left);
            format!("!{}_{}!", base, lower(index, false))
        }
        ExprKind::Binary { left, op, right } => {
            format!(
                "{} {} {}",
                lower(left, arithmetic),
                op,
                lower(right, arithmetic)
            )
        }
        ExprKind::Unary { op, operand } => {
            format!("{}{}", op, lower(operand, arithmetic))
        }
        ExprKind::List(elements) => {
            let parts: Vec<String> = elements.iter().map(|el| lower(el, false)).collect();
            parts.join(",")
        }
        ExprKind::Map(pairs) => {
            let parts: Vec<String> = pairs
                .iter()
                .map(|p| format!("{}={}", p.key, lower(&p.value, false)))
                .collect();
            parts.join(",")
        }
        ExprKind::Exists(path) => format!("exist {}", lower(path, false)),
    }
}

/// Is this value an arithmetic expression that must lower under `set /a`?
pub fn is_arithmetic(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Binary { op, .. } => matches!(op.as_str(), "+" | "-" | "*" | "/" | "**"),
        ExprKind::Unary { op, .. } => op == "-",
        _ => false,
    }
}

/// Strip one layer of `!...!` so a lowered base can be suffixed into a
/// composed variable name.
fn strip_expansion(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('!') && s.ends_with('!') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Replace `$name`, `$name.field` and `$name[index]` in a string literal
/// with their delayed-expansion forms. `$$` escapes a literal dollar.
pub fn interpolate(s: &str) -> String {
    interpolate_with(s, false)
}

fn interpolate_with(s: &str, escape: bool) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '$' {
            // Escaped dollar
            if i + 1 < chars.len() && chars[i + 1] == '$' {
                out.push('$');
                i += 2;
                continue;
            }
            if i + 1 < chars.len() && is_ident_start(chars[i + 1]) {
                let mut j = i + 1;
                while j < chars.len() && is_ident_part(chars[j]) {
                    j += 1;
                }
                let name: String = chars[i + 1..j].iter().collect();

                // $name.field
                if j + 1 < chars.len() && chars[j] == '.' && is_ident_start(chars[j + 1]) {
                    let mut k = j + 1;
                    while k < chars.len() && is_ident_part(chars[k]) {
                        k += 1;
                    }
                    let field: String = chars[j + 1..k].iter().collect();
                    out.push_str(&format!("!{}_{}!", name, field));
                    i = k;
                    continue;
                }

                // $name[123] or $name[$var]
                if j < chars.len() && chars[j] == '[' {
                    if let Some((index, next)) = scan_index(&chars, j + 1) {
                        out.push_str(&format!("!{}_{}!", name, index));
                        i = next;
                        continue;
                    }
                }

                out.push_str(&format!("!{}!", name));
                i = j;
                continue;
            }
        }

        if escape {
            push_escaped(&mut out, chars[i]);
        } else {
            out.push(chars[i]);
        }
        i += 1;
    }

    out
}

/// Parse the inside of an interpolated index starting at `from` (just past
/// the '['). Returns the lowered index fragment and the position after ']'.
fn scan_index(chars: &[char], from: usize) -> Option<(String, usize)> {
    // Literal integer index: $xs[0] -> !xs_0!
    let mut j = from;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    if j > from && j < chars.len() && chars[j] == ']' {
        let digits: String = chars[from..j].iter().collect();
        return Some((digits, j + 1));
    }

    // Variable index: $xs[$i] -> !xs_!i!!
    if from < chars.len() && chars[from] == '$' {
        let mut j = from + 1;
        if j < chars.len() && is_ident_start(chars[j]) {
            while j < chars.len() && is_ident_part(chars[j]) {
                j += 1;
            }
            if j < chars.len() && chars[j] == ']' {
                let name: String = chars[from + 1..j].iter().collect();
                return Some((format!("!{}!", name), j + 1));
            }
        }
    }

    None
}

/// Escape batch specials in literal echo text. Standalone `!` needs the
/// doubled caret because the line is reparsed under delayed expansion.
fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '<' | '>' | '|' | '&' => {
            out.push('^');
            out.push(ch);
        }
        '!' => out.push_str("^^!"),
        _ => out.push(ch),
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}
