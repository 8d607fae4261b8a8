mod common;

use common::{parse_ok, parse_with_errors};
use fin_lang::formatter::format_program;
use fin_lang::parser::ast::{ExprKind, StmtKind};

#[test]
fn set_statement() {
    let program = parse_ok("set x 10\n");
    assert_eq!(program.statements.len(), 1);
    match &program.statements[0].kind {
        StmtKind::Set { name, value } => {
            assert_eq!(name, "x");
            assert!(matches!(&value.kind, ExprKind::Number(n) if n == "10"));
        }
        other => panic!("expected set, got {:?}", other),
    }
}

#[test]
fn assignment_vs_call_lookahead() {
    let program = parse_ok("x = 5\nfoo 1 2\nfoo\n");
    assert!(matches!(
        program.statements[0].kind,
        StmtKind::Assign { .. }
    ));
    match &program.statements[1].kind {
        StmtKind::Call { name, args } => {
            assert_eq!(name, "foo");
            assert_eq!(args.len(), 2);
        }
        other => panic!("expected call, got {:?}", other),
    }
    match &program.statements[2].kind {
        StmtKind::Call { name, args } => {
            assert_eq!(name, "foo");
            assert!(args.is_empty());
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn echo_argument_is_optional() {
    let program = parse_ok("echo\necho $x\n");
    assert!(matches!(
        program.statements[0].kind,
        StmtKind::Echo { value: None }
    ));
    assert!(matches!(
        program.statements[1].kind,
        StmtKind::Echo { value: Some(_) }
    ));
}

#[test]
fn run_requires_a_string() {
    let program = parse_ok("run \"git status\"\n");
    assert!(matches!(program.statements[0].kind, StmtKind::Run { .. }));

    let (_, errors) = parse_with_errors("run 42\n");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "E002");
}

#[test]
fn statement_at_eof_needs_no_newline() {
    let program = parse_ok("set x 1");
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn precedence_multiplication_binds_tighter() {
    let program = parse_ok("set y 1 + 2 * 3\n");
    assert_eq!(format_program(&program), "set y (1 + (2 * 3))\n");
}

#[test]
fn precedence_comparison_and_logic() {
    let program = parse_ok("set a 1\nset b 2\nset c $a < 3 && $b > 1 || false\n");
    let formatted = format_program(&program);
    assert!(formatted.contains("set c ((($a < 3) && ($b > 1)) || false)"));
}

#[test]
fn power_is_right_associative() {
    let program = parse_ok("set y 2 ** 3 ** 2\n");
    assert_eq!(format_program(&program), "set y (2 ** (3 ** 2))\n");
}

#[test]
fn unary_binds_tighter_than_power() {
    let program = parse_ok("set y -2 ** 2\n");
    assert_eq!(format_program(&program), "set y (-2 ** 2)\n");
}

#[test]
fn property_and_index_bind_tightest() {
    let program = parse_ok("set y -$a.b\nset z $xs[0] + 1\n");
    let formatted = format_program(&program);
    assert!(formatted.contains("set y -$a.b"));
    assert!(formatted.contains("set z ($xs[0] + 1)"));
}

#[test]
fn grouping_parentheses() {
    let program = parse_ok("set y (1 + 2) * 3\n");
    assert_eq!(format_program(&program), "set y ((1 + 2) * 3)\n");
}

#[test]
fn list_literals() {
    let program = parse_ok("set xs [1, 2, 3]\nset empty []\n");
    match &program.statements[0].kind {
        StmtKind::Set { value, .. } => match &value.kind {
            ExprKind::List(elements) => assert_eq!(elements.len(), 3),
            other => panic!("expected list, got {:?}", other),
        },
        _ => unreachable!(),
    }
    match &program.statements[1].kind {
        StmtKind::Set { value, .. } => {
            assert!(matches!(&value.kind, ExprKind::List(e) if e.is_empty()));
        }
        _ => unreachable!(),
    }
}

#[test]
fn map_literals_preserve_order() {
    let program = parse_ok("set m {b: 1, a: 2}\n");
    match &program.statements[0].kind {
        StmtKind::Set { value, .. } => match &value.kind {
            ExprKind::Map(pairs) => {
                let keys: Vec<&str> = pairs.iter().map(|p| p.key.as_str()).collect();
                assert_eq!(keys, vec!["b", "a"]);
            }
            other => panic!("expected map, got {:?}", other),
        },
        _ => unreachable!(),
    }
}

#[test]
fn if_else_blocks() {
    let program = parse_ok("if $x > 5\n    echo \"big\"\nelse\n    echo \"small\"\nend\n");
    match &program.statements[0].kind {
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            assert_eq!(then_branch.len(), 1);
            assert_eq!(else_branch.len(), 1);
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn exists_condition() {
    let program = parse_ok("if exists \"config.txt\"\n    echo \"found\"\nend\n");
    match &program.statements[0].kind {
        StmtKind::If { cond, .. } => {
            assert!(matches!(cond.kind, ExprKind::Exists(_)));
        }
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn for_loop_header() {
    let program = parse_ok("for i in 1..3\n    echo $i\nend\n");
    match &program.statements[0].kind {
        StmtKind::For {
            var, body, ..
        } => {
            assert_eq!(var, "i");
            assert_eq!(body.len(), 1);
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn for_loop_without_range_is_an_error() {
    let (program, errors) = parse_with_errors("for i in 1 3\n    echo $i\nend\n");
    assert!(!errors.is_empty());
    assert!(program
        .statements
        .iter()
        .all(|s| !matches!(s.kind, StmtKind::For { .. })));
}

#[test]
fn fn_declaration_params_until_newline() {
    let program = parse_ok("fn add a b\n    return $a + $b\nend\n");
    match &program.statements[0].kind {
        StmtKind::Fn { name, params, body } => {
            assert_eq!(name, "add");
            assert_eq!(params, &vec!["a".to_string(), "b".to_string()]);
            assert_eq!(body.len(), 1);
        }
        other => panic!("expected fn, got {:?}", other),
    }
}

#[test]
fn keyword_is_accepted_as_a_name() {
    // Syntactically fine; the analyzer rejects it with a reserved-name error
    let program = parse_ok("set if 1\n");
    match &program.statements[0].kind {
        StmtKind::Set { name, .. } => assert_eq!(name, "if"),
        other => panic!("expected set, got {:?}", other),
    }
}

#[test]
fn recovery_continues_after_an_error() {
    let (program, errors) = parse_with_errors("set\nset x 1\n");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "E002");
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn illegal_token_is_reported_and_skipped() {
    let (program, errors) = parse_with_errors("@\nset x 1\n");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "E001");
    assert_eq!(program.statements.len(), 1);
}

#[test]
fn recovery_inside_blocks() {
    let (program, errors) = parse_with_errors("if true\n    set\n    set x 1\nend\n");
    assert_eq!(errors.len(), 1);
    match &program.statements[0].kind {
        StmtKind::If { then_branch, .. } => assert_eq!(then_branch.len(), 1),
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn statement_positions_point_at_the_keyword() {
    let program = parse_ok("set x 1\nif true\n    echo\nend\n");
    assert_eq!(program.statements[0].span.line, 1);
    assert_eq!(program.statements[0].span.col, 1);
    assert_eq!(program.statements[1].span.line, 2);
    assert_eq!(program.statements[1].span.col, 1);
}

#[test]
fn missing_end_is_reported() {
    let (_, errors) = parse_with_errors("if true\n    echo\n");
    assert!(errors.iter().any(|e| e.code == "E002"));
}

#[test]
fn break_and_continue_parse() {
    let program = parse_ok("while true\n    break\n    continue\nend\n");
    match &program.statements[0].kind {
        StmtKind::While { body, .. } => {
            assert!(matches!(body[0].kind, StmtKind::Break));
            assert!(matches!(body[1].kind, StmtKind::Continue));
        }
        other => panic!("expected while, got {:?}", other),
    }
}
