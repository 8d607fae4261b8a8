mod common;

use common::scan;
use fin_lang::scanner::token::TokenType;
use fin_lang::span::Span;

fn types(source: &str) -> Vec<TokenType> {
    scan(source).into_iter().map(|t| t.token_type).collect()
}

#[test]
fn empty_input_yields_single_eof() {
    let tokens = scan("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::Eof);
    assert_eq!(tokens[0].span, Span::new(1, 1));
}

#[test]
fn exactly_one_eof_and_it_is_last() {
    let tokens = scan("set x 10\necho $x\n");
    let eofs = tokens
        .iter()
        .filter(|t| t.token_type == TokenType::Eof)
        .count();
    assert_eq!(eofs, 1);
    assert_eq!(tokens.last().unwrap().token_type, TokenType::Eof);
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        types("set x"),
        vec![TokenType::Set, TokenType::Identifier, TokenType::Eof]
    );
    // A keyword prefix does not make an identifier a keyword
    assert_eq!(
        types("settle"),
        vec![TokenType::Identifier, TokenType::Eof]
    );
    assert_eq!(
        types("fn end exists"),
        vec![
            TokenType::Function,
            TokenType::End,
            TokenType::Exists,
            TokenType::Eof
        ]
    );
}

#[test]
fn newlines_are_preserved() {
    assert_eq!(
        types("echo\n\necho"),
        vec![
            TokenType::Echo,
            TokenType::Newline,
            TokenType::Newline,
            TokenType::Echo,
            TokenType::Eof
        ]
    );
}

#[test]
fn carriage_returns_are_discarded() {
    assert_eq!(types("set x 1\r\n"), types("set x 1\n"));
}

#[test]
fn comments_are_skipped() {
    assert_eq!(
        types("# a comment\nset"),
        vec![TokenType::Newline, TokenType::Set, TokenType::Eof]
    );
    // Comment at end of file, no trailing newline
    assert_eq!(types("set # trailing"), vec![TokenType::Set, TokenType::Eof]);
}

#[test]
fn operators_prefer_longest_match() {
    assert_eq!(
        types("** * == = != ! <= < >= > && || .. ."),
        vec![
            TokenType::Power,
            TokenType::Star,
            TokenType::Equal,
            TokenType::Assign,
            TokenType::NotEqual,
            TokenType::Bang,
            TokenType::LessEqual,
            TokenType::Less,
            TokenType::GreaterEqual,
            TokenType::Greater,
            TokenType::And,
            TokenType::Or,
            TokenType::Range,
            TokenType::Dot,
            TokenType::Eof
        ]
    );
}

#[test]
fn single_ampersand_and_pipe_are_illegal() {
    let tokens = scan("& |");
    assert_eq!(tokens[0].token_type, TokenType::Illegal);
    assert_eq!(tokens[0].lexeme, "&");
    assert_eq!(tokens[1].token_type, TokenType::Illegal);
    assert_eq!(tokens[1].lexeme, "|");
}

#[test]
fn dollar_yields_bare_identifier() {
    let tokens = scan("echo $name");
    assert_eq!(tokens[1].token_type, TokenType::Identifier);
    assert_eq!(tokens[1].lexeme, "name");
    // Position points at the sigil
    assert_eq!(tokens[1].span, Span::new(1, 6));
}

#[test]
fn dollar_keyword_is_still_an_identifier() {
    // $true must not become the `true` keyword
    let tokens = scan("$true");
    assert_eq!(tokens[0].token_type, TokenType::Identifier);
    assert_eq!(tokens[0].lexeme, "true");
}

#[test]
fn dollar_without_identifier_is_illegal() {
    let tokens = scan("$1");
    assert_eq!(tokens[0].token_type, TokenType::Illegal);
    assert_eq!(tokens[0].lexeme, "$");
    assert_eq!(tokens[1].token_type, TokenType::Number);
}

#[test]
fn numbers_keep_their_lexeme() {
    let tokens = scan("007 42");
    assert_eq!(tokens[0].token_type, TokenType::Number);
    assert_eq!(tokens[0].lexeme, "007");
    assert_eq!(tokens[1].lexeme, "42");
}

#[test]
fn string_escapes_are_decoded() {
    let tokens = scan(r#""a\nb\t\"c\\d""#);
    match &tokens[0].token_type {
        TokenType::Str(value) => assert_eq!(value, "a\nb\t\"c\\d"),
        other => panic!("expected string, got {:?}", other),
    }
}

#[test]
fn unknown_escape_passes_through() {
    let tokens = scan(r#""a\qb""#);
    match &tokens[0].token_type {
        TokenType::Str(value) => assert_eq!(value, "aqb"),
        other => panic!("expected string, got {:?}", other),
    }
}

#[test]
fn unterminated_string_is_illegal_with_partial_content() {
    let tokens = scan("\"abc");
    assert_eq!(tokens[0].token_type, TokenType::Illegal);
    assert_eq!(tokens[0].lexeme, "abc");
    assert_eq!(tokens[1].token_type, TokenType::Eof);
}

#[test]
fn unexpected_character_is_single_illegal_token() {
    let tokens = scan("@set");
    assert_eq!(tokens[0].token_type, TokenType::Illegal);
    assert_eq!(tokens[0].lexeme, "@");
    assert_eq!(tokens[1].token_type, TokenType::Set);
}

#[test]
fn positions_are_one_based_and_reset_per_line() {
    let tokens = scan("set x 10\necho $x");
    assert_eq!(tokens[0].span, Span::new(1, 1)); // set
    assert_eq!(tokens[1].span, Span::new(1, 5)); // x
    assert_eq!(tokens[2].span, Span::new(1, 7)); // 10
    assert_eq!(tokens[3].span, Span::new(1, 9)); // newline
    assert_eq!(tokens[4].span, Span::new(2, 1)); // echo
    assert_eq!(tokens[5].span, Span::new(2, 6)); // $x
}

#[test]
fn delimiters_scan() {
    assert_eq!(
        types("( ) [ ] { } , :"),
        vec![
            TokenType::LeftParen,
            TokenType::RightParen,
            TokenType::LeftBracket,
            TokenType::RightBracket,
            TokenType::LeftBrace,
            TokenType::RightBrace,
            TokenType::Comma,
            TokenType::Colon,
            TokenType::Eof
        ]
    );
}
