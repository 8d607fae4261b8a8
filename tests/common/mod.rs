#![allow(dead_code)]

use fin_lang::diagnostics::Diagnostic;
use fin_lang::keywords::load_keywords;
use fin_lang::parser::ast::Program;
use fin_lang::scanner::token::Token;
use fin_lang::KeywordTable;

pub fn keywords() -> KeywordTable {
    load_keywords(None).expect("default keyword table")
}

pub fn scan(source: &str) -> Vec<Token> {
    fin_lang::tokenize(source, &keywords())
}

/// Parse, asserting the source is syntactically clean.
pub fn parse_ok(source: &str) -> Program {
    let (program, diagnostics) = fin_lang::parse(source, &keywords());
    assert!(
        diagnostics.is_empty(),
        "unexpected parse errors: {:?}",
        diagnostics
    );
    program
}

/// Parse without asserting, returning the diagnostics too.
pub fn parse_with_errors(source: &str) -> (Program, Vec<Diagnostic>) {
    fin_lang::parse(source, &keywords())
}

/// Full pipeline diagnostics, in source order.
pub fn check(source: &str) -> Vec<Diagnostic> {
    fin_lang::check(source, &keywords())
}

/// Compile to batch text, asserting the source is clean.
pub fn generate(source: &str) -> String {
    fin_lang::build(source, &keywords()).expect("build failed")
}

/// Canonical formatting, asserting the source parses.
pub fn format(source: &str) -> String {
    fin_lang::format_source(source, &keywords()).expect("format failed")
}
