pub mod analyzer;
pub mod diagnostics;
pub mod formatter;
pub mod generator;
pub mod keywords;
pub mod parser;
pub mod scanner;
pub mod span;

use std::collections::HashMap;

use crate::analyzer::{AnalysisResult, Analyzer};
use crate::diagnostics::{codes, sort_by_position, Diagnostic};
use crate::generator::{BatchGenerator, GeneratorError};
use crate::parser::ast::Program;
use crate::parser::Parser;
use crate::scanner::token::{Token, TokenType};
use crate::scanner::Scanner;

pub type KeywordTable = HashMap<String, TokenType>;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("compilation failed with {} diagnostic(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Scan `source` into a token stream ending with a single Eof token.
pub fn tokenize(source: &str, keywords: &KeywordTable) -> Vec<Token> {
    Scanner::new(source, keywords).scan_tokens()
}

/// Scan and parse, returning the (possibly partial) program together with
/// any parse diagnostics.
pub fn parse(source: &str, keywords: &KeywordTable) -> (Program, Vec<Diagnostic>) {
    Parser::new(tokenize(source, keywords)).parse()
}

/// Run semantic analysis over an already parsed program.
pub fn analyze(program: &Program, keywords: &KeywordTable) -> AnalysisResult {
    Analyzer::new(keywords::reserved_names(keywords)).analyze(program)
}

/// Run the whole pipeline without producing output: scanner, parser,
/// analyzer, and generator validation. Returns every diagnostic in source
/// order.
pub fn check(source: &str, keywords: &KeywordTable) -> Vec<Diagnostic> {
    let (program, mut diagnostics) = parse(source, keywords);
    diagnostics.extend(analyze(&program, keywords).diagnostics);

    // Generator validation only makes sense on a clean tree.
    if diagnostics.is_empty() {
        if let Err(err) = BatchGenerator::new().generate(&program) {
            diagnostics.push(Diagnostic::error(err.span, codes::SYNTAX, err.message));
        }
    }

    sort_by_position(&mut diagnostics);
    diagnostics
}

/// Compile `source` to batch text, or fail with the collected diagnostics.
pub fn build(source: &str, keywords: &KeywordTable) -> Result<String, BuildError> {
    let (program, mut diagnostics) = parse(source, keywords);
    diagnostics.extend(analyze(&program, keywords).diagnostics);
    if !diagnostics.is_empty() {
        sort_by_position(&mut diagnostics);
        return Err(BuildError::Diagnostics(diagnostics));
    }

    Ok(BatchGenerator::new().generate(&program)?)
}

/// Reformat `source` into canonical form. Fails with diagnostics when the
/// input does not parse.
pub fn format_source(source: &str, keywords: &KeywordTable) -> Result<String, BuildError> {
    let (program, diagnostics) = parse(source, keywords);
    if !diagnostics.is_empty() {
        return Err(BuildError::Diagnostics(diagnostics));
    }
    Ok(formatter::format_program(&program))
}
