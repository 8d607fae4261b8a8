use anyhow::Result;
use std::collections::HashMap;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::scanner::token::TokenType;

/// Load the keyword table, optionally overridden by a JSON file mapping
/// concept words to surface keywords (e.g. {"function": "fungsi"}).
pub fn load_keywords(path: Option<&Path>) -> Result<HashMap<String, TokenType>> {
    let map: HashMap<String, String> = match path {
        Some(p) => {
            let contents = fs::read_to_string(p)?;
            serde_json::from_str(&contents)?
        }
        None => default_keywords(),
    };

    let mut keywords = HashMap::new();
    for (key, value) in map {
        if let Some(token_type) = str_to_token_type(&key) {
            keywords.insert(value, token_type);
        }
    }

    Ok(keywords)
}

pub fn default_keywords() -> HashMap<String, String> {
    // The default mapping, from "concept words" to the keywords actually
    // written in source. Customizing maps a concept to a different surface
    // word while the token type stays the same.
    HashMap::from([
        ("set".into(), "set".into()),
        ("echo".into(), "echo".into()),
        ("run".into(), "run".into()),
        ("if".into(), "if".into()),
        ("else".into(), "else".into()),
        ("end".into(), "end".into()),
        ("for".into(), "for".into()),
        ("while".into(), "while".into()),
        ("in".into(), "in".into()),
        ("exists".into(), "exists".into()),
        ("function".into(), "fn".into()),
        ("return".into(), "return".into()),
        ("break".into(), "break".into()),
        ("continue".into(), "continue".into()),
        ("true".into(), "true".into()),
        ("false".into(), "false".into()),
    ])
}

fn str_to_token_type(s: &str) -> Option<TokenType> {
    match s {
        "set" => Some(TokenType::Set),
        "echo" => Some(TokenType::Echo),
        "run" => Some(TokenType::Run),
        "if" => Some(TokenType::If),
        "else" => Some(TokenType::Else),
        "end" => Some(TokenType::End),
        "for" => Some(TokenType::For),
        "while" => Some(TokenType::While),
        "in" => Some(TokenType::In),
        "exists" => Some(TokenType::Exists),
        "function" => Some(TokenType::Function),
        "return" => Some(TokenType::Return),
        "break" => Some(TokenType::Break),
        "continue" => Some(TokenType::Continue),
        "true" => Some(TokenType::True),
        "false" => Some(TokenType::False),
        _ => None,
    }
}

/// The reserved-name set the analyzer checks definitions against: every
/// surface keyword in the active table.
pub fn reserved_names(keywords: &HashMap<String, TokenType>) -> HashSet<String> {
    keywords.keys().cloned().collect()
}
