use crate::span::Span;

#[derive(Clone, Debug)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, span: Span) -> Self {
        Token {
            token_type,
            lexeme: lexeme.into(),
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,    // (
    RightParen,   // )
    LeftBrace,    // {
    RightBrace,   // }
    LeftBracket,  // [
    RightBracket, // ]
    Comma,        // ,
    Dot,          // .
    Minus,        // -
    Plus,         // +
    Colon,        // :
    Slash,        // /
    Star,         // *

    // One or two character tokens
    Bang,         // !
    NotEqual,     // !=
    Assign,       // =
    Equal,        // ==
    Greater,      // >
    GreaterEqual, // >=
    Less,         // <
    LessEqual,    // <=
    And,          // &&
    Or,           // ||
    Power,        // **
    Range,        // ..

    // Literals
    Identifier,  // variable and function names ($ sigil already stripped)
    Str(String), // "hello" with escapes decoded
    Number,      // digits, kept textual in the lexeme

    // Keywords
    Set,      // set
    Echo,     // echo
    Run,      // run
    If,       // if
    Else,     // else
    End,      // end
    For,      // for
    While,    // while
    In,       // in
    Exists,   // exists
    Function, // fn
    Return,   // return
    Break,    // break
    Continue, // continue
    True,     // true
    False,    // false

    // Control
    Newline, // statement separator
    Illegal, // unrecognized input; lexeme holds the offending text
    Eof,     // end of file
}

impl TokenType {
    /// True for keyword tokens, whose lexeme is still a usable word. The
    /// parser accepts these where a name is expected so the analyzer can
    /// reject them with a positioned diagnostic.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenType::Set
                | TokenType::Echo
                | TokenType::Run
                | TokenType::If
                | TokenType::Else
                | TokenType::End
                | TokenType::For
                | TokenType::While
                | TokenType::In
                | TokenType::Exists
                | TokenType::Function
                | TokenType::Return
                | TokenType::Break
                | TokenType::Continue
                | TokenType::True
                | TokenType::False
        )
    }
}
