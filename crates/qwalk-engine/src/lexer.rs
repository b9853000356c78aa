//! Lexer for operator-token lists such as `"sm1, sh2"`.

use std::fmt;

use logos::Logos;

/// Tokens of an operator list.
///
/// Whitespace is insignificant everywhere: between tokens it is skipped,
/// inside a token it is dropped, so `"s m 1"` reads as `sm1`.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token(",")]
    Comma,

    /// A single operator such as `sm1`; its prefix and constant are checked
    /// by the topology compiler.
    #[regex(r"[^,\s][^,]*", |lex| lex.slice().split_whitespace().collect::<String>())]
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comma => write!(f, ","),
            Token::Word(s) => write!(f, "{s}"),
        }
    }
}
