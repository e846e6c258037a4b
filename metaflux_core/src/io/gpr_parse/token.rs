//! Tokens produced by the GPR lexer
use std::fmt::{Display, Formatter};

/// A single token of a gene reaction rule
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub enum Token {
    /// Gene id
    Identifier(String),
    /// `and`, `AND` or `&&`
    And,
    /// `or`, `OR` or `||`
    Or,
    /// `not`, lexed only so the parser can reject it
    Not,
    LeftParen,
    RightParen,
    /// End of the rule
    Eof,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Identifier(id) => write!(f, "gene {}", id),
            Token::And => write!(f, "'and'"),
            Token::Or => write!(f, "'or'"),
            Token::Not => write!(f, "'not'"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::Eof => write!(f, "end of rule"),
        }
    }
}
