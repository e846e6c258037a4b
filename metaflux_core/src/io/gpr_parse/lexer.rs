//! Lex a GPR string into a series of tokens for later parsing

use thiserror::Error;

use crate::io::gpr_parse::token::Token;

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the source into tokens, always terminated by [`Token::Eof`]
    pub fn lex(&mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::Eof);
        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c: char = self.advance();
        match c {
            // Single Character Tokens
            '(' => self.add_token(Token::LeftParen),
            ')' => self.add_token(Token::RightParen),
            // Symbolic operators, doubled or not
            '&' => {
                self.match_char('&');
                self.add_token(Token::And)
            }
            '|' => {
                self.match_char('|');
                self.add_token(Token::Or)
            }
            // Whitespace
            ' ' | '\r' | '\n' | '\t' => {}
            // Identifiers and Operators
            c if Lexer::is_identifier_char(c) => self.read_identifier(),
            c => {
                return Err(LexerError::InvalidToken {
                    character: c,
                    position: self.start,
                })
            }
        };
        Ok(())
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == expected {
            self.current += 1;
            return true;
        }
        false
    }

    fn read_identifier(&mut self) {
        while Lexer::is_identifier_char(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        match text.as_str() {
            "and" | "And" | "AND" => self.add_token(Token::And),
            "or" | "Or" | "OR" => self.add_token(Token::Or),
            "not" | "Not" | "NOT" => self.add_token(Token::Not),
            gene => self.add_token(Token::Identifier(gene.to_string())),
        }
    }

    /// Gene ids are made of letters, digits and `_ . - :`
    fn is_identifier_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | ':')
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexerError {
    #[error("Invalid character {character:?} at position {position}")]
    InvalidToken { character: char, position: usize },
}

#[cfg(test)]
mod tests {
    use crate::io::gpr_parse::lexer::{Lexer, LexerError};
    use crate::io::gpr_parse::token::Token;

    #[test]
    fn test_single_gene() {
        let mut lexer = Lexer::new("Rv0023");
        let tokens = match lexer.lex() {
            Ok(t) => t,
            Err(_) => panic!("Failed to parse during test"),
        };
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::Identifier(String::from("Rv0023")));
    }

    #[test]
    fn test_grouping() {
        let mut lexer = Lexer::new("(Rv0023 or Rv0123)");
        let tokens = match lexer.lex() {
            Ok(t) => t,
            Err(_) => panic!("Failed to parse during test"),
        };
        assert_eq!(
            tokens,
            vec![
                Token::LeftParen,
                Token::Identifier(String::from("Rv0023")),
                Token::Or,
                Token::Identifier(String::from("Rv0123")),
                Token::RightParen,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_symbols_and_ids() {
        let mut lexer = Lexer::new("10005.1&&b-0001 || NOT s:1");
        let tokens = lexer.lex().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Identifier(String::from("10005.1")),
                Token::And,
                Token::Identifier(String::from("b-0001")),
                Token::Or,
                Token::Not,
                Token::Identifier(String::from("s:1")),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_invalid_character() {
        let mut lexer = Lexer::new("g1 + g2");
        assert_eq!(
            lexer.lex(),
            Err(LexerError::InvalidToken {
                character: '+',
                position: 3
            })
        );
    }
}
