//! Safe evaluation of arithmetic text.
//!
//! Only digits, `.`, `+ - * /` and parentheses are accepted; anything
//! else is rejected before tokenizing. Grammar, left-associative with
//! the usual precedence:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := '(' expression ')' | number
//! number     := digits ('.' digits)?
//! ```
//!
//! Division by zero is not an error: it yields `inf` or `NaN` as IEEE-754
//! prescribes. Parentheses may nest at most [`MAX_NESTING`] levels deep.

use thiserror::Error;

/// Deepest parenthesis nesting `evaluate_expression` accepts.
pub const MAX_NESTING: usize = 256;

/// Positions are token indices into the whitespace-stripped input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid characters in expression")]
    InvalidCharacters,

    #[error("malformed number at token {position}")]
    MalformedNumber { position: usize },

    #[error("expected number at token {position}")]
    ExpectedNumber { position: usize },

    #[error("missing closing parenthesis at token {position}")]
    MissingClosingParenthesis { position: usize },

    #[error("unexpected tokens after expression at token {position}")]
    UnexpectedTokens { position: usize },

    #[error("parentheses nested too deeply at token {position}")]
    NestingTooDeep { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

/// Evaluate `text` with standard precedence and parentheses.
pub fn evaluate_expression(text: &str) -> Result<f64, ParseError> {
    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() || !stripped.chars().all(is_allowed) {
        return Err(ParseError::InvalidCharacters);
    }

    let tokens = tokenize(&stripped)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    if parser.pos < parser.tokens.len() {
        return Err(ParseError::UnexpectedTokens {
            position: parser.pos,
        });
    }
    Ok(value)
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '.')
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let token = match bytes[i] {
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            _ => {
                // Digits and dots: consume the whole run, then check shape.
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let literal = &input[start..i];
                let position = tokens.len();
                if !is_number_literal(literal) {
                    return Err(ParseError::MalformedNumber { position });
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::MalformedNumber { position })?;
                tokens.push(Token::Number(value));
                continue;
            }
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

/// `digits ('.' digits)?`
fn is_number_literal(literal: &str) -> bool {
    let mut parts = literal.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match parts.next() {
        None => digits(int_part),
        Some(frac) => digits(int_part) && digits(frac),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open parentheses enclosing the current position.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn expression(&mut self) -> Result<f64, ParseError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus {
                value + rhs
            } else {
                value - rhs
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ParseError> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            value = if op == Token::Star {
                value * rhs
            } else {
                value / rhs
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, ParseError> {
        match self.peek() {
            Some(Token::LParen) => {
                if self.depth >= MAX_NESTING {
                    return Err(ParseError::NestingTooDeep { position: self.pos });
                }
                self.depth += 1;
                self.pos += 1;
                let value = self.expression()?;
                if self.peek() != Some(Token::RParen) {
                    return Err(ParseError::MissingClosingParenthesis { position: self.pos });
                }
                self.pos += 1;
                self.depth -= 1;
                Ok(value)
            }
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(n)
            }
            _ => Err(ParseError::ExpectedNumber { position: self.pos }),
        }
    }
}
