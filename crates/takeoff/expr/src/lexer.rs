//! Lexer: tokenizes quantity expressions
//!
//! The whole input is checked against the character whitelist and the length
//! limit before a single token is produced. Identifiers directly followed by
//! `(` become function tokens and must name a built-in function; every other
//! identifier is a variable.

use crate::errors::{ExprError, ExprResult};
use crate::limits::EvalLimits;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Binary arithmetic operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    /// Binding strength; all operators are left-associative
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div => 2,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// Built-in function. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Ceil,
    Floor,
    Round,
    Min,
    Max,
    Case,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ceil" => Some(Self::Ceil),
            "floor" => Some(Self::Floor),
            "round" => Some(Self::Round),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "case" => Some(Self::Case),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ceil => "ceil",
            Self::Floor => "floor",
            Self::Round => "round",
            Self::Min => "min",
            Self::Max => "max",
            Self::Case => "case",
        }
    }

    /// Fixed argument count
    pub fn arity(&self) -> usize {
        match self {
            Self::Ceil | Self::Floor | Self::Round => 1,
            Self::Min | Self::Max => 2,
            Self::Case => 3,
        }
    }
}

/// Token kinds
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number(Decimal),
    Variable(String),
    Operator(Operator),
    Function(Function),
    LeftParen,
    RightParen,
    Comma,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {}", n),
            Self::Variable(name) => write!(f, "variable '{}'", name),
            Self::Operator(op) => write!(f, "operator '{}'", op.symbol()),
            Self::Function(func) => write!(f, "function '{}'", func.name()),
            Self::LeftParen => write!(f, "'('"),
            Self::RightParen => write!(f, "')'"),
            Self::Comma => write!(f, "','"),
        }
    }
}

/// A token produced by the lexer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// 0-based character offset in the source expression
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, position: usize) -> Self {
        Self { kind, position }
    }
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_ascii_whitespace()
        || matches!(c, '_' | '+' | '-' | '*' | '/' | '(' | ')' | '.' | ',')
}

/// Tokenize `input` under `limits`
pub fn tokenize(input: &str, limits: &EvalLimits) -> ExprResult<Vec<Token>> {
    Lexer::new(input, limits).tokenize()
}

/// Lexer for quantity expressions
pub struct Lexer<'a> {
    input: Vec<char>,
    pos: usize,
    limits: &'a EvalLimits,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &str, limits: &'a EvalLimits) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            limits,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> ExprResult<Vec<Token>> {
        self.check_input()?;

        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);

            if tokens.len() > self.limits.max_tokens {
                return Err(ExprError::syntax(
                    self.pos,
                    format!(
                        "expression has more than {} tokens",
                        self.limits.max_tokens
                    ),
                ));
            }
        }

        Ok(tokens)
    }

    fn check_input(&self) -> ExprResult<()> {
        if self.input.len() > self.limits.max_expression_len {
            return Err(ExprError::syntax(
                self.limits.max_expression_len,
                format!(
                    "expression is longer than {} characters",
                    self.limits.max_expression_len
                ),
            ));
        }

        if let Some((position, ch)) = self
            .input
            .iter()
            .enumerate()
            .find(|(_, c)| !is_allowed(**c))
        {
            return Err(ExprError::syntax(
                position,
                format!("character {:?} is not allowed", ch),
            ));
        }

        if self.input.iter().all(|c| c.is_ascii_whitespace()) {
            return Err(ExprError::syntax(0, "empty expression"));
        }

        Ok(())
    }

    fn next_token(&mut self) -> ExprResult<Token> {
        let ch = self.input[self.pos];
        let position = self.pos;

        match ch {
            '(' => {
                self.advance();
                Ok(Token::new(TokenKind::LeftParen, position))
            }
            ')' => {
                self.advance();
                Ok(Token::new(TokenKind::RightParen, position))
            }
            ',' => {
                self.advance();
                Ok(Token::new(TokenKind::Comma, position))
            }
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_identifier(),
            c => match Operator::from_char(c) {
                Some(op) => {
                    self.advance();
                    Ok(Token::new(TokenKind::Operator(op), position))
                }
                None => Err(ExprError::syntax(
                    position,
                    format!("unexpected character {:?}", c),
                )),
            },
        }
    }

    fn read_number(&mut self) -> ExprResult<Token> {
        let position = self.pos;
        let mut text = String::new();

        while let Some(c) = self.peek_at(0) {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            text.push(c);
            self.advance();
        }

        if text.matches('.').count() > 1 || text == "." {
            return Err(ExprError::syntax(
                position,
                format!("malformed number '{}'", text),
            ));
        }

        // `.5` and `5.` are accepted
        let normalized = match (text.starts_with('.'), text.ends_with('.')) {
            (true, _) => format!("0{}", text),
            (_, true) => format!("{}0", text),
            _ => text.clone(),
        };

        let value = Decimal::from_str(&normalized).map_err(|e| {
            ExprError::syntax(position, format!("invalid number '{}': {}", text, e))
        })?;

        if value >= self.limits.max_literal {
            return Err(ExprError::syntax(
                position,
                format!(
                    "number {} must be below {}",
                    text, self.limits.max_literal
                ),
            ));
        }

        Ok(Token::new(TokenKind::Number(value), position))
    }

    fn read_identifier(&mut self) -> ExprResult<Token> {
        let position = self.pos;
        let mut name = String::new();

        while let Some(c) = self.peek_at(0) {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            name.push(c);
            self.advance();
        }

        if self.next_non_whitespace() == Some('(') {
            return match Function::from_name(&name) {
                Some(func) => Ok(Token::new(TokenKind::Function(func), position)),
                None => Err(ExprError::syntax(
                    position,
                    format!("unknown function '{}'", name),
                )),
            };
        }

        Ok(Token::new(TokenKind::Variable(name), position))
    }

    fn skip_whitespace(&mut self) {
        while self.peek_at(0).is_some_and(|c| c.is_ascii_whitespace()) {
            self.advance();
        }
    }

    fn next_non_whitespace(&self) -> Option<char> {
        self.input[self.pos..]
            .iter()
            .copied()
            .find(|c| !c.is_ascii_whitespace())
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }
}
