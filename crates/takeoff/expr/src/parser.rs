//! Parser: shunting-yard conversion from infix tokens to RPN
//!
//! Besides reordering, the parser checks that operands and operators
//! alternate, that parentheses balance, that commas only appear inside
//! function calls, and that every call passes exactly its function's arity.

use crate::errors::{ExprError, ExprResult};
use crate::lexer::{Function, Token, TokenKind};

/// What the previous token allows next
#[derive(Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Number, variable, function or `(`
    Operand,
    /// Operator, `)` or `,`
    Operator,
}

/// An open parenthesis: a plain group or the argument list of a call
struct Frame {
    call: Option<Function>,
    args: usize,
    position: usize,
}

/// Shunting-yard parser over a token stream
pub struct Parser {
    tokens: Vec<Token>,
    output: Vec<Token>,
    stack: Vec<Token>,
    frames: Vec<Frame>,
}

impl Parser {
    /// Convert `tokens` to RPN order
    pub fn parse(tokens: Vec<Token>) -> ExprResult<Vec<Token>> {
        let mut parser = Self {
            output: Vec::with_capacity(tokens.len()),
            stack: Vec::new(),
            frames: Vec::new(),
            tokens,
        };
        parser.run()?;
        Ok(parser.output)
    }

    fn run(&mut self) -> ExprResult<()> {
        let tokens = std::mem::take(&mut self.tokens);
        let mut expect = Expect::Operand;
        let mut pending_call: Option<Function> = None;
        let mut end = 0;

        for token in tokens {
            end = token.position + 1;
            let position = token.position;

            match &token.kind {
                TokenKind::Number(_) | TokenKind::Variable(_) => {
                    self.require(expect, Expect::Operand, &token)?;
                    self.output.push(token);
                    expect = Expect::Operator;
                }
                TokenKind::Function(func) => {
                    self.require(expect, Expect::Operand, &token)?;
                    pending_call = Some(*func);
                    self.stack.push(token);
                }
                TokenKind::LeftParen => {
                    self.require(expect, Expect::Operand, &token)?;
                    self.frames.push(Frame {
                        call: pending_call.take(),
                        args: 1,
                        position,
                    });
                    self.stack.push(token);
                }
                TokenKind::Comma => {
                    self.require(expect, Expect::Operator, &token)?;
                    self.pop_until_paren(position, "',' outside of a function call")?;
                    match self.frames.last_mut() {
                        Some(Frame {
                            call: Some(_),
                            args,
                            ..
                        }) => *args += 1,
                        _ => {
                            return Err(ExprError::syntax(
                                position,
                                "',' outside of a function call",
                            ))
                        }
                    }
                    expect = Expect::Operand;
                }
                TokenKind::RightParen => {
                    self.require(expect, Expect::Operator, &token)?;
                    self.pop_until_paren(position, "unmatched ')'")?;
                    self.stack.pop();
                    let frame = self
                        .frames
                        .pop()
                        .ok_or_else(|| ExprError::syntax(position, "unmatched ')'"))?;
                    if let Some(func) = frame.call {
                        if frame.args != func.arity() {
                            return Err(ExprError::syntax(
                                frame.position,
                                format!(
                                    "{}() takes {} argument{}, got {}",
                                    func.name(),
                                    func.arity(),
                                    if func.arity() == 1 { "" } else { "s" },
                                    frame.args
                                ),
                            ));
                        }
                        // The call is emitted once its arguments are complete
                        if let Some(call) = self.stack.pop() {
                            self.output.push(call);
                        }
                    }
                    expect = Expect::Operator;
                }
                TokenKind::Operator(op) => {
                    self.require(expect, Expect::Operator, &token)?;
                    while let Some(top) = self.stack.last() {
                        match &top.kind {
                            TokenKind::Operator(prev) if prev.precedence() >= op.precedence() => {
                                if let Some(prev) = self.stack.pop() {
                                    self.output.push(prev);
                                }
                            }
                            _ => break,
                        }
                    }
                    self.stack.push(token);
                    expect = Expect::Operand;
                }
            }
        }

        if expect == Expect::Operand {
            return Err(ExprError::syntax(end, "unexpected end of expression"));
        }

        while let Some(token) = self.stack.pop() {
            if token.kind == TokenKind::LeftParen {
                return Err(ExprError::syntax(token.position, "unclosed '('"));
            }
            self.output.push(token);
        }

        Ok(())
    }

    fn require(&self, actual: Expect, wanted: Expect, token: &Token) -> ExprResult<()> {
        if actual == wanted {
            return Ok(());
        }
        let expected = match actual {
            Expect::Operand => "a number, variable, function or '('",
            Expect::Operator => "an operator, ',' or ')'",
        };
        Err(ExprError::syntax(
            token.position,
            format!("expected {}, found {}", expected, token.kind),
        ))
    }

    /// Move operators to the output until the nearest `(`, which is left on the stack
    fn pop_until_paren(&mut self, position: usize, message: &str) -> ExprResult<()> {
        loop {
            match self.stack.last() {
                None => return Err(ExprError::syntax(position, message)),
                Some(top) if top.kind == TokenKind::LeftParen => return Ok(()),
                Some(_) => {
                    if let Some(op) = self.stack.pop() {
                        self.output.push(op);
                    }
                }
            }
        }
    }
}
