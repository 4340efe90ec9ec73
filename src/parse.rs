use crate::{
    error::Error,
    lex::{DisplayTokens, Token, TokenKind},
    stack::Stack,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

impl Op {
    pub fn from_literal(literal: &str) -> Option<Op> {
        match literal {
            "+" => Some(Op::Plus),
            "-" => Some(Op::Minus),
            "*" => Some(Op::Star),
            "/" => Some(Op::Slash),
            "^" => Some(Op::Caret),
            _ => None,
        }
    }

    pub fn from_token(token: &Token<'_>) -> Result<Op, Error> {
        Op::from_literal(token.literal).ok_or_else(|| Error::UnknownOperator {
            op: token.literal.to_string(),
            span: token.span(),
        })
    }

    pub const fn binding(self) -> (u8, Assoc) {
        match self {
            Op::Plus | Op::Minus => (1, Assoc::Left),
            Op::Star | Op::Slash => (2, Assoc::Left),
            Op::Caret => (3, Assoc::Right),
        }
    }

    /// Whether `self`, already on the operator stack, must be emitted before
    /// `incoming` is pushed.
    fn yields_to(self, incoming: Op) -> bool {
        let (stacked, _) = self.binding();
        let (next, assoc) = incoming.binding();
        stacked > next || (stacked == next && assoc == Assoc::Left)
    }
}

/// Reorders an infix token stream into postfix using the shunting-yard
/// algorithm.
///
/// Expects the shape guaranteed by [`crate::tokenize`]: every function is
/// followed by a parenthesized group (or, for a sign, by another function).
/// A function is emitted as soon as the group it owns is closed.
pub fn to_rpn<'de>(tokens: &[Token<'de>]) -> Result<Vec<Token<'de>>, Error> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut ops = Stack::with_capacity(tokens.len());

    for &token in tokens {
        match token.kind {
            TokenKind::Number | TokenKind::Constant => output.push(token),
            TokenKind::Function | TokenKind::LeftParen => ops.push(token),
            TokenKind::RightParen => {
                loop {
                    match ops.pop() {
                        Some(Token {
                            kind: TokenKind::LeftParen,
                            ..
                        }) => break,
                        Some(top) => output.push(top),
                        None => {
                            return Err(Error::MismatchedParentheses { span: token.span() });
                        }
                    }
                }
                // the owning function, and a sign in front of it
                while let Some(top) = ops
                    .peek()
                    .copied()
                    .filter(|top: &Token<'_>| top.kind == TokenKind::Function)
                {
                    ops.pop();
                    output.push(top);
                }
            }
            TokenKind::Operator => {
                let incoming = Op::from_token(&token)?;
                while let Some(top) = ops.peek().copied() {
                    if top.kind != TokenKind::Operator || !Op::from_token(&top)?.yields_to(incoming) {
                        break;
                    }
                    ops.pop();
                    output.push(top);
                }
                ops.push(token);
            }
            TokenKind::Comma => return Err(Error::InvalidRpnSyntax { span: token.span() }),
        }
    }

    while let Some(top) = ops.pop() {
        if top.kind == TokenKind::LeftParen {
            return Err(Error::MismatchedParentheses { span: top.span() });
        }
        output.push(top);
    }

    tracing::debug!("rpn: {}", DisplayTokens(&output));
    Ok(output)
}
