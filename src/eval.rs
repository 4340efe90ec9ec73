use std::time::{Duration, Instant};

use crate::{
    error::Error,
    lex::{Token, TokenKind},
    parse::Op,
    stack::Stack,
    system::{Constant, Func},
};

/// How long [`evaluate`] may run before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Unit of trig arguments and of inverse-trig results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
    Radians,
    #[default]
    Degrees,
}

impl AngleMode {
    pub fn to_radians(self, angle: f64) -> f64 {
        match self {
            AngleMode::Radians => angle,
            AngleMode::Degrees => angle.to_radians(),
        }
    }

    pub fn angle_from_radians(self, radians: f64) -> f64 {
        match self {
            AngleMode::Radians => radians,
            AngleMode::Degrees => radians.to_degrees(),
        }
    }
}

/// Evaluates a postfix token stream, bounded by [`DEFAULT_TIMEOUT`].
pub fn evaluate(rpn: &[Token<'_>], mode: AngleMode) -> Result<f64, Error> {
    evaluate_within(rpn, mode, DEFAULT_TIMEOUT)
}

pub fn evaluate_within(rpn: &[Token<'_>], mode: AngleMode, timeout: Duration) -> Result<f64, Error> {
    evaluate_until(rpn, mode, Instant::now().checked_add(timeout))
}

/// Evaluates a postfix token stream on a value stack.
///
/// The deadline is checked before every token; `None` means no limit.
/// Every intermediate value must be finite.
pub fn evaluate_until(
    rpn: &[Token<'_>],
    mode: AngleMode,
    deadline: Option<Instant>,
) -> Result<f64, Error> {
    let mut values: Stack<f64> = Stack::with_capacity(rpn.len());

    for token in rpn {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(Error::Timeout { span: token.span() });
        }

        let value = match token.kind {
            TokenKind::Number => {
                let n: f64 = token.literal.parse().map_err(|_| Error::InvalidNumber {
                    span: token.span(),
                })?;
                finite(n, token)?
            }
            TokenKind::Constant => constant(token)?,
            TokenKind::Operator => {
                let op = Op::from_token(token)?;
                if values.len() < 2 {
                    return Err(not_enough_operands(token));
                }
                let (Some(b), Some(a)) = (values.pop(), values.pop()) else {
                    return Err(not_enough_operands(token));
                };
                let result = match op {
                    Op::Plus => a + b,
                    Op::Minus => a - b,
                    Op::Star => a * b,
                    Op::Slash => {
                        if b == 0.0 {
                            return Err(Error::DivisionByZero { span: token.span() });
                        }
                        a / b
                    }
                    Op::Caret => a.powf(b),
                };
                finite(result, token)?
            }
            TokenKind::Function => {
                let func = Func::from_name(token.literal).ok_or_else(|| Error::UnknownFunction {
                    name: token.literal.to_string(),
                    span: token.span(),
                })?;
                if values.is_empty() {
                    return Err(not_enough_operands(token));
                }
                let Some(x) = values.pop() else {
                    return Err(not_enough_operands(token));
                };
                let result = func
                    .apply(x, mode)
                    .map_err(|reason| Error::InvalidExpression {
                        reason: reason.to_string(),
                        span: Some(token.span()),
                    })?;
                finite(result, token)?
            }
            TokenKind::LeftParen | TokenKind::RightParen | TokenKind::Comma => {
                return Err(Error::InvalidRpnSyntax { span: token.span() });
            }
        };

        values.push(value);
        tracing::trace!(
            "{token}: stack (top first) {:?}",
            values.iter().collect::<Vec<_>>()
        );
    }

    let left = values.len();
    match (values.pop(), rpn.last()) {
        (Some(result), Some(last)) if left == 1 => {
            let result = finite(result, last)?;
            tracing::debug!("result: {result}");
            Ok(result)
        }
        _ => Err(Error::InvalidExpression {
            reason: format!("expected exactly one value on the stack, found {left}"),
            span: None,
        }),
    }
}

fn constant(token: &Token<'_>) -> Result<f64, Error> {
    let (sign, name) = match token.literal.strip_prefix('-') {
        Some(name) => (-1.0, name),
        None => (1.0, token.literal),
    };
    let constant = Constant::from_name(name).ok_or_else(|| Error::UnknownSymbol {
        symbol: token.literal.to_string(),
        span: token.span(),
    })?;
    Ok(sign * constant.value())
}

fn finite(value: f64, token: &Token<'_>) -> Result<f64, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::ArithmeticOverflow { span: token.span() })
    }
}

fn not_enough_operands(token: &Token<'_>) -> Error {
    Error::NotEnoughOperands {
        token: token.literal.to_string(),
        span: token.span(),
    }
}
