use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

/// Everything that can go wrong while turning text into a number.
///
/// Variants that can be traced back to the input carry a [`SourceSpan`] so the
/// caller can render them against the original expression with
/// [`Error::with_source`].
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum Error {
    #[error("unknown symbol `{symbol}` at position {}", .span.offset())]
    #[diagnostic(
        code(rpncalc::lex::unknown_symbol),
        help("supported functions: sin, cos, tg, tan, ctg, asin, acos, atan, log, log2, log10, sqrt, abs, exp; constants: pi, e")
    )]
    UnknownSymbol {
        symbol: String,
        #[label("this symbol")]
        span: SourceSpan,
    },

    #[error("invalid number at position {}", .span.offset())]
    #[diagnostic(code(rpncalc::lex::invalid_number))]
    InvalidNumber {
        #[label("this numeric literal")]
        span: SourceSpan,
    },

    #[error("mismatched parentheses at position {}", .span.offset())]
    #[diagnostic(
        code(rpncalc::syntax::mismatched_parentheses),
        help("every `(` needs a matching `)`")
    )]
    MismatchedParentheses {
        #[label("unmatched")]
        span: SourceSpan,
    },

    #[error("invalid syntax at position {}", .span.offset())]
    #[diagnostic(code(rpncalc::syntax::invalid_rpn_syntax))]
    InvalidRpnSyntax {
        #[label("unexpected here")]
        span: SourceSpan,
    },

    #[error("not enough operands for `{token}` at position {}", .span.offset())]
    #[diagnostic(code(rpncalc::syntax::not_enough_operands))]
    NotEnoughOperands {
        token: String,
        #[label("needs more operands")]
        span: SourceSpan,
    },

    #[error("unknown operator `{op}` at position {}", .span.offset())]
    #[diagnostic(code(rpncalc::syntax::unknown_operator))]
    UnknownOperator {
        op: String,
        #[label("this operator")]
        span: SourceSpan,
    },

    #[error("unknown function `{name}` at position {}", .span.offset())]
    #[diagnostic(code(rpncalc::syntax::unknown_function))]
    UnknownFunction {
        name: String,
        #[label("this function")]
        span: SourceSpan,
    },

    #[error("division by zero at position {}", .span.offset())]
    #[diagnostic(code(rpncalc::eval::division_by_zero))]
    DivisionByZero {
        #[label("divisor is zero")]
        span: SourceSpan,
    },

    #[error("arithmetic overflow at position {}", .span.offset())]
    #[diagnostic(
        code(rpncalc::eval::arithmetic_overflow),
        help("the result does not fit in a 64-bit float")
    )]
    ArithmeticOverflow {
        #[label("overflows here")]
        span: SourceSpan,
    },

    #[error("invalid expression: {reason}")]
    #[diagnostic(code(rpncalc::eval::invalid_expression))]
    InvalidExpression {
        reason: String,
        #[label("here")]
        span: Option<SourceSpan>,
    },

    #[error("calculation timed out at position {}", .span.offset())]
    #[diagnostic(code(rpncalc::eval::timeout))]
    Timeout {
        #[label("gave up here")]
        span: SourceSpan,
    },
}

/// The stage an [`Error`] is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Syntax,
    Eval,
}

impl Error {
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::UnknownSymbol { span, .. }
            | Error::InvalidNumber { span }
            | Error::MismatchedParentheses { span }
            | Error::InvalidRpnSyntax { span }
            | Error::NotEnoughOperands { span, .. }
            | Error::UnknownOperator { span, .. }
            | Error::UnknownFunction { span, .. }
            | Error::DivisionByZero { span }
            | Error::ArithmeticOverflow { span }
            | Error::Timeout { span } => Some(span.offset()),
            Error::InvalidExpression { span, .. } => span.map(|span| span.offset()),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Error::UnknownSymbol { .. } | Error::InvalidNumber { .. } => Stage::Lex,
            Error::MismatchedParentheses { .. }
            | Error::InvalidRpnSyntax { .. }
            | Error::NotEnoughOperands { .. }
            | Error::UnknownOperator { .. }
            | Error::UnknownFunction { .. } => Stage::Syntax,
            Error::DivisionByZero { .. }
            | Error::ArithmeticOverflow { .. }
            | Error::InvalidExpression { .. }
            | Error::Timeout { .. } => Stage::Eval,
        }
    }

    /// Attaches the expression text so the labels render against it.
    pub fn with_source(self, name: &str, source: &str) -> Report {
        Report::new(self).with_source_code(NamedSource::new(name, source.to_string()))
    }
}
