pub mod error;
pub mod eval;
pub mod lex;
pub mod parse;
mod stack;
pub mod system;

pub use error::{Error, Stage};
pub use eval::{AngleMode, DEFAULT_TIMEOUT, evaluate, evaluate_until, evaluate_within};
pub use lex::{DisplayTokens, Lexer, Token, TokenKind, tokenize};
pub use parse::to_rpn;

/// Tokenizes, converts and evaluates `input` in one go.
pub fn calculate(input: &str, mode: AngleMode) -> Result<f64, Error> {
    let tokens = tokenize(input)?;
    let rpn = to_rpn(&tokens)?;
    evaluate(&rpn, mode)
}
