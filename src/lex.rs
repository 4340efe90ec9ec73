use std::fmt::Display;

use miette::SourceSpan;

use crate::{
    error::Error,
    stack::Stack,
    system::{Constant, Func},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Operator,
    Function,
    LeftParen,
    RightParen,
    Constant,
    /// Reserved for multi-argument functions; never produced by the lexer.
    Comma,
}

/// A slice of the input together with its kind and the byte offset it
/// starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
    pub offset: usize,
}

impl<'de> Token<'de> {
    pub fn new(kind: TokenKind, literal: &'de str, offset: usize) -> Self {
        Token {
            kind,
            literal,
            offset,
        }
    }

    pub fn span(&self) -> SourceSpan {
        (self.offset, self.literal.len()).into()
    }

    /// A unary minus standing in front of a function call or a parenthesized
    /// group. It is a one-argument function that negates its operand.
    pub fn is_sign(&self) -> bool {
        self.kind == TokenKind::Function && self.literal == Func::Neg.name()
    }

    fn starts_value(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Number | TokenKind::Constant | TokenKind::Function | TokenKind::LeftParen
        )
    }

    /// What may follow a complete operand.
    fn continues_value(&self) -> bool {
        matches!(self.kind, TokenKind::Operator | TokenKind::RightParen)
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number => write!(f, "NUMBER {lit}"),
            TokenKind::Operator => write!(f, "OPERATOR {lit}"),
            TokenKind::Function => write!(f, "FUNCTION {lit}"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit}"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit}"),
            TokenKind::Constant => write!(f, "CONSTANT {lit}"),
            TokenKind::Comma => write!(f, "COMMA {lit}"),
        }
    }
}

/// Space-separated literals, e.g. `2 3 4 * +`.
pub struct DisplayTokens<'a, 'de>(pub &'a [Token<'de>]);

impl Display for DisplayTokens<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token.literal)?;
        }
        Ok(())
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
    prev: Option<TokenKind>,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
            prev: None,
        }
    }

    /// A `-` here is a sign, not a subtraction.
    fn at_operand_start(&self) -> bool {
        matches!(
            self.prev,
            None | Some(TokenKind::Operator) | Some(TokenKind::LeftParen)
        )
    }

    fn emit(
        &mut self,
        kind: TokenKind,
        literal: &'de str,
        offset: usize,
    ) -> Option<Result<Token<'de>, Error>> {
        self.prev = Some(kind);
        Some(Ok(Token {
            kind,
            literal,
            offset,
        }))
    }

    /// Moves past `len` bytes of `self.rest`.
    fn advance(&mut self, len: usize) {
        self.byte += len;
        self.rest = &self.rest[len..];
    }

    fn preceded_by_digit(&self, offset: usize) -> bool {
        offset > 0 && self.whole.as_bytes()[offset - 1].is_ascii_digit()
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut chars = self.rest.chars();
            let c = chars.next()?;
            let start = self.byte;
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            enum Started {
                Sign,
                Number,
                Ident,
            }

            let started = match c {
                c if c.is_whitespace() => continue,
                '-' if self.at_operand_start() => Started::Sign,
                '+' | '-' | '*' | '/' | '^' => {
                    if self.prev == Some(TokenKind::Operator) {
                        return Some(Err(Error::InvalidRpnSyntax {
                            span: (start, 1).into(),
                        }));
                    }
                    return self.emit(TokenKind::Operator, &cur[..1], start);
                }
                '(' => return self.emit(TokenKind::LeftParen, &cur[..1], start),
                ')' => return self.emit(TokenKind::RightParen, &cur[..1], start),
                '0'..='9' | '.' => Started::Number,
                'a'..='z' | 'A'..='Z' => Started::Ident,
                c => {
                    return Some(Err(Error::UnknownSymbol {
                        symbol: c.to_string(),
                        span: (start, c.len_utf8()).into(),
                    }));
                }
            };

            match started {
                Started::Number => {
                    let len = match number_len(cur, start) {
                        Ok(len) => len,
                        Err(e) => return Some(Err(e)),
                    };
                    self.advance(len - 1);
                    return self.emit(TokenKind::Number, &cur[..len], start);
                }
                Started::Ident => {
                    if self.preceded_by_digit(start) {
                        return Some(Err(Error::InvalidNumber {
                            span: (start, 1).into(),
                        }));
                    }
                    let len = ident_len(cur);
                    let literal = &cur[..len];
                    self.advance(len - 1);

                    let kind = if Constant::from_name(literal).is_some() {
                        TokenKind::Constant
                    } else if Func::from_name(literal).is_some() {
                        TokenKind::Function
                    } else {
                        return Some(Err(Error::UnknownSymbol {
                            symbol: literal.to_string(),
                            span: (start, len).into(),
                        }));
                    };
                    return self.emit(kind, literal, start);
                }
                Started::Sign => match self.rest.chars().next() {
                    Some('0'..='9' | '.') => {
                        let len = match number_len(self.rest, start + 1) {
                            Ok(len) => len,
                            Err(e) => return Some(Err(e)),
                        };
                        self.advance(len);
                        return self.emit(TokenKind::Number, &cur[..len + 1], start);
                    }
                    Some('a'..='z' | 'A'..='Z') => {
                        let len = ident_len(self.rest);
                        let name = &self.rest[..len];
                        if Constant::from_name(name).is_some() {
                            self.advance(len);
                            return self.emit(TokenKind::Constant, &cur[..len + 1], start);
                        }
                        if Func::from_name(name).is_some() {
                            // the function name itself is lexed on the next call
                            return self.emit(TokenKind::Function, &cur[..1], start);
                        }
                        return Some(Err(Error::UnknownSymbol {
                            symbol: name.to_string(),
                            span: (start + 1, len).into(),
                        }));
                    }
                    Some('(') => return self.emit(TokenKind::Function, &cur[..1], start),
                    _ => {
                        return Some(Err(Error::InvalidNumber {
                            span: (start, 1).into(),
                        }));
                    }
                },
            }
        }
    }
}

fn ident_len(text: &str) -> usize {
    text.find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(text.len())
}

/// Length of the numeric literal at the start of `text`, which begins with a
/// digit or a decimal point and sits at `offset` in the whole input.
///
/// Grammar: `digits [ '.' digits ] [ ('e' | 'E') [ '+' | '-' ] digits ]`.
fn number_len(text: &str, offset: usize) -> Result<usize, Error> {
    let bytes = text.as_bytes();
    let invalid = |at: usize| Error::InvalidNumber {
        span: (offset + at, 1).into(),
    };
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let mut i = digits_from(0);
    if bytes.get(i) == Some(&b'.') {
        let int_digits = i;
        let after_dot = digits_from(i + 1);
        if int_digits == 0 || after_dot == i + 1 {
            return Err(invalid(0));
        }
        i = after_dot;
        if bytes.get(i) == Some(&b'.') {
            return Err(invalid(i));
        }
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let marker = i;
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let end = digits_from(i);
        if end == i {
            return Err(invalid(marker));
        }
        i = end;
        if bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
            return Err(invalid(i));
        }
    }

    Ok(i)
}

/// Scans `input` and checks that the tokens form a well-shaped infix
/// expression: balanced parentheses, every operator and `(` followed by an
/// operand, every function followed by `(`.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>, Error> {
    let tokens = Lexer::new(input).collect::<Result<Vec<_>, _>>()?;
    validate(&tokens)?;
    tracing::debug!("tokens: {}", DisplayTokens(&tokens));
    Ok(tokens)
}

fn validate(tokens: &[Token<'_>]) -> Result<(), Error> {
    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return Err(Error::InvalidRpnSyntax {
            span: (0, 0).into(),
        });
    };

    match first.kind {
        TokenKind::Operator | TokenKind::Comma => {
            return Err(Error::InvalidRpnSyntax { span: first.span() });
        }
        TokenKind::RightParen => {
            return Err(Error::MismatchedParentheses { span: first.span() });
        }
        _ => {}
    }
    match last.kind {
        TokenKind::Operator | TokenKind::Function | TokenKind::Comma => {
            return Err(Error::InvalidRpnSyntax { span: last.span() });
        }
        TokenKind::LeftParen => {
            return Err(Error::MismatchedParentheses { span: last.span() });
        }
        _ => {}
    }

    let mut open = Stack::new();
    for (i, token) in tokens.iter().enumerate() {
        let next = tokens.get(i + 1);
        let well_followed = match token.kind {
            TokenKind::Operator => next.is_some_and(Token::starts_value),
            TokenKind::Function if token.is_sign() => next.is_some_and(|next| {
                next.kind == TokenKind::LeftParen
                    || (next.kind == TokenKind::Function && !next.is_sign())
            }),
            TokenKind::Function => next.is_some_and(|next| next.kind == TokenKind::LeftParen),
            TokenKind::LeftParen => {
                open.push(*token);
                next.is_some_and(Token::starts_value)
            }
            TokenKind::RightParen => {
                if open.pop().is_none() {
                    return Err(Error::MismatchedParentheses { span: token.span() });
                }
                next.is_none_or(Token::continues_value)
            }
            TokenKind::Number | TokenKind::Constant => {
                next.is_none_or(Token::continues_value)
            }
            TokenKind::Comma => false,
        };
        if !well_followed {
            return Err(Error::InvalidRpnSyntax { span: token.span() });
        }
    }

    if let Some(unclosed) = open.peek() {
        return Err(Error::MismatchedParentheses {
            span: unclosed.span(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_literals(input: &str) -> Vec<(TokenKind, &str, usize)> {
        tokenize(input)
            .unwrap_or_else(|e| panic!("tokenize({input:?}) failed: {e}"))
            .into_iter()
            .map(|token| (token.kind, token.literal, token.offset))
            .collect()
    }

    fn err(input: &str) -> Error {
        match tokenize(input) {
            Ok(tokens) => panic!("expected error for {input:?}, got {tokens:?}"),
            Err(e) => e,
        }
    }

    #[test]
    fn numbers() {
        use TokenKind::Number;
        assert_eq!(kinds_and_literals("42"), vec![(Number, "42", 0)]);
        assert_eq!(kinds_and_literals("3.14"), vec![(Number, "3.14", 0)]);
        assert_eq!(kinds_and_literals("1.25e+09"), vec![(Number, "1.25e+09", 0)]);
        assert_eq!(kinds_and_literals("1.25E-09"), vec![(Number, "1.25E-09", 0)]);
        assert_eq!(kinds_and_literals("1e5"), vec![(Number, "1e5", 0)]);
        assert_eq!(kinds_and_literals("  7 "), vec![(Number, "7", 2)]);
    }

    #[test]
    fn unary_minus_folds_into_number() {
        use TokenKind::*;
        assert_eq!(kinds_and_literals("-42"), vec![(Number, "-42", 0)]);
        assert_eq!(
            kinds_and_literals("2 + -5"),
            vec![(Number, "2", 0), (Operator, "+", 2), (Number, "-5", 4)]
        );
        assert_eq!(
            kinds_and_literals("2 * (-5)"),
            vec![
                (Number, "2", 0),
                (Operator, "*", 2),
                (LeftParen, "(", 4),
                (Number, "-5", 5),
                (RightParen, ")", 7),
            ]
        );
        assert_eq!(
            kinds_and_literals("3-1"),
            vec![(Number, "3", 0), (Operator, "-", 1), (Number, "1", 2)]
        );
    }

    #[test]
    fn unary_minus_before_constant_function_and_group() {
        use TokenKind::*;
        assert_eq!(
            kinds_and_literals("-pi * 2"),
            vec![(Constant, "-pi", 0), (Operator, "*", 4), (Number, "2", 6)]
        );
        assert_eq!(
            kinds_and_literals("2 * -sin(1)"),
            vec![
                (Number, "2", 0),
                (Operator, "*", 2),
                (Function, "-", 4),
                (Function, "sin", 5),
                (LeftParen, "(", 8),
                (Number, "1", 9),
                (RightParen, ")", 10),
            ]
        );
        assert_eq!(
            kinds_and_literals("-(1 + 2)"),
            vec![
                (Function, "-", 0),
                (LeftParen, "(", 1),
                (Number, "1", 2),
                (Operator, "+", 4),
                (Number, "2", 6),
                (RightParen, ")", 7),
            ]
        );
        assert!(tokenize("-(1)").is_ok_and(|tokens| tokens[0].is_sign()));
    }

    #[test]
    fn operators_parens_and_names() {
        use TokenKind::*;
        assert_eq!(
            kinds_and_literals("(2 + 3) ^ 4"),
            vec![
                (LeftParen, "(", 0),
                (Number, "2", 1),
                (Operator, "+", 3),
                (Number, "3", 5),
                (RightParen, ")", 6),
                (Operator, "^", 8),
                (Number, "4", 10),
            ]
        );
        assert_eq!(
            kinds_and_literals("sin(pi)"),
            vec![
                (Function, "sin", 0),
                (LeftParen, "(", 3),
                (Constant, "pi", 4),
                (RightParen, ")", 6),
            ]
        );
        assert_eq!(
            kinds_and_literals("pi*e"),
            vec![(Constant, "pi", 0), (Operator, "*", 2), (Constant, "e", 3)]
        );
        assert_eq!(kinds_and_literals("log10(1)")[0], (Function, "log10", 0));
    }

    #[test]
    fn invalid_numbers() {
        for input in ["1.2.3", "1.2e", "1.2e+", "1.2e1.2", "1.2e++2", "1e10f", ".5", "5.", "1 + 4j", "-", "2 * -"] {
            assert!(
                matches!(err(input), Error::InvalidNumber { .. }),
                "{input:?} -> {:?}",
                tokenize(input)
            );
        }
        assert_eq!(err("1.2.3").offset(), Some(3));
        assert_eq!(err("1e10f").offset(), Some(4));
        assert_eq!(err("1.2e").offset(), Some(3));
        assert_eq!(err("2 * - 3").offset(), Some(4));
    }

    #[test]
    fn unknown_symbols() {
        for input in ["1 @ 2", "unknown", "pi2", "pix", "2 , 3", "x"] {
            assert!(
                matches!(err(input), Error::UnknownSymbol { .. }),
                "{input:?} -> {:?}",
                tokenize(input)
            );
        }
        assert_eq!(err("1 @ 2").offset(), Some(2));
        match err("2 + foo(1)") {
            Error::UnknownSymbol { symbol, span } => {
                assert_eq!(symbol, "foo");
                assert_eq!(span.offset(), 4);
                assert_eq!(span.len(), 3);
            }
            e => panic!("unexpected {e:?}"),
        }
    }

    #[test]
    fn structural_errors() {
        for input in ["", "   ", "2 /", "1 ++ 2", "1 + * 2", "1 1 + 1", "(2 + 3) +", "()", "sin 30", "2 pi", "(1)(2)", "* 2"] {
            assert!(
                matches!(err(input), Error::InvalidRpnSyntax { .. }),
                "{input:?} -> {:?}",
                tokenize(input)
            );
        }
        assert_eq!(err("1 ++ 2").offset(), Some(3));
    }

    #[test]
    fn mismatched_parentheses() {
        for input in ["(2 + 3))", "(2 + 3", "2 + (3", ")2(", "((1)"] {
            assert!(
                matches!(err(input), Error::MismatchedParentheses { .. }),
                "{input:?} -> {:?}",
                tokenize(input)
            );
        }
        assert_eq!(err("(2 + 3))").offset(), Some(7));
        assert_eq!(err("((1)").offset(), Some(0));
    }

    #[test]
    fn display() {
        let tokens = tokenize("-sin(2)*pi").expect("valid");
        let printed = tokens.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(
            printed,
            vec![
                "FUNCTION -",
                "FUNCTION sin",
                "LEFT_PAREN (",
                "NUMBER 2",
                "RIGHT_PAREN )",
                "OPERATOR *",
                "CONSTANT pi",
            ]
        );
        assert_eq!(DisplayTokens(&tokens).to_string(), "- sin ( 2 ) * pi");
    }
}
