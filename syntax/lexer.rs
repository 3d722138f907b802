//! Tokenize a string representation of a boolean expression.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace1, not_line_ending},
    combinator::{recognize, value},
    error::ParseError,
    multi::many0_count,
    sequence::pair,
    IResult, Offset, Parser,
};

use crate::Symbol;

/// A comment runs from `#` to the end of the line.
fn comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('#'), not_line_ending))(input)
}

/// Skip any mix of whitespace and comments.
pub(crate) fn space(input: &str) -> IResult<&str, ()> {
    value((), many0_count(alt((multispace1, comment))))(input)
}

pub(crate) fn symbol(input: &str) -> IResult<&str, Symbol> {
    let (input, name) = recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)?;
    Ok((input, Symbol::from(name)))
}

/// Wrap a parser so that its output carries the exact source text it
/// consumed. The text is a subslice of the lexer input, so its position
/// can be recovered later with [`nom::Offset`].
pub(crate) fn token<'a, O, E, F>(
    mut parser: F,
) -> impl FnMut(&'a str) -> IResult<&'a str, Token<O, &'a str>, E>
where
    O: Clone,
    E: ParseError<&'a str>,
    F: Parser<&'a str, O, E>,
{
    move |input: &'a str| {
        let (rest, t) = parser.parse(input)?;
        let consumed = input.offset(rest);
        Ok((rest, Token::new(t, &input[..consumed])))
    }
}

/// Define a parser combinator for a token denoted by a tag.
#[macro_export]
macro_rules! lex_token {
    ($function: ident<$ty: ty>, $tag: literal, $token: expr) => {
        pub(crate) fn $function(input: &str) -> IResult<&str, $crate::Token<$ty, &str>> {
            $crate::lexer::token(::nom::combinator::map(
                ::nom::bytes::complete::tag($tag),
                |_| $token,
            ))(input)
        }
    };
}

/// A token with source information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token<T: Clone, S: Clone> {
    pub token: T,
    pub source: S,
}

impl<T: Clone, S: Clone> Token<T, S> {
    pub fn new(token: T, source: S) -> Self {
        Self { token, source }
    }
}

/// A lexer, a.k.a. lexical analyzer, tokenizer.
pub trait Lex<'a, S> {
    type Input;
    type Token;

    /// Tokenize an input stream. Whatever is left over
    /// could not be recognized as a token.
    fn lex(input: Self::Input) -> IResult<Self::Input, Vec<Self::Token>>;
}

/// Line and column (both 1-based) of `offset` bytes into `source`.
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(newline) => before[newline + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn symbol() {
        assert!(super::symbol("").is_err(), "empty");
        assert!(super::symbol("123").is_err(), "symbol starts with a digit");
        assert_eq!(
            super::symbol("_123"),
            Ok(("", Symbol::from("_123"))),
            "symbol starts with an underscore"
        );
        assert_eq!(
            super::symbol("Feature_2 & x"),
            Ok((" & x", Symbol::from("Feature_2"))),
            "symbol includes an underscore and a digit"
        );
    }

    #[test]
    fn space() {
        assert_eq!(super::space(""), Ok(("", ())));
        assert_eq!(super::space("  \n\t x"), Ok(("x", ())));
        assert_eq!(super::space("# note\n  # more\nx"), Ok(("x", ())));
        assert_eq!(super::space("# no newline"), Ok(("", ())));
    }

    #[test]
    fn token_source() {
        let input = "abc def";
        let (rest, tok) = token(super::symbol)(input).expect("a symbol");
        assert_eq!(rest, " def");
        assert_eq!(tok, Token::new(Symbol::from("abc"), "abc"));
        assert_eq!(input.offset(tok.source), 0);
    }

    #[test]
    fn line_column() {
        let source = "ab\ncd\n\nef";
        assert_eq!(super::line_column(source, 0), (1, 1));
        assert_eq!(super::line_column(source, 1), (1, 2));
        assert_eq!(super::line_column(source, 3), (2, 1));
        assert_eq!(super::line_column(source, 4), (2, 2));
        assert_eq!(super::line_column(source, 7), (4, 1));
        assert_eq!(super::line_column(source, 99), (4, 3));
    }
}
