//! Std-grammar tokens and tokenizer.

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1},
    combinator::{map, map_opt, value},
    multi::many0,
    sequence::{pair, preceded, terminated},
    IResult, InputLength,
};

use crate::lexer::{space, symbol, token, Lex, Token};
use crate::{lex_token, Symbol};

/// Lexical element of a boolean expression.
/// Named after how they look, not what they mean.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum BoolToken {
    Symbol(Symbol),
    Zero,
    One,
    True,
    False,
    And,
    Or,
    Not,
    Xor,
    VarOrder,
    MainExp,
    Tilde,
    Bang,
    Amp,
    AmpAmp,
    Bar,
    BarBar,
    Caret,
    FatArrow,
    Arrow,
    DoubleFatArrow,
    DoubleArrow,
    Eq,
    Lt,
    Gt,
    Dash,
    Comma,
    LParen,
    RParen,
}

impl From<Symbol> for BoolToken {
    fn from(s: Symbol) -> Self {
        Self::Symbol(s)
    }
}

impl From<&str> for BoolToken {
    fn from(s: &str) -> Self {
        Self::Symbol(Symbol::from(s))
    }
}

impl InputLength for BoolToken {
    #[inline]
    fn input_len(&self) -> usize {
        1
    }
}

macro_rules! bool_token {
    ($function: ident, $tag: literal, $token: ident) => {
        lex_token!($function<BoolToken>, $tag, BoolToken::$token);
    };
}

bool_token!(tilde, "~", Tilde);
bool_token!(bang, "!", Bang);
bool_token!(amp_amp, "&&", AmpAmp);
bool_token!(amp, "&", Amp);
bool_token!(bar_bar, "||", BarBar);
bool_token!(bar, "|", Bar);
bool_token!(caret, "^", Caret);
bool_token!(double_fat_arrow, "<=>", DoubleFatArrow);
bool_token!(double_arrow, "<->", DoubleArrow);
bool_token!(fat_arrow, "=>", FatArrow);
bool_token!(arrow, "->", Arrow);
bool_token!(eq, "=", Eq);
bool_token!(lt, "<", Lt);
bool_token!(gt, ">", Gt);
bool_token!(dash, "-", Dash);
bool_token!(comma, ",", Comma);
bool_token!(lparen, "(", LParen);
bool_token!(rparen, ")", RParen);

/// Section headers like `Main_Exp:`, with optional space before the colon.
fn header(input: &str) -> IResult<&str, Token<BoolToken, &str>> {
    fn section<'a>(
        name: &'static str,
    ) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
        terminated(tag_no_case(name), pair(space, char(':')))
    }

    token(alt((
        value(BoolToken::VarOrder, section("var_order")),
        value(BoolToken::MainExp, section("main_exp")),
    )))(input)
}

/// Only the digits `0` and `1` are constants.
fn constant(input: &str) -> IResult<&str, Token<BoolToken, &str>> {
    token(map_opt(digit1, |digits: &str| match digits {
        "0" => Some(BoolToken::Zero),
        "1" => Some(BoolToken::One),
        _ => None,
    }))(input)
}

/// A name, unless it is a (case-insensitive) keyword.
fn word(input: &str) -> IResult<&str, Token<BoolToken, &str>> {
    token(map(symbol, |s| {
        let keyword = s.name().to_ascii_lowercase();
        match keyword.as_str() {
            "and" => BoolToken::And,
            "or" => BoolToken::Or,
            "not" => BoolToken::Not,
            "xor" => BoolToken::Xor,
            "true" => BoolToken::True,
            "false" => BoolToken::False,
            _ => BoolToken::Symbol(s),
        }
    }))(input)
}

/// Std-grammar lexer.
pub struct BoolLexer;

impl<'a> Lex<'a, &str> for BoolLexer {
    type Input = &'a str;
    type Token = Token<BoolToken, &'a str>;

    /// Tokenize a std-format expression file. Longer operators are
    /// tried before their prefixes, and headers before plain names.
    fn lex(input: &'a str) -> IResult<&'a str, Vec<Self::Token>> {
        preceded(
            space,
            many0(terminated(
                alt((
                    header,
                    alt((double_fat_arrow, double_arrow, fat_arrow, arrow)),
                    alt((amp_amp, amp, bar_bar, bar, caret, tilde, bang)),
                    alt((eq, lt, gt, dash, comma, lparen, rparen)),
                    constant,
                    word,
                )),
                space,
            )),
        )(input)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(input: &str) -> (&str, Vec<BoolToken>) {
        let (rest, tokens) = BoolLexer::lex(input).expect("lexer never fails outright");
        (rest, tokens.into_iter().map(|t| t.token).collect())
    }

    #[test]
    fn bool_lexer() {
        use BoolToken::*;

        assert_eq!(BoolLexer::lex(""), Ok(("", vec![])), "nothing");
        assert_eq!(BoolLexer::lex(" \n# just a comment"), Ok(("", vec![])), "space");
        assert_eq!(
            BoolLexer::lex("abc"),
            Ok(("", vec![Token::new("abc".into(), "abc")])),
            "one token"
        );
        assert_eq!(
            BoolLexer::lex(" a &b "),
            Ok((
                "",
                vec![
                    Token::new("a".into(), "a"),
                    Token::new(Amp, "&"),
                    Token::new("b".into(), "b"),
                ]
            )),
            "sources are exact"
        );
        assert_eq!(
            kinds("~a | !b && c || d ^ e"),
            (
                "",
                vec![
                    Tilde,
                    "a".into(),
                    Bar,
                    Bang,
                    "b".into(),
                    AmpAmp,
                    "c".into(),
                    BarBar,
                    "d".into(),
                    Caret,
                    "e".into()
                ]
            ),
            "symbolic operators"
        );
        assert_eq!(
            kinds("a => b -> c <=> d <-> e"),
            (
                "",
                vec![
                    "a".into(),
                    FatArrow,
                    "b".into(),
                    Arrow,
                    "c".into(),
                    DoubleFatArrow,
                    "d".into(),
                    DoubleArrow,
                    "e".into()
                ]
            ),
            "arrows"
        );
        assert_eq!(
            kinds("(A AND b) Or NOT c xor True and false"),
            (
                "",
                vec![
                    LParen,
                    "A".into(),
                    And,
                    "b".into(),
                    RParen,
                    Or,
                    Not,
                    "c".into(),
                    Xor,
                    True,
                    And,
                    False
                ]
            ),
            "keywords"
        );
        assert_eq!(
            kinds("android oracle notary"),
            ("", vec!["android".into(), "oracle".into(), "notary".into()]),
            "keyword prefixes are names"
        );
        assert_eq!(kinds("0 1"), ("", vec![Zero, One]), "constants");
        assert_eq!(kinds("2"), ("2", vec![]), "no other numbers");
        assert_eq!(
            kinds("Var_Order : a, b\nmain_exp: a"),
            (
                "",
                vec![
                    VarOrder,
                    "a".into(),
                    Comma,
                    "b".into(),
                    MainExp,
                    "a".into()
                ]
            ),
            "headers"
        );
        assert_eq!(
            kinds("Main_Exp_2"),
            ("", vec!["Main_Exp_2".into()]),
            "a header needs its colon"
        );
        assert_eq!(kinds("a @ b"), ("@ b", vec!["a".into()]), "leftovers");
    }
}
