//! Std-grammar parser.
//!
//! Pratt-style precedence parsing for the binary connectives,
//! recursive descent for everything else. Once an operator or an
//! opening parenthesis has been consumed the parse is committed
//! (`cut`), so errors point at the offending token.

use nom::{
    branch::alt,
    combinator::{cut, map, opt, success},
    error::{Error, ErrorKind},
    multi::{many0, many0_count},
    sequence::{delimited, preceded, terminated},
    Err, IResult, Slice,
};

use crate::{parse_token, BinOp, Expr, ExpressionFile, Parse, Precedence, Symbol, Token, Tokens};

use super::lexer::BoolToken;

/// Local alias.
type Input<'a, S> = crate::parser::Input<'a, BoolToken, S>;

/// Std-grammar parser: an expression file, with or without headers.
pub struct BoolParser;

impl<'a, S: Clone> Parse<'a, S> for BoolParser {
    type Token = BoolToken;
    type Tree = ExpressionFile;

    fn parse(input: Input<'a, S>) -> IResult<Input<'a, S>, Self::Tree> {
        alt((headed_file, bare_file))(input)
    }
}

/// Define a parser combinator that recognizes a single token.
macro_rules! parse_bool_token {
    ($function: ident, $token: ident) => {
        parse_token!($function<BoolToken>, BoolToken::$token);
    };
}

parse_bool_token!(var_order, VarOrder);
parse_bool_token!(main_exp, MainExp);
parse_bool_token!(tilde, Tilde);
parse_bool_token!(bang, Bang);
parse_bool_token!(not_kw, Not);
parse_bool_token!(amp, Amp);
parse_bool_token!(amp_amp, AmpAmp);
parse_bool_token!(and_kw, And);
parse_bool_token!(bar, Bar);
parse_bool_token!(bar_bar, BarBar);
parse_bool_token!(or_kw, Or);
parse_bool_token!(caret, Caret);
parse_bool_token!(xor_kw, Xor);
parse_bool_token!(fat_arrow, FatArrow);
parse_bool_token!(arrow, Arrow);
parse_bool_token!(double_fat_arrow, DoubleFatArrow);
parse_bool_token!(double_arrow, DoubleArrow);
parse_bool_token!(eq, Eq);
parse_bool_token!(lt, Lt);
parse_bool_token!(gt, Gt);
parse_bool_token!(dash, Dash);
parse_bool_token!(comma, Comma);
parse_bool_token!(lparen, LParen);
parse_bool_token!(rparen, RParen);

fn fail<S: Clone, O>(input: Input<S>) -> IResult<Input<S>, O> {
    Err(Err::Error(Error::new(input, ErrorKind::Tag)))
}

fn constant<S: Clone>(input: Input<S>) -> IResult<Input<S>, bool> {
    match input.first().map(|t| &t.token) {
        Some(BoolToken::One | BoolToken::True) => Ok((input.slice(1..), true)),
        Some(BoolToken::Zero | BoolToken::False) => Ok((input.slice(1..), false)),
        _ => fail(input),
    }
}

fn symbol<S: Clone>(input: Input<S>) -> IResult<Input<S>, Symbol> {
    match input.first().map(|t| &t.token) {
        Some(BoolToken::Symbol(s)) => Ok((input.slice(1..), s.clone())),
        _ => fail(input),
    }
}

// The proc-macro lexer sees Rust punctuation one character at a time,
// so each compound operator also parses as its sequence of characters.

fn not<S: Clone>(input: Input<S>) -> IResult<Input<S>, Input<S>> {
    alt((tilde, bang, not_kw))(input)
}

fn and<S: Clone>(input: Input<S>) -> IResult<Input<S>, Input<S>> {
    alt((amp_amp, preceded(amp, amp), amp, and_kw))(input)
}

fn or<S: Clone>(input: Input<S>) -> IResult<Input<S>, Input<S>> {
    alt((bar_bar, preceded(bar, bar), bar, or_kw))(input)
}

fn xor<S: Clone>(input: Input<S>) -> IResult<Input<S>, Input<S>> {
    alt((caret, xor_kw))(input)
}

fn implies<S: Clone>(input: Input<S>) -> IResult<Input<S>, Input<S>> {
    alt((fat_arrow, arrow, preceded(eq, gt), preceded(dash, gt)))(input)
}

fn iff<S: Clone>(input: Input<S>) -> IResult<Input<S>, Input<S>> {
    alt((
        double_fat_arrow,
        double_arrow,
        preceded(lt, preceded(eq, gt)),
        preceded(lt, preceded(dash, gt)),
    ))(input)
}

fn bin_op<S: Clone>(input: Input<S>) -> IResult<Input<S>, (Precedence, Option<BinOp>)> {
    alt((
        map(iff, |_| (Precedence::Iff, Some(BinOp::Iff))),
        map(implies, |_| (Precedence::Implies, Some(BinOp::Implies))),
        map(or, |_| (Precedence::Or, Some(BinOp::Or))),
        map(xor, |_| (Precedence::Xor, Some(BinOp::Xor))),
        map(and, |_| (Precedence::And, Some(BinOp::And))),
        success((Precedence::Lowest, None)),
    ))(input)
}

fn infix<S: Clone>(input: Input<S>, left: Expr) -> IResult<Input<S>, Expr> {
    let (input, (precedence, bin_op)) = bin_op(input)?;
    match bin_op {
        Some(op) => {
            let (input, right) = cut(|i| pratt_left(i, precedence))(input)?;
            Ok((input, Expr::binary(left, op, right)))
        }
        None => fail(input),
    }
}

fn pratt_right<S: Clone>(
    mut input: Input<S>,
    precedence: Precedence,
    mut left: Expr,
) -> IResult<Input<S>, Expr> {
    loop {
        let (_, (peek, _)) = bin_op(input)?;
        if peek > precedence || (peek == precedence && peek.is_right_assoc()) {
            (input, left) = infix(input, left)?;
        } else {
            return Ok((input, left));
        }
    }
}

fn pratt_left<S: Clone>(input: Input<S>, precedence: Precedence) -> IResult<Input<S>, Expr> {
    let (input, left) = base_expr(input)?;
    pratt_right(input, precedence, left)
}

fn atom<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    alt((
        map(constant, Expr::Const),
        map(symbol, Expr::Var),
        delimited(lparen, cut(expression), cut(rparen)),
    ))(input)
}

/// Any number of negations, counted rather than recursed on.
fn base_expr<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    let (input, negations) = many0_count(not)(input)?;
    let (input, atom) = if negations > 0 {
        cut(atom)(input)?
    } else {
        atom(input)?
    };
    Ok((input, (0..negations).fold(atom, |e, _| Expr::not(e))))
}

/// Parse one expression, leaving any tokens that follow it.
pub fn expression<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    pratt_left(input, Precedence::Lowest)
}

/// Names separated by spaces and/or commas.
fn var_order_section<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Symbol>> {
    preceded(var_order, many0(terminated(symbol, opt(comma))))(input)
}

fn main_section<S: Clone>(input: Input<S>) -> IResult<Input<S>, Expr> {
    preceded(main_exp, cut(expression))(input)
}

/// At most one `Var_Order` section, before or after the main one.
/// The main expression is parsed once, however long it is.
fn headed_file<S: Clone>(input: Input<S>) -> IResult<Input<S>, ExpressionFile> {
    let (input, before) = opt(var_order_section)(input)?;
    let (input, main) = main_section(input)?;
    let (input, after) = match before {
        Some(_) => (input, None),
        None => opt(var_order_section)(input)?,
    };
    Ok((input, ExpressionFile::new(before.or(after).unwrap_or_default(), main)))
}

fn bare_file<S: Clone>(input: Input<S>) -> IResult<Input<S>, ExpressionFile> {
    map(expression, |main| ExpressionFile::new([], main))(input)
}

#[cfg(test)]
mod test {
    use super::*;

    fn eof<'a>() -> Tokens<'a, Token<BoolToken, ()>> {
        Tokens::new(&[])
    }

    macro_rules! tok {
        ($t: ident) => {
            Token::new(BoolToken::$t, ())
        };
        ([$s: ident]) => {
            Token::new(BoolToken::Symbol(stringify!($s).into()), ())
        };
    }

    macro_rules! toks {
        [$($t: tt),* $(,)?] => {
            Tokens::new(&[$(tok!($t)),*])
        };
    }

    macro_rules! assert_parse {
        ($parsed: expr, $expected: expr) => {
            assert_eq!($parsed, Ok((eof(), $expected)));
        };
    }

    fn v(name: &str) -> Expr {
        Expr::var(name)
    }

    #[test]
    fn atoms() {
        assert_parse!(expression(toks![[a]]), v("a"));
        assert_parse!(expression(toks![One]), Expr::Const(true));
        assert_parse!(expression(toks![False]), Expr::Const(false));
        assert_parse!(expression(toks![LParen, [a], RParen]), v("a"));
    }

    #[test]
    fn negation() {
        assert_parse!(expression(toks![Tilde, [a]]), !v("a"));
        assert_parse!(expression(toks![Bang, Not, [a]]), !!v("a"));
        assert_parse!(expression(toks![Tilde, [a], Amp, [b]]), !v("a") & v("b"));
        assert_parse!(
            expression(toks![Tilde, LParen, [a], Amp, [b], RParen]),
            !(v("a") & v("b"))
        );
    }

    #[test]
    fn and_or() {
        // and binds tighter
        assert_parse!(
            expression(toks![[a], Bar, [b], Amp, [c]]),
            v("a") | (v("b") & v("c"))
        );
        assert_parse!(
            expression(toks![[a], And, [b], Or, [c]]),
            (v("a") & v("b")) | v("c")
        );
        // left associative
        assert_parse!(
            expression(toks![[a], AmpAmp, [b], Amp, Amp, [c]]),
            (v("a") & v("b")) & v("c")
        );
        assert_parse!(
            expression(toks![[a], BarBar, [b], Bar, Bar, [c]]),
            (v("a") | v("b")) | v("c")
        );
    }

    #[test]
    fn xor() {
        assert_parse!(
            expression(toks![[a], Caret, [b], Amp, [c]]),
            v("a") ^ (v("b") & v("c"))
        );
        assert_parse!(
            expression(toks![[a], Bar, [b], Xor, [c]]),
            v("a") | (v("b") ^ v("c"))
        );
    }

    #[test]
    fn implies() {
        // right associative
        assert_parse!(
            expression(toks![[a], FatArrow, [b], Arrow, [c]]),
            v("a").implies(v("b").implies(v("c")))
        );
        assert_parse!(
            expression(toks![LParen, [a], Eq, Gt, [b], RParen, Dash, Gt, [c]]),
            v("a").implies(v("b")).implies(v("c"))
        );
        assert_parse!(
            expression(toks![[a], Bar, [b], FatArrow, [c]]),
            (v("a") | v("b")).implies(v("c"))
        );
    }

    #[test]
    fn iff() {
        assert_parse!(
            expression(toks![[a], DoubleFatArrow, [b], FatArrow, [c]]),
            v("a").iff(v("b").implies(v("c")))
        );
        assert_parse!(
            expression(toks![[a], Lt, Eq, Gt, [b], Lt, Dash, Gt, [c]]),
            v("a").iff(v("b")).iff(v("c"))
        );
        assert_parse!(
            expression(toks![[a], DoubleArrow, [b]]),
            v("a").iff(v("b"))
        );
    }

    #[test]
    fn split_operators() {
        // What a proc macro sees for `&&`, `||`, and `=>`.
        assert_parse!(expression(toks![[a], Amp, Amp, [b]]), v("a") & v("b"));
        assert_parse!(expression(toks![[a], Bar, Bar, [b]]), v("a") | v("b"));
        assert_parse!(
            expression(toks![[a], Eq, Gt, [b]]),
            v("a").implies(v("b"))
        );
    }

    #[test]
    fn long_negation() {
        let mut tokens = vec![tok!(Tilde); 20_001];
        tokens.push(tok!([a]));
        let (rest, mut e) = expression(Tokens::new(&tokens)).expect("negations");
        assert!(rest.is_empty());
        let mut depth = 0;
        while let Expr::Not(inner) = e {
            depth += 1;
            e = *inner;
        }
        assert_eq!((depth, e), (20_001, v("a")));
    }

    #[test]
    fn leftovers() {
        assert_eq!(
            expression(toks![[a], [b]]),
            Ok((toks![[b]], v("a"))),
            "juxtaposition stops the expression"
        );
    }

    #[test]
    fn errors() {
        assert!(expression(eof()).is_err());
        assert!(matches!(
            expression(toks![[a], Amp, RParen]),
            Err(Err::Failure(Error { input, .. })) if input == toks![RParen]
        ));
        assert!(matches!(
            expression(toks![LParen, [a]]),
            Err(Err::Failure(Error { input, .. })) if input.is_empty()
        ));
    }

    #[test]
    fn files() {
        assert_parse!(
            BoolParser::parse(toks![MainExp, [a]]),
            ExpressionFile::new([], v("a"))
        );
        assert_parse!(
            BoolParser::parse(toks![VarOrder, [b], Comma, [a], MainExp, [a], Amp, [b]]),
            ExpressionFile::new(["b".into(), "a".into()], v("a") & v("b"))
        );
        assert_parse!(
            BoolParser::parse(toks![MainExp, [a], VarOrder, [a]]),
            ExpressionFile::new(["a".into()], v("a"))
        );
        assert_parse!(
            BoolParser::parse(toks![[a], Or, [b]]),
            ExpressionFile::new([], v("a") | v("b"))
        );
    }
}
