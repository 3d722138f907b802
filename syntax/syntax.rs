//! Syntactic elements of propositional (boolean) expressions,
//! and the plain-text "std" format used to exchange them:
//!
//! ```text
//! # Comments run to the end of the line.
//! Var_Order: a b c
//! Main_Exp: (a & b) | ~c
//! ```
//!
//! A file without headers is read as a bare main expression.
//! The proc-macro parser layers Rust tokens over the same grammar.

mod boolean;
mod lexer;
mod parser;
mod tokens;

use std::collections::BTreeSet;
use std::fmt;
use std::ops;

use nom::Offset as _;
use thiserror::Error;

pub use boolean::{expression, BoolLexer, BoolParser, BoolToken};
pub use lexer::{Lex, Token};
pub use parser::Parse;
pub use tokens::Tokens;

/// A variable name.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: String) -> Self {
        Symbol(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(String::from(s))
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol::new(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binding strength of the connectives, loosest first.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Precedence {
    Lowest,
    Iff,
    Implies,
    Or,
    Xor,
    And,
    Not,
    Atomic,
}

impl Precedence {
    pub fn is_right_assoc(&self) -> bool {
        matches!(self, Self::Implies)
    }
}

/// Binary connectives.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum BinOp {
    And,
    Or,
    Xor,
    Implies,
    Iff,
}

impl BinOp {
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::And => Precedence::And,
            Self::Or => Precedence::Or,
            Self::Xor => Precedence::Xor,
            Self::Implies => Precedence::Implies,
            Self::Iff => Precedence::Iff,
        }
    }

    /// Apply the connective to two truth values.
    pub fn eval(&self, x: bool, y: bool) -> bool {
        match self {
            Self::And => x && y,
            Self::Or => x || y,
            Self::Xor => x != y,
            Self::Implies => !x || y,
            Self::Iff => x == y,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Implies => "=>",
            Self::Iff => "<=>",
        })
    }
}

/// A propositional expression over named variables.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum Expr {
    Const(bool),
    Var(Symbol),
    Not(Box<Expr>),
    Binary(Box<Expr>, BinOp, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<Symbol>) -> Self {
        Self::Var(name.into())
    }

    /// Boxing constructor.
    #[allow(clippy::should_implement_trait)]
    pub fn not(e: Expr) -> Self {
        Self::Not(Box::new(e))
    }

    /// Boxing constructor.
    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Self::Binary(Box::new(left), op, Box::new(right))
    }

    pub fn implies(self, consequent: Expr) -> Self {
        Self::binary(self, BinOp::Implies, consequent)
    }

    pub fn iff(self, other: Expr) -> Self {
        Self::binary(self, BinOp::Iff, other)
    }

    /// Left-nested conjunction; the empty conjunction is _true_.
    pub fn all(conjuncts: impl IntoIterator<Item = Expr>) -> Self {
        conjuncts
            .into_iter()
            .reduce(|l, r| l & r)
            .unwrap_or(Self::Const(true))
    }

    /// Left-nested disjunction; the empty disjunction is _false_.
    pub fn any(disjuncts: impl IntoIterator<Item = Expr>) -> Self {
        disjuncts
            .into_iter()
            .reduce(|l, r| l | r)
            .unwrap_or(Self::Const(false))
    }

    /// Exactly one of `features` holds: a disjunction over each feature
    /// of "this one, and none of the others".
    pub fn one_of(features: impl IntoIterator<Item = Symbol>) -> Self {
        let features = features.into_iter().collect::<Vec<_>>();
        Self::any(features.iter().map(|active| {
            Self::all(features.iter().map(|f| {
                if f == active {
                    Self::Var(f.clone())
                } else {
                    !Self::Var(f.clone())
                }
            }))
        }))
    }

    /// A single clause ruling out exactly the configuration `excluded`
    /// (a subset of `features`): some excluded feature is off, or some
    /// other feature is on. Without the second half, every superset of
    /// the configuration would be ruled out too.
    pub fn exclude(
        features: impl IntoIterator<Item = Symbol>,
        excluded: impl IntoIterator<Item = Symbol>,
    ) -> Self {
        let excluded = excluded.into_iter().collect::<Vec<_>>();
        let off = excluded.iter().cloned().map(|f| !Self::Var(f));
        let on = features
            .into_iter()
            .filter(|f| !excluded.contains(f))
            .map(Self::Var);
        Self::any(off.chain(on))
    }

    /// The set of variables mentioned anywhere in the expression.
    pub fn variables(&self) -> BTreeSet<Symbol> {
        let mut vars = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(e) = stack.pop() {
            match e {
                Self::Const(_) => (),
                Self::Var(v) => {
                    vars.insert(v.clone());
                }
                Self::Not(e) => stack.push(e),
                Self::Binary(l, _, r) => {
                    stack.push(r);
                    stack.push(l);
                }
            }
        }
        vars
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Const(_) | Self::Var(_) => Precedence::Atomic,
            Self::Not(_) => Precedence::Not,
            Self::Binary(_, op, _) => op.precedence(),
        }
    }
}

impl From<Symbol> for Expr {
    fn from(s: Symbol) -> Self {
        Self::Var(s)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Self::Const(b)
    }
}

impl ops::Not for Expr {
    type Output = Self;

    fn not(self) -> Self::Output {
        Expr::not(self)
    }
}

impl ops::BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Expr::binary(self, BinOp::And, rhs)
    }
}

impl ops::BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Expr::binary(self, BinOp::Or, rhs)
    }
}

impl ops::BitXor for Expr {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Expr::binary(self, BinOp::Xor, rhs)
    }
}

/// Print in the std grammar with as few parentheses as
/// will re-parse to the same tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn operand(f: &mut fmt::Formatter<'_>, e: &Expr, parens: bool) -> fmt::Result {
            if parens {
                f.write_fmt(format_args!("({e})"))
            } else {
                f.write_fmt(format_args!("{e}"))
            }
        }

        match self {
            Self::Const(true) => f.write_str("1"),
            Self::Const(false) => f.write_str("0"),
            Self::Var(v) => v.fmt(f),
            Self::Not(_) => {
                let mut e = self;
                while let Self::Not(inner) = e {
                    f.write_str("~")?;
                    e = &**inner;
                }
                operand(f, e, e.precedence() < Precedence::Not)
            }
            Self::Binary(_, op, _) => {
                // A left-associative chain prints without parentheses
                // down its left spine, so walk that spine in a loop.
                let p = op.precedence();
                let mut left = self;
                let mut rights = Vec::new();
                loop {
                    match left {
                        Self::Binary(l, o, r)
                            if o == op && (rights.is_empty() || !p.is_right_assoc()) =>
                        {
                            rights.push(&**r);
                            left = &**l;
                        }
                        _ => break,
                    }
                }
                let lp = left.precedence();
                operand(f, left, lp < p || (lp == p && p.is_right_assoc()))?;
                for r in rights.into_iter().rev() {
                    let rp = r.precedence();
                    f.write_fmt(format_args!(" {op} "))?;
                    operand(f, r, rp < p || (rp == p && !p.is_right_assoc()))?;
                }
                Ok(())
            }
        }
    }
}

/// The parsed contents of a std-format file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExpressionFile {
    /// Preferred variable order, if the file declares one.
    pub var_order: Vec<Symbol>,
    pub main_expr: Expr,
}

impl ExpressionFile {
    pub fn new(var_order: impl IntoIterator<Item = Symbol>, main_expr: Expr) -> Self {
        Self {
            var_order: var_order.into_iter().collect(),
            main_expr,
        }
    }
}

impl fmt::Display for ExpressionFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.var_order.is_empty() {
            let order = self
                .var_order
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            f.write_fmt(format_args!("Var_Order: {order}\n"))?;
        }
        f.write_fmt(format_args!("Main_Exp: {}", self.main_expr))
    }
}

/// Things that may go wrong reading an expression.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SyntaxError {
    #[error("unrecognized input at line {line}, column {column}: `{found}`")]
    Lex {
        line: usize,
        column: usize,
        found: String,
    },
    #[error("unexpected `{found}` at line {line}, column {column}")]
    Parse {
        line: usize,
        column: usize,
        found: String,
    },
    #[error("unexpected `{found}` after the end of the expression at line {line}, column {column}")]
    TrailingInput {
        line: usize,
        column: usize,
        found: String,
    },
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("`Var_Order:` given without a `Main_Exp:` section")]
    MissingMainExpression,
}

type StrToken<'a> = Token<BoolToken, &'a str>;
type StrInput<'a> = Tokens<'a, StrToken<'a>>;

impl SyntaxError {
    /// Locate `found` (a subslice of `source`) and describe it.
    fn locate(source: &str, found: &str) -> (usize, usize, String) {
        let (line, column) = lexer::line_column(source, source.offset(found));
        let found = found
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .chars()
            .take(16)
            .collect();
        (line, column, found)
    }

    fn lex(source: &str, rest: &str) -> Self {
        let (line, column, found) = Self::locate(source, rest);
        Self::Lex {
            line,
            column,
            found,
        }
    }

    fn parse(source: &str, input: &StrInput) -> Self {
        match input.first() {
            None => Self::UnexpectedEnd,
            Some(t) => {
                let (line, column, found) = Self::locate(source, t.source);
                Self::Parse {
                    line,
                    column,
                    found,
                }
            }
        }
    }

    fn trailing(source: &str, t: &StrToken) -> Self {
        let (line, column, found) = Self::locate(source, t.source);
        Self::TrailingInput {
            line,
            column,
            found,
        }
    }
}

fn lex(source: &str) -> Result<Vec<StrToken>, SyntaxError> {
    match BoolLexer::lex(source) {
        Ok(("", tokens)) => Ok(tokens),
        Ok((rest, _)) => Err(SyntaxError::lex(source, rest)),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(SyntaxError::lex(source, e.input)),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::UnexpectedEnd),
    }
}

/// Insist that a parse consumed every token.
fn finish<'a, T>(
    source: &'a str,
    result: nom::IResult<StrInput<'a>, T>,
) -> Result<T, SyntaxError> {
    match result {
        Ok((rest, tree)) => match rest.first() {
            None => Ok(tree),
            Some(t) => Err(SyntaxError::trailing(source, t)),
        },
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(SyntaxError::parse(source, &e.input)),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::UnexpectedEnd),
    }
}

/// Read a std-format expression file.
pub fn parse_std(source: &str) -> Result<ExpressionFile, SyntaxError> {
    let tokens = lex(source)?;
    let has = |wanted: BoolToken| tokens.iter().any(|t| t.token == wanted);
    if has(BoolToken::VarOrder) && !has(BoolToken::MainExp) {
        return Err(SyntaxError::MissingMainExpression);
    }
    finish(source, BoolParser::parse(Tokens::new(&tokens[..])))
}

/// Read a bare expression (no headers).
pub fn parse_expr(source: &str) -> Result<Expr, SyntaxError> {
    let tokens = lex(source)?;
    finish(source, expression(Tokens::new(&tokens[..])))
}

/// Render expressions as Rust tokens.
/// See the `expr!` proc macro parser.
#[cfg(feature = "to-rust")]
mod to_rust {
    use proc_macro2::TokenStream;
    use quote::{quote, ToTokens};

    use super::*;

    impl ToTokens for Symbol {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            let name = self.name();
            tokens.extend(quote!(::cnfgen_syntax::Symbol::from(#name)));
        }
    }

    impl ToTokens for BinOp {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                BinOp::And => quote!(::cnfgen_syntax::BinOp::And),
                BinOp::Or => quote!(::cnfgen_syntax::BinOp::Or),
                BinOp::Xor => quote!(::cnfgen_syntax::BinOp::Xor),
                BinOp::Implies => quote!(::cnfgen_syntax::BinOp::Implies),
                BinOp::Iff => quote!(::cnfgen_syntax::BinOp::Iff),
            });
        }
    }

    impl ToTokens for Expr {
        fn to_tokens(&self, tokens: &mut TokenStream) {
            tokens.extend(match self {
                Expr::Const(b) => quote!(::cnfgen_syntax::Expr::Const(#b)),
                Expr::Var(v) => quote!(::cnfgen_syntax::Expr::Var(#v)),
                Expr::Not(e) => quote!(::cnfgen_syntax::Expr::not(#e)),
                Expr::Binary(l, op, r) => {
                    quote!(::cnfgen_syntax::Expr::binary(#l, #op, #r))
                }
            });
        }
    }
}

/// Constructor macros for tests. They are *not* intended as a public
/// interface, and *should* be behind `#[cfg(test)]`, but [cargo can't
/// currently export test code across crates](https://github.com/rust-lang/cargo/issues/8379).
#[cfg(feature = "macros")]
mod macros {
    #[macro_export]
    macro_rules! sym {
        ($name: ident) => {
            $crate::Symbol::from(stringify!($name))
        };
    }

    #[macro_export]
    macro_rules! var {
        ($name: ident) => {
            $crate::Expr::Var($crate::sym!($name))
        };
    }

    /// Parse a bare expression or die trying.
    #[macro_export]
    macro_rules! parse {
        ($source: expr) => {
            $crate::parse_expr($source).expect("can't parse test expression")
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn v(name: &str) -> Expr {
        Expr::var(name)
    }

    #[test]
    fn display_minimal_parens() {
        assert_eq!((v("a") & v("b")).to_string(), "a & b");
        assert_eq!(((v("a") | v("b")) & v("c")).to_string(), "(a | b) & c");
        assert_eq!((v("a") | (v("b") & v("c"))).to_string(), "a | b & c");
        assert_eq!((v("a") & (v("b") & v("c"))).to_string(), "a & (b & c)");
        assert_eq!(
            v("a").implies(v("b").implies(v("c"))).to_string(),
            "a => b => c"
        );
        assert_eq!(
            v("a").implies(v("b")).implies(v("c")).to_string(),
            "(a => b) => c"
        );
        assert_eq!((!(v("a") ^ v("b"))).to_string(), "~(a ^ b)");
        assert_eq!((!!v("a")).to_string(), "~~a");
        assert_eq!(v("a").iff(Expr::Const(false)).to_string(), "a <=> 0");
    }

    #[test]
    fn display_round_trip() {
        for source in [
            "a",
            "~a & b",
            "(a | b) & (c | ~d)",
            "a ^ b | c",
            "a => (b <=> c)",
            "(a => b) => c",
            "~(a & (b | 1))",
            "a & (b & c)",
        ] {
            let e = parse_expr(source).expect("parse");
            assert_eq!(parse_expr(&e.to_string()), Ok(e), "{source}");
        }
    }

    #[test]
    fn parse_std_headers() {
        let file = parse_std("# features\nVar_Order: a, b c\nMain_Exp: a & (b | ~c)\n")
            .expect("std file");
        assert_eq!(file.var_order, vec![Symbol::from("a"), "b".into(), "c".into()]);
        assert_eq!(file.main_expr, v("a") & (v("b") | !v("c")));
        assert_eq!(
            file.to_string(),
            "Var_Order: a b c\nMain_Exp: a & (b | ~c)"
        );
    }

    #[test]
    fn parse_std_order_after_main() {
        let file = parse_std("Main_Exp: x | y\nVar_Order: y x").expect("std file");
        assert_eq!(file.var_order, vec![Symbol::from("y"), Symbol::from("x")]);
        assert_eq!(file.main_expr, v("x") | v("y"));
    }

    #[test]
    fn parse_std_bare() {
        let file = parse_std("(A AND B) OR C").expect("bare expression");
        assert!(file.var_order.is_empty());
        assert_eq!(file.main_expr, (v("A") & v("B")) | v("C"));
    }

    #[test]
    fn parse_std_errors() {
        assert_eq!(parse_std(""), Err(SyntaxError::UnexpectedEnd));
        assert_eq!(parse_std("# only a comment\n"), Err(SyntaxError::UnexpectedEnd));
        assert_eq!(
            parse_std("Var_Order: a b"),
            Err(SyntaxError::MissingMainExpression)
        );
        assert_eq!(
            parse_std("Main_Exp: a &\n  $b"),
            Err(SyntaxError::Lex {
                line: 2,
                column: 3,
                found: "$b".into()
            })
        );
        assert_eq!(
            parse_std("Main_Exp: a & )"),
            Err(SyntaxError::Parse {
                line: 1,
                column: 15,
                found: ")".into()
            })
        );
        assert_eq!(parse_std("Main_Exp: (a | b"), Err(SyntaxError::UnexpectedEnd));
        assert_eq!(
            parse_std("a b"),
            Err(SyntaxError::TrailingInput {
                line: 1,
                column: 3,
                found: "b".into()
            })
        );
    }

    #[test]
    fn one_of() {
        let fs = ["a", "b", "c"].map(Symbol::from);
        assert_eq!(
            Expr::one_of(fs).to_string(),
            "a & ~b & ~c | ~a & b & ~c | ~a & ~b & c"
        );
        assert_eq!(Expr::one_of([Symbol::from("a")]), v("a"));
        assert_eq!(Expr::one_of([]), Expr::Const(false));
    }

    #[test]
    fn exclude() {
        let fs = ["a", "b", "c", "d"].map(Symbol::from);
        let excluded = ["a", "c"].map(Symbol::from);
        assert_eq!(Expr::exclude(fs, excluded).to_string(), "~a | ~c | b | d");
        let fs = ["a", "b"].map(Symbol::from);
        assert_eq!(Expr::exclude(fs.clone(), fs).to_string(), "~a | ~b");
    }

    #[test]
    fn variables() {
        let e = parse_expr("(b & a) => ~(c | a) ^ 1").expect("parse");
        assert_eq!(
            e.variables().into_iter().collect::<Vec<_>>(),
            ["a", "b", "c"].map(Symbol::from)
        );
    }

    #[test]
    fn spaced_operators() {
        assert_eq!(parse_expr("a & & b"), parse_expr("a && b"));
        assert_eq!(parse_expr("a | | b"), parse_expr("a || b"));
        assert_eq!(parse_expr("a = > b"), parse_expr("a => b"));
        assert_eq!(parse_expr("a - > b"), parse_expr("a -> b"));
        assert_eq!(parse_expr("a < = > b"), parse_expr("a <=> b"));
        assert!(parse_expr("a = b").is_err());
    }

    #[test]
    fn long_chains() {
        let n = 10_000;
        let source = (0..n).map(|i| format!("x{i}")).collect::<Vec<_>>().join(" | ");
        let mut e = parse_expr(&source).expect("long disjunction");
        assert_eq!(e.variables().len(), n);
        assert_eq!(e.to_string(), source);
        // Take the trees apart in a loop; dropping them whole recurses.
        while let Expr::Binary(l, BinOp::Or, _) = e {
            e = *l;
        }
        assert_eq!(e, Expr::var("x0"));

        let negated = format!("{}a", "~".repeat(n));
        let mut e = parse_expr(&negated).expect("long negation");
        assert_eq!(e.to_string(), negated);
        while let Expr::Not(inner) = e {
            e = *inner;
        }
        assert_eq!(e, Expr::var("a"));
    }

    #[test]
    fn eval_bin_op() {
        use BinOp::*;
        let table = [(false, false), (false, true), (true, false), (true, true)];
        let results = |op: BinOp| table.map(|(x, y)| op.eval(x, y));
        assert_eq!(results(And), [false, false, false, true]);
        assert_eq!(results(Or), [false, true, true, true]);
        assert_eq!(results(Xor), [false, true, true, false]);
        assert_eq!(results(Implies), [true, true, false, true]);
        assert_eq!(results(Iff), [true, false, false, true]);
    }
}
