//! A proc-macro parser for boolean expressions.
//!
//! Translate Rust tokens into std-grammar ones, parse them,
//! and (if successful) emit Rust code that constructs
//! the corresponding [`Expr`](cnfgen_syntax::Expr).

use std::fmt::{self, Display};

use proc_macro::{Delimiter, TokenStream, TokenTree};
use proc_macro2::Span;
use quote::{quote, quote_spanned};

use cnfgen_syntax::{expression, BoolLexer, BoolToken, Lex as _, Tokens};

struct Error {
    message: String,
    span: Span,
}

impl Error {
    fn new(message: String, span: Span) -> Self {
        Self { message, span }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

type Result<T> = std::result::Result<T, Error>;
type Token = cnfgen_syntax::Token<BoolToken, Span>;

/// Translate a stream of Rust tokens to a sequence of std-grammar tokens.
/// Rust punctuation arrives one character at a time, so `=>` becomes
/// `Eq Gt`; the parser accepts both spellings.
fn translate_tokens(input: TokenStream) -> Result<Vec<Token>> {
    use BoolToken::*;
    let mut toks = Vec::new();
    for tt in input {
        match tt {
            TokenTree::Group(g) => {
                let open = g.span_open().into();
                if g.delimiter() != Delimiter::Parenthesis {
                    return Err(Error::new("only parentheses group expressions".into(), open));
                }
                toks.push(Token::new(LParen, open));
                toks.extend(translate_tokens(g.stream())?);
                toks.push(Token::new(RParen, g.span_close().into()));
            }
            TokenTree::Ident(i) => {
                let name = i.to_string();
                let token = match name.to_ascii_lowercase().as_str() {
                    "and" => And,
                    "or" => Or,
                    "not" => Not,
                    "xor" => Xor,
                    "true" => True,
                    "false" => False,
                    // The glob import above shadows the `Symbol` type with the variant.
                    _ => Symbol(cnfgen_syntax::Symbol::new(name)),
                };
                toks.push(Token::new(token, i.span().into()));
            }
            TokenTree::Punct(p) => {
                let span = p.span().into();
                let token = match p.as_char() {
                    '~' => Tilde,
                    '!' => Bang,
                    '&' => Amp,
                    '|' => Bar,
                    '^' => Caret,
                    '=' => Eq,
                    '<' => Lt,
                    '>' => Gt,
                    '-' => Dash,
                    c => return Err(Error::new(format!("unexpected punctuation '{c}'"), span)),
                };
                toks.push(Token::new(token, span));
            }
            TokenTree::Literal(l) => {
                // There is no good way to get the value out of a `proc_macro::Literal`,
                // so re-tokenize its string representation with our own lexer.
                let s = l.to_string();
                let span = l.span().into();
                let (unused, tokens) = BoolLexer::lex(&s)
                    .map_err(|e| Error::new(format!("can't lex literal: {e}"), span))?;
                match (unused.len(), &tokens[..]) {
                    (0, [t]) if matches!(t.token, Zero | One) => {
                        toks.push(Token::new(t.token.clone(), span))
                    }
                    _ => return Err(Error::new(format!("expected 0 or 1, found {s}"), span)),
                }
            }
        }
    }
    Ok(toks)
}

macro_rules! macro_error {
    ($msg: literal) => {{
        let msg = format!($msg);
        quote!(compile_error!(#msg)).into()
    }};
    ($msg: literal, $span: expr) => {{
        let msg = format!($msg);
        quote_spanned!($span=> compile_error!(#msg)).into()
    }};
}

/// Parse `input` as a boolean expression at Rust compile time.
#[proc_macro]
pub fn expr(input: TokenStream) -> TokenStream {
    let tokens = match translate_tokens(input) {
        Ok(tokens) => tokens,
        Err(Error { message, span }) => return macro_error!("expression lexing failed: {message}", span),
    };
    if tokens.is_empty() {
        return macro_error!("empty expression");
    }
    match expression(Tokens::new(&tokens[..])) {
        Ok((unused, expr)) => match unused.span() {
            None => quote!(#expr).into(),
            Some(span) => macro_error!("unexpected tokens after expression", span),
        },
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => match e.input.span() {
            Some(span) => macro_error!("expression parsing failed", span),
            None => macro_error!("expression ended too soon"),
        },
        Err(nom::Err::Incomplete(_)) => macro_error!("expression ended too soon"),
    }
}
