//! Streams of lexical tokens.

use std::iter::Enumerate;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::slice;

use nom::{InputIter, InputLength, InputTake, Needed, Slice, UnspecializedInput};

/// A borrowed run of tokens that [nom](https://crates.io/crates/nom)
/// can consume like a byte or character slice; see the notes on
/// [custom input types](https://github.com/rust-bakery/nom/blob/main/doc/custom_input_types.md).
#[derive(PartialEq, Debug)]
pub struct Tokens<'a, T> {
    pub tok: &'a [T],
}

// Not derived: the derive would demand `T: Copy`.
impl<'a, T> Clone for Tokens<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Tokens<'a, T> {}

impl<'a, T> Tokens<'a, T> {
    pub fn new(tok: &'a [T]) -> Self {
        Tokens { tok }
    }

    pub fn is_empty(&self) -> bool {
        self.tok.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tok.len()
    }

    /// The next token in the stream, if any.
    pub fn first(&self) -> Option<&'a T> {
        self.tok.first()
    }

    /// The final token in the stream, if any.
    pub fn last(&self) -> Option<&'a T> {
        self.tok.last()
    }
}

impl<'a, T> InputLength for Tokens<'a, T> {
    #[inline]
    fn input_len(&self) -> usize {
        self.tok.len()
    }
}

impl<'a, T> InputTake for Tokens<'a, T> {
    #[inline]
    fn take(&self, count: usize) -> Self {
        Tokens::new(&self.tok[..count])
    }

    #[inline]
    fn take_split(&self, count: usize) -> (Self, Self) {
        let (prefix, suffix) = self.tok.split_at(count);
        (Tokens::new(suffix), Tokens::new(prefix))
    }
}

impl<'a, T> Slice<Range<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: Range<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeTo<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeTo<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeFrom<usize>> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, range: RangeFrom<usize>) -> Self {
        Tokens::new(&self.tok[range])
    }
}

impl<'a, T> Slice<RangeFull> for Tokens<'a, T> {
    #[inline]
    fn slice(&self, _: RangeFull) -> Self {
        *self
    }
}

impl<'a, T> InputIter for Tokens<'a, T> {
    type Item = &'a T;
    type Iter = Enumerate<slice::Iter<'a, T>>;
    type IterElem = slice::Iter<'a, T>;

    #[inline]
    fn iter_indices(&self) -> Self::Iter {
        self.tok.iter().enumerate()
    }

    #[inline]
    fn iter_elements(&self) -> Self::IterElem {
        self.tok.iter()
    }

    #[inline]
    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.tok.iter().position(predicate)
    }

    #[inline]
    fn slice_index(&self, count: usize) -> Result<usize, Needed> {
        if self.tok.len() >= count {
            Ok(count)
        } else {
            Err(Needed::new(count - self.tok.len()))
        }
    }
}

impl<'a, T> UnspecializedInput for Tokens<'a, T> {}

#[cfg(feature = "to-rust")]
mod to_rust {
    use proc_macro2::Span;

    use crate::lexer::Token;

    use super::*;

    impl<'a, T: Clone> Tokens<'a, Token<T, Span>> {
        /// Where to point a compile error about this stream.
        /// Joining spans needs the unstable `proc_macro::Span::join`,
        /// so we settle for the first token.
        pub fn span(&self) -> Option<Span> {
            self.first().map(|t| t.source)
        }
    }
}

#[cfg(test)]
mod test {
    use nom::bytes::complete::take;
    use nom::IResult;

    use super::*;

    #[test]
    fn take_splits_in_order() {
        let toks = [1, 2, 3];
        let input = Tokens::new(&toks[..]);
        let result: IResult<_, _> = take(2_usize)(input);
        let (rest, taken) = result.expect("two tokens available");
        assert_eq!(taken.tok, &[1, 2]);
        assert_eq!(rest.tok, &[3]);
    }

    #[test]
    fn take_too_many() {
        let toks = [1];
        let result: IResult<_, _> = take(2_usize)(Tokens::new(&toks[..]));
        assert!(result.is_err());
    }

    #[test]
    fn slices() {
        let toks = ['a', 'b', 'c', 'd'];
        let input = Tokens::new(&toks[..]);
        assert_eq!(input.slice(1..3).tok, &['b', 'c']);
        assert_eq!(input.slice(..1).tok, &['a']);
        assert_eq!(input.slice(2..).tok, &['c', 'd']);
        assert_eq!(input.slice(..), input);
        assert_eq!(input.first(), Some(&'a'));
        assert_eq!(input.last(), Some(&'d'));
    }
}
