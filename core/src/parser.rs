//! The `Parser` trait: an opaque, composable value that consumes tokens from
//! a [`ParseState`] and produces a result, or fails by writing into the
//! state's error slot.
//!
//! Combinators never mutate a `Parser` in place — `map`, `or`, `then` and the
//! rest all consume `self` (or borrow it, for the trait's own `eval`) and
//! produce a *new* value wrapping the old ones. A `Parser` is cheap to build
//! and, once built, immutable; the mutation all happens in the `ParseState`
//! threaded through `eval`.

use crate::expected::ExpectedSet;
use crate::state::ParseState;
use crate::source::TokenSource;

/// Implemented by every combinator. `T` is the token type, `C` is the
/// user-supplied context threaded through the whole parse (`()` if unused).
///
/// `eval` is generic over the source `S` so one combinator value works
/// against any [`TokenSource`] without the source type leaking into the
/// combinator's own type parameters.
pub trait Parser<T, C = ()> {
    type Output;

    /// Attempt to parse starting at the state's current offset.
    ///
    /// On success, returns `Some(value)` with the state advanced past the
    /// consumed tokens. On failure, returns `None`; the state's error slot
    /// holds the furthest-offset failure seen so far, and `expected`
    /// accumulates what this parser (and anything it called into) was
    /// looking for at that offset. The caller is responsible for rewinding
    /// the state back to where this parser started, if backtracking is
    /// wanted — `eval` itself never rewinds on failure.
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output>;
}

// Blanket impl so `&P` composes like `P` (handy for parsers stored behind a
// shared reference, e.g. inside `Rec`).
impl<T, C, P: Parser<T, C> + ?Sized> Parser<T, C> for &P {
    type Output = P::Output;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        (**self).eval(state, expected)
    }
}

// Blanket impl so a `Box<dyn Parser<..>>` composes like any other `Parser`
// value — e.g. as the element parser of a repetition combinator, without
// the caller needing to unbox it first.
impl<T, C, P: Parser<T, C> + ?Sized> Parser<T, C> for Box<P> {
    type Output = P::Output;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        (**self).eval(state, expected)
    }
}

// Blanket impl so an `Rc<dyn Parser<..>>` composes like any other `Parser`
// value. Useful whenever one sub-grammar is wired into several places of a
// larger grammar (e.g. an operand parser reused across every precedence
// level) without paying to rebuild or re-box it at each site.
impl<T, C, P: Parser<T, C> + ?Sized> Parser<T, C> for std::rc::Rc<P> {
    type Output = P::Output;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        (**self).eval(state, expected)
    }
}
