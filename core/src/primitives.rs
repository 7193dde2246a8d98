//! Leaf parsers: the combinators in `combinators.rs` and `repeat.rs` are all
//! built by composing these (and each other).

use std::marker::PhantomData;

use crate::delta::{SourcePos, SourcePosDelta};
use crate::expected::{Expected, ExpectedSet};
use crate::parser::Parser;
use crate::source::TokenSource;
use crate::state::ParseState;

/// Always succeeds with a clone of `value`, consuming nothing.
pub struct Return<R>(pub R);

impl<T, C, R: Clone> Parser<T, C> for Return<R> {
    type Output = R;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        _state: &mut ParseState<T, S, C>,
        _expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        Some(self.0.clone())
    }
}

/// Always succeeds with a clone of `value`, consuming nothing.
#[inline]
pub fn ret<R: Clone>(value: R) -> Return<R> {
    Return(value)
}

/// Always fails at the current offset without consuming input.
pub struct Fail<T> {
    message: Option<&'static str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Clone, C> Parser<T, C> for Fail<T> {
    type Output = std::convert::Infallible;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        _expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let offset = state.offset();
        let unexpected = state.current().cloned();
        let eof = unexpected.is_none();
        match self.message {
            Some(msg) => state.set_error_with_message(unexpected, eof, offset, msg),
            None => state.set_error(unexpected, eof, offset),
        }
        None
    }
}

/// Always fails, with no accompanying message.
#[inline]
pub fn fail<T>() -> Fail<T> {
    Fail {
        message: None,
        _marker: PhantomData,
    }
}

/// Always fails, attaching a fixed diagnostic message.
#[inline]
pub fn fail_with<T>(message: &'static str) -> Fail<T> {
    Fail {
        message: Some(message),
        _marker: PhantomData,
    }
}

/// Matches exactly one token equal to `expected`, consuming it.
pub struct TokenExact<T> {
    expected: T,
}

impl<T: Clone + PartialEq + std::fmt::Debug, C> Parser<T, C> for TokenExact<T> {
    type Output = T;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let offset = state.offset();
        match state.current() {
            Some(tok) if *tok == self.expected => {
                let tok = tok.clone();
                state.advance(1);
                Some(tok)
            }
            Some(tok) => {
                let tok = tok.clone();
                expected.insert(Expected::literal(vec![self.expected.clone()]));
                state.set_error(Some(tok), false, offset);
                None
            }
            None => {
                expected.insert(Expected::literal(vec![self.expected.clone()]));
                state.set_error(None, true, offset);
                None
            }
        }
    }
}

/// Matches exactly one token equal to `expected`, consuming it.
#[inline]
pub fn token<T>(expected: T) -> TokenExact<T> {
    TokenExact { expected }
}

/// Matches one token satisfying `predicate`, consuming it.
pub struct TokenPredicate<T, F> {
    predicate: F,
    label: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> TokenPredicate<T, F> {
    pub fn new(label: &'static str, predicate: F) -> Self {
        Self {
            predicate,
            label,
            _marker: PhantomData,
        }
    }
}

impl<T, C, F> Parser<T, C> for TokenPredicate<T, F>
where
    T: Clone,
    F: Fn(&T) -> bool,
{
    type Output = T;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let offset = state.offset();
        match state.current() {
            Some(tok) if (self.predicate)(tok) => {
                let tok = tok.clone();
                state.advance(1);
                Some(tok)
            }
            Some(tok) => {
                let tok = tok.clone();
                expected.insert(Expected::label(self.label));
                state.set_error(Some(tok), false, offset);
                None
            }
            None => {
                expected.insert(Expected::label(self.label));
                state.set_error(None, true, offset);
                None
            }
        }
    }
}

/// Matches one token for which `predicate` returns `true`, consuming it.
/// `label` names the predicate for error messages (e.g. `"digit"`).
#[inline]
pub fn satisfy<T, F: Fn(&T) -> bool>(label: &'static str, predicate: F) -> TokenPredicate<T, F> {
    TokenPredicate::new(label, predicate)
}

/// Matches a literal run of tokens in order, consuming all of them on
/// success and nothing on failure.
pub struct Literal<T> {
    expected: Vec<T>,
}

impl<T: Clone + PartialEq + std::fmt::Debug, C> Parser<T, C> for Literal<T> {
    type Output = Vec<T>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let start = state.offset();
        let window = state.look_ahead(self.expected.len());
        if window.len() == self.expected.len() && window == self.expected.as_slice() {
            state.advance(self.expected.len());
            Some(self.expected.clone())
        } else {
            // Matches up to `mismatch_at` tokens before diverging (or truncating
            // at EOF); that prefix is consumed before the failure is reported, so
            // a non-zero mismatch position is a *committed* failure to an
            // enclosing alternation, per the Sequence primitive's contract.
            let mismatch_at = window
                .iter()
                .zip(self.expected.iter())
                .position(|(a, b)| a != b)
                .unwrap_or(window.len());
            let offset = start + mismatch_at;
            let unexpected = window.get(mismatch_at).cloned();
            let eof = unexpected.is_none();
            expected.insert(Expected::literal(self.expected.clone()));
            state.advance(mismatch_at);
            state.set_error(unexpected, eof, offset);
            None
        }
    }
}

/// Matches a literal run of tokens, e.g. the keyword `"let"` as `['l','e','t']`.
#[inline]
pub fn literal<T>(expected: impl Into<Vec<T>>) -> Literal<T> {
    Literal {
        expected: expected.into(),
    }
}

/// Succeeds only at end of input, consuming nothing.
pub struct End<T>(PhantomData<fn() -> T>);

impl<T: Clone, C> Parser<T, C> for End<T> {
    type Output = ();

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let offset = state.offset();
        if state.has_current() {
            let tok = state.current().cloned();
            expected.insert(Expected::EndOfInput);
            state.set_error(tok, false, offset);
            None
        } else {
            Some(())
        }
    }
}

/// Succeeds only at end of input, consuming nothing.
#[inline]
pub fn end<T>() -> End<T> {
    End(PhantomData)
}

/// Yields the current token offset, consuming nothing. Never fails.
pub struct CurrentOffset;

impl<T, C> Parser<T, C> for CurrentOffset {
    type Output = usize;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        _expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        Some(state.offset())
    }
}

/// Yields the current token offset, consuming nothing. Never fails.
#[inline]
pub fn current_offset() -> CurrentOffset {
    CurrentOffset
}

/// Yields the current `(line, col)`, consuming nothing. Never fails.
pub struct CurrentPos;

impl<T: Clone, C> Parser<T, C> for CurrentPos {
    type Output = SourcePos;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        _expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        Some(state.source_pos())
    }
}

/// Yields the current `(line, col)`, consuming nothing. Never fails.
#[inline]
pub fn current_pos() -> CurrentPos {
    CurrentPos
}

/// Yields the cumulative [`SourcePosDelta`] from input start to the current
/// offset, consuming nothing. Never fails.
pub struct CurrentPosDelta;

impl<T: Clone, C> Parser<T, C> for CurrentPosDelta {
    type Output = SourcePosDelta;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        _expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        Some(state.compute_source_pos_delta())
    }
}

/// Yields the cumulative [`SourcePosDelta`], consuming nothing. Never fails.
#[inline]
pub fn current_pos_delta() -> CurrentPosDelta {
    CurrentPosDelta
}
