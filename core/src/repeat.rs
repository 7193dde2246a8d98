//! Repetition combinators, all built on one rule: an element that fails
//! *without* consuming input ends the loop normally (this is how `many`
//! knows it has found the end of the repeated region); an element that fails
//! *after* consuming input is a real syntax error and propagates. An element
//! that *succeeds* without consuming input would loop forever, so that case
//! is treated as a combinator-usage bug (see [`crate::error::Error::NonConsumingRepetition`])
//! rather than silently hanging.

use crate::error::Error;
use crate::expected::ExpectedSet;
use crate::parser::Parser;
use crate::source::TokenSource;
use crate::state::ParseState;

#[allow(clippy::panic)]
fn non_consuming_bug() -> ! {
    panic!("{}", Error::NonConsumingRepetition);
}

/// `many(p)`: zero or more, collected into a `Vec`.
pub struct Many<P> {
    pub(crate) parser: P,
}

impl<T: Clone, C, P: Parser<T, C>> Parser<T, C> for Many<P> {
    type Output = Vec<P::Output>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let mut out = Vec::new();
        loop {
            let start = state.offset();
            match self.parser.eval(state, expected) {
                Some(v) => {
                    if state.offset() == start {
                        non_consuming_bug();
                    }
                    out.push(v);
                }
                None if state.offset() == start => return Some(out),
                None => return None,
            }
        }
    }
}

/// `at_least_once(p)`: one or more, collected into a `Vec`.
pub struct AtLeastOnce<P> {
    pub(crate) parser: P,
}

impl<T: Clone, C, P: Parser<T, C>> Parser<T, C> for AtLeastOnce<P> {
    type Output = Vec<P::Output>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let first_start = state.offset();
        let first = self.parser.eval(state, expected)?;
        if state.offset() == first_start {
            non_consuming_bug();
        }
        let mut out = vec![first];
        loop {
            let start = state.offset();
            match self.parser.eval(state, expected) {
                Some(v) => {
                    if state.offset() == start {
                        non_consuming_bug();
                    }
                    out.push(v);
                }
                None if state.offset() == start => return Some(out),
                None => return None,
            }
        }
    }
}

/// `repeat(p, n)`: exactly `n` occurrences.
pub struct Repeat<P> {
    pub(crate) parser: P,
    pub(crate) count: usize,
}

impl<T, C, P: Parser<T, C>> Parser<T, C> for Repeat<P> {
    type Output = Vec<P::Output>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let mut out = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            out.push(self.parser.eval(state, expected)?);
        }
        Some(out)
    }
}

/// `separated(elem, sep)`: zero or more `elem`, separated by `sep`, no
/// trailing `sep`.
pub struct Separated<P, Q> {
    pub(crate) elem: P,
    pub(crate) sep: Q,
}

impl<T: Clone, C, P: Parser<T, C>, Q: Parser<T, C>> Parser<T, C> for Separated<P, Q> {
    type Output = Vec<P::Output>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let first_start = state.offset();
        let first = match self.elem.eval(state, expected) {
            Some(v) => v,
            None if state.offset() == first_start => return Some(Vec::new()),
            None => return None,
        };
        let mut out = vec![first];
        loop {
            let sep_start = state.offset();
            match self.sep.eval(state, expected) {
                Some(_) => {}
                None if state.offset() == sep_start => return Some(out),
                None => return None,
            }
            let elem_start = state.offset();
            match self.elem.eval(state, expected) {
                Some(v) => {
                    if state.offset() == elem_start {
                        non_consuming_bug();
                    }
                    out.push(v);
                }
                // sep already consumed, so a failing elem here is committed
                // regardless of whether it itself consumed anything.
                None => return None,
            }
        }
    }
}

/// `separated_at_least_once(elem, sep)`: one or more `elem`, separated by
/// `sep`, no trailing `sep`.
pub struct SeparatedAtLeastOnce<P, Q> {
    pub(crate) elem: P,
    pub(crate) sep: Q,
}

impl<T: Clone, C, P: Parser<T, C>, Q: Parser<T, C>> Parser<T, C> for SeparatedAtLeastOnce<P, Q> {
    type Output = Vec<P::Output>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let first = self.elem.eval(state, expected)?;
        let mut out = vec![first];
        loop {
            let sep_start = state.offset();
            match self.sep.eval(state, expected) {
                Some(_) => {}
                None if state.offset() == sep_start => return Some(out),
                None => return None,
            }
            let elem_start = state.offset();
            match self.elem.eval(state, expected) {
                Some(v) => {
                    if state.offset() == elem_start {
                        non_consuming_bug();
                    }
                    out.push(v);
                }
                None => return None,
            }
        }
    }
}

/// `separated_and_terminated(elem, sep)`: zero or more `elem`, each one
/// followed by a required `sep` (e.g. statements each ending in `;`).
pub struct SeparatedAndTerminated<P, Q> {
    pub(crate) elem: P,
    pub(crate) sep: Q,
}

impl<T: Clone, C, P: Parser<T, C>, Q: Parser<T, C>> Parser<T, C>
    for SeparatedAndTerminated<P, Q>
{
    type Output = Vec<P::Output>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let mut out = Vec::new();
        loop {
            let elem_start = state.offset();
            let v = match self.elem.eval(state, expected) {
                Some(v) => v,
                None if state.offset() == elem_start => return Some(out),
                None => return None,
            };
            // elem succeeded, so the terminator is required.
            self.sep.eval(state, expected)?;
            out.push(v);
        }
    }
}

/// `separated_and_optionally_terminated(elem, sep)`: zero or more `elem`
/// separated by `sep`, with an optional trailing `sep` permitted (e.g. a
/// trailing comma in a list literal).
pub struct SeparatedAndOptionallyTerminated<P, Q> {
    pub(crate) elem: P,
    pub(crate) sep: Q,
}

impl<T: Clone, C, P: Parser<T, C>, Q: Parser<T, C>> Parser<T, C>
    for SeparatedAndOptionallyTerminated<P, Q>
{
    type Output = Vec<P::Output>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let first_start = state.offset();
        let first = match self.elem.eval(state, expected) {
            Some(v) => v,
            None if state.offset() == first_start => return Some(Vec::new()),
            None => return None,
        };
        let mut out = vec![first];
        loop {
            let sep_start = state.offset();
            match self.sep.eval(state, expected) {
                Some(_) => {}
                None if state.offset() == sep_start => return Some(out),
                None => return None,
            }
            // a sep just matched; the following elem is optional, covering
            // both "another element follows" and "that was a trailing sep".
            let elem_start = state.offset();
            match self.elem.eval(state, expected) {
                Some(v) => {
                    if state.offset() == elem_start {
                        non_consuming_bug();
                    }
                    out.push(v);
                }
                None if state.offset() == elem_start => return Some(out),
                None => return None,
            }
        }
    }
}

/// Accumulates a left-associative fold over a `chain_at_least_once` run,
/// e.g. building up a binary-expression tree from a flat `elem (op elem)*`
/// sequence without materialising an intermediate `Vec`.
pub trait Chainer<Op, Elem> {
    type Result;

    /// Start the fold from the first element.
    fn seed(elem: Elem) -> Self;

    /// Fold in one more `(op, elem)` pair.
    fn apply(&mut self, op: Op, rhs: Elem);

    /// Finish the fold.
    fn get_result(self) -> Self::Result;

    /// Called when an operator has matched but the following element fails
    /// to parse (a committed failure). The default does nothing; override
    /// to record diagnostics before the failure propagates.
    fn on_error(&mut self) {}
}

/// `chain_at_least_once(elem, op)`: one or more `elem`, separated by `op`,
/// folded left-associatively via a [`Chainer`] instead of collected into a
/// `Vec`.
pub struct ChainAtLeastOnce<P, Q, Ch> {
    pub(crate) elem: P,
    pub(crate) op: Q,
    pub(crate) _chainer: std::marker::PhantomData<fn() -> Ch>,
}

impl<T: Clone, C, P, Q, Ch> Parser<T, C> for ChainAtLeastOnce<P, Q, Ch>
where
    P: Parser<T, C>,
    Q: Parser<T, C>,
    Ch: Chainer<Q::Output, P::Output>,
{
    type Output = Ch::Result;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let first = self.elem.eval(state, expected)?;
        let mut chainer = Ch::seed(first);
        loop {
            let op_start = state.offset();
            let op = match self.op.eval(state, expected) {
                Some(op) => op,
                None if state.offset() == op_start => return Some(chainer.get_result()),
                None => return None,
            };
            let elem_start = state.offset();
            match self.elem.eval(state, expected) {
                Some(rhs) => {
                    if state.offset() == elem_start {
                        non_consuming_bug();
                    }
                    chainer.apply(op, rhs);
                }
                None => {
                    chainer.on_error();
                    return None;
                }
            }
        }
    }
}

/// Free-function constructors, mirroring `primitives`'s `token`/`literal`/...
/// style: build a combinator value directly from its parts, for call sites
/// that don't want to lead with a parser expression.
pub fn many<P>(parser: P) -> Many<P> {
    Many { parser }
}

pub fn at_least_once<P>(parser: P) -> AtLeastOnce<P> {
    AtLeastOnce { parser }
}

pub fn repeat<P>(parser: P, count: usize) -> Repeat<P> {
    Repeat { parser, count }
}

pub fn separated<P, Q>(elem: P, sep: Q) -> Separated<P, Q> {
    Separated { elem, sep }
}

pub fn separated_at_least_once<P, Q>(elem: P, sep: Q) -> SeparatedAtLeastOnce<P, Q> {
    SeparatedAtLeastOnce { elem, sep }
}

pub fn separated_and_terminated<P, Q>(elem: P, sep: Q) -> SeparatedAndTerminated<P, Q> {
    SeparatedAndTerminated { elem, sep }
}

pub fn separated_and_optionally_terminated<P, Q>(
    elem: P,
    sep: Q,
) -> SeparatedAndOptionallyTerminated<P, Q> {
    SeparatedAndOptionallyTerminated { elem, sep }
}

pub fn chain_at_least_once<P, Q, Ch>(elem: P, op: Q) -> ChainAtLeastOnce<P, Q, Ch> {
    ChainAtLeastOnce {
        elem,
        op,
        _chainer: std::marker::PhantomData,
    }
}

/// Method-call sugar for the repetition combinators above, so a grammar
/// reads `atom.separated_by(comma)` instead of `separated(atom, comma)`.
/// Blanket-implemented for every `Parser`, the same way [`crate::combinators::ParserExt`]
/// covers `map`/`or`/`then`.
pub trait RepeatExt<T, C>: Parser<T, C> + Sized {
    fn many(self) -> Many<Self> {
        many(self)
    }

    fn at_least_once(self) -> AtLeastOnce<Self> {
        at_least_once(self)
    }

    fn repeat(self, count: usize) -> Repeat<Self> {
        repeat(self, count)
    }

    fn separated_by<Q>(self, sep: Q) -> Separated<Self, Q> {
        separated(self, sep)
    }

    fn separated_by_at_least_once<Q>(self, sep: Q) -> SeparatedAtLeastOnce<Self, Q> {
        separated_at_least_once(self, sep)
    }

    fn separated_and_terminated_by<Q>(self, sep: Q) -> SeparatedAndTerminated<Self, Q> {
        separated_and_terminated(self, sep)
    }

    fn separated_and_optionally_terminated_by<Q>(
        self,
        sep: Q,
    ) -> SeparatedAndOptionallyTerminated<Self, Q> {
        separated_and_optionally_terminated(self, sep)
    }

    fn chain_at_least_once<Q, Ch>(self, op: Q) -> ChainAtLeastOnce<Self, Q, Ch> {
        chain_at_least_once(self, op)
    }
}

impl<T, C, P: Parser<T, C>> RepeatExt<T, C> for P {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseConfig;
    use crate::primitives::token;
    use crate::source::IterSource;

    fn state(input: &str) -> ParseState<char, IterSource<std::vec::IntoIter<char>>> {
        let chars: Vec<char> = input.chars().collect();
        ParseState::new(IterSource::new(chars.into_iter()), ParseConfig::default())
    }

    #[test]
    fn many_collects_zero_or_more() {
        let mut st = state("aaab");
        let mut exp = ExpectedSet::new();
        let p = Many { parser: token('a') };
        assert_eq!(p.eval(&mut st, &mut exp), Some(vec!['a', 'a', 'a']));
        assert_eq!(st.offset(), 3);
    }

    #[test]
    fn many_succeeds_with_empty_vec_on_no_match() {
        let mut st = state("b");
        let mut exp = ExpectedSet::new();
        let p = Many { parser: token('a') };
        assert_eq!(p.eval(&mut st, &mut exp), Some(Vec::new()));
        assert_eq!(st.offset(), 0);
    }

    #[test]
    fn at_least_once_requires_first_match() {
        let mut st = state("b");
        let mut exp = ExpectedSet::new();
        let p = AtLeastOnce { parser: token('a') };
        assert_eq!(p.eval(&mut st, &mut exp), None);
    }

    #[test]
    fn at_least_once_collects_run() {
        let mut st = state("aab");
        let mut exp = ExpectedSet::new();
        let p = AtLeastOnce { parser: token('a') };
        assert_eq!(p.eval(&mut st, &mut exp), Some(vec!['a', 'a']));
    }

    #[test]
    fn repeat_requires_exact_count() {
        let mut st = state("aaa");
        let mut exp = ExpectedSet::new();
        let p = Repeat {
            parser: token('a'),
            count: 2,
        };
        assert_eq!(p.eval(&mut st, &mut exp), Some(vec!['a', 'a']));
        assert_eq!(st.offset(), 2);
    }

    #[test]
    fn repeat_fails_if_fewer_than_count() {
        let mut st = state("ab");
        let mut exp = ExpectedSet::new();
        let p = Repeat {
            parser: token('a'),
            count: 2,
        };
        assert_eq!(p.eval(&mut st, &mut exp), None);
    }

    #[test]
    fn separated_collects_with_no_trailing() {
        let mut st = state("a,a,a");
        let mut exp = ExpectedSet::new();
        let p = Separated {
            elem: token('a'),
            sep: token(','),
        };
        assert_eq!(p.eval(&mut st, &mut exp), Some(vec!['a', 'a', 'a']));
        assert_eq!(st.offset(), 5);
    }

    #[test]
    fn separated_stops_before_trailing_separator() {
        let mut st = state("a,a,");
        let mut exp = ExpectedSet::new();
        let p = Separated {
            elem: token('a'),
            sep: token(','),
        };
        assert_eq!(p.eval(&mut st, &mut exp), None);
    }

    #[test]
    fn separated_and_terminated_requires_trailing_each_time() {
        let mut st = state("a;a;");
        let mut exp = ExpectedSet::new();
        let p = SeparatedAndTerminated {
            elem: token('a'),
            sep: token(';'),
        };
        assert_eq!(p.eval(&mut st, &mut exp), Some(vec!['a', 'a']));
        assert_eq!(st.offset(), 4);
    }

    #[test]
    fn separated_and_optionally_terminated_allows_trailing() {
        let mut st = state("a,a,");
        let mut exp = ExpectedSet::new();
        let p = SeparatedAndOptionallyTerminated {
            elem: token('a'),
            sep: token(','),
        };
        assert_eq!(p.eval(&mut st, &mut exp), Some(vec!['a', 'a']));
        assert_eq!(st.offset(), 4);
    }

    #[test]
    fn separated_and_optionally_terminated_allows_no_trailing() {
        let mut st = state("a,a");
        let mut exp = ExpectedSet::new();
        let p = SeparatedAndOptionallyTerminated {
            elem: token('a'),
            sep: token(','),
        };
        assert_eq!(p.eval(&mut st, &mut exp), Some(vec!['a', 'a']));
        assert_eq!(st.offset(), 3);
    }

    struct SumChainer(i32);

    impl Chainer<char, i32> for SumChainer {
        type Result = i32;

        fn seed(elem: i32) -> Self {
            SumChainer(elem)
        }

        fn apply(&mut self, op: char, rhs: i32) {
            match op {
                '+' => self.0 += rhs,
                '-' => self.0 -= rhs,
                _ => unreachable!(),
            }
        }

        fn get_result(self) -> i32 {
            self.0
        }
    }

    #[test]
    fn chain_at_least_once_folds_left_associatively() {
        use crate::combinators::ParserExt;

        let mut st = state("1+2-3");
        let mut exp = ExpectedSet::new();
        let digit = crate::primitives::satisfy("digit", |c: &char| c.is_ascii_digit())
            .map(|c| c.to_digit(10).unwrap() as i32);
        let op = token('+').or(token('-'));
        let p = ChainAtLeastOnce::<_, _, SumChainer> {
            elem: digit,
            op,
            _chainer: std::marker::PhantomData,
        };
        assert_eq!(p.eval(&mut st, &mut exp), Some(0));
    }
}
