//! Combinators that build new parsers out of existing ones: mapping,
//! sequencing, alternation, and the backtracking-control trio
//! (`Try`/`Lookahead`/`Not`).
//!
//! Alternation (`Or`/`OneOf`) is where the committed-vs-uncommitted failure
//! discipline lives: a branch that consumed input before failing is treated
//! as *committed* and its failure propagates immediately, without trying the
//! next branch. A branch that failed without consuming anything is
//! *uncommitted* and the next branch gets a chance. When every branch is
//! uncommitted, the reported error is the one at the deepest offset, with
//! expected sets from every branch that reached that same deepest offset
//! merged together (ties favour breadth, not a single arbitrary winner).

use crate::expected::{Expected, ExpectedSet};
use crate::parse_error::InternalError;
use crate::parser::Parser;
use crate::source::TokenSource;
use crate::state::ParseState;

/// `p.map(f)`: transform a successful result, leaving failure untouched.
pub struct Map<P, F> {
    pub(crate) parser: P,
    pub(crate) f: F,
}

impl<T, C, P, F, R> Parser<T, C> for Map<P, F>
where
    P: Parser<T, C>,
    F: Fn(P::Output) -> R,
{
    type Output = R;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        self.parser.eval(state, expected).map(&self.f)
    }
}

/// `p.bind(f)`: sequence into a parser chosen by the first result.
pub struct Bind<P, F> {
    pub(crate) parser: P,
    pub(crate) f: F,
}

impl<T, C, P, F, Q> Parser<T, C> for Bind<P, F>
where
    P: Parser<T, C>,
    F: Fn(P::Output) -> Q,
    Q: Parser<T, C>,
{
    type Output = Q::Output;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let value = self.parser.eval(state, expected)?;
        (self.f)(value).eval(state, expected)
    }
}

/// `p.then(q)`: run both in sequence, keep `q`'s result.
pub struct Then<P, Q> {
    pub(crate) left: P,
    pub(crate) right: Q,
}

impl<T, C, P, Q> Parser<T, C> for Then<P, Q>
where
    P: Parser<T, C>,
    Q: Parser<T, C>,
{
    type Output = Q::Output;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        self.left.eval(state, expected)?;
        self.right.eval(state, expected)
    }
}

/// `p.before(q)`: run both in sequence, keep `p`'s result.
pub struct Before<P, Q> {
    pub(crate) left: P,
    pub(crate) right: Q,
}

impl<T, C, P, Q> Parser<T, C> for Before<P, Q>
where
    P: Parser<T, C>,
    Q: Parser<T, C>,
{
    type Output = P::Output;

    #[inline]
    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let value = self.left.eval(state, expected)?;
        self.right.eval(state, expected)?;
        Some(value)
    }
}

/// `p.or(q)`: try `p`; fall through to `q` only if `p` failed without
/// consuming input.
pub struct Or<P, Q> {
    pub(crate) left: P,
    pub(crate) right: Q,
}

impl<T, C, P, Q> Parser<T, C> for Or<P, Q>
where
    T: Clone + PartialEq,
    P: Parser<T, C>,
    Q: Parser<T, C, Output = P::Output>,
{
    type Output = P::Output;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let start = state.offset();

        let mut left_exp = ExpectedSet::new();
        if let Some(v) = self.left.eval(state, &mut left_exp) {
            expected.extend_from(left_exp);
            return Some(v);
        }
        let left_consumed = state.offset() != start;
        let left_err = state.get_error().cloned();
        if left_consumed {
            expected.extend_from(left_exp);
            return None;
        }

        let mut right_exp = ExpectedSet::new();
        if let Some(v) = self.right.eval(state, &mut right_exp) {
            expected.extend_from(right_exp);
            return Some(v);
        }
        let right_consumed = state.offset() != start;
        if right_consumed {
            expected.extend_from(right_exp);
            return None;
        }
        let right_err = state.get_error().cloned();

        merge_uncommitted(state, expected, [(left_err, left_exp), (right_err, right_exp)]);
        None
    }
}

/// Merge the errors/expected-sets of a set of uncommitted (non-consuming)
/// failed branches: keep the deepest offset, merging expected sets of every
/// branch tied at that offset. Leaves the state's error slot holding the
/// winning `InternalError`.
fn merge_uncommitted<T: Clone + PartialEq, S: TokenSource<T>, C, const N: usize>(
    state: &mut ParseState<T, S, C>,
    expected: &mut ExpectedSet<T>,
    branches: [(Option<InternalError<T>>, ExpectedSet<T>); N],
) {
    let deepest = branches
        .iter()
        .filter_map(|(err, _)| err.as_ref().map(|e| e.offset))
        .max();
    let Some(deepest) = deepest else { return };

    let mut winner: Option<InternalError<T>> = None;
    for (err, exp) in branches {
        let Some(err) = err else { continue };
        if err.offset == deepest {
            expected.extend_from(exp);
            winner.get_or_insert(err);
        }
    }
    if let Some(err) = winner {
        state.set_error(err.unexpected, err.eof, err.offset);
    }
}

/// A boxed `Parser`, used by [`OneOf`] to hold a heterogeneous list of
/// alternatives behind one concrete type.
pub type BoxedParser<'a, T, C, O> = Box<dyn Parser<T, C, Output = O> + 'a>;

/// `one_of([p1, p2, ...])`: try each alternative in order under the same
/// committed/uncommitted discipline as [`Or`], generalised to any number of
/// branches.
pub struct OneOf<'a, T, C, O> {
    branches: Vec<BoxedParser<'a, T, C, O>>,
}

impl<'a, T, C, O> OneOf<'a, T, C, O> {
    pub fn new(branches: Vec<BoxedParser<'a, T, C, O>>) -> Self {
        Self { branches }
    }
}

impl<T: Clone + PartialEq, C, O> Parser<T, C> for OneOf<'_, T, C, O> {
    type Output = O;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let start = state.offset();
        let mut uncommitted: Vec<(Option<InternalError<T>>, ExpectedSet<T>)> = Vec::new();

        for branch in &self.branches {
            let mut branch_exp = ExpectedSet::new();
            if let Some(v) = branch.eval(state, &mut branch_exp) {
                expected.extend_from(branch_exp);
                return Some(v);
            }
            if state.offset() != start {
                expected.extend_from(branch_exp);
                return None;
            }
            let err = state.get_error().cloned();
            uncommitted.push((err, branch_exp));
        }

        let deepest = uncommitted
            .iter()
            .filter_map(|(err, _)| err.as_ref().map(|e| e.offset))
            .max();
        if let Some(deepest) = deepest {
            let mut winner = None;
            for (err, exp) in uncommitted {
                let Some(err) = err else { continue };
                if err.offset == deepest {
                    expected.extend_from(exp);
                    winner.get_or_insert(err);
                }
            }
            if let Some(err) = winner {
                state.set_error(err.unexpected, err.eof, err.offset);
            }
        }
        None
    }
}

/// Build a [`OneOf`] from a vector of alternatives.
pub fn one_of<'a, T, C, O>(branches: Vec<BoxedParser<'a, T, C, O>>) -> OneOf<'a, T, C, O> {
    OneOf::new(branches)
}

/// `p.try_()`: if `p` fails after consuming input, rewind and report the
/// failure as uncommitted instead, so an enclosing `Or`/`OneOf` will still
/// try the next alternative. The deepest-offset error information recorded
/// in the error slot is preserved across the rewind.
pub struct Try<P> {
    pub(crate) parser: P,
}

impl<T: Clone, C, P: Parser<T, C>> Parser<T, C> for Try<P> {
    type Output = P::Output;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let bookmark = state.bookmark();
        match self.parser.eval(state, expected) {
            Some(v) => {
                state.discard_bookmark(bookmark);
                Some(v)
            }
            None => {
                state.rewind(bookmark);
                None
            }
        }
    }
}

/// `p.lookahead()`: run `p`; on success, rewind to before `p` ran (the match
/// is checked but not consumed). On failure, the position is left exactly as
/// `p` left it, so the usual committed/uncommitted rules still apply to the
/// failure.
pub struct Lookahead<P> {
    pub(crate) parser: P,
}

impl<T: Clone, C, P: Parser<T, C>> Parser<T, C> for Lookahead<P> {
    type Output = P::Output;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let bookmark = state.bookmark();
        match self.parser.eval(state, expected) {
            Some(v) => {
                state.rewind(bookmark);
                Some(v)
            }
            None => {
                state.discard_bookmark(bookmark);
                None
            }
        }
    }
}

/// `p.not()`: succeeds with `()`, consuming nothing, iff `p` would fail.
/// Fails, consuming nothing, iff `p` would succeed. Always restores the
/// starting position regardless of what `p` did — `not` never consumes, on
/// either outcome, which is why `not(not(p))` is not the same parser as `p`:
/// the former never consumes input and discards `p`'s value, the latter
/// does both.
pub struct Not<P> {
    pub(crate) parser: P,
}

impl<T: Clone + PartialEq, C, P: Parser<T, C>> Parser<T, C> for Not<P> {
    type Output = ();

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        _expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let start = state.offset();
        let bookmark = state.bookmark();
        let mut inner_exp = ExpectedSet::new();
        let inner_result = self.parser.eval(state, &mut inner_exp);
        state.rewind(bookmark);
        match inner_result {
            Some(_) => {
                let unexpected = state.current().cloned();
                state.set_error_with_message(unexpected, false, start, "unexpected match");
                None
            }
            None => Some(()),
        }
    }
}

/// `p.label(name)`: on failure, hide `p`'s internal expected-set detail and
/// report just `name` instead.
pub struct Labelled<P> {
    pub(crate) parser: P,
    pub(crate) label: &'static str,
}

impl<T: PartialEq, C, P: Parser<T, C>> Parser<T, C> for Labelled<P> {
    type Output = P::Output;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let mut inner_exp = ExpectedSet::new();
        match self.parser.eval(state, &mut inner_exp) {
            Some(v) => Some(v),
            None => {
                expected.insert(Expected::label(self.label));
                None
            }
        }
    }
}

/// `p.optional()`: `Some(v)` if `p` succeeds, `None` if `p` fails without
/// consuming input. A committed (consuming) failure still propagates.
pub struct Optional<P> {
    pub(crate) parser: P,
}

impl<T: Clone + PartialEq, C, P: Parser<T, C>> Parser<T, C> for Optional<P> {
    type Output = Option<P::Output>;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let start = state.offset();
        let mut inner_exp = ExpectedSet::new();
        match self.parser.eval(state, &mut inner_exp) {
            Some(v) => {
                expected.extend_from(inner_exp);
                Some(Some(v))
            }
            None if state.offset() == start => {
                expected.extend_from(inner_exp);
                Some(None)
            }
            None => {
                expected.extend_from(inner_exp);
                None
            }
        }
    }
}

/// `p.recover_with(f)`: if `p` fails, rewind and substitute `f()` so the
/// overall parse always succeeds. The error slot is left as `p` left it, so
/// an outer diagnostic can still report the deepest failure seen even though
/// this combinator itself never fails.
pub struct RecoverWith<P, F> {
    pub(crate) parser: P,
    pub(crate) recover: F,
}

impl<T: Clone, C, P, F> Parser<T, C> for RecoverWith<P, F>
where
    P: Parser<T, C>,
    F: Fn() -> P::Output,
{
    type Output = P::Output;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let bookmark = state.bookmark();
        match self.parser.eval(state, expected) {
            Some(v) => {
                state.discard_bookmark(bookmark);
                Some(v)
            }
            None => {
                state.rewind(bookmark);
                Some((self.recover)())
            }
        }
    }
}

/// Ergonomic combinator methods, implemented for every [`Parser`].
pub trait ParserExt<T, C>: Parser<T, C> + Sized {
    fn map<F, R>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> R,
    {
        Map { parser: self, f }
    }

    fn bind<F, Q>(self, f: F) -> Bind<Self, F>
    where
        F: Fn(Self::Output) -> Q,
        Q: Parser<T, C>,
    {
        Bind { parser: self, f }
    }

    fn then<Q: Parser<T, C>>(self, next: Q) -> Then<Self, Q> {
        Then {
            left: self,
            right: next,
        }
    }

    fn before<Q: Parser<T, C>>(self, next: Q) -> Before<Self, Q> {
        Before {
            left: self,
            right: next,
        }
    }

    fn or<Q: Parser<T, C, Output = Self::Output>>(self, alt: Q) -> Or<Self, Q> {
        Or {
            left: self,
            right: alt,
        }
    }

    fn try_(self) -> Try<Self> {
        Try { parser: self }
    }

    fn lookahead(self) -> Lookahead<Self> {
        Lookahead { parser: self }
    }

    fn not(self) -> Not<Self> {
        Not { parser: self }
    }

    fn label(self, name: &'static str) -> Labelled<Self> {
        Labelled {
            parser: self,
            label: name,
        }
    }

    fn optional(self) -> Optional<Self> {
        Optional { parser: self }
    }

    fn recover_with<F>(self, recover: F) -> RecoverWith<Self, F>
    where
        F: Fn() -> Self::Output,
    {
        RecoverWith {
            parser: self,
            recover,
        }
    }
}

impl<T, C, P: Parser<T, C>> ParserExt<T, C> for P {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseConfig;
    use crate::primitives::{fail, token};
    use crate::source::IterSource;

    fn state(input: &str) -> ParseState<char, IterSource<std::vec::IntoIter<char>>> {
        let chars: Vec<char> = input.chars().collect();
        ParseState::new(IterSource::new(chars.into_iter()), ParseConfig::default())
    }

    #[test]
    fn map_transforms_success() {
        let mut st = state("a");
        let mut exp = ExpectedSet::new();
        let p = token('a').map(|c| c.to_ascii_uppercase());
        assert_eq!(p.eval(&mut st, &mut exp), Some('A'));
    }

    #[test]
    fn then_keeps_right_result() {
        let mut st = state("ab");
        let mut exp = ExpectedSet::new();
        let p = token('a').then(token('b'));
        assert_eq!(p.eval(&mut st, &mut exp), Some('b'));
        assert_eq!(st.offset(), 2);
    }

    #[test]
    fn before_keeps_left_result() {
        let mut st = state("ab");
        let mut exp = ExpectedSet::new();
        let p = token('a').before(token('b'));
        assert_eq!(p.eval(&mut st, &mut exp), Some('a'));
        assert_eq!(st.offset(), 2);
    }

    #[test]
    fn or_falls_through_on_uncommitted_failure() {
        let mut st = state("b");
        let mut exp = ExpectedSet::new();
        let p = token('a').or(token('b'));
        assert_eq!(p.eval(&mut st, &mut exp), Some('b'));
    }

    #[test]
    fn or_propagates_committed_failure_without_trying_next() {
        let mut st = state("ax");
        let mut exp = ExpectedSet::new();
        let p = token('a').then(token('b')).or(token('a').then(token('x')).map(|_| 'z'));
        // left branch: 'a' then 'b' -- 'a' matches, consumes, then 'b' fails: committed.
        assert_eq!(p.eval(&mut st, &mut exp), None);
        // state is left wherever the committed branch left it (after consuming 'a').
        assert_eq!(st.offset(), 1);
    }

    #[test]
    fn or_merges_uncommitted_expected_at_deepest_offset() {
        let mut st = state("z");
        let mut exp = ExpectedSet::new();
        let p = token('a').or(token('b'));
        assert_eq!(p.eval(&mut st, &mut exp), None);
        assert_eq!(exp.len(), 2);
    }

    #[test]
    fn try_converts_committed_failure_to_uncommitted() {
        let mut st = state("ax");
        let mut exp = ExpectedSet::new();
        let p = token('a').then(token('b')).try_().or(token('a').then(token('x')));
        assert_eq!(p.eval(&mut st, &mut exp), Some('x'));
        assert_eq!(st.offset(), 2);
    }

    #[test]
    fn lookahead_preserves_position_on_success() {
        let mut st = state("ab");
        let mut exp = ExpectedSet::new();
        let p = token('a').lookahead();
        assert_eq!(p.eval(&mut st, &mut exp), Some('a'));
        assert_eq!(st.offset(), 0);
    }

    #[test]
    fn not_succeeds_when_inner_fails_and_never_consumes() {
        let mut st = state("b");
        let mut exp = ExpectedSet::new();
        let p = token('a').not();
        assert_eq!(p.eval(&mut st, &mut exp), Some(()));
        assert_eq!(st.offset(), 0);
    }

    #[test]
    fn not_fails_when_inner_succeeds_and_rewinds() {
        let mut st = state("a");
        let mut exp = ExpectedSet::new();
        let p = token('a').not();
        assert_eq!(p.eval(&mut st, &mut exp), None);
        assert_eq!(st.offset(), 0);
    }

    #[test]
    fn label_hides_inner_expected_detail() {
        let mut st = state("z");
        let mut exp = ExpectedSet::new();
        let p = token('a').or(token('b')).label("letter");
        assert_eq!(p.eval(&mut st, &mut exp), None);
        assert_eq!(exp.len(), 1);
    }

    #[test]
    fn optional_yields_none_on_uncommitted_failure() {
        let mut st = state("z");
        let mut exp = ExpectedSet::new();
        let p = token('a').optional();
        assert_eq!(p.eval(&mut st, &mut exp), Some(None));
        assert_eq!(st.offset(), 0);
    }

    #[test]
    fn recover_with_substitutes_on_failure_and_rewinds() {
        let mut st = state("z");
        let mut exp = ExpectedSet::new();
        let p = token('a').recover_with(|| 'x');
        assert_eq!(p.eval(&mut st, &mut exp), Some('x'));
        assert_eq!(st.offset(), 0);
    }

    #[test]
    fn one_of_tries_each_branch_in_order() {
        let mut st = state("c");
        let mut exp = ExpectedSet::new();
        let p = one_of(vec![
            Box::new(token('a')) as BoxedParser<char, (), char>,
            Box::new(token('b')),
            Box::new(token('c')),
        ]);
        assert_eq!(p.eval(&mut st, &mut exp), Some('c'));
    }

    #[test]
    fn fail_primitive_composes_with_or() {
        let mut st = state("a");
        let mut exp = ExpectedSet::new();
        let p: Or<_, _> = fail::<char>().map(|_| 'never').or(token('a'));
        assert_eq!(p.eval(&mut st, &mut exp), Some('a'));
    }

    #[test_case::test_case("ab", Some('b'), 2; "ab succeeds and consumes both")]
    #[test_case::test_case("ac", None, 1; "ac is a committed failure after consuming a")]
    #[test_case::test_case("xy", None, 0; "xy fails before consuming anything")]
    fn string_literal_or_commits_after_its_first_match(
        input: &str,
        expected: Option<char>,
        offset_after: usize,
    ) {
        let mut st = state(input);
        let mut exp = ExpectedSet::new();
        let p = token('a').then(token('b')).or(token('a').then(token('c')));
        assert_eq!(p.eval(&mut st, &mut exp), expected);
        assert_eq!(st.offset(), offset_after);
    }

    #[test_case::test_case("ac", Some('c'); "try lets a sibling branch run after a would-be commit")]
    #[test_case::test_case("ab", Some('b'); "try does not disturb the branch that actually matches")]
    fn try_makes_a_branch_uncommitted_regardless_of_how_much_it_consumed(
        input: &str,
        expected: Option<char>,
    ) {
        let mut st = state(input);
        let mut exp = ExpectedSet::new();
        let p = token('a').then(token('b')).try_().or(token('a').then(token('c')));
        assert_eq!(p.eval(&mut st, &mut exp), expected);
    }
}
