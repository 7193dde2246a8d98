//! Recursive and mutually-recursive grammars.
//!
//! A `Parser` is an ordinary Rust value, so a grammar that refers to itself
//! (`expr := term (('+' | '-') term)*` where `term` itself bottoms out back
//! at `expr` through parens) can't be written as a plain `let` binding —
//! the type would have to be infinitely large. [`Rec`] breaks the cycle with
//! a heap-allocated, reference-counted, once-initialised slot: build the
//! handle first, hand clones of it to whatever needs to call back into the
//! grammar, then `define` it once the whole definition is assembled.
//!
//! Like the rest of a constructed grammar (`OneOf`'s boxed branches, a
//! `map`'s closure), a `Rec` handle is `Rc`-backed rather than `Arc`-backed:
//! §5's "freely shared across threads" claim is about independent
//! `ParseState`s running the *same* grammar value from the *same* thread that
//! built it, not about handing one grammar to multiple threads at once —
//! nothing in the public combinator surface is `Send`/`Sync`-bounded, so a
//! grammar is single-thread-affine as a whole, this handle included.
use std::cell::OnceCell;
use std::rc::Rc;

use crate::expected::ExpectedSet;
use crate::parser::Parser;
use crate::source::TokenSource;
use crate::state::ParseState;

type DynParser<T, C, O> = dyn Parser<T, C, Output = O>;

/// A lazily-defined, reference-counted, recursive parser handle. Cheap to
/// `clone` (it's a refcount bump); every clone refers to the same
/// definition once [`Rec::define`] has run.
pub struct Rec<T, C, O> {
    inner: Rc<OnceCell<Box<DynParser<T, C, O>>>>,
}

impl<T, C, O> Clone for Rec<T, C, O> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, C, O> Default for Rec<T, C, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, O> Rec<T, C, O> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(OnceCell::new()),
        }
    }

    /// Supply the grammar this handle stands for. Must be called exactly
    /// once per handle, before it is ever evaluated. Panics on a second
    /// call — a `Rec` is a forward declaration, not a mutable slot.
    #[allow(clippy::panic)]
    pub fn define(&self, parser: impl Parser<T, C, Output = O> + 'static) {
        if self.inner.set(Box::new(parser)).is_err() {
            panic!("Rec::define called twice on the same handle");
        }
    }
}

impl<T: Clone, C, O> Parser<T, C> for Rec<T, C, O> {
    type Output = O;

    fn eval<S: TokenSource<T>>(
        &self,
        state: &mut ParseState<T, S, C>,
        expected: &mut ExpectedSet<T>,
    ) -> Option<Self::Output> {
        let limit = state.max_recursion_depth();
        if let Err(e) = state.recursion_guard_mut().enter(limit) {
            let offset = state.offset();
            state.set_error_with_message(None, false, offset, e.to_string());
            return None;
        }
        let parser = self
            .inner
            .get()
            .unwrap_or_else(|| unreachable!("Rec evaluated before define() was called"));
        let result = parser.eval(state, expected);
        state.recursion_guard_mut().exit();
        result
    }
}

/// Build a recursive grammar in one expression: `build` receives a handle to
/// itself (clone it into the definition wherever the grammar recurses) and
/// returns the boxed definition.
#[allow(clippy::panic)]
pub fn rec<T, C, O>(build: impl FnOnce(Rec<T, C, O>) -> Box<DynParser<T, C, O>>) -> Rec<T, C, O> {
    let handle = Rec::new();
    let definition = build(handle.clone());
    handle.inner.set(definition).unwrap_or_else(|_| {
        panic!("Rec::define called twice on the same handle");
    });
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{one_of, BoxedParser, ParserExt};
    use crate::config::ParseConfig;
    use crate::primitives::{ret, token};
    use crate::source::IterSource;

    fn state(input: &str) -> ParseState<char, IterSource<std::vec::IntoIter<char>>> {
        let chars: Vec<char> = input.chars().collect();
        ParseState::new(IterSource::new(chars.into_iter()), ParseConfig::default())
    }

    // balanced "(((x)))" -> counts the nesting depth
    fn nested_parens() -> Rec<char, (), u32> {
        rec(|inner| {
            Box::new(one_of(vec![
                Box::new(
                    token('(')
                        .then(inner.clone())
                        .before(token(')'))
                        .map(|n| n + 1),
                ) as BoxedParser<char, (), u32>,
                Box::new(token('x').then(ret(0u32))),
            ]))
        })
    }

    #[test]
    fn rec_parses_nested_structure() {
        let mut st = state("((x))");
        let mut exp = ExpectedSet::new();
        let p = nested_parens();
        assert_eq!(p.eval(&mut st, &mut exp), Some(2));
        assert_eq!(st.offset(), 5);
    }

    #[test]
    fn rec_clone_shares_the_same_definition() {
        let p = nested_parens();
        let q = p.clone();
        let mut st = state("(x)");
        let mut exp = ExpectedSet::new();
        assert_eq!(q.eval(&mut st, &mut exp), Some(1));
    }

    #[test]
    #[should_panic(expected = "called twice")]
    fn define_twice_panics() {
        let handle: Rec<char, (), char> = Rec::new();
        handle.define(token('a'));
        handle.define(token('b'));
    }

    #[test]
    fn deep_recursion_fails_gracefully_instead_of_overflowing_stack() {
        let depth = "(".repeat(200) + "x" + &")".repeat(200);
        let mut st = ParseState::new(
            IterSource::new(depth.chars().collect::<Vec<_>>().into_iter()),
            ParseConfig::default().with_max_recursion_depth(16),
        );
        let mut exp = ExpectedSet::new();
        let p = nested_parens();
        assert_eq!(p.eval(&mut st, &mut exp), None);
    }
}
