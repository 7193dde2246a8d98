//! Parsing a fixed set of sub-parsers in any order, each exactly once —
//! useful for things like record literals or attribute lists where the
//! grammar doesn't care which field comes first.
//!
//! Built by trying every ordering as an `or` branch; sub-parsers are shared
//! across branches via `Rc` (each branch only ever runs one of them, but the
//! branches themselves all need a handle to all of them).

use std::rc::Rc;

use catena_core::combinators::ParserExt;
use catena_core::parser::Parser;

/// Parses `p` and `q`, in either order, exactly once each.
pub fn permutation2<T, C, A, B>(
    p: impl Parser<T, C, Output = A> + 'static,
    q: impl Parser<T, C, Output = B> + 'static,
) -> impl Parser<T, C, Output = (A, B)>
where
    T: 'static,
    C: 'static,
    A: Clone + 'static,
    B: Clone + 'static,
{
    let p: Rc<dyn Parser<T, C, Output = A>> = Rc::new(p);
    let q: Rc<dyn Parser<T, C, Output = B>> = Rc::new(q);

    let (p1, q1) = (p.clone(), q.clone());
    let pq = p1.bind(move |a: A| {
        let q1 = q1.clone();
        q1.map(move |b: B| (a.clone(), b))
    });

    let qp = q.bind(move |b: B| {
        let p2 = p.clone();
        p2.map(move |a: A| (a, b.clone()))
    });

    pq.or(qp)
}

/// Parses `p`, `q` and `r`, in any of the six orderings, exactly once each.
pub fn permutation3<T, C, A, B, D>(
    p: impl Parser<T, C, Output = A> + 'static,
    q: impl Parser<T, C, Output = B> + 'static,
    r: impl Parser<T, C, Output = D> + 'static,
) -> impl Parser<T, C, Output = (A, B, D)>
where
    T: 'static,
    C: 'static,
    A: Clone + 'static,
    B: Clone + 'static,
    D: Clone + 'static,
{
    let p: Rc<dyn Parser<T, C, Output = A>> = Rc::new(p);
    let q: Rc<dyn Parser<T, C, Output = B>> = Rc::new(q);
    let r: Rc<dyn Parser<T, C, Output = D>> = Rc::new(r);

    let first_p = {
        let (q, r) = (q.clone(), r.clone());
        p.clone().bind(move |a: A| {
            let (q, r) = (q.clone(), r.clone());
            permutation2(q, r).map(move |(b, d): (B, D)| (a.clone(), b, d))
        })
    };
    let first_q = {
        let (p, r) = (p.clone(), r.clone());
        q.clone().bind(move |b: B| {
            let (p, r) = (p.clone(), r.clone());
            permutation2(p, r).map(move |(a, d): (A, D)| (a, b.clone(), d))
        })
    };
    let first_r = {
        let (p, q) = (p.clone(), q.clone());
        r.bind(move |d: D| {
            let (p, q) = (p.clone(), q.clone());
            permutation2(p, q).map(move |(a, b): (A, B)| (a, b, d.clone()))
        })
    };

    first_p.or(first_q).or(first_r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catena_core::config::ParseConfig;
    use catena_core::expected::ExpectedSet;
    use catena_core::primitives::token;
    use catena_core::source::IterSource;
    use catena_core::state::ParseState;

    fn state(input: &str) -> ParseState<char, IterSource<std::vec::IntoIter<char>>> {
        let chars: Vec<char> = input.chars().collect();
        ParseState::new(IterSource::new(chars.into_iter()), ParseConfig::default())
    }

    #[test]
    fn permutation2_accepts_either_order() {
        let mut st = state("ba");
        let mut exp = ExpectedSet::new();
        let p = permutation2(token('a'), token('b'));
        assert_eq!(p.eval(&mut st, &mut exp), Some(('a', 'b')));
        assert_eq!(st.offset(), 2);
    }

    #[test]
    fn permutation3_accepts_a_shuffled_order() {
        let mut st = state("cab");
        let mut exp = ExpectedSet::new();
        let p = permutation3(token('a'), token('b'), token('c'));
        assert_eq!(p.eval(&mut st, &mut exp), Some(('a', 'b', 'c')));
        assert_eq!(st.offset(), 3);
    }

    #[test]
    fn permutation2_fails_if_one_member_is_missing() {
        let mut st = state("a");
        let mut exp = ExpectedSet::new();
        let p = permutation2(token('a'), token('b'));
        assert_eq!(p.eval(&mut st, &mut exp), None);
    }
}
