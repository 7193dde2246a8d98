//! A small Pratt-style expression-precedence builder, layered entirely on
//! `catena_core`'s public combinator surface (`bind`/`map`/`or`, `many`, and
//! `chain_at_least_once`) — it never touches `ParseState` or the error slot
//! directly.
//!
//! An [`OperatorTable`] is a list of [`Level`]s, tightest-binding first. Each
//! level may carry a prefix operator, a postfix operator, and one infix
//! operator of either associativity; `build` wraps the supplied operand
//! parser with each level in turn, so the final parser it returns is the
//! loosest-binding (topmost) one — exactly what a hand-written
//! precedence-climbing parser's entry point would be.

use std::rc::Rc;

use catena_core::combinators::{BoxedParser, ParserExt};
use catena_core::parser::Parser;
use catena_core::rec::rec;
use catena_core::repeat::{Chainer, RepeatExt};

/// Associativity of an infix operator level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// A prefix/postfix operator's effect: transform one operand.
pub type UnaryFold<O> = Rc<dyn Fn(O) -> O>;

/// An infix operator's effect: combine two operands.
pub type BinaryFold<O> = Rc<dyn Fn(O, O) -> O>;

/// Wraps an operator-token parser so its matched value becomes a fixed
/// [`UnaryFold`], discarding what was actually matched. Combine several with
/// `.or(...)` to offer more than one prefix/postfix operator at one level.
pub fn unary_op<T, C, Op, O>(
    op_parser: impl Parser<T, C, Output = Op> + 'static,
    fold: impl Fn(O) -> O + 'static,
) -> impl Parser<T, C, Output = UnaryFold<O>>
where
    O: 'static,
{
    let fold: UnaryFold<O> = Rc::new(fold);
    op_parser.map(move |_matched: Op| fold.clone())
}

/// Wraps an operator-token parser so its matched value becomes a fixed
/// [`BinaryFold`]. Combine several with `.or(...)` for more than one infix
/// operator sharing a level's associativity.
pub fn binary_op<T, C, Op, O>(
    op_parser: impl Parser<T, C, Output = Op> + 'static,
    fold: impl Fn(O, O) -> O + 'static,
) -> impl Parser<T, C, Output = BinaryFold<O>>
where
    O: 'static,
{
    let fold: BinaryFold<O> = Rc::new(fold);
    op_parser.map(move |_matched: Op| fold.clone())
}

/// One precedence level's operators. Any of the four may be left unset.
pub struct Level<T, C, O> {
    prefix: Option<BoxedParser<'static, T, C, UnaryFold<O>>>,
    infix_left: Option<BoxedParser<'static, T, C, BinaryFold<O>>>,
    infix_right: Option<BoxedParser<'static, T, C, BinaryFold<O>>>,
    postfix: Option<BoxedParser<'static, T, C, UnaryFold<O>>>,
}

impl<T, C, O> Default for Level<T, C, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, O> Level<T, C, O> {
    pub fn new() -> Self {
        Self {
            prefix: None,
            infix_left: None,
            infix_right: None,
            postfix: None,
        }
    }

    pub fn prefix(mut self, op: impl Parser<T, C, Output = UnaryFold<O>> + 'static) -> Self {
        self.prefix = Some(Box::new(op));
        self
    }

    pub fn postfix(mut self, op: impl Parser<T, C, Output = UnaryFold<O>> + 'static) -> Self {
        self.postfix = Some(Box::new(op));
        self
    }

    pub fn infix(
        mut self,
        assoc: Assoc,
        op: impl Parser<T, C, Output = BinaryFold<O>> + 'static,
    ) -> Self {
        match assoc {
            Assoc::Left => self.infix_left = Some(Box::new(op)),
            Assoc::Right => self.infix_right = Some(Box::new(op)),
        }
        self
    }
}

/// Folds a flat `elem (op elem)*` run left-associatively via
/// `chain_at_least_once`, applying each [`BinaryFold`] as it goes.
struct FoldChainer<O> {
    acc: O,
}

impl<O: Clone> Chainer<BinaryFold<O>, O> for FoldChainer<O> {
    type Result = O;

    fn seed(elem: O) -> Self {
        Self { acc: elem }
    }

    fn apply(&mut self, op: BinaryFold<O>, rhs: O) {
        self.acc = (op.as_ref())(self.acc.clone(), rhs);
    }

    fn get_result(self) -> O {
        self.acc
    }
}

impl<T: Clone + 'static, C: 'static, O: Clone + 'static> Level<T, C, O> {
    fn build(self, inner: Rc<dyn Parser<T, C, Output = O>>) -> Rc<dyn Parser<T, C, Output = O>> {
        let with_prefix = match self.prefix {
            None => inner,
            Some(prefix_boxed) => {
                let prefix: Rc<dyn Parser<T, C, Output = UnaryFold<O>>> = Rc::from(prefix_boxed);
                let inner = inner.clone();
                let built = prefix.many().bind(move |folds: Vec<UnaryFold<O>>| {
                    let inner = inner.clone();
                    inner.map(move |v: O| {
                        folds.iter().rev().fold(v, |acc, f| (f.as_ref())(acc))
                    })
                });
                Rc::new(built) as Rc<dyn Parser<T, C, Output = O>>
            }
        };

        let with_postfix = match self.postfix {
            None => with_prefix,
            Some(postfix_boxed) => {
                let postfix: Rc<dyn Parser<T, C, Output = UnaryFold<O>>> = Rc::from(postfix_boxed);
                let built = with_prefix.bind(move |v: O| {
                    let postfix = postfix.clone();
                    postfix.many().map(move |folds: Vec<UnaryFold<O>>| {
                        folds.into_iter().fold(v.clone(), |acc, f| (f.as_ref())(acc))
                    })
                });
                Rc::new(built) as Rc<dyn Parser<T, C, Output = O>>
            }
        };

        let with_infix_left = match self.infix_left {
            None => with_postfix,
            Some(op_boxed) => {
                let op: Rc<dyn Parser<T, C, Output = BinaryFold<O>>> = Rc::from(op_boxed);
                let elem = with_postfix.clone();
                let built = elem.chain_at_least_once::<_, FoldChainer<O>>(op);
                Rc::new(built) as Rc<dyn Parser<T, C, Output = O>>
            }
        };

        match self.infix_right {
            None => with_infix_left,
            Some(op_boxed) => {
                let op: Rc<dyn Parser<T, C, Output = BinaryFold<O>>> = Rc::from(op_boxed);
                right_assoc(with_infix_left, op)
            }
        }
    }
}

/// `elem (op elem)*` folded right-associatively: `a op b op c` becomes
/// `op(a, op(b, c))`. Unlike the left-associative case this can't be a flat
/// loop, since the right-hand side of each application is itself the result
/// of parsing everything to its right — so it's built as a small recursive
/// grammar via `catena_core::rec`.
fn right_assoc<T: Clone + 'static, C: 'static, O: Clone + 'static>(
    elem: Rc<dyn Parser<T, C, Output = O>>,
    op: Rc<dyn Parser<T, C, Output = BinaryFold<O>>>,
) -> Rc<dyn Parser<T, C, Output = O>> {
    let handle = rec(move |self_handle| {
        Box::new(elem.clone().bind(move |lhs: O| {
            let lhs_for_fallback = lhs.clone();
            let op = op.clone();
            let self_handle = self_handle.clone();
            op.bind(move |fold: BinaryFold<O>| {
                let lhs = lhs.clone();
                let self_handle = self_handle.clone();
                self_handle.map(move |rhs: O| (fold.as_ref())(lhs.clone(), rhs))
            })
            .optional()
            .map(move |applied: Option<O>| applied.unwrap_or_else(|| lhs_for_fallback.clone()))
        }))
    });
    Rc::new(handle) as Rc<dyn Parser<T, C, Output = O>>
}

/// A list of precedence levels, tightest-binding first.
pub struct OperatorTable<T, C, O> {
    levels: Vec<Level<T, C, O>>,
}

impl<T, C, O> Default for OperatorTable<T, C, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, O> OperatorTable<T, C, O> {
    pub fn new() -> Self {
        Self { levels: Vec::new() }
    }

    pub fn level(mut self, level: Level<T, C, O>) -> Self {
        self.levels.push(level);
        self
    }
}

impl<T: Clone + 'static, C: 'static, O: Clone + 'static> OperatorTable<T, C, O> {
    /// Builds the final expression parser from `operand` (the tightest
    /// possible term, e.g. a literal or a parenthesised sub-expression wired
    /// in via `catena_core::rec` by the caller) and this table's levels.
    pub fn build(self, operand: impl Parser<T, C, Output = O> + 'static) -> impl Parser<T, C, Output = O> {
        let mut current: Rc<dyn Parser<T, C, Output = O>> = Rc::new(operand);
        for level in self.levels {
            current = level.build(current);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catena_core::config::ParseConfig;
    use catena_core::expected::ExpectedSet;
    use catena_core::source::IterSource;
    use catena_core::state::ParseState;

    use crate::chars::{decimal, one_of_chars};

    fn state(input: &str) -> ParseState<char, IterSource<std::vec::IntoIter<char>>> {
        let chars: Vec<char> = input.chars().collect();
        ParseState::new(IterSource::new(chars.into_iter()), ParseConfig::default())
    }

    fn arithmetic<C: 'static>() -> impl Parser<char, C, Output = i64> {
        let mul = binary_op(one_of_chars::<C>(['*']), |a: i64, b: i64| a * b)
            .or(binary_op(one_of_chars::<C>(['/']), |a: i64, b: i64| a / b));
        let add = binary_op(one_of_chars::<C>(['+']), |a: i64, b: i64| a + b)
            .or(binary_op(one_of_chars::<C>(['-']), |a: i64, b: i64| a - b));
        let neg = unary_op(one_of_chars::<C>(['-']), |a: i64| -a);

        OperatorTable::new()
            .level(Level::new().infix(Assoc::Left, mul))
            .level(Level::new().prefix(neg).infix(Assoc::Left, add))
            .build(decimal())
    }

    fn power<C: 'static>() -> impl Parser<char, C, Output = i64> {
        let pow = binary_op(one_of_chars::<C>(['^']), |a: i64, b: i64| a.pow(b as u32));
        OperatorTable::new()
            .level(Level::new().infix(Assoc::Right, pow))
            .build(decimal())
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let mut st = state("2+3*4");
        let mut exp = ExpectedSet::new();
        assert_eq!(arithmetic::<()>().eval(&mut st, &mut exp), Some(14));
    }

    #[test]
    fn left_associative_subtraction_chains_left_to_right() {
        let mut st = state("10-3-2");
        let mut exp = ExpectedSet::new();
        assert_eq!(arithmetic::<()>().eval(&mut st, &mut exp), Some(5));
    }

    #[test]
    fn prefix_negation_applies_before_addition() {
        let mut st = state("-3+5");
        let mut exp = ExpectedSet::new();
        assert_eq!(arithmetic::<()>().eval(&mut st, &mut exp), Some(2));
    }

    #[test]
    fn right_associative_power_nests_on_the_right() {
        // 2^(3^2) = 2^9 = 512, not (2^3)^2 = 64.
        let mut st = state("2^3^2");
        let mut exp = ExpectedSet::new();
        assert_eq!(power::<()>().eval(&mut st, &mut exp), Some(512));
    }
}
