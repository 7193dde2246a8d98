//! Library-fatal conditions: bugs in combinator usage rather than parse
//! failures. These surface as a `Result` from the handful of call sites that
//! can detect them ahead of time (e.g. `ParseConfig` limits, `Rec` cycles)
//! rather than as a panic, so embedding applications can decide how to react.

use core::fmt;

/// A combinator-usage bug, distinct from an ordinary parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Parsing recursed deeper than [`crate::config::ParseConfig::max_recursion_depth`].
    RecursionLimitExceeded { depth: usize, limit: usize },

    /// The parse consumed more tokens than [`crate::config::ParseConfig::max_tokens`].
    TokenLimitExceeded { consumed: usize, limit: usize },

    /// The element parser of a `many`-class combinator (`many`, `at_least_once`,
    /// `separated_by`, `chain_at_least_once`, ...) succeeded without consuming
    /// any input. Looping would never terminate, so this is reported instead.
    NonConsumingRepetition,

    /// A user-computed level/repeat count was negative before being cast to
    /// an unsigned count. `repeat` itself takes a `usize` and so cannot
    /// observe this directly; this variant exists for internal `isize`-taking
    /// builders (e.g. the expression-precedence table) that compute a count
    /// before handing it to `repeat`.
    NegativeRepeatCount { count: isize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RecursionLimitExceeded { depth, limit } => {
                write!(f, "recursion limit exceeded: depth {depth} > limit {limit}")
            }
            Error::TokenLimitExceeded { consumed, limit } => {
                write!(f, "token limit exceeded: consumed {consumed} > limit {limit}")
            }
            Error::NonConsumingRepetition => {
                write!(f, "parser consumed no input in many-like combinator")
            }
            Error::NegativeRepeatCount { count } => {
                write!(f, "negative repeat count: {count}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
