//! Top-level entry points: run a [`Parser`] to completion over a
//! [`TokenSource`], turning its `Option`-based success/failure into a
//! `Result<T, ParseError<T>>` and requiring the whole input be consumed.

use crate::config::ParseConfig;
use crate::expected::ExpectedSet;
use crate::parse_error::ParseError;
use crate::parser::Parser;
use crate::source::TokenSource;
use crate::state::ParseState;

/// Run `parser` over `source` to completion. Fails if the parser itself
/// fails, or if it succeeds without consuming the entire input (trailing
/// tokens are reported as the failure, at the offset where they start).
///
/// Instrumented with a `tracing` span at `debug` level; per-combinator
/// tracing is deliberately not part of the hot path (see the crate's
/// top-level docs).
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
pub fn run<T, C, S, P>(
    parser: &P,
    source: S,
    config: ParseConfig<T>,
    ctx: C,
) -> Result<P::Output, ParseError<T>>
where
    T: Clone + PartialEq + std::fmt::Debug,
    S: TokenSource<T>,
    P: Parser<T, C>,
{
    let mut state = ParseState::with_ctx(source, config, ctx);
    let mut expected = ExpectedSet::new();

    let result = parser.eval(&mut state, &mut expected);
    match result {
        Some(value) if !state.has_current() => {
            #[cfg(feature = "tracing")]
            tracing::debug!("parse succeeded, full input consumed");
            Ok(value)
        }
        Some(_) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(offset = state.offset(), "parse succeeded but left trailing input");
            let offset = state.offset();
            let unexpected = state.current().cloned();
            state.set_error(unexpected, false, offset);
            let mut trailing_expected = ExpectedSet::new();
            trailing_expected.insert(crate::expected::Expected::EndOfInput);
            Err(state.build_error(trailing_expected))
        }
        None => {
            #[cfg(feature = "tracing")]
            tracing::debug!("parse failed");
            Err(state.build_error(expected))
        }
    }
}

/// Like [`run`], but panics with the rendered [`ParseError`] on failure
/// instead of returning it. Intended for tests, examples, and other call
/// sites where a parse failure indicates a programmer error rather than bad
/// input.
#[allow(clippy::panic)]
pub fn run_or_throw<T, C, S, P>(parser: &P, source: S, config: ParseConfig<T>, ctx: C) -> P::Output
where
    T: Clone + PartialEq + std::fmt::Debug,
    S: TokenSource<T>,
    P: Parser<T, C>,
{
    match run(parser, source, config, ctx) {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::ParserExt;
    use crate::primitives::token;
    use crate::source::IterSource;

    fn source(input: &str) -> IterSource<std::vec::IntoIter<char>> {
        IterSource::new(input.chars().collect::<Vec<_>>().into_iter())
    }

    #[test]
    fn run_succeeds_on_full_consumption() {
        let p = token('a').then(token('b'));
        let result = run(&p, source("ab"), ParseConfig::default(), ());
        assert_eq!(result, Ok('b'));
    }

    #[test]
    fn run_fails_on_trailing_input() {
        let p = token('a');
        let result = run(&p, source("ab"), ParseConfig::default(), ());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("end of input"));
    }

    #[test]
    fn run_fails_when_parser_fails() {
        let p = token('a');
        let result = run(&p, source("b"), ParseConfig::default(), ());
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "parse error")]
    fn run_or_throw_panics_on_failure() {
        let p = token('a');
        run_or_throw(&p, source("b"), ParseConfig::default(), ());
    }
}
