//! Matching a fixed set of keyword-like literals into an enum (or any other
//! `V`), longest-literal-first, with an implicit word-boundary check so
//! `"let"` doesn't accidentally match the prefix of `"letter"`.

use catena_core::combinators::{BoxedParser, ParserExt, one_of};
use catena_core::parser::Parser;

use crate::chars::{letter_or_digit, string};

/// Builds a parser that matches the longest of `keywords` whose text is a
/// prefix of the remaining input and is *not* immediately followed by
/// another letter or digit, yielding the associated value.
///
/// Sorting longest-first means `"else"` is tried before `"el"` would be if
/// both were present, so a shorter keyword that happens to prefix a longer
/// one never wins by accident regardless of the order the caller lists them
/// in. Each candidate's literal-then-boundary-check is wrapped in `.try_()`
/// so a word-boundary rejection (matched the letters, but they're followed
/// by another letter or digit) counts as an uncommitted failure: the next
/// keyword still gets a chance, and so does whatever a caller chains onto
/// this with `.or(...)` (typically a plain identifier parser) instead of
/// the failure being pinned on the partial literal match.
pub fn keyword_of<C, V>(
    keywords: impl IntoIterator<Item = (&'static str, V)>,
) -> impl Parser<char, C, Output = V>
where
    V: Clone + 'static,
    C: 'static,
{
    let mut sorted: Vec<(&'static str, V)> = keywords.into_iter().collect();
    sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    let branches: Vec<BoxedParser<'static, char, C, V>> = sorted
        .into_iter()
        .map(|(text, value)| {
            let matched = string(text)
                .then(letter_or_digit().not())
                .try_()
                .map(move |_| value.clone());
            Box::new(matched) as BoxedParser<'static, char, C, V>
        })
        .collect();
    one_of(branches)
}
