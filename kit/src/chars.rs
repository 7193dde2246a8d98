//! Character-specialised convenience parsers over `Parser<char, C>`.
//!
//! Everything here is composed out of `catena_core`'s token-level primitives
//! (`satisfy`, `token`, `literal`) and combinators (`map`, `bind`, `or`,
//! `many`/`at_least_once`) — none of it reaches into `ParseState` directly.

use catena_core::combinators::{BoxedParser, ParserExt};
use catena_core::parser::Parser;
use catena_core::primitives::{end, literal, ret, satisfy, token};
use catena_core::repeat::RepeatExt;

/// One ASCII decimal digit (`0`-`9`).
pub fn digit<C>() -> impl Parser<char, C, Output = char> {
    satisfy("digit", |c: &char| c.is_ascii_digit())
}

/// One ASCII hexadecimal digit (`0`-`9`, `a`-`f`, `A`-`F`).
pub fn hex_digit<C>() -> impl Parser<char, C, Output = char> {
    satisfy("hex digit", |c: &char| c.is_ascii_hexdigit())
}

/// One Unicode alphabetic character.
pub fn letter<C>() -> impl Parser<char, C, Output = char> {
    satisfy("letter", |c: &char| c.is_alphabetic())
}

/// One Unicode alphanumeric character.
pub fn letter_or_digit<C>() -> impl Parser<char, C, Output = char> {
    satisfy("letter or digit", |c: &char| c.is_alphanumeric())
}

/// One Unicode whitespace character (including newlines).
pub fn whitespace<C>() -> impl Parser<char, C, Output = char> {
    satisfy("whitespace", |c: &char| c.is_whitespace())
}

/// A maximal run of zero or more whitespace characters, consuming as much
/// as possible and always succeeding (the `SkipWhitespaces` operation).
/// Equivalent whether the run is aligned to the start of input or begins
/// partway through it — it only ever looks at what's under the cursor.
pub fn whitespaces<C>() -> impl Parser<char, C, Output = ()> {
    whitespace().many().map(|_| ())
}

/// One character equal to `c`, ignoring ASCII case (`ci_char('l')` also
/// matches `'L'`).
pub fn ci_char<C>(c: char) -> impl Parser<char, C, Output = char> {
    satisfy("character", move |found: &char| found.eq_ignore_ascii_case(&c))
}

/// One character drawn from `chars`, in any order.
pub fn one_of_chars<C>(chars: impl Into<Vec<char>>) -> impl Parser<char, C, Output = char> {
    let set = chars.into();
    satisfy("one of", move |c: &char| set.contains(c))
}

/// One character *not* drawn from `chars`.
pub fn none_of<C>(chars: impl Into<Vec<char>>) -> impl Parser<char, C, Output = char> {
    let set = chars.into();
    satisfy("none of", move |c: &char| !set.contains(c))
}

/// The exact sequence of characters in `s`, returned as an owned `String`.
pub fn string<C>(s: &str) -> impl Parser<char, C, Output = String> {
    let expected: Vec<char> = s.chars().collect();
    literal(expected).map(|matched: Vec<char>| matched.into_iter().collect())
}

/// Like [`string`] but case-insensitive (`ci_string("let")` also matches
/// `"LET"` or `"Let"`), returning the characters actually consumed.
///
/// Built by folding one `satisfy` per expected character through `bind`,
/// since `catena_core::primitives::Literal` only supports exact equality.
pub fn ci_string<C>(s: &str) -> impl Parser<char, C, Output = String>
where
    C: 'static,
{
    let target: Vec<char> = s.chars().collect();
    let seed: BoxedParser<'static, char, C, Vec<char>> = Box::new(ret(Vec::<char>::new()));
    let folded = target.into_iter().fold(seed, |acc, expected_ch| {
        let next: BoxedParser<'static, char, C, Vec<char>> = Box::new(acc.bind(move |collected: Vec<char>| {
            satisfy("character", move |c: &char| c.eq_ignore_ascii_case(&expected_ch)).map(
                move |matched: char| {
                    let mut collected = collected.clone();
                    collected.push(matched);
                    collected
                },
            )
        }));
        next
    });
    folded.map(|chars: Vec<char>| chars.into_iter().collect())
}

/// An unsigned or `-`-prefixed run of decimal digits, parsed to `i64`.
/// Overflow saturates to `i64::MAX`/`i64::MIN` rather than failing the parse
/// — the digits themselves are always valid, so there's nothing to report
/// as a parse error.
pub fn decimal<C>() -> impl Parser<char, C, Output = i64> {
    token('-').optional().bind(|sign: Option<char>| {
        digit().at_least_once().map(move |ds: Vec<char>| {
            let text: String = ds.into_iter().collect();
            let magnitude: i64 = text.parse().unwrap_or(i64::MAX);
            if sign.is_some() { -magnitude } else { magnitude }
        })
    })
}

/// A decimal literal with an optional fractional part (`-12`, `3.14`),
/// parsed to `f64`.
pub fn real<C>() -> impl Parser<char, C, Output = f64> {
    token('-').optional().bind(|sign: Option<char>| {
        digit().at_least_once().bind(move |int_part: Vec<char>| {
            token('.')
                .then(digit().at_least_once())
                .optional()
                .map(move |frac: Option<Vec<char>>| {
                    let mut text = String::new();
                    if sign.is_some() {
                        text.push('-');
                    }
                    text.extend(int_part.iter());
                    if let Some(frac_digits) = frac {
                        text.push('.');
                        text.extend(frac_digits.iter());
                    }
                    text.parse().unwrap_or(0.0)
                })
        })
    })
}

/// A line terminator: `"\r\n"`, a bare `"\n"`, or end of input.
pub fn end_of_line<C>() -> impl Parser<char, C, Output = ()> {
    literal(['\r', '\n'])
        .map(|_| ())
        .or(token('\n').map(|_| ()))
        .or(end())
}

/// Skips a line comment: `start` followed by everything up to (but not
/// including) the next newline or end of input.
pub fn comment_line<C>(start: &str) -> impl Parser<char, C, Output = ()> {
    let marker: Vec<char> = start.chars().collect();
    literal(marker)
        .then(satisfy("not a newline", |c: &char| *c != '\n').many())
        .map(|_| ())
}

/// Skips a block comment: `start`, then everything up to and including the
/// first occurrence of `end`. Does not nest.
pub fn skip_block_comment<C>(start: &str, end_marker: &str) -> impl Parser<char, C, Output = ()> {
    let opening: Vec<char> = start.chars().collect();
    let closing: Vec<char> = end_marker.chars().collect();
    let body = literal(closing.clone())
        .not()
        .then(satisfy("character", |_: &char| true));
    literal(opening)
        .then(body.many())
        .then(literal(closing))
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catena_core::config::ParseConfig;
    use catena_core::expected::ExpectedSet;
    use catena_core::source::IterSource;
    use catena_core::state::ParseState;

    fn state(input: &str) -> ParseState<char, IterSource<std::vec::IntoIter<char>>> {
        let chars: Vec<char> = input.chars().collect();
        ParseState::new(IterSource::new(chars.into_iter()), ParseConfig::default())
    }

    #[test]
    fn digit_matches_one_ascii_digit() {
        let mut st = state("7x");
        let mut exp = ExpectedSet::new();
        assert_eq!(digit::<()>().eval(&mut st, &mut exp), Some('7'));
        assert_eq!(st.offset(), 1);
    }

    #[test]
    fn decimal_parses_negative_integer() {
        let mut st = state("-42");
        let mut exp = ExpectedSet::new();
        assert_eq!(decimal::<()>().eval(&mut st, &mut exp), Some(-42));
    }

    #[test]
    fn real_parses_fractional_literal() {
        let mut st = state("3.25");
        let mut exp = ExpectedSet::new();
        assert_eq!(real::<()>().eval(&mut st, &mut exp), Some(3.25));
    }

    #[test]
    fn ci_string_matches_regardless_of_case() {
        let mut st = state("LeT x");
        let mut exp = ExpectedSet::new();
        assert_eq!(
            ci_string::<()>("let").eval(&mut st, &mut exp),
            Some("LeT".to_string())
        );
        assert_eq!(st.offset(), 3);
    }

    #[test]
    fn one_of_chars_accepts_any_member() {
        let mut st = state("+");
        let mut exp = ExpectedSet::new();
        assert_eq!(
            one_of_chars::<()>(['+', '-']).eval(&mut st, &mut exp),
            Some('+')
        );
    }

    #[test]
    fn comment_line_consumes_up_to_newline() {
        let mut st = state("// hi\nrest");
        let mut exp = ExpectedSet::new();
        assert_eq!(comment_line::<()>("//").eval(&mut st, &mut exp), Some(()));
        assert_eq!(st.offset(), 5);
    }

    #[test]
    fn end_of_line_matches_crlf_and_lf() {
        let mut st = state("\r\n");
        let mut exp = ExpectedSet::new();
        assert_eq!(end_of_line::<()>().eval(&mut st, &mut exp), Some(()));
        assert_eq!(st.offset(), 2);
    }

    #[test]
    fn end_of_line_also_accepts_end_of_input() {
        let mut st = state("");
        let mut exp = ExpectedSet::new();
        assert_eq!(end_of_line::<()>().eval(&mut st, &mut exp), Some(()));
        assert_eq!(st.offset(), 0);
    }

    #[test]
    fn ci_char_matches_regardless_of_case() {
        let mut st = state("L");
        let mut exp = ExpectedSet::new();
        assert_eq!(ci_char::<()>('l').eval(&mut st, &mut exp), Some('L'));
        assert_eq!(st.offset(), 1);
    }

    #[test]
    fn ci_char_rejects_other_letters() {
        let mut st = state("x");
        let mut exp = ExpectedSet::new();
        assert_eq!(ci_char::<()>('l').eval(&mut st, &mut exp), None);
        assert_eq!(st.offset(), 0);
    }

    // SkipWhitespaces must behave identically whether the run starts at
    // offset 0 (aligned) or partway into the input after prior tokens were
    // consumed (misaligned) — it only ever looks at what's under the cursor.
    #[test]
    fn whitespaces_skips_maximal_run_aligned() {
        let mut st = state("   x");
        let mut exp = ExpectedSet::new();
        assert_eq!(whitespaces::<()>().eval(&mut st, &mut exp), Some(()));
        assert_eq!(st.offset(), 3);
        assert_eq!(st.current(), Some(&'x'));
    }

    #[test]
    fn whitespaces_skips_maximal_run_misaligned() {
        let mut st = state("a   x");
        let mut exp = ExpectedSet::new();
        assert_eq!(token('a').eval(&mut st, &mut exp), Some('a'));
        assert_eq!(whitespaces::<()>().eval(&mut st, &mut exp), Some(()));
        assert_eq!(st.offset(), 4);
        assert_eq!(st.current(), Some(&'x'));
    }

    #[test]
    fn whitespaces_succeeds_with_zero_width_on_no_whitespace() {
        let mut st = state("x");
        let mut exp = ExpectedSet::new();
        assert_eq!(whitespaces::<()>().eval(&mut st, &mut exp), Some(()));
        assert_eq!(st.offset(), 0);
    }

    #[test]
    fn skip_block_comment_consumes_start_through_end() {
        let mut st = state("/* hi there */rest");
        let mut exp = ExpectedSet::new();
        assert_eq!(
            skip_block_comment::<()>("/*", "*/").eval(&mut st, &mut exp),
            Some(())
        );
        assert_eq!(st.offset(), 15);
        assert_eq!(st.current(), Some(&'r'));
    }

    #[test]
    fn skip_block_comment_fails_on_unterminated_input() {
        let mut st = state("/* never closed");
        let mut exp = ExpectedSet::new();
        assert_eq!(
            skip_block_comment::<()>("/*", "*/").eval(&mut st, &mut exp),
            None
        );
    }
}
