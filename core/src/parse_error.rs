//! The parse-error plane: [`InternalError`] is what primitives write into the
//! [`crate::state::ParseState`] error slot as they fail; [`ParseError`] is
//! what the driver hands back to the caller once a top-level parse fails.

use std::borrow::Cow;
use std::fmt;

use crate::delta::SourcePos;
use crate::expected::ExpectedSet;

/// The error slot's contents: position and "what was actually there" only.
/// Carries no expected set — that's accumulated separately by alternation and
/// merged in at [`ParseState::build_error`](crate::state::ParseState::build_error) time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalError<T> {
    pub offset: usize,
    pub unexpected: Option<T>,
    pub eof: bool,
    pub message: Option<Cow<'static, str>>,
}

impl<T> InternalError<T> {
    pub fn new(offset: usize, unexpected: Option<T>, eof: bool) -> Self {
        Self {
            offset,
            unexpected,
            eof,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// The user-facing error returned by [`crate::driver::run`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError<T> {
    pub offset: usize,
    pub pos: Option<SourcePos>,
    pub unexpected: Option<T>,
    pub eof: bool,
    pub expected: Vec<String>,
    pub message: Option<Cow<'static, str>>,
}

impl<T: fmt::Debug> fmt::Display for ParseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parse error")?;
        if let Some(pos) = self.pos {
            write!(f, " at line {} col {}", pos.line, pos.col)?;
        } else {
            write!(f, " at offset {}", self.offset)?;
        }
        write!(f, ": unexpected ")?;
        match &self.unexpected {
            Some(t) => write!(f, "{t:?}")?,
            None => write!(f, "end of input")?,
        }
        if !self.expected.is_empty() {
            write!(f, "; expected ")?;
            match self.expected.as_slice() {
                [one] => write!(f, "{one}")?,
                [init @ .., last] => {
                    write!(f, "{}", init.join(", "))?;
                    write!(f, ", or {last}")?;
                }
                [] => unreachable!(),
            }
        }
        if let Some(message) = &self.message {
            write!(f, "; {message}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<T: fmt::Debug> std::error::Error for ParseError<T> {}

impl<T: PartialEq + fmt::Debug> ParseError<T> {
    pub fn build(
        internal: InternalError<T>,
        expected: ExpectedSet<T>,
        pos: Option<SourcePos>,
    ) -> Self {
        Self {
            offset: internal.offset,
            pos,
            unexpected: internal.unexpected,
            eof: internal.eof,
            expected: expected.sorted_rendered(),
            message: internal.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expected::Expected;

    #[test]
    fn renders_canonical_form_with_one_expected() {
        let mut set: ExpectedSet<char> = ExpectedSet::new();
        set.insert(Expected::label("digit"));
        let err = ParseError::build(
            InternalError::new(3, Some('a'), false),
            set,
            Some(SourcePos { line: 1, col: 4 }),
        );
        assert_eq!(
            err.to_string(),
            "parse error at line 1 col 4: unexpected 'a'; expected digit"
        );
    }

    #[test]
    fn renders_multiple_expected_with_oxford_or() {
        let mut set: ExpectedSet<char> = ExpectedSet::new();
        set.insert(Expected::label("a"));
        set.insert(Expected::label("b"));
        set.insert(Expected::label("c"));
        let err = ParseError::build(
            InternalError::new(0, Some('x'), false),
            set,
            Some(SourcePos::START),
        );
        assert_eq!(
            err.to_string(),
            "parse error at line 1 col 1: unexpected 'x'; expected a, b, or c"
        );
    }

    #[test]
    fn renders_eof_as_unexpected_and_expected() {
        let mut set: ExpectedSet<char> = ExpectedSet::new();
        set.insert(Expected::EndOfInput);
        let err = ParseError::build(InternalError::new(0, None, true), set, Some(SourcePos::START));
        assert_eq!(
            err.to_string(),
            "parse error at line 1 col 1: unexpected end of input; expected end of input"
        );
    }

    #[test]
    fn renders_message_when_present() {
        let err: ParseError<char> = ParseError::build(
            InternalError::new(0, None, true).with_message("custom failure"),
            ExpectedSet::new(),
            None,
        );
        assert_eq!(
            err.to_string(),
            "parse error at offset 0: unexpected end of input; custom failure"
        );
    }
}
