#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
//! Batteries-included facade over `catena-core`: character-specialised
//! helpers, keyword/enum matching, expression-precedence parsing,
//! permutation parsing, and I/O-backed input sources.
//!
//! Everything here is built entirely out of `catena_core` primitives and
//! combinators — nothing in this crate touches `ParseState` or the error
//! slot directly.

pub use catena_core::*;

pub mod chars;
pub mod expr;
pub mod keyword;
pub mod permutation;
pub mod source;

pub use chars::{
    ci_char, ci_string, comment_line, decimal, digit, end_of_line, hex_digit, letter,
    letter_or_digit, none_of, one_of_chars, real, skip_block_comment, string, whitespace,
    whitespaces,
};
pub use expr::{Assoc, BinaryFold, Level, OperatorTable, UnaryFold, binary_op, unary_op};
pub use keyword::keyword_of;
pub use permutation::{Permutation2, Permutation3, permutation2, permutation3};
pub use source::{
    CharReaderSource, ReadSource, from_char_reader, from_iter, from_read, from_slice, from_str,
};
