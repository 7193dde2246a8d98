#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
#![allow(clippy::type_complexity)]
//! The core parser-combinator engine: an opaque, composable `Parser` value
//! evaluated against a buffered, bookmarked token stream.
//!
//! This crate has no opinion on what a "token" is beyond `Clone +
//! PartialEq + Debug` — [`char`] and [`u8`] get a free [`config::ParseConfig`]
//! default, anything else supplies its own [`delta::TokenPos`] or
//! `token_to_delta` function. Character-specific convenience parsers,
//! keyword matching, expression-precedence building, and I/O-backed sources
//! live one layer up, in the `catena` facade crate.

pub mod combinators;
pub mod config;
pub mod delta;
pub mod driver;
pub mod error;
pub mod expected;
pub mod parse_error;
pub mod parser;
pub mod pool;
pub mod primitives;
pub mod rec;
pub mod repeat;
pub mod source;
pub mod state;

pub use combinators::{
    BoxedParser, Labelled, Lookahead, Map, Not, OneOf, Optional, Or, ParserExt, RecoverWith, Try,
    one_of,
};
pub use config::{ParseConfig, RecursionGuard};
pub use delta::{SourcePos, SourcePosDelta, TokenPos};
pub use driver::{run, run_or_throw};
pub use error::Error;
pub use expected::{Expected, ExpectedSet};
pub use parse_error::{InternalError, ParseError};
pub use parser::Parser;
pub use pool::{ArrayPool, DefaultArrayPool, PooledVec};
pub use primitives::{
    CurrentOffset, CurrentPos, CurrentPosDelta, End, Fail, Literal, Return, TokenExact,
    TokenPredicate, current_offset, current_pos, current_pos_delta, end, fail, fail_with, literal,
    ret, satisfy, token,
};
pub use rec::{Rec, rec};
pub use repeat::{
    AtLeastOnce, Chainer, ChainAtLeastOnce, Many, Repeat, RepeatExt, Separated,
    SeparatedAndOptionallyTerminated, SeparatedAndTerminated, SeparatedAtLeastOnce,
    at_least_once, chain_at_least_once, many, repeat, separated, separated_and_optionally_terminated,
    separated_and_terminated, separated_at_least_once,
};
pub use source::{IterSource, SliceSource, TokenSource};
pub use state::{Bookmark, ParseState};
