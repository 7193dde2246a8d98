//! The mutable heart of the core: buffered lookahead, bookmarked rewinding,
//! the error slot, and an amortised source-position cache, all built around
//! a [`TokenSource`].

use std::borrow::Cow;

use crate::config::{ParseConfig, RecursionGuard};
use crate::delta::{SourcePos, SourcePosDelta};
use crate::error::Error;
use crate::expected::ExpectedSet;
use crate::parse_error::{InternalError, ParseError};
use crate::pool::PooledVec;
use crate::source::TokenSource;

const FILL_CHUNK: usize = 64;

/// A pinned offset, preventing the buffer from discarding tokens before it
/// until [`ParseState::rewind`] or [`ParseState::discard_bookmark`] releases
/// the pin. Opaque on purpose: the index into the state's bookmark table is
/// an implementation detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    slot: usize,
    offset: usize,
}

impl Bookmark {
    /// The token offset this bookmark was taken at.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// Owns the buffer, the bookmark stack, the error slot, and a position
/// cache, around one [`TokenSource`]. Created fresh per parse by
/// [`crate::driver::run`]; lives only for that parse's duration.
pub struct ParseState<T, S, C = ()> {
    source: S,
    buffer: PooledVec<T>,
    /// Absolute offset of `buffer[0]`.
    frontier: usize,
    /// Absolute offset of the current token.
    pos: usize,
    exhausted: bool,
    bookmarks: Vec<Option<usize>>,
    error: Option<InternalError<T>>,
    /// Cumulative delta from input start to `anchor_offset`.
    anchor_offset: usize,
    anchor_delta: SourcePosDelta,
    config: ParseConfig<T>,
    recursion: RecursionGuard,
    /// User-extensible context, threaded through every parser invocation.
    pub ctx: C,
}

impl<T: Clone, S: TokenSource<T>> ParseState<T, S, ()> {
    pub fn new(source: S, config: ParseConfig<T>) -> Self {
        Self::with_ctx(source, config, ())
    }
}

impl<T: Clone, S: TokenSource<T>, C> ParseState<T, S, C> {
    pub fn with_ctx(source: S, config: ParseConfig<T>, ctx: C) -> Self {
        let buffer = PooledVec::new(config.pool(), FILL_CHUNK);
        Self {
            source,
            buffer,
            frontier: 0,
            pos: 0,
            exhausted: false,
            bookmarks: Vec::new(),
            error: None,
            anchor_offset: 0,
            anchor_delta: SourcePosDelta::ZERO,
            config,
            recursion: RecursionGuard::new(),
            ctx,
        }
    }

    #[inline]
    fn buf_index(&self) -> usize {
        self.pos - self.frontier
    }

    fn ensure(&mut self, want: usize) {
        if self.exhausted {
            return;
        }
        let available = self.buffer.len().saturating_sub(self.buf_index());
        if available >= want {
            return;
        }
        let mut need = want - available;
        while need > 0 && !self.exhausted {
            let chunk = need.max(FILL_CHUNK);
            let got = self.source.read(&mut self.buffer, chunk);
            if got == 0 {
                self.exhausted = true;
                break;
            }
            need = need.saturating_sub(got);
        }
    }

    /// The absolute token offset of the current position.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Whether a current token exists (not at end of input).
    pub fn has_current(&mut self) -> bool {
        self.ensure(1);
        self.buf_index() < self.buffer.len()
    }

    /// The token at the current offset, or `None` at end of input.
    pub fn current(&mut self) -> Option<&T> {
        self.ensure(1);
        let idx = self.buf_index();
        self.buffer.get(idx)
    }

    /// A slice of up to `n` tokens starting at the current offset, without
    /// advancing.
    pub fn look_ahead(&mut self, n: usize) -> &[T] {
        self.ensure(n);
        let idx = self.buf_index();
        let end = (idx + n).min(self.buffer.len());
        &self.buffer[idx..end]
    }

    /// Move forward up to `n` tokens (fewer if input runs out first, or if
    /// [`crate::config::ParseConfig::max_tokens`] would be exceeded first).
    /// Returns the number actually advanced. Hitting the token budget writes
    /// a [`Error::TokenLimitExceeded`] message into the error slot, the same
    /// way [`crate::rec::Rec`] reports a recursion-limit breach, so a run
    /// bounded by `max_tokens` fails with a distinguishing message instead of
    /// a plain, indistinguishable "unexpected end of input".
    pub fn advance(&mut self, n: usize) -> usize {
        self.ensure(n);
        let idx = self.buf_index();
        let avail = self.buffer.len().saturating_sub(idx).min(n);
        let budget = self.config.max_tokens.saturating_sub(self.pos);
        let actual = avail.min(budget);
        self.pos += actual;
        if actual < avail && actual == budget {
            let unexpected = self.buffer.get(idx + actual).cloned();
            let message = Error::TokenLimitExceeded {
                consumed: self.pos,
                limit: self.config.max_tokens,
            }
            .to_string();
            self.set_error_with_message(unexpected, false, self.pos, message);
        }
        actual
    }

    /// Whether the parse has consumed more tokens than `max_tokens` allows.
    pub fn token_limit_exceeded(&self) -> Option<Error> {
        if self.pos > self.config.max_tokens {
            Some(Error::TokenLimitExceeded {
                consumed: self.pos,
                limit: self.config.max_tokens,
            })
        } else {
            None
        }
    }

    /// Pin the current offset so the buffer won't discard tokens before it.
    pub fn bookmark(&mut self) -> Bookmark {
        let slot = self.bookmarks.len();
        self.bookmarks.push(Some(self.pos));
        Bookmark {
            slot,
            offset: self.pos,
        }
    }

    /// Restore the current offset to the bookmark's offset and release it.
    pub fn rewind(&mut self, bookmark: Bookmark) {
        self.pos = bookmark.offset;
        self.release(bookmark);
    }

    /// Release a bookmark's pin without moving the cursor.
    pub fn discard_bookmark(&mut self, bookmark: Bookmark) {
        self.release(bookmark);
    }

    fn release(&mut self, bookmark: Bookmark) {
        if let Some(slot) = self.bookmarks.get_mut(bookmark.slot) {
            *slot = None;
        }
        self.compact();
    }

    fn compact(&mut self) {
        let live_min = self.bookmarks.iter().flatten().copied().min();
        let keep_from = match live_min {
            Some(m) => m.min(self.anchor_offset),
            None => self.anchor_offset,
        };
        let drop_n = keep_from.saturating_sub(self.frontier);
        if drop_n > 0 {
            self.buffer.drain(0..drop_n.min(self.buffer.len()));
            self.frontier += drop_n;
        }
    }

    /// The cumulative `(line, col)` delta from input start to the current
    /// offset, folding only the tokens since the last call (amortised O(1)
    /// in the common case of monotonically advancing through the input).
    pub fn compute_source_pos_delta(&mut self) -> SourcePosDelta {
        self.refresh_anchor_to(self.pos);
        self.anchor_delta
    }

    /// The resolved `(line, col)` at the current offset.
    pub fn source_pos(&mut self) -> SourcePos {
        SourcePos::from_delta(self.compute_source_pos_delta())
    }

    /// Resolve a `(line, col)` for an arbitrary past offset still held in the
    /// buffer (e.g. the offset recorded in the error slot). Falls back to
    /// `None` if the tokens have already been discarded (can only happen for
    /// offsets before any live bookmark and before the last position query).
    pub fn source_pos_at(&mut self, offset: usize) -> Option<SourcePos> {
        if offset < self.frontier {
            return None;
        }
        if offset <= self.anchor_offset {
            // Walking backwards from the anchor isn't supported; only valid
            // when the offset coincides with a position we've already
            // resolved exactly.
            if offset == self.anchor_offset {
                return Some(SourcePos::from_delta(self.anchor_delta));
            }
            return None;
        }
        let saved_anchor_offset = self.anchor_offset;
        let saved_anchor_delta = self.anchor_delta;
        self.refresh_anchor_to(offset);
        let result = SourcePos::from_delta(self.anchor_delta);
        self.anchor_offset = saved_anchor_offset;
        self.anchor_delta = saved_anchor_delta;
        Some(result)
    }

    fn refresh_anchor_to(&mut self, target: usize) {
        if target <= self.anchor_offset {
            return;
        }
        let start_idx = self.anchor_offset - self.frontier;
        let end_idx = target - self.frontier;
        let delta: SourcePosDelta = self.buffer[start_idx..end_idx]
            .iter()
            .map(self.config.token_to_delta)
            .fold(SourcePosDelta::ZERO, SourcePosDelta::combine);
        self.anchor_delta = self.anchor_delta.combine(delta);
        self.anchor_offset = target;
    }

    /// Write the error slot. Primitives call this on failure; the previous
    /// contents are discarded unconditionally (merging across alternation
    /// branches is `OneOf`'s job, not the state's).
    pub fn set_error(&mut self, unexpected: Option<T>, eof: bool, offset: usize) {
        self.error = Some(InternalError::new(offset, unexpected, eof));
    }

    pub fn set_error_with_message(
        &mut self,
        unexpected: Option<T>,
        eof: bool,
        offset: usize,
        message: impl Into<Cow<'static, str>>,
    ) {
        self.error = Some(InternalError::new(offset, unexpected, eof).with_message(message));
    }

    /// Read the current error slot.
    pub fn get_error(&self) -> Option<&InternalError<T>> {
        self.error.as_ref()
    }

    /// Take the current error slot, leaving `None` behind.
    pub fn take_error(&mut self) -> Option<InternalError<T>> {
        self.error.take()
    }

    /// Build the final, user-facing [`ParseError`] from the given expected
    /// set and whatever is currently in the error slot (or a generic
    /// end-of-input error if the slot was never set).
    pub fn build_error(&mut self, expected: ExpectedSet<T>) -> ParseError<T>
    where
        T: PartialEq + std::fmt::Debug,
    {
        let internal = self.error.clone().unwrap_or_else(|| {
            InternalError::new(self.pos, None, !self.has_current())
        });
        let pos = self.source_pos_at(internal.offset);
        ParseError::build(internal, expected, pos)
    }

    #[inline]
    pub fn recursion_guard_mut(&mut self) -> &mut RecursionGuard {
        &mut self.recursion
    }

    #[inline]
    pub fn max_recursion_depth(&self) -> usize {
        self.config.max_recursion_depth
    }
}
