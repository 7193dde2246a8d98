//! Parser configuration: resource limits, source-position mapping, and the
//! buffer pool.
//!
//! Following the pattern established by `serde_json`, parsers enforce a
//! maximum recursion depth to prevent malicious or malformed input (deeply
//! nested `Rec`-based grammars) from overflowing the stack. The default
//! limit of 128 balances security with practical use.

use std::sync::Arc;

use crate::delta::{SourcePosDelta, TokenPos};
use crate::error::Error;
use crate::pool::{ArrayPool, DefaultArrayPool};

/// Configuration for a single parse: resource limits, the pooled-buffer
/// provider, and the function used to translate a token into a
/// [`SourcePosDelta`] for line/column reporting.
///
/// Cheap to clone: the pool handle is an `Arc`, everything else is `Copy`.
pub struct ParseConfig<T> {
    /// Maximum allowed `Rec` recursion depth. Default: 128.
    pub max_recursion_depth: usize,
    /// Maximum number of tokens to consume before failing. Default: `usize::MAX`.
    pub max_tokens: usize,
    /// Maps one token to its contribution to the running source position.
    pub token_to_delta: fn(&T) -> SourcePosDelta,
    pool: Arc<dyn ArrayPool<T>>,
}

impl<T> Clone for ParseConfig<T> {
    fn clone(&self) -> Self {
        Self {
            max_recursion_depth: self.max_recursion_depth,
            max_tokens: self.max_tokens,
            token_to_delta: self.token_to_delta,
            pool: self.pool.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> ParseConfig<T> {
    /// Create a configuration with an explicit token-to-delta function and
    /// the built-in pooled-buffer provider.
    pub fn new(token_to_delta: fn(&T) -> SourcePosDelta) -> Self {
        Self {
            max_recursion_depth: 128,
            max_tokens: usize::MAX,
            token_to_delta,
            pool: Arc::new(DefaultArrayPool::new()),
        }
    }

    #[inline]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    #[inline]
    pub fn with_max_tokens(mut self, count: usize) -> Self {
        self.max_tokens = count;
        self
    }

    /// Disable the recursion limit. Only safe for trusted input: unbounded
    /// `Rec` nesting can overflow the stack.
    #[inline]
    pub fn disable_recursion_limit(self) -> Self {
        self.with_max_recursion_depth(usize::MAX)
    }

    /// Supply a custom pool, e.g. one shared across many independent parses.
    pub fn with_pool(mut self, pool: Arc<dyn ArrayPool<T>>) -> Self {
        self.pool = pool;
        self
    }

    pub(crate) fn pool(&self) -> Arc<dyn ArrayPool<T>> {
        self.pool.clone()
    }
}

impl<T: TokenPos + Send + Sync + 'static> Default for ParseConfig<T> {
    /// The default configuration: recursion depth 128, no token limit, and
    /// the token type's own [`TokenPos`] impl for position tracking.
    fn default() -> Self {
        Self::new(|t| t.pos_delta())
    }
}

/// Tracks `Rec` recursion depth during parsing, enforcing
/// [`ParseConfig::max_recursion_depth`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursionGuard {
    depth: usize,
}

impl RecursionGuard {
    #[inline]
    pub const fn new() -> Self {
        Self { depth: 0 }
    }

    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a nested `Rec` evaluation, incrementing depth.
    #[inline]
    pub fn enter(&mut self, limit: usize) -> Result<(), Error> {
        self.depth = self.depth.saturating_add(1);
        if self.depth > limit {
            Err(Error::RecursionLimitExceeded {
                depth: self.depth,
                limit,
            })
        } else {
            Ok(())
        }
    }

    /// Exit a nested `Rec` evaluation. Saturates at 0 so an extra `exit()`
    /// never underflows.
    #[inline]
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
