//! Structured "what was looked for" values, merged across alternation branches.

use std::borrow::Cow;
use std::fmt;

/// A single thing a parser was looking for at some offset.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected<T> {
    /// A human-readable label, e.g. `"digit"` or `"identifier"`.
    Label(Cow<'static, str>),
    /// A literal run of tokens the parser tried to match, e.g. `['a', 'b']`.
    Literal(Vec<T>),
    /// The sentinel for "end of input".
    EndOfInput,
}

impl<T> Expected<T> {
    #[inline]
    pub fn label(s: impl Into<Cow<'static, str>>) -> Self {
        Self::Label(s.into())
    }

    #[inline]
    pub fn literal(tokens: impl Into<Vec<T>>) -> Self {
        Self::Literal(tokens.into())
    }
}

impl<T: fmt::Debug> fmt::Display for Expected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Label(s) => write!(f, "{s}"),
            Expected::Literal(tokens) if tokens.len() == 1 => write!(f, "{:?}", tokens[0]),
            Expected::Literal(tokens) => {
                write!(f, "\"")?;
                for t in tokens {
                    write!(f, "{t:?}")?;
                }
                write!(f, "\"")
            }
            Expected::EndOfInput => write!(f, "end of input"),
        }
    }
}

/// An unordered, deduplicated collection of [`Expected`] values.
///
/// Kept as a flat `Vec` rather than a `HashSet`/`BTreeSet` so the only bound
/// this places on the token type is `PartialEq` (matching the "any value with
/// equality" contract on `T`); rendering sorts by the formatted label instead
/// of relying on `Ord`.
#[derive(Debug, Clone, Default)]
pub struct ExpectedSet<T> {
    items: Vec<Expected<T>>,
}

impl<T: PartialEq> ExpectedSet<T> {
    #[inline]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Insert a value, collapsing duplicates.
    pub fn insert(&mut self, expected: Expected<T>) {
        if !self.items.contains(&expected) {
            self.items.push(expected);
        }
    }

    /// Merge another set into this one, collapsing duplicates.
    pub fn extend_from(&mut self, other: Self) {
        for item in other.items {
            self.insert(item);
        }
    }

    /// Replace all contents with the given set (used by `labelled`/`with_expected`).
    pub fn replace_with(&mut self, items: impl IntoIterator<Item = Expected<T>>) {
        self.items.clear();
        for item in items {
            self.insert(item);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expected<T>> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Expected<T>> {
        self.items
    }
}

impl<T: fmt::Debug + PartialEq> ExpectedSet<T> {
    /// A deterministic, display-sorted view of the contents.
    pub fn sorted_rendered(&self) -> Vec<String> {
        let mut rendered: Vec<String> = self.items.iter().map(|e| e.to_string()).collect();
        rendered.sort();
        rendered.dedup();
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_deduplicates() {
        let mut set = ExpectedSet::new();
        set.insert(Expected::label("digit"));
        set.insert(Expected::label("digit"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn extend_from_merges_and_dedupes() {
        let mut a: ExpectedSet<char> = ExpectedSet::new();
        a.insert(Expected::label("digit"));
        let mut b: ExpectedSet<char> = ExpectedSet::new();
        b.insert(Expected::label("digit"));
        b.insert(Expected::label("letter"));
        a.extend_from(b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn display_renders_label_and_literal_and_eof() {
        assert_eq!(Expected::<char>::label("digit").to_string(), "digit");
        assert_eq!(Expected::literal(vec!['a', 'b']).to_string(), "\"ab\"");
        assert_eq!(Expected::<char>::EndOfInput.to_string(), "end of input");
    }

    #[test]
    fn sorted_rendered_is_deterministic_regardless_of_insertion_order() {
        let mut a: ExpectedSet<char> = ExpectedSet::new();
        a.insert(Expected::label("b"));
        a.insert(Expected::label("a"));
        let mut b: ExpectedSet<char> = ExpectedSet::new();
        b.insert(Expected::label("a"));
        b.insert(Expected::label("b"));
        assert_eq!(a.sorted_rendered(), b.sorted_rendered());
    }
}
