// Frequency lists and nested token groups

use crate::wordform::Wordform;

// ---------------------------------------------------------------------------
// Frequency lists
// ---------------------------------------------------------------------------

/// Error type for malformed frequency lists.
#[derive(Debug, thiserror::Error)]
pub enum FreqListError {
    #[error("line {line}: expected a token and a count separated by {separator:?}")]
    MissingSeparator { line: usize, separator: String },
    #[error("line {line}: invalid count {value:?}")]
    InvalidCount { line: usize, value: String },
}

/// A token type with its corpus frequency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FreqEntry {
    pub token: String,
    pub count: u64,
}

impl FreqEntry {
    pub fn new(token: impl Into<String>, count: u64) -> Self {
        Self {
            token: token.into(),
            count,
        }
    }
}

/// Parse `token<sep>count` lines. Lines of two characters or fewer are
/// skipped.
pub fn read_freq_list(text: &str, separator: &str) -> Result<Vec<FreqEntry>, FreqListError> {
    let mut entries = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.chars().count() <= 2 {
            continue;
        }
        let (token, count) =
            line.rsplit_once(separator)
                .ok_or_else(|| FreqListError::MissingSeparator {
                    line: i + 1,
                    separator: separator.to_string(),
                })?;
        let count = count
            .trim()
            .parse::<u64>()
            .map_err(|_| FreqListError::InvalidCount {
                line: i + 1,
                value: count.to_string(),
            })?;
        entries.push(FreqEntry::new(token.trim(), count));
    }
    Ok(entries)
}

/// Most frequent first; ties broken alphabetically.
pub fn sort_freq_list(entries: &mut [FreqEntry]) {
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
}

// ---------------------------------------------------------------------------
// Token groups
// ---------------------------------------------------------------------------

/// Tokens nested into sentences (or any other grouping).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree<T> {
    Leaf(T),
    Group(Vec<Tree<T>>),
}

/// Analyses of a nested token structure.
pub type TokenTree = Tree<Vec<Wordform>>;

impl<T> Tree<T> {
    /// Transform every leaf, keeping the nesting.
    pub fn map<U>(&self, f: &mut impl FnMut(&T) -> U) -> Tree<U> {
        match self {
            Tree::Leaf(value) => Tree::Leaf(f(value)),
            Tree::Group(items) => Tree::Group(items.iter().map(|item| item.map(&mut *f)).collect()),
        }
    }

    /// Leaves in document order.
    pub fn leaves(&self) -> Vec<&T> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Tree::Leaf(value) => out.push(value),
                Tree::Group(items) => stack.extend(items.iter().rev()),
            }
        }
        out
    }

    /// Mutable leaves in document order.
    pub fn leaves_mut(&mut self) -> Vec<&mut T> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Tree::Leaf(value) => out.push(value),
                Tree::Group(items) => stack.extend(items.iter_mut().rev()),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_skips_short_lines() {
        let text = "house\t12\n\nok\ncat\t3\n";
        let entries = read_freq_list(text, "\t").unwrap();
        assert_eq!(entries, vec![FreqEntry::new("house", 12), FreqEntry::new("cat", 3)]);
    }

    #[test]
    fn rejects_bad_counts() {
        let err = read_freq_list("house\tmany", "\t").unwrap_err();
        assert!(matches!(err, FreqListError::InvalidCount { line: 1, .. }));
        let err = read_freq_list("house 12", "\t").unwrap_err();
        assert!(matches!(err, FreqListError::MissingSeparator { line: 1, .. }));
    }

    #[test]
    fn sorts_by_count_then_token() {
        let mut entries = vec![
            FreqEntry::new("b", 1),
            FreqEntry::new("c", 5),
            FreqEntry::new("a", 1),
        ];
        sort_freq_list(&mut entries);
        let order: Vec<&str> = entries.iter().map(|e| e.token.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn tree_leaves_in_order() {
        let tree = Tree::Group(vec![
            Tree::Leaf(1),
            Tree::Group(vec![Tree::Leaf(2), Tree::Leaf(3)]),
            Tree::Leaf(4),
        ]);
        let leaves: Vec<i32> = tree.leaves().into_iter().copied().collect();
        assert_eq!(leaves, vec![1, 2, 3, 4]);
        let doubled = tree.map(&mut |x| x * 2);
        let leaves: Vec<i32> = doubled.leaves().into_iter().copied().collect();
        assert_eq!(leaves, vec![2, 4, 6, 8]);
    }

    #[test]
    fn tree_leaves_mut() {
        let mut tree = Tree::Group(vec![Tree::Leaf(1), Tree::Group(vec![Tree::Leaf(2)])]);
        for leaf in tree.leaves_mut() {
            *leaf += 10;
        }
        assert_eq!(tree, Tree::Group(vec![Tree::Leaf(11), Tree::Group(vec![Tree::Leaf(12)])]));
    }
}
