// Traversal configuration / explicit DFS stack

use hashbrown::HashSet;

use crate::edits::{EditKind, EditOp};

/// One node of the DFS: a transducer state reached from `start` after
/// consuming the input up to `pos`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub state: u32,
    /// Next input position.
    pub pos: usize,
    /// Input position where the match began.
    pub start: usize,
    /// Corrected input segment matched so far.
    pub segment: Vec<char>,
    pub ops: Vec<EditOp>,
}

impl Frame {
    pub fn root(start: usize) -> Self {
        Self {
            start,
            pos: start,
            ..Self::default()
        }
    }

    #[inline]
    pub fn edits(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn last_edit(&self) -> Option<EditKind> {
        self.ops.last().map(|op| op.kind)
    }

    /// Successor frame after consuming `consumed` input characters and
    /// appending `emitted` to the corrected segment.
    pub fn advance(&self, state: u32, consumed: usize, emitted: &[char], op: Option<EditKind>) -> Frame {
        let mut next = self.clone();
        if let Some(kind) = op {
            next.ops.push(EditOp {
                kind,
                pos: self.start + self.segment.len(),
            });
        }
        next.state = state;
        next.pos += consumed;
        next.segment.extend_from_slice(emitted);
        next
    }
}

/// Traversal configuration.
///
/// Holds the input, the DFS stack and the bookkeeping that lets `next`
/// resume where the previous call returned.
#[derive(Debug, Default)]
pub struct TraversalConfig {
    /// Maximum number of edit operations per match.
    pub max_edits: usize,
    /// First start position.
    pub first_start: usize,
    /// Only try `first_start`; otherwise every later position is tried too.
    pub anchored: bool,

    /// Input characters.
    pub input: Vec<char>,
    /// Pre-mapped input symbols (`None` for characters outside the alphabet).
    pub input_symbols: Vec<Option<u16>>,
    /// Next start position to seed once the stack runs dry.
    pub next_start: usize,
    /// Exclusive bound of start positions.
    pub start_limit: usize,
    /// Pending frames.
    pub stack: Vec<Frame>,
    /// Frame sitting on a final state and the index of its next value.
    pub pending: Option<(Frame, u32)>,
    /// Matches already yielded: `(start, end, value, segment)`.
    pub seen: HashSet<(usize, usize, u32, Vec<char>)>,
}

impl TraversalConfig {
    /// Substring search: every start position, up to `max_edits` edits.
    pub fn new(max_edits: usize) -> Self {
        Self {
            max_edits,
            ..Self::default()
        }
    }

    /// Prefix search at a single position, exact.
    pub fn anchored_at(start: usize) -> Self {
        Self {
            first_start: start,
            anchored: true,
            ..Self::default()
        }
    }

    /// Reset the traversal state (called at the start of `prepare`).
    pub fn reset(&mut self) {
        self.input.clear();
        self.input_symbols.clear();
        self.stack.clear();
        self.pending = None;
        self.seen.clear();
        self.next_start = self.first_start;
        self.start_limit = 0;
    }
}
