// Frozen transducer and its traversal

use uniparse_core::enums::WILDCARD;

use crate::config::{Frame, TraversalConfig};
use crate::edits::{EditKind, EditOp};
use crate::symbols::SymbolTable;
use crate::transition::{StateEntry, Transition, find_transition};
use crate::{MAX_LOOP_COUNT, Transducer};

/// A match of one key against the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FstMatch {
    /// First input position covered by the match.
    pub start: usize,
    /// Exclusive end in the input.
    pub end: usize,
    /// Index of the matched value (see [`Fst::value`]).
    pub value: u32,
    /// Input segment `start..end` after corrections; substituted and
    /// inserted characters are [`WILDCARD`]s. Its length equals the key's.
    pub segment: Vec<char>,
    pub edits: Vec<EditOp>,
}

/// Frozen key transducer. Immutable and shareable across threads.
pub struct Fst<T> {
    states: Vec<StateEntry>,
    transitions: Vec<Transition>,
    finals: Vec<u32>,
    values: Vec<T>,
    symbols: SymbolTable,
}

impl<T> std::fmt::Debug for Fst<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fst")
            .field("state_count", &self.states.len())
            .field("transition_count", &self.transitions.len())
            .field("value_count", &self.values.len())
            .field("symbol_count", &self.symbols.len())
            .finish()
    }
}

impl<T> Fst<T> {
    pub(crate) fn from_parts(
        states: Vec<StateEntry>,
        transitions: Vec<Transition>,
        finals: Vec<u32>,
        values: Vec<T>,
        symbols: SymbolTable,
    ) -> Self {
        Self {
            states,
            transitions,
            finals,
            values,
            symbols,
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    #[inline]
    pub fn value(&self, index: u32) -> &T {
        &self.values[index as usize]
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    fn arcs(&self, state: u32) -> &[Transition] {
        self.states[state as usize].transitions(&self.transitions)
    }

    fn final_value(&self, state: u32, nth: u32) -> Option<u32> {
        let entry = self.states[state as usize];
        (nth < entry.final_count).then(|| self.finals[(entry.first_final + nth) as usize])
    }

    /// All substrings of `input` that match a key with at most `max_edits`
    /// edits.
    pub fn lookup(&self, input: &[char], max_edits: usize) -> Vec<FstMatch> {
        let mut config = TraversalConfig::new(max_edits);
        self.collect(&mut config, input)
    }

    /// Values whose key is a prefix of `input[start..]`, exact (input
    /// wildcards match any key character).
    pub fn prefixes_at(&self, input: &[char], start: usize) -> Vec<&T> {
        let mut config = TraversalConfig::anchored_at(start);
        self.collect(&mut config, input)
            .into_iter()
            .map(|m| self.value(m.value))
            .collect()
    }

    fn collect(&self, config: &mut TraversalConfig, input: &[char]) -> Vec<FstMatch> {
        self.prepare(config, input);
        let mut out = Vec::new();
        let mut m = FstMatch::default();
        while self.next(config, &mut m) {
            out.push(m.clone());
        }
        out
    }

    /// Push the successors of `frame`, first-tried last.
    fn expand(&self, config: &mut TraversalConfig, frame: &Frame) {
        let arcs = self.arcs(frame.state);
        let n = config.input.len();
        let mut children = Vec::new();

        if frame.pos < n {
            let ch = config.input[frame.pos];
            if ch == WILDCARD {
                for t in arcs {
                    children.push(frame.advance(t.target, 1, &[ch], None));
                }
            } else if let Some(t) = config.input_symbols[frame.pos].and_then(|s| find_transition(arcs, s)) {
                children.push(frame.advance(t.target, 1, &[ch], None));
            }
        }

        if frame.edits() < config.max_edits && !arcs.is_empty() {
            let last = frame.last_edit();
            if frame.pos < n {
                let ch = config.input[frame.pos];
                let sym = config.input_symbols[frame.pos];
                if ch != WILDCARD {
                    for t in arcs.iter().filter(|t| Some(t.sym) != sym) {
                        children.push(frame.advance(t.target, 1, &[WILDCARD], Some(EditKind::Substitute)));
                    }
                }
                if !frame.segment.is_empty() && last != Some(EditKind::Insert) {
                    children.push(frame.advance(frame.state, 1, &[], Some(EditKind::Delete)));
                }
            }
            if last != Some(EditKind::Delete) {
                for t in arcs {
                    children.push(frame.advance(t.target, 0, &[WILDCARD], Some(EditKind::Insert)));
                }
            }
            if frame.pos + 1 < n {
                let first = config.input_symbols[frame.pos + 1];
                let second = config.input_symbols[frame.pos];
                if let (Some(a), Some(b)) = (first, second) {
                    let swapped = find_transition(arcs, a)
                        .and_then(|t1| find_transition(self.arcs(t1.target), b));
                    if let (true, Some(t2)) = (a != b, swapped) {
                        let emitted = [config.input[frame.pos + 1], config.input[frame.pos]];
                        children.push(frame.advance(t2.target, 2, &emitted, Some(EditKind::Transpose)));
                    }
                }
            }
        }

        config.stack.extend(children.into_iter().rev());
    }
}

impl<T> Transducer for Fst<T> {
    type Config = TraversalConfig;
    type Output = FstMatch;

    fn prepare(&self, config: &mut Self::Config, input: &[char]) -> bool {
        config.reset();
        let mut all_known = true;
        for &ch in input {
            let sym = self.symbols.get(ch);
            all_known &= sym.is_some() || ch == WILDCARD;
            config.input.push(ch);
            config.input_symbols.push(sym);
        }
        config.start_limit = if config.anchored {
            config.first_start + 1
        } else {
            input.len()
        };
        all_known
    }

    fn next(&self, config: &mut Self::Config, output: &mut Self::Output) -> bool {
        let mut loop_counter: u32 = 0;
        while loop_counter < MAX_LOOP_COUNT {
            loop_counter += 1;

            if let Some((frame, nth)) = config.pending.as_mut() {
                if let Some(value) = self.final_value(frame.state, *nth) {
                    *nth += 1;
                    let key = (frame.start, frame.pos, value, frame.segment.clone());
                    if config.seen.insert(key) {
                        output.start = frame.start;
                        output.end = frame.pos;
                        output.value = value;
                        output.segment.clone_from(&frame.segment);
                        output.edits.clone_from(&frame.ops);
                        return true;
                    }
                    continue;
                }
            }
            config.pending = None;

            let frame = match config.stack.pop() {
                Some(frame) => frame,
                None => {
                    if config.next_start < config.start_limit && config.next_start <= config.input.len() {
                        config.stack.push(Frame::root(config.next_start));
                        config.next_start += 1;
                        continue;
                    }
                    return false;
                }
            };

            self.expand(config, &frame);
            if self.states[frame.state as usize].is_final() {
                config.pending = Some((frame, 0));
            }
        }
        false
    }
}
