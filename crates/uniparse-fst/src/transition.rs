// Flat transition table layout

/// One outgoing arc. The arcs of a state are stored contiguously and sorted
/// by `sym`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub sym: u16,
    pub target: u32,
}

/// Where a state's arcs and final values live in the flat tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateEntry {
    pub first_transition: u32,
    pub transition_count: u32,
    pub first_final: u32,
    pub final_count: u32,
}

impl StateEntry {
    #[inline]
    pub fn transitions<'a>(&self, table: &'a [Transition]) -> &'a [Transition] {
        let start = self.first_transition as usize;
        &table[start..start + self.transition_count as usize]
    }

    #[inline]
    pub fn is_final(&self) -> bool {
        self.final_count > 0
    }
}

/// Binary search for the arc labelled `sym`.
#[inline]
pub fn find_transition(arcs: &[Transition], sym: u16) -> Option<&Transition> {
    arcs.binary_search_by_key(&sym, |t| t.sym)
        .ok()
        .map(|i| &arcs[i])
}
