// Stem conversion: derive missing stem slots from a base slot

use regex::Regex;

/// One ordered regex substitution.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub pattern: Regex,
    pub with: String,
}

impl Replacement {
    pub fn apply(&self, stem: &str) -> String {
        self.pattern.replace_all(stem, self.with.as_str()).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct StemConversion {
    pub name: String,
    pub base: usize,
    /// Target slot and the replacements producing it, in slot order.
    pub targets: Vec<(usize, Vec<Replacement>)>,
}

impl StemConversion {
    /// Fill empty slots from the base slot. Written stems are kept.
    pub fn convert(&self, slots: &mut Vec<Vec<String>>) {
        let Some(base) = slots.get(self.base).cloned() else {
            return;
        };
        if base.is_empty() {
            return;
        }
        let mut targets: Vec<&(usize, Vec<Replacement>)> = self.targets.iter().collect();
        targets.sort_by_key(|(slot, _)| *slot);
        for (slot, replacements) in targets {
            if slots.len() <= *slot {
                slots.resize(slot + 1, Vec::new());
            }
            if !slots[*slot].is_empty() {
                continue;
            }
            slots[*slot] = base
                .iter()
                .map(|stem| replacements.iter().fold(stem.clone(), |s, r| r.apply(&s)))
                .collect();
        }
    }
}
