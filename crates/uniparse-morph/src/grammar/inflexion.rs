// Inflexions, flex parts and the flex notation

use std::collections::BTreeSet;

use uniparse_core::enums::{GlossType, Position};

use super::field::RegexTest;
use super::{GrammarError, ParadigmId};

/// One typed segment of an inflexion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexPart {
    /// Surface material consumed from the word. Zero morphemes are empty.
    pub surface: Vec<char>,
    /// Text shown in the glossed segmentation (`0` stays visible).
    pub glossed: String,
    pub gloss: String,
    pub gloss_type: GlossType,
}

impl FlexPart {
    pub fn marker(gloss_type: GlossType) -> Self {
        Self {
            surface: Vec::new(),
            glossed: String::new(),
            gloss: String::new(),
            gloss_type,
        }
    }

    pub fn affix(text: &str, gloss_type: GlossType) -> Self {
        Self {
            surface: text.chars().filter(|&c| c != '0').collect(),
            glossed: text.to_string(),
            gloss: String::new(),
            gloss_type,
        }
    }

    fn stem_spec(text: &str) -> Self {
        Self {
            surface: Vec::new(),
            glossed: text.to_string(),
            gloss: text.to_string(),
            gloss_type: GlossType::StemSpec,
        }
    }

    pub fn surface_string(&self) -> String {
        self.surface.iter().collect()
    }
}

/// One affix template of a paradigm, compiled to a single part sequence.
#[derive(Debug, Clone)]
pub struct Inflexion {
    /// Flex as written, for diagnostics.
    pub flex: String,
    pub parts: Vec<FlexPart>,
    pub gramm: String,
    /// Restricts the inflexion to these stem slots.
    pub stem_num: Option<BTreeSet<usize>>,
    pub tests: Vec<RegexTest>,
    pub lemma_changer: Option<Box<Inflexion>>,
    pub position: Position,
    /// Paradigms that may fill a `<.>`.
    pub subsequent: Vec<ParadigmId>,
    pub replace_grammar: bool,
    pub keep_other_data: bool,
    pub start_with_self: bool,
}

impl Inflexion {
    /// Compile a flex and distribute its gloss over the affix-like parts.
    pub fn new(flex: &str, gloss: &str, gramm: &str) -> Result<Self, GrammarError> {
        let mut parts = parse_flex(flex)?;
        assign_glosses(&mut parts, gloss);
        let start_with_self = parts
            .first()
            .is_some_and(|p| p.gloss_type == GlossType::StartWithSelf);
        Ok(Self {
            flex: flex.to_string(),
            parts,
            gramm: gramm.to_string(),
            stem_num: None,
            tests: Vec::new(),
            lemma_changer: None,
            position: Position::Both,
            subsequent: Vec::new(),
            replace_grammar: false,
            keep_other_data: true,
            start_with_self,
        })
    }

    /// Empty inflexion that only links to other paradigms.
    pub fn link(subsequent: Vec<ParadigmId>) -> Self {
        Self {
            flex: String::new(),
            parts: Vec::new(),
            gramm: String::new(),
            stem_num: None,
            tests: Vec::new(),
            lemma_changer: None,
            position: Position::Both,
            subsequent,
            replace_grammar: false,
            keep_other_data: true,
            start_with_self: false,
        }
    }

    /// Link inflexions are looked through, never matched.
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.parts.is_empty() && !self.subsequent.is_empty()
    }

    pub fn next_flex_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| p.gloss_type == GlossType::NextFlex)
            .count()
    }

    #[inline]
    pub fn has_next_flex(&self) -> bool {
        self.parts.iter().any(|p| p.gloss_type == GlossType::NextFlex)
    }

    /// Number of surface characters.
    pub fn literal_len(&self) -> usize {
        self.parts.iter().map(|p| p.surface.len()).sum()
    }

    /// Surface expected right where the inflexion starts matching when the
    /// stem is already behind.
    pub fn anchored_key(&self) -> Vec<char> {
        self.key(true)
    }

    /// Surface expected before the stem; a leading stem boundary means the
    /// stem comes first and the key is empty.
    pub fn slot_key(&self) -> Vec<char> {
        self.key(false)
    }

    fn key(&self, skip_boundary: bool) -> Vec<char> {
        let mut key = Vec::new();
        let rest = self.parts.iter().skip_while(|p| {
            matches!(p.gloss_type, GlossType::Empty | GlossType::StartWithSelf)
                || (skip_boundary && p.gloss_type.is_stem_boundary())
        });
        for part in rest {
            if part.gloss_type.is_marker() {
                break;
            }
            key.extend_from_slice(&part.surface);
        }
        key
    }

    /// Replace the first `<.>` with `child`.
    ///
    /// Returns `false` (and leaves `self` untouched) when there is no `<.>`.
    pub fn join(&mut self, child: &Inflexion) -> bool {
        let Some(at) = self
            .parts
            .iter()
            .position(|p| p.gloss_type == GlossType::NextFlex)
        else {
            return false;
        };
        let inserted: Vec<FlexPart> = child
            .parts
            .iter()
            .filter(|p| !p.gloss_type.is_stem_boundary() && p.gloss_type != GlossType::StartWithSelf)
            .cloned()
            .collect();
        self.parts.splice(at..=at, inserted);
        self.flex = self
            .flex
            .replacen("<.>", child.flex.trim_start_matches('.'), 1);

        if child.replace_grammar {
            self.gramm.clone_from(&child.gramm);
        } else {
            self.gramm = join_tags(&self.gramm, &child.gramm);
        }
        self.replace_grammar |= child.replace_grammar;
        self.stem_num = match (self.stem_num.take(), &child.stem_num) {
            (Some(a), Some(b)) => Some(a.intersection(b).copied().collect()),
            (None, b) => b.clone(),
            (a, None) => a,
        };
        self.tests.extend(child.tests.iter().cloned());
        if child.lemma_changer.is_some() {
            self.lemma_changer.clone_from(&child.lemma_changer);
        }
        self.position = child.position;
        self.subsequent.clone_from(&child.subsequent);
        self.keep_other_data &= child.keep_other_data;
        true
    }
}

/// Join two comma-separated tag strings.
pub fn join_tags(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{left},{right}"),
    }
}

fn malformed(flex: &str, reason: &'static str) -> GrammarError {
    GrammarError::MalformedFlex {
        flex: flex.to_string(),
        reason,
    }
}

/// Characters that end a plain affix run.
fn ends_affix(ch: char) -> bool {
    matches!(ch, '.' | '|' | '[' | '<' | '~' | ']' | '>')
}

/// Split a flex into typed parts.
///
/// A flex without any stem boundary is a suffix: a `.` is inserted at its
/// start (after a leading `[self]`).
pub fn parse_flex(flex: &str) -> Result<Vec<FlexPart>, GrammarError> {
    let chars: Vec<char> = flex.chars().collect();
    let mut parts = Vec::new();
    let mut affix = String::new();
    let mut i = 0;
    if flex.starts_with("[self]") {
        parts.push(FlexPart::marker(GlossType::StartWithSelf));
        i = "[self]".len();
    }

    let flush = |affix: &mut String, parts: &mut Vec<FlexPart>| {
        if !affix.is_empty() {
            parts.push(FlexPart::affix(affix, GlossType::Affix));
            affix.clear();
        }
    };

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '.' => {
                flush(&mut affix, &mut parts);
                parts.push(FlexPart::marker(GlossType::Stem));
                i += 1;
            }
            '|' => {
                flush(&mut affix, &mut parts);
                i += 1;
            }
            '[' | '<' => {
                let close = if ch == '[' { ']' } else { '>' };
                let end = chars[i + 1..]
                    .iter()
                    .position(|&c| c == close)
                    .map(|p| i + 1 + p)
                    .ok_or_else(|| malformed(flex, "unclosed bracket"))?;
                let inner: String = chars[i + 1..end].iter().collect();
                if inner.is_empty() {
                    return Err(malformed(flex, "empty brackets"));
                }
                flush(&mut affix, &mut parts);
                let part = match (ch, inner.as_str()) {
                    ('[', ".") => FlexPart::marker(GlossType::StemForced),
                    ('<', ".") => FlexPart::marker(GlossType::NextFlex),
                    ('<', "+") => FlexPart::marker(GlossType::Incorporation),
                    ('[', _) => FlexPart::stem_spec(&inner),
                    _ => FlexPart::affix(&inner, GlossType::Infix),
                };
                parts.push(part);
                i = end + 1;
            }
            '~' => {
                if affix.is_empty() {
                    let start = i + 1;
                    let end = chars[start..]
                        .iter()
                        .position(|&c| ends_affix(c))
                        .map_or(chars.len(), |p| start + p);
                    if end == start {
                        return Err(malformed(flex, "empty reduplicant"));
                    }
                    let text: String = chars[start..end].iter().collect();
                    parts.push(FlexPart::affix(&text, GlossType::ReduplLeft));
                    i = end;
                } else {
                    parts.push(FlexPart::affix(&affix, GlossType::ReduplRight));
                    affix.clear();
                    i += 1;
                }
            }
            ']' | '>' => return Err(malformed(flex, "unbalanced bracket")),
            _ => {
                affix.push(ch);
                i += 1;
            }
        }
    }
    flush(&mut affix, &mut parts);

    if !parts.iter().any(|p| p.gloss_type.is_stem_boundary()) {
        let at = usize::from(parts.first().is_some_and(|p| p.gloss_type == GlossType::StartWithSelf));
        parts.insert(at, FlexPart::marker(GlossType::Stem));
    }
    Ok(parts)
}

/// Hand `|`-separated gloss slices to the affix-like parts in order.
fn assign_glosses(parts: &mut Vec<FlexPart>, gloss: &str) {
    let mut slices = gloss.split('|').filter(|_| !gloss.is_empty());
    let mut glossable = false;
    for part in parts.iter_mut().filter(|p| p.gloss_type.takes_gloss()) {
        glossable = true;
        match slices.next() {
            Some(slice) => part.gloss = slice.to_string(),
            None if part.surface.is_empty() => {
                part.gloss_type = GlossType::Empty;
                part.glossed.clear();
            }
            None => {}
        }
    }
    if !glossable && !gloss.is_empty() {
        let at = parts
            .iter()
            .position(|p| p.gloss_type == GlossType::NextFlex)
            .unwrap_or(parts.len());
        let mut empty = FlexPart::affix("", GlossType::Affix);
        empty.gloss = gloss.to_string();
        parts.insert(at, empty);
    }
}
