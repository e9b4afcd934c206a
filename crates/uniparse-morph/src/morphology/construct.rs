// Wordform construction: stem and flex interleaving, glossing, lemma change

use std::sync::LazyLock;

use regex::Regex;
use uniparse_core::character::{BOUNDARY, MORPH_BREAK, remove_morph_breaks, replace_morph_breaks};
use uniparse_core::enums::{EMPTY_FLEX_MARK, GlossType};
use uniparse_core::wordform::{LEX_MARKER, Wordform};

use super::state::InflLevel;
use crate::grammar::inflexion::join_tags;
use crate::grammar::{FlexPart, Grammar, Inflexion, Lexeme, SubLexRef, SubLexeme};

static DOUBLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([>~\-])-+").unwrap());
static TRAILING_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+([<~])$").unwrap());

/// Surface, segmentation and gloss of one stem joined with one inflexion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Joined {
    pub wf: String,
    pub wf_glossed: String,
    pub gloss: String,
}

/// Split a stem pattern into boundary and literal chunks.
fn stem_chunks(pattern: &[char]) -> Vec<&[char]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for (i, &ch) in pattern.iter().enumerate() {
        if ch == BOUNDARY {
            if start < i {
                chunks.push(&pattern[start..i]);
            }
            chunks.push(&pattern[i..=i]);
            start = i + 1;
        }
    }
    if start < pattern.len() {
        chunks.push(&pattern[start..]);
    }
    chunks
}

fn tidy(text: &str) -> String {
    let trim = |s: &str| s.trim_matches(|c| c == '-' || c == '~').to_string();
    let text = trim(&DOUBLE_SEPARATOR.replace_all(text, "$1"));
    trim(&TRAILING_SEPARATOR.replace_all(&text, "$1"))
}

/// Interleave stem chunks and flex parts.
///
/// The walk alternates between the stem side and the flex side, switching
/// at every boundary. Affixes met before the first stem chunk are prefixes.
pub fn join_stem_flex(pattern: &[char], stem_gloss: &str, parts: &[FlexPart]) -> Joined {
    let chunks = stem_chunks(pattern);
    let stem_specs: String = parts
        .iter()
        .filter(|p| p.gloss_type == GlossType::StemSpec)
        .map(|p| format!(".{}", p.gloss))
        .collect();

    let mut out = Joined::default();
    let (mut prefixes, mut infixes, mut main) = (String::new(), String::new(), String::new());
    let mut pos = [0usize, 0usize];
    let lens = [chunks.len(), parts.len()];
    let mut side = 0;
    let mut stem_started = false;

    while pos[0] < lens[0] || pos[1] < lens[1] {
        if pos[side] >= lens[side] {
            side = 1 - side;
            continue;
        }
        if side == 0 {
            let chunk = chunks[pos[0]];
            pos[0] += 1;
            if chunk == [BOUNDARY] {
                side = 1;
                continue;
            }
            let text: String = chunk.iter().collect();
            out.wf.push_str(&remove_morph_breaks(&text));
            out.wf_glossed.push_str(&replace_morph_breaks(&text));
            main.push_str(stem_gloss);
            main.push_str(&stem_specs);
            stem_started = true;
            continue;
        }

        let part = &parts[pos[1]];
        pos[1] += 1;
        if part.gloss_type.is_stem_boundary() {
            if pos[1] == 1 && pos[0] != 1 {
                continue;
            }
            side = 0;
            continue;
        }

        out.wf.extend(part.surface.iter());
        let shown = if part.glossed.is_empty() && part.gloss_type != GlossType::Empty {
            EMPTY_FLEX_MARK
        } else {
            part.glossed.as_str()
        };
        match part.gloss_type {
            GlossType::Affix => {
                let gloss = format!("-{}-", part.gloss);
                if stem_started {
                    main.push_str(&gloss);
                } else {
                    prefixes.push_str(&gloss);
                }
                out.wf_glossed.push_str(&format!("-{shown}-"));
            }
            GlossType::Infix => {
                infixes.push_str(&format!("<{}>", part.gloss));
                out.wf_glossed.push_str(&format!("<{shown}>"));
            }
            GlossType::ReduplRight => {
                stem_started = true;
                main.push_str(&format!("-{}~", part.gloss));
                out.wf_glossed.push_str(&format!("-{shown}~"));
            }
            GlossType::ReduplLeft => {
                main.push_str(&format!("~{}-", part.gloss));
                out.wf_glossed.push_str(&format!("~{shown}-"));
            }
            GlossType::StemSpec => out.wf_glossed.push_str(&part.glossed),
            GlossType::Empty => {
                stem_started = true;
                out.wf_glossed.push_str(&part.glossed);
            }
            _ => {}
        }
    }

    out.gloss = tidy(&format!("{prefixes}{infixes}{main}"));
    out.wf_glossed = tidy(&out.wf_glossed);
    out
}

/// Build the wordform of a sub-lexeme with a fully merged inflexion.
///
/// `None` when the inflexion does not fit the sub-lexeme (stem number or
/// regex tests).
pub fn build_wordform(grammar: &Grammar, sub_ref: SubLexRef, infl: &Inflexion) -> Option<Wordform> {
    let lexeme = grammar.lexeme(sub_ref.lexeme)?;
    let sub = lexeme.subs.get(sub_ref.sub as usize)?;
    let joined = fit(lexeme, sub, infl)?;

    let gramm = if infl.replace_grammar {
        infl.gramm.clone()
    } else {
        join_tags(&sub.gramm, &infl.gramm)
    };
    let lemma = match &infl.lemma_changer {
        Some(changer) => changed_lemma(lexeme, changer),
        None => lexeme.lemma.clone(),
    };
    let other_data = if infl.keep_other_data {
        lexeme.other_data.clone()
    } else {
        Vec::new()
    };
    Some(Wordform {
        wf: joined.wf,
        wf_glossed: joined.wf_glossed,
        gloss: joined.gloss,
        lemma,
        gramm,
        stem: sub.stem.clone(),
        other_data,
        subwords: Vec::new(),
    })
}

/// Stem-number and test checks, then the join itself.
fn fit(lexeme: &Lexeme, sub: &SubLexeme, infl: &Inflexion) -> Option<Joined> {
    if let Some(nums) = &infl.stem_num {
        if lexeme.num_stems > 1 {
            if nums.last().is_some_and(|&max| max >= lexeme.num_stems) {
                log::warn!(
                    "inflexion {:?} asks for stem {nums:?} but lexeme {:?} has {} stems",
                    infl.flex,
                    lexeme.lemma,
                    lexeme.num_stems
                );
                return None;
            }
            if nums.is_disjoint(&sub.stem_nums) {
                return None;
            }
        }
    }
    if !infl.tests.iter().all(|t| t.check_sublexeme(sub, lexeme)) {
        return None;
    }

    let pattern: Vec<char> = if infl.start_with_self && sub.pattern.first() != Some(&BOUNDARY) {
        std::iter::once(BOUNDARY).chain(sub.pattern.iter().copied()).collect()
    } else {
        sub.pattern.clone()
    };
    Some(join_stem_flex(&pattern, &sub.gloss, &infl.parts))
}

/// Lemma produced by a lemma changer, or the dictionary lemma.
fn changed_lemma(lexeme: &Lexeme, changer: &Inflexion) -> String {
    let mut subs: Vec<&SubLexeme> = lexeme
        .subs
        .iter()
        .filter(|s| {
            changer
                .stem_num
                .as_ref()
                .is_none_or(|nums| !nums.is_disjoint(&s.stem_nums))
        })
        .collect();
    if subs.is_empty() && lexeme.num_stems == 1 {
        subs = lexeme.subs.iter().collect();
    }
    subs.first()
        .and_then(|sub| fit(lexeme, sub, changer))
        .map_or_else(|| lexeme.lemma.clone(), |joined| joined.wf)
}

/// Fold the level stack into one inflexion, deepest level first.
///
/// Incorporated stems become affix parts and `LEX:` tags of the level that
/// consumed them.
pub(crate) fn merge_levels(grammar: &Grammar, levels: &[InflLevel]) -> Option<Inflexion> {
    let mut merged: Option<Inflexion> = None;
    for level in levels.iter().rev() {
        let mut infl = grammar.inflexion(level.infl)?.clone();
        for inc in &level.incorporations {
            let lexeme = grammar.lexeme(inc.sub.lexeme)?;
            let form = grammar.sublexeme(inc.sub)?.incorporation.as_ref()?;
            let part = infl.parts.get_mut(inc.part)?;
            *part = FlexPart {
                surface: form.stem.chars().filter(|&c| c != MORPH_BREAK).collect(),
                glossed: replace_morph_breaks(&form.stem),
                gloss: form.gloss.clone(),
                gloss_type: GlossType::Affix,
            };
            let marker = format!("{LEX_MARKER}{}:{}", lexeme.lemma, form.gramm.replace(',', ";"));
            infl.gramm = join_tags(&infl.gramm, &marker);
        }
        if let Some(child) = merged.take() {
            if !infl.join(&child) {
                log::debug!("inflexion {:?} has no continuation for {:?}", infl.flex, child.flex);
                return None;
            }
        }
        merged = Some(infl);
    }
    merged
}

/// Every wordform of a sub-lexeme with the simple inflexions of its
/// paradigm.
pub fn generate_wordforms(grammar: &Grammar, sub_ref: SubLexRef) -> Vec<Wordform> {
    let Some(paradigm) = grammar
        .sublexeme(sub_ref)
        .and_then(|sub| grammar.paradigm(sub.paradigm))
    else {
        return Vec::new();
    };
    paradigm
        .inflexions
        .iter()
        .filter(|infl| {
            !infl.is_transparent()
                && !infl.has_next_flex()
                && !infl.parts.iter().any(|p| p.gloss_type == GlossType::Incorporation)
        })
        .filter_map(|infl| build_wordform(grammar, sub_ref, infl))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::descriptor::{InflexionDescriptor, LexemeDescriptor, ParadigmDescriptor};
    use crate::grammar::{GrammarBuilder, GrammarConfig};

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn join(stem: &str, flex: &str, gloss: &str) -> Joined {
        let infl = Inflexion::new(flex, gloss, "").unwrap();
        join_stem_flex(&chars(stem), "STEM", &infl.parts)
    }

    #[test]
    fn suffix() {
        let j = join("test.", ".s", "PL");
        assert_eq!(j.wf, "tests");
        assert_eq!(j.wf_glossed, "test-s");
        assert_eq!(j.gloss, "STEM-PL");
    }

    #[test]
    fn prefix_before_leading_boundary() {
        let j = join(".test.", "ex.", "EX");
        assert_eq!(j.wf, "extest");
        assert_eq!(j.wf_glossed, "ex-test");
        assert_eq!(j.gloss, "EX-STEM");
    }

    #[test]
    fn zero_and_empty_affixes() {
        let j = join("test.", ".0", "SG");
        assert_eq!(j.wf, "test");
        assert_eq!(j.wf_glossed, "test-0");
        assert_eq!(j.gloss, "STEM-SG");

        let j = join("test.", ".", "NOM");
        assert_eq!(j.wf_glossed, "test-∅");
        assert_eq!(j.gloss, "STEM-NOM");
    }

    #[test]
    fn infix_and_breaks() {
        let j = join("t.st", ".<e>.", "INF");
        assert_eq!(j.wf, "test");
        assert_eq!(j.wf_glossed, "t<e>st");
        assert!(j.gloss.starts_with("<INF>"));

        let j = join("hand&book.", ".s", "PL");
        assert_eq!(j.wf, "handbooks");
        assert_eq!(j.wf_glossed, "hand-book-s");
    }

    fn grammar() -> Grammar {
        let mut changer = InflexionDescriptor::new(".a", "", "");
        changer.stem_num = Some(vec![0]);
        let mut obl = InflexionDescriptor::new(".i", "obl", "OBL");
        obl.stem_num = Some(vec![1]);
        obl.lemma_changer = Some(Box::new(changer));
        obl.keep_other_data = false;
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        builder
            .add_paradigms([ParadigmDescriptor {
                name: "N".into(),
                inflexions: vec![InflexionDescriptor::new(".a", "nom", "NOM"), obl],
                derivations: Vec::new(),
            }])
            .unwrap();
        builder
            .add_lexemes([LexemeDescriptor {
                lemma: "kniga".into(),
                stem: "knig.//knizh.".into(),
                paradigms: vec!["N".into()],
                gramm: "N".into(),
                gloss: "book".into(),
                other_data: vec![("trans_en".into(), "book".into())],
                ..LexemeDescriptor::default()
            }])
            .unwrap();
        builder.compile().unwrap().grammar
    }

    fn sub_with_stem(g: &Grammar, stem: &str) -> SubLexRef {
        let (id, lexeme) = g.lexemes().next().unwrap();
        let i = lexeme.subs.iter().position(|s| s.stem == stem).unwrap();
        SubLexRef {
            lexeme: id,
            sub: i as u32,
        }
    }

    #[test]
    fn stem_numbers_select_variants() {
        let g = grammar();
        let n = g.paradigm_by_name("N").unwrap();
        let knig = sub_with_stem(&g, "knig.");
        let knizh = sub_with_stem(&g, "knizh.");
        assert!(build_wordform(&g, knig, &n.inflexions[1]).is_none());
        assert_eq!(build_wordform(&g, knizh, &n.inflexions[0]).unwrap().wf, "knizha");

        let wf = build_wordform(&g, knizh, &n.inflexions[1]).unwrap();
        assert_eq!(wf.wf, "knizhi");
        assert_eq!(wf.gramm, "N,obl");
        assert_eq!(wf.gloss, "book-OBL");
        assert_eq!(wf.lemma, "kniga");
        assert!(wf.other_data.is_empty());
    }

    #[test]
    fn pregeneration_skips_unfit_inflexions() {
        let g = grammar();
        let knig = sub_with_stem(&g, "knig.");
        let forms = generate_wordforms(&g, knig);
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].wf, "kniga");
        assert_eq!(forms[0].other("trans_en").collect::<Vec<_>>(), vec!["book"]);
    }
}
