// Grammar compiler: descriptors in, frozen Grammar out.
//
// Compilation order:
// 1. stem conversions by name
// 2. paradigm arena, subsequent paradigm names resolved to handles
// 3. derivation graph expansion (see derivation.rs)
// 4. widening of continuation inflexions under the compile budget
// 5. lexemes and their sub-lexemes
// 6. clitics, lexical rules and bad-analysis templates
//
// Definition errors become diagnostics and the offending entity is skipped.
// Only malformed JSON and allocation failure end a load call.

use std::time::Instant;

use hashbrown::HashMap;
use regex::Regex;
use serde_json::Value;
use uniparse_core::character::stem_surface;

use super::bad_analysis::BadAnalyses;
use super::clitic::Clitic;
use super::derivation::expand_derivations;
use super::descriptor::{
    CliticDescriptor, DerivationDescriptor, GrammarDescriptor, InflexionDescriptor,
    LexRuleDescriptor, LexemeDescriptor, ParadigmDescriptor, StemConversionDescriptor,
    TestDescriptor,
};
use super::field::RegexTest;
use super::inflexion::Inflexion;
use super::lex_rule::LexRule;
use super::lexeme::{IncorporationForm, Lexeme, SubLexeme, merge_slots, split_stem_slots, stem_pattern};
use super::paradigm::Paradigm;
use super::stem_conversion::{Replacement, StemConversion};
use super::{Grammar, GrammarConfig, GrammarError, ParadigmId};

/// Non-fatal errors collected during a load or a compile.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    errors: Vec<GrammarError>,
}

impl Diagnostics {
    pub(crate) fn report(&mut self, error: GrammarError) {
        log::warn!("grammar: {error}");
        self.errors.push(error);
    }

    /// Record errors that were already logged where they were found.
    fn extend_logged(&mut self, errors: Vec<GrammarError>) {
        self.errors.extend(errors);
    }
}

/// Output of [`GrammarBuilder::compile`].
#[derive(Debug)]
pub struct CompiledGrammar {
    pub grammar: Grammar,
    /// Every skipped entity, in discovery order.
    pub diagnostics: Vec<GrammarError>,
}

/// Collects raw descriptors until [`GrammarBuilder::compile`] freezes them.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    config: GrammarConfig,
    stem_conversions: Vec<StemConversionDescriptor>,
    paradigms: Vec<ParadigmDescriptor>,
    derivations: Vec<DerivationDescriptor>,
    lexemes: Vec<LexemeDescriptor>,
    clitics: Vec<CliticDescriptor>,
    lex_rules: Vec<LexRuleDescriptor>,
    bad_analyses: BadAnalyses,
    categories: HashMap<String, String>,
    diagnostics: Diagnostics,
}

/// Append `items` to `target`, or leave `target` as it was when memory runs
/// out.
fn extend_checked<T>(
    target: &mut Vec<T>,
    items: impl IntoIterator<Item = T>,
    what: &'static str,
) -> Result<usize, GrammarError> {
    let before = target.len();
    let items = items.into_iter();
    let oom = |target: &mut Vec<T>| {
        target.truncate(before);
        GrammarError::OutOfMemory { what }
    };
    if target.try_reserve(items.size_hint().0).is_err() {
        return Err(oom(target));
    }
    for item in items {
        if target.try_reserve(1).is_err() {
            return Err(oom(target));
        }
        target.push(item);
    }
    Ok(target.len() - before)
}

impl GrammarBuilder {
    pub fn new(config: GrammarConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Builder preloaded with a whole grammar document.
    pub fn from_json(text: &str, config: GrammarConfig) -> Result<Self, GrammarError> {
        let descriptor: GrammarDescriptor =
            serde_json::from_str(text).map_err(|source| GrammarError::Json {
                what: "grammar",
                source,
            })?;
        let mut builder = Self::new(config);
        builder.add_descriptor(descriptor)?;
        Ok(builder)
    }

    pub fn add_descriptor(&mut self, descriptor: GrammarDescriptor) -> Result<(), GrammarError> {
        self.add_stem_conversions(descriptor.stem_conversions)?;
        self.add_paradigms(descriptor.paradigms)?;
        self.add_derivations(descriptor.derivations)?;
        self.add_lexemes(descriptor.lexemes)?;
        self.add_clitics(descriptor.clitics)?;
        self.add_lex_rules(descriptor.lex_rules)?;
        if let Some(value) = &descriptor.bad_analyses {
            let (templates, errors) = BadAnalyses::from_value(value);
            self.bad_analyses.extend(templates);
            self.diagnostics.extend_logged(errors);
        }
        if let Some(value) = &descriptor.categories {
            self.add_categories(value);
        }
        Ok(())
    }

    pub fn add_stem_conversions(
        &mut self,
        items: impl IntoIterator<Item = StemConversionDescriptor>,
    ) -> Result<usize, GrammarError> {
        extend_checked(&mut self.stem_conversions, items, "stem conversions")
    }

    pub fn add_paradigms(
        &mut self,
        items: impl IntoIterator<Item = ParadigmDescriptor>,
    ) -> Result<usize, GrammarError> {
        extend_checked(&mut self.paradigms, items, "paradigms")
    }

    pub fn add_derivations(
        &mut self,
        items: impl IntoIterator<Item = DerivationDescriptor>,
    ) -> Result<usize, GrammarError> {
        extend_checked(&mut self.derivations, items, "derivations")
    }

    pub fn add_lexemes(
        &mut self,
        items: impl IntoIterator<Item = LexemeDescriptor>,
    ) -> Result<usize, GrammarError> {
        extend_checked(&mut self.lexemes, items, "lexemes")
    }

    pub fn add_clitics(
        &mut self,
        items: impl IntoIterator<Item = CliticDescriptor>,
    ) -> Result<usize, GrammarError> {
        extend_checked(&mut self.clitics, items, "clitics")
    }

    pub fn add_lex_rules(
        &mut self,
        items: impl IntoIterator<Item = LexRuleDescriptor>,
    ) -> Result<usize, GrammarError> {
        extend_checked(&mut self.lex_rules, items, "lexical rules")
    }

    /// Append bad-analysis templates from a JSON array. Returns the number of
    /// templates loaded.
    pub fn load_bad_analyses_json(&mut self, text: &str) -> Result<usize, GrammarError> {
        let (templates, errors) = BadAnalyses::from_json(text)?;
        let loaded = templates.unconditional.len() + templates.conditional.len();
        self.bad_analyses.extend(templates);
        self.diagnostics.extend_logged(errors);
        Ok(loaded)
    }

    /// Load tag categories from a JSON object.
    ///
    /// Both `{"tag": "category"}` and `{"category": ["tag", ...]}` entries
    /// are accepted.
    pub fn load_categories_json(&mut self, text: &str) -> Result<usize, GrammarError> {
        let value: Value = serde_json::from_str(text).map_err(|source| GrammarError::Json {
            what: "categories",
            source,
        })?;
        Ok(self.add_categories(&value))
    }

    fn add_categories(&mut self, value: &Value) -> usize {
        let before = self.categories.len();
        let Value::Object(map) = value else {
            return 0;
        };
        for (key, value) in map {
            match value {
                Value::String(category) => {
                    self.categories.insert(key.clone(), category.clone());
                }
                Value::Array(tags) => {
                    for tag in tags.iter().filter_map(Value::as_str) {
                        self.categories.insert(tag.to_string(), key.clone());
                    }
                }
                _ => {}
            }
        }
        self.categories.len() - before
    }

    /// Freeze everything collected so far.
    pub fn compile(self) -> Result<CompiledGrammar, GrammarError> {
        let GrammarBuilder {
            config,
            stem_conversions,
            paradigms,
            derivations,
            lexemes,
            clitics,
            lex_rules,
            bad_analyses,
            categories,
            mut diagnostics,
        } = self;
        let started = Instant::now();
        let mut grammar = Grammar::empty(config);

        for desc in &stem_conversions {
            match compile_stem_conversion(desc) {
                Ok(conversion) => {
                    grammar.stem_conversions.insert(desc.name.clone(), conversion);
                }
                Err(e) => diagnostics.report(e),
            }
        }

        let mut sources: Vec<&ParadigmDescriptor> = Vec::with_capacity(paradigms.len());
        for desc in &paradigms {
            if grammar.paradigm_names.contains_key(&desc.name) {
                diagnostics.report(GrammarError::DuplicateParadigm(desc.name.clone()));
                continue;
            }
            let id = grammar
                .paradigms
                .try_alloc(Paradigm::new(desc.name.clone()))
                .map_err(|_| GrammarError::OutOfMemory { what: "paradigms" })?;
            grammar.paradigm_names.insert(desc.name.clone(), id);
            sources.push(desc);
        }
        for desc in &sources {
            let mut inflexions = Vec::with_capacity(desc.inflexions.len());
            for infl in &desc.inflexions {
                match compile_inflexion(infl, &grammar.paradigm_names, &desc.name) {
                    Ok(compiled) => inflexions.push(compiled),
                    Err(e) => diagnostics.report(e),
                }
            }
            if let Some(p) = grammar.paradigm_id(&desc.name).and_then(|id| grammar.paradigms.get_mut(id)) {
                p.inflexions = inflexions;
            }
        }

        let forks = expand_derivations(&mut grammar, &sources, &derivations, &mut diagnostics)?;
        let widened = widen(&mut grammar);

        for desc in &lexemes {
            compile_lexeme(&mut grammar, desc, &mut diagnostics)?;
        }

        for desc in &clitics {
            match compile_clitic(desc) {
                Ok(clitic) => grammar.clitics.push(clitic),
                Err(e) => diagnostics.report(e),
            }
        }

        for desc in &lex_rules {
            let rule = match compile_lex_rule(desc) {
                Ok(rule) => rule,
                Err(e) => {
                    diagnostics.report(e);
                    continue;
                }
            };
            let (index, key) = match (&rule.stem, &rule.lemma) {
                (Some(stem), _) => (&mut grammar.lex_rules_by_stem, stem.clone()),
                (None, Some(lemma)) => (&mut grammar.lex_rules_by_lemma, lemma.clone()),
                (None, None) => continue,
            };
            index.entry(key).or_default().push(rule);
        }

        grammar.bad_analyses = bad_analyses;
        grammar.categories = categories;

        log::debug!(
            "compiled {} paradigms ({forks} derivation forks, {widened} widened inflexions) and {} lexemes in {:?}",
            grammar.paradigm_count(),
            grammar.lexeme_count(),
            started.elapsed()
        );
        Ok(CompiledGrammar {
            grammar,
            diagnostics: diagnostics.errors,
        })
    }
}

fn compile_tests(tests: &[TestDescriptor], context: &str) -> Result<Vec<RegexTest>, GrammarError> {
    tests
        .iter()
        .map(|t| {
            RegexTest::new(&t.field, &t.pattern).map_err(|source| GrammarError::InvalidRegex {
                pattern: t.pattern.clone(),
                context: context.to_string(),
                source,
            })
        })
        .collect()
}

/// Compile one inflexion descriptor of `paradigm`.
pub(crate) fn compile_inflexion(
    desc: &InflexionDescriptor,
    names: &HashMap<String, ParadigmId>,
    paradigm: &str,
) -> Result<Inflexion, GrammarError> {
    let mut infl = Inflexion::new(&desc.flex, &desc.gloss, &desc.gramm)?;
    infl.stem_num = desc.stem_num.as_ref().map(|nums| nums.iter().copied().collect());
    infl.tests = compile_tests(&desc.tests, &format!("inflexion {:?} of {paradigm}", desc.flex))?;
    if let Some(changer) = &desc.lemma_changer {
        infl.lemma_changer = Some(Box::new(compile_inflexion(changer, names, paradigm)?));
    }
    infl.position = desc.position;
    infl.replace_grammar = desc.replace_grammar;
    infl.keep_other_data = desc.keep_other_data;
    for name in &desc.paradigms {
        let id = names.get(name).ok_or_else(|| GrammarError::UnknownParadigm {
            name: name.clone(),
            context: format!("inflexion {:?} of {paradigm}", desc.flex),
        })?;
        infl.subsequent.push(*id);
    }
    if infl.has_next_flex() && infl.subsequent.is_empty() {
        return Err(GrammarError::MissingSubsequent {
            flex: desc.flex.clone(),
            paradigm: paradigm.to_string(),
        });
    }
    Ok(infl)
}

fn compile_stem_conversion(desc: &StemConversionDescriptor) -> Result<StemConversion, GrammarError> {
    let mut targets = Vec::with_capacity(desc.new_stems.len());
    for new_stem in &desc.new_stems {
        let replacements = new_stem
            .replace
            .iter()
            .map(|r| {
                Regex::new(&r.from)
                    .map(|pattern| Replacement {
                        pattern,
                        with: r.to.clone(),
                    })
                    .map_err(|source| GrammarError::InvalidRegex {
                        pattern: r.from.clone(),
                        context: format!("stem conversion {:?}", desc.name),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        targets.push((new_stem.stem, replacements));
    }
    Ok(StemConversion {
        name: desc.name.clone(),
        base: desc.base,
        targets,
    })
}

// ============================================================================
// Widening
// ============================================================================

/// Pre-join continuation inflexions with the inflexions of their subsequent
/// paradigms, so the engine needs one level fewer.
///
/// Under `partial_compile` only inflexions with less than `min_flex_length`
/// surface characters are widened. Widening stops once `max_compile_time`
/// has passed; the paradigms left alone are still correct.
fn widen(grammar: &mut Grammar) -> usize {
    let deadline = Instant::now().checked_add(grammar.config.max_compile_time);
    let ids: Vec<ParadigmId> = grammar
        .paradigms
        .iter()
        .filter(|(_, p)| !p.is_derivational())
        .map(|(id, _)| id)
        .collect();
    let mut widened = 0;
    for id in ids {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            log::warn!(
                "paradigm widening stopped after {:?}",
                grammar.config.max_compile_time
            );
            break;
        }
        let Some(paradigm) = grammar.paradigm(id) else {
            continue;
        };
        let mut inflexions = Vec::with_capacity(paradigm.inflexions.len());
        let mut changed = false;
        for infl in &paradigm.inflexions {
            match widen_inflexion(grammar, infl) {
                Some(joined) => {
                    inflexions.extend(joined);
                    changed = true;
                    widened += 1;
                }
                None => inflexions.push(infl.clone()),
            }
        }
        if changed {
            if let Some(p) = grammar.paradigms.get_mut(id) {
                p.inflexions = inflexions;
            }
        }
    }
    widened
}

fn widen_inflexion(grammar: &Grammar, infl: &Inflexion) -> Option<Vec<Inflexion>> {
    let config = &grammar.config;
    if infl.next_flex_count() != 1 || infl.is_transparent() || infl.start_with_self {
        return None;
    }
    if config.partial_compile && infl.literal_len() >= config.min_flex_length {
        return None;
    }
    let mut joined = Vec::new();
    for &id in &infl.subsequent {
        let paradigm = grammar.paradigm(id)?;
        if paradigm.is_derivational() {
            return None;
        }
        for child in &paradigm.inflexions {
            if child.is_transparent() || child.has_next_flex() || child.start_with_self {
                return None;
            }
            let mut merged = infl.clone();
            if merged.join(child) {
                joined.push(merged);
            }
        }
    }
    Some(joined)
}

// ============================================================================
// Lexemes, clitics, lexical rules
// ============================================================================

fn compile_lexeme(
    grammar: &mut Grammar,
    desc: &LexemeDescriptor,
    diagnostics: &mut Diagnostics,
) -> Result<(), GrammarError> {
    let mut slots = split_stem_slots(&desc.stem);
    if slots.iter().all(Vec::is_empty) {
        diagnostics.report(GrammarError::EmptyStem {
            lemma: desc.lemma.clone(),
        });
        return Ok(());
    }
    if let Some(name) = &desc.stem_conversion {
        match grammar.stem_conversions.get(name) {
            Some(conversion) => conversion.convert(&mut slots),
            None => diagnostics.report(GrammarError::UnknownStemConversion {
                name: name.clone(),
                lemma: desc.lemma.clone(),
            }),
        }
    }
    let num_stems = slots.len();

    let mut paradigms = Vec::with_capacity(desc.paradigms.len());
    for name in &desc.paradigms {
        match grammar.paradigm_id(name) {
            Some(id) => paradigms.push(id),
            None => diagnostics.report(GrammarError::UnknownParadigm {
                name: name.clone(),
                context: format!("lexeme {:?}", desc.lemma),
            }),
        }
    }
    if paradigms.is_empty() {
        if desc.paradigms.is_empty() {
            diagnostics.report(GrammarError::NoParadigm {
                lemma: desc.lemma.clone(),
            });
        }
        return Ok(());
    }

    if num_stems > 1 {
        for &id in &paradigms {
            let Some(paradigm) = grammar.paradigm(id) else {
                continue;
            };
            for infl in &paradigm.inflexions {
                let out_of_range = infl
                    .stem_num
                    .as_ref()
                    .and_then(|nums| nums.iter().copied().find(|&n| n >= num_stems));
                if let Some(num) = out_of_range {
                    diagnostics.report(GrammarError::StemNumberOutOfRange {
                        lemma: desc.lemma.clone(),
                        flex: infl.flex.clone(),
                        num,
                        num_stems,
                    });
                }
            }
        }
    }

    let variants = merge_slots(&slots);
    let incorporation = |stem: &str| -> Option<IncorporationForm> {
        if desc.no_incorporation {
            return None;
        }
        let form = match &desc.incorporation {
            Some(inc) => IncorporationForm {
                stem: inc.stem.clone(),
                gramm: inc.gramm.clone().unwrap_or_else(|| desc.gramm.clone()),
                gloss: inc.gloss.clone().unwrap_or_else(|| desc.gloss.clone()),
            },
            None => IncorporationForm {
                stem: stem_surface(stem),
                gramm: desc.gramm.clone(),
                gloss: desc.gloss.clone(),
            },
        };
        (!form.stem.is_empty()).then_some(form)
    };

    grammar
        .lexemes
        .try_alloc_with(|lexeme| Lexeme {
            lemma: desc.lemma.clone(),
            subs: variants
                .iter()
                .flat_map(|(stem, nums)| {
                    paradigms.iter().map(move |&paradigm| (stem, nums, paradigm))
                })
                .map(|(stem, nums, paradigm)| SubLexeme {
                    lexeme,
                    stem: stem.clone(),
                    pattern: stem_pattern(stem),
                    paradigm,
                    stem_nums: nums.clone(),
                    gloss: desc.gloss.clone(),
                    gramm: desc.gramm.clone(),
                    no_incorporation: desc.no_incorporation,
                    incorporation: incorporation(stem),
                })
                .collect(),
            other_data: desc.other_data.clone(),
            num_stems,
        })
        .map_err(|_| GrammarError::OutOfMemory { what: "lexemes" })?;
    Ok(())
}

fn compile_clitic(desc: &CliticDescriptor) -> Result<Clitic, GrammarError> {
    let context = format!("clitic {:?}", desc.stem);
    let host_tests = desc
        .host_regex
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| GrammarError::InvalidRegex {
                pattern: pattern.clone(),
                context: context.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Clitic {
        stem: desc.stem.clone(),
        side: desc.side,
        lemma: desc.lemma.clone(),
        gramm: desc.gramm.clone(),
        gloss: desc.gloss.clone(),
        other_data: desc.other_data.clone(),
        host_tests,
        tests: compile_tests(&desc.tests, &context)?,
    })
}

fn compile_lex_rule(desc: &LexRuleDescriptor) -> Result<LexRule, GrammarError> {
    if desc.lemma.is_none() && desc.stem.is_none() {
        return Err(GrammarError::LexRuleWithoutTrigger);
    }
    Ok(LexRule {
        lemma: desc.lemma.clone(),
        stem: desc.stem.clone(),
        tests: compile_tests(&desc.tests, "lexical rule")?,
        new_lemma: desc.new_lemma.clone(),
        gramm: desc.gramm.clone(),
        gloss: desc.gloss.clone(),
        other_data: desc.other_data.clone(),
        mode: desc.mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::descriptor::{NewStemDescriptor, ReplaceDescriptor};
    use uniparse_core::enums::GlossType;

    fn lexeme(lemma: &str, stem: &str, paradigm: &str) -> LexemeDescriptor {
        LexemeDescriptor {
            lemma: lemma.into(),
            stem: stem.into(),
            paradigms: vec![paradigm.into()],
            gramm: "N".into(),
            gloss: lemma.to_uppercase(),
            ..LexemeDescriptor::default()
        }
    }

    fn noun_paradigm() -> ParadigmDescriptor {
        ParadigmDescriptor {
            name: "N".into(),
            inflexions: vec![
                InflexionDescriptor::new("", "sg", ""),
                InflexionDescriptor::new("s", "pl", "PL"),
            ],
            derivations: Vec::new(),
        }
    }

    #[test]
    fn bad_definitions_become_diagnostics() {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        let mut broken = noun_paradigm();
        broken.inflexions.push(InflexionDescriptor::new(".<x", "", ""));
        broken.inflexions.push(InflexionDescriptor::new(".<.>", "", ""));
        builder.add_paradigms([broken, noun_paradigm()]).unwrap();
        builder
            .add_lexemes([
                lexeme("test", "test", "N"),
                lexeme("ghost", "ghost", "Missing"),
                lexeme("void", " ", "N"),
            ])
            .unwrap();
        let compiled = builder.compile().unwrap();
        let d = &compiled.diagnostics;
        assert!(d.iter().any(|e| matches!(e, GrammarError::MalformedFlex { .. })));
        assert!(d.iter().any(|e| matches!(e, GrammarError::MissingSubsequent { .. })));
        assert!(d.iter().any(|e| matches!(e, GrammarError::DuplicateParadigm(n) if n == "N")));
        assert!(d.iter().any(|e| matches!(e, GrammarError::UnknownParadigm { name, .. } if name == "Missing")));
        assert!(d.iter().any(|e| matches!(e, GrammarError::EmptyStem { .. })));

        let g = &compiled.grammar;
        assert_eq!(g.lexeme_count(), 1);
        assert_eq!(g.paradigm_by_name("N").unwrap().inflexions.len(), 2);
    }

    #[test]
    fn lexeme_variants_and_stem_conversion() {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        builder
            .add_stem_conversions([StemConversionDescriptor {
                name: "k-ch".into(),
                base: 0,
                new_stems: vec![NewStemDescriptor {
                    stem: 1,
                    replace: vec![ReplaceDescriptor {
                        from: "k\\.$".into(),
                        to: "ch.".into(),
                    }],
                }],
            }])
            .unwrap();
        builder.add_paradigms([noun_paradigm()]).unwrap();
        let mut desc = lexeme("ruka", "ruk.|ruc.", "N");
        desc.stem_conversion = Some("k-ch".into());
        builder.add_lexemes([desc]).unwrap();
        let compiled = builder.compile().unwrap();
        assert!(compiled.diagnostics.is_empty());

        let (_, lex) = compiled.grammar.lexemes().next().unwrap();
        assert_eq!(lex.num_stems, 2);
        let stems: Vec<&str> = lex.subs.iter().map(|s| s.stem.as_str()).collect();
        assert_eq!(stems, vec!["ruk.", "ruc.", "ruch."]);
        assert_eq!(lex.subs[2].stem_nums.iter().copied().collect::<Vec<_>>(), vec![1]);
        let inc = lex.subs[0].incorporation.as_ref().unwrap();
        assert_eq!(inc.stem, "ruk");
    }

    #[test]
    fn stem_number_range_is_checked() {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        let mut para = noun_paradigm();
        let mut infl = InflexionDescriptor::new("i", "obl", "OBL");
        infl.stem_num = Some(vec![3]);
        para.inflexions.push(infl);
        builder.add_paradigms([para]).unwrap();
        builder.add_lexemes([lexeme("ruka", "ruk.//ruc.", "N")]).unwrap();
        let compiled = builder.compile().unwrap();
        assert!(compiled.diagnostics.iter().any(|e| matches!(
            e,
            GrammarError::StemNumberOutOfRange { num: 3, num_stems: 2, .. }
        )));
        assert_eq!(compiled.grammar.lexeme_count(), 1);
    }

    #[test]
    fn widening_joins_empty_continuations() {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        let mut stem_class = ParadigmDescriptor {
            name: "Stem".into(),
            inflexions: vec![InflexionDescriptor::new(".<.>", "", "")],
            derivations: Vec::new(),
        };
        stem_class.inflexions[0].paradigms = vec!["N".into()];
        builder.add_paradigms([stem_class, noun_paradigm()]).unwrap();
        let compiled = builder.compile().unwrap();
        let stem = compiled.grammar.paradigm_by_name("Stem").unwrap();
        assert_eq!(stem.inflexions.len(), 2);
        assert!(stem.inflexions.iter().all(|i| !i.has_next_flex()));
        let plural = &stem.inflexions[1];
        assert_eq!(plural.gramm, "pl");
        assert_eq!(plural.parts.last().map(|p| p.gloss_type), Some(GlossType::Affix));
    }

    #[test]
    fn widening_keeps_long_flexes_under_partial_compile() {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        let mut long = ParadigmDescriptor {
            name: "Long".into(),
            inflexions: vec![InflexionDescriptor::new(".ab<.>", "", "")],
            derivations: Vec::new(),
        };
        long.inflexions[0].paradigms = vec!["N".into()];
        builder.add_paradigms([long, noun_paradigm()]).unwrap();
        let compiled = builder.compile().unwrap();
        let long = compiled.grammar.paradigm_by_name("Long").unwrap();
        assert_eq!(long.inflexions.len(), 1);
        assert!(long.inflexions[0].has_next_flex());
    }

    #[test]
    fn lex_rules_are_indexed_by_stem_first() {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        builder
            .add_lex_rules([
                LexRuleDescriptor {
                    lemma: Some("go".into()),
                    stem: Some("wen.".into()),
                    ..LexRuleDescriptor::default()
                },
                LexRuleDescriptor {
                    lemma: Some("go".into()),
                    ..LexRuleDescriptor::default()
                },
                LexRuleDescriptor::default(),
            ])
            .unwrap();
        let compiled = builder.compile().unwrap();
        assert_eq!(compiled.grammar.lex_rules_for_stem("wen.").len(), 1);
        assert_eq!(compiled.grammar.lex_rules_for_lemma("go").len(), 1);
        assert!(
            compiled
                .diagnostics
                .iter()
                .any(|e| matches!(e, GrammarError::LexRuleWithoutTrigger))
        );
    }

    #[test]
    fn categories_accept_both_shapes() {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        let n = builder
            .load_categories_json(r#"{"sg": "number", "case": ["nom", "gen"], "x": 1}"#)
            .unwrap();
        assert_eq!(n, 3);
        assert!(builder.load_categories_json("[").is_err());
        let g = builder.compile().unwrap().grammar;
        assert_eq!(g.category("gen"), Some("case"));
        assert_eq!(g.category("sg"), Some("number"));
    }
}
