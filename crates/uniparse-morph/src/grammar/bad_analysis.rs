// Bad-analysis templates

use regex::Regex;
use serde_json::{Map, Value};
use uniparse_core::wordform::Wordform;

use super::GrammarError;
use super::field::Field;

/// Field-level regexes an analysis must all satisfy to conform.
#[derive(Debug, Clone, Default)]
pub struct Template {
    pub fields: Vec<(Field, Regex)>,
}

impl Template {
    /// Regexes are anchored at both ends.
    pub fn from_json(object: &Map<String, Value>) -> Result<Self, GrammarError> {
        let mut fields = Vec::new();
        for (name, value) in object {
            let Value::String(pattern) = value else {
                continue;
            };
            let anchored = format!("^{}$", pattern.trim_matches(|c| c == '^' || c == '$'));
            let regex = Regex::new(&anchored).map_err(|source| GrammarError::InvalidRegex {
                pattern: pattern.clone(),
                context: "bad analyses".to_string(),
                source,
            })?;
            fields.push((Field::parse(name), regex));
        }
        Ok(Self { fields })
    }

    pub fn conforms(&self, wordform: &Wordform) -> bool {
        self.fields.iter().all(|(field, regex)| match field.wordform_value(wordform) {
            Some(value) => regex.is_match(value),
            None => wordform.other(field.name()).any(|v| regex.is_match(v)),
        })
    }
}

/// Unconditional templates and `remove`/`if_exists` pairs.
#[derive(Debug, Clone, Default)]
pub struct BadAnalyses {
    pub unconditional: Vec<Template>,
    pub conditional: Vec<(Template, Template)>,
}

impl BadAnalyses {
    /// Load templates from a JSON array.
    ///
    /// Broken entries are skipped and reported; only malformed JSON fails
    /// the whole load.
    pub fn from_json(text: &str) -> Result<(Self, Vec<GrammarError>), GrammarError> {
        let value: Value = serde_json::from_str(text).map_err(|source| GrammarError::Json {
            what: "bad analyses",
            source,
        })?;
        Ok(Self::from_value(&value))
    }

    /// Same as [`BadAnalyses::from_json`] for an already parsed document.
    pub fn from_value(value: &Value) -> (Self, Vec<GrammarError>) {
        let mut out = Self::default();
        let mut diagnostics = Vec::new();
        let Value::Array(items) = value else {
            return (out, diagnostics);
        };
        for item in items {
            let Value::Object(object) = item else {
                continue;
            };
            let loaded = match (object.get("remove"), object.get("if_exists")) {
                (Some(Value::Object(remove)), Some(Value::Object(if_exists))) => {
                    Template::from_json(remove).and_then(|r| {
                        Template::from_json(if_exists).map(|e| out.conditional.push((r, e)))
                    })
                }
                _ => Template::from_json(object).map(|t| out.unconditional.push(t)),
            };
            if let Err(e) = loaded {
                log::warn!("{e}");
                diagnostics.push(e);
            }
        }
        (out, diagnostics)
    }

    /// Append the templates of `other`.
    pub fn extend(&mut self, other: BadAnalyses) {
        self.unconditional.extend(other.unconditional);
        self.conditional.extend(other.conditional);
    }

    pub fn is_empty(&self) -> bool {
        self.unconditional.is_empty() && self.conditional.is_empty()
    }

    /// Whether `analyses[index]` must go, judged against all of its
    /// siblings.
    pub fn is_bad(&self, analyses: &[Wordform], index: usize) -> bool {
        let ana = &analyses[index];
        if self.unconditional.iter().any(|t| t.conforms(ana)) {
            return true;
        }
        self.conditional.iter().any(|(remove, if_exists)| {
            remove.conforms(ana)
                && analyses
                    .iter()
                    .enumerate()
                    .any(|(i, other)| i != index && if_exists.conforms(other))
        })
    }

    /// Decide for every analysis first, then drop the bad ones.
    pub fn filter(&self, analyses: Vec<Wordform>) -> Vec<Wordform> {
        if self.is_empty() {
            return analyses;
        }
        let bad: Vec<bool> = (0..analyses.len()).map(|i| self.is_bad(&analyses, i)).collect();
        analyses
            .into_iter()
            .zip(bad)
            .filter_map(|(ana, bad)| (!bad).then_some(ana))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana(lemma: &str, gramm: &str) -> Wordform {
        Wordform {
            wf: "x".into(),
            lemma: lemma.into(),
            gramm: gramm.into(),
            ..Wordform::default()
        }
    }

    const TEMPLATES: &str = r#"[
        {"lex": "bad"},
        {"remove": {"gramm": "N,.*"}, "if_exists": {"gramm": "V,.*"}}
    ]"#;

    #[test]
    fn unconditional_templates_are_anchored() {
        let (bad, diagnostics) = BadAnalyses::from_json(TEMPLATES).unwrap();
        assert!(diagnostics.is_empty());
        let anas = vec![ana("bad", "N"), ana("badly", "ADV")];
        assert_eq!(bad.filter(anas), vec![ana("badly", "ADV")]);
    }

    #[test]
    fn conditional_removal_needs_a_sibling() {
        let (bad, _) = BadAnalyses::from_json(TEMPLATES).unwrap();
        let both = vec![ana("a", "N,sg"), ana("b", "V,prs")];
        assert_eq!(bad.filter(both), vec![ana("b", "V,prs")]);
        let alone = vec![ana("a", "N,sg")];
        assert_eq!(bad.filter(alone.clone()), alone);
    }

    #[test]
    fn mutual_removal_is_decided_on_the_full_set() {
        let json = r#"[
            {"remove": {"lex": "a"}, "if_exists": {"lex": "b"}},
            {"remove": {"lex": "b"}, "if_exists": {"lex": "a"}}
        ]"#;
        let (bad, _) = BadAnalyses::from_json(json).unwrap();
        assert!(bad.filter(vec![ana("a", ""), ana("b", "")]).is_empty());
    }

    #[test]
    fn broken_regex_is_reported_and_skipped() {
        let (bad, diagnostics) = BadAnalyses::from_json(r#"[{"lex": "("}, {"lex": "x"}]"#).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(bad.unconditional.len(), 1);
        assert!(BadAnalyses::from_json("{").is_err());
    }
}
