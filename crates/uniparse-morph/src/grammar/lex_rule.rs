// Lexical rules: lemma- or stem-triggered enrichment of analyses

use serde::{Deserialize, Serialize};
use uniparse_core::wordform::Wordform;

use super::field::RegexTest;

/// What happens to the original analysis when a rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    /// Keep the original next to the rule output.
    #[default]
    Augment,
    /// Drop the original.
    Replace,
}

#[derive(Debug, Clone)]
pub struct LexRule {
    pub lemma: Option<String>,
    pub stem: Option<String>,
    pub tests: Vec<RegexTest>,
    pub new_lemma: Option<String>,
    /// Tags appended to the analysis.
    pub gramm: String,
    pub gloss: Option<String>,
    pub other_data: Vec<(String, String)>,
    pub mode: RuleMode,
}

impl LexRule {
    /// Rule output for `wordform`, or `None` when a test fails.
    pub fn apply(&self, wordform: &Wordform) -> Option<Wordform> {
        if !self.tests.iter().all(|t| t.check_wordform(wordform)) {
            return None;
        }
        let mut out = wordform.clone();
        if let Some(lemma) = &self.new_lemma {
            out.lemma.clone_from(lemma);
        }
        out.add_tags(&self.gramm);
        if let Some(gloss) = &self.gloss {
            out.gloss.clone_from(gloss);
        }
        out.other_data.extend(self.other_data.iter().cloned());
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_enriches_a_copy() {
        let rule = LexRule {
            lemma: Some("go".into()),
            stem: None,
            tests: vec![RegexTest::new("gramm", "past").unwrap()],
            new_lemma: None,
            gramm: "irreg".into(),
            gloss: None,
            other_data: vec![("trans_ru".into(), "идти".into())],
            mode: RuleMode::Augment,
        };
        let wf = Wordform {
            lemma: "go".into(),
            gramm: "V,past".into(),
            ..Wordform::default()
        };
        let out = rule.apply(&wf).unwrap();
        assert_eq!(out.gramm, "V,past,irreg");
        assert_eq!(out.other("trans_ru").collect::<Vec<_>>(), vec!["идти"]);
        assert_eq!(wf.gramm, "V,past");

        let present = Wordform {
            gramm: "V,prs".into(),
            ..wf
        };
        assert!(rule.apply(&present).is_none());
    }
}
