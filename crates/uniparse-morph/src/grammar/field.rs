// Testable fields and regex tests over sub-lexemes and wordforms

use regex::Regex;
use uniparse_core::wordform::Wordform;

use super::lexeme::{Lexeme, SubLexeme};

/// Field probed by a regex test or a bad-analysis template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Wf,
    WfGlossed,
    Lemma,
    Gramm,
    Gloss,
    Stem,
    /// Paradigm names cannot be tested; such tests always fail.
    Paradigm,
    /// Extra lexeme field (`trans_en`, ...).
    Other(String),
}

impl Field {
    /// Accepts both grammar spellings (`lex`, `wfGlossed`, `prev`) and the
    /// snake_case names.
    pub fn parse(name: &str) -> Field {
        match name {
            "wf" => Field::Wf,
            "wfGlossed" | "wf_glossed" | "parts" => Field::WfGlossed,
            "lex" | "lemma" => Field::Lemma,
            "gramm" | "gr" => Field::Gramm,
            "gloss" => Field::Gloss,
            "stem" | "prev" => Field::Stem,
            "paradigm" => Field::Paradigm,
            other => Field::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Field::Wf => "wf",
            Field::WfGlossed => "wf_glossed",
            Field::Lemma => "lemma",
            Field::Gramm => "gramm",
            Field::Gloss => "gloss",
            Field::Stem => "stem",
            Field::Paradigm => "paradigm",
            Field::Other(name) => name,
        }
    }

    /// Value of a single-valued wordform field. `None` for extra fields and
    /// paradigms.
    pub fn wordform_value<'a>(&self, wordform: &'a Wordform) -> Option<&'a str> {
        match self {
            Field::Wf => Some(&wordform.wf),
            Field::WfGlossed => Some(&wordform.wf_glossed),
            Field::Lemma => Some(&wordform.lemma),
            Field::Gramm => Some(&wordform.gramm),
            Field::Gloss => Some(&wordform.gloss),
            Field::Stem => Some(&wordform.stem),
            Field::Paradigm | Field::Other(_) => None,
        }
    }
}

/// Searches a field with an unanchored regex.
#[derive(Debug, Clone)]
pub struct RegexTest {
    pub field: Field,
    pub regex: Regex,
}

impl RegexTest {
    pub fn new(field: &str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            field: Field::parse(field),
            regex: Regex::new(pattern)?,
        })
    }

    /// Test a sub-lexeme before an inflexion is attached to it.
    pub fn check_sublexeme(&self, sub: &SubLexeme, lexeme: &Lexeme) -> bool {
        match &self.field {
            Field::Stem => self.regex.is_match(&sub.stem),
            Field::Lemma => self.regex.is_match(&lexeme.lemma),
            Field::Gramm => self.regex.is_match(&sub.gramm),
            Field::Gloss => self.regex.is_match(&sub.gloss),
            Field::Paradigm => {
                log::warn!("paradigm names cannot be subject to regex tests");
                false
            }
            other => all_match(&self.regex, lexeme.other(other.name())),
        }
    }

    /// Test a finished wordform (clitic and lexical rule conditions).
    pub fn check_wordform(&self, wordform: &Wordform) -> bool {
        match self.field.wordform_value(wordform) {
            Some(value) => self.regex.is_match(value),
            None if self.field == Field::Paradigm => false,
            None => all_match(&self.regex, wordform.other(self.field.name())),
        }
    }
}

/// At least one value, and every value matches.
fn all_match<'a>(regex: &Regex, values: impl Iterator<Item = &'a str>) -> bool {
    let mut any = false;
    for value in values {
        if !regex.is_match(value) {
            return false;
        }
        any = true;
    }
    any
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_spellings_map_to_fields() {
        assert_eq!(Field::parse("lex"), Field::Lemma);
        assert_eq!(Field::parse("wfGlossed"), Field::WfGlossed);
        assert_eq!(Field::parse("prev"), Field::Stem);
        assert_eq!(Field::parse("trans_en"), Field::Other("trans_en".into()));
        assert_eq!(Field::parse("trans_en").name(), "trans_en");
    }

    #[test]
    fn wordform_tests() {
        let wordform = Wordform {
            wf: "tests".into(),
            lemma: "test".into(),
            gramm: "N,pl".into(),
            other_data: vec![("trans_en".into(), "test".into())],
            ..Wordform::default()
        };
        assert!(RegexTest::new("gramm", "pl").unwrap().check_wordform(&wordform));
        assert!(!RegexTest::new("lex", "^x").unwrap().check_wordform(&wordform));
        assert!(RegexTest::new("trans_en", "^te").unwrap().check_wordform(&wordform));
        assert!(!RegexTest::new("trans_ru", ".").unwrap().check_wordform(&wordform));
        assert!(!RegexTest::new("paradigm", ".").unwrap().check_wordform(&wordform));
    }
}
