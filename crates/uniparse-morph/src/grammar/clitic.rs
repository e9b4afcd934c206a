// Clitics

use regex::Regex;
use uniparse_core::character::{remove_morph_breaks, replace_morph_breaks};
use uniparse_core::enums::CliticSide;
use uniparse_core::wordform::Wordform;

use super::field::RegexTest;

#[derive(Debug, Clone)]
pub struct Clitic {
    pub stem: String,
    pub side: CliticSide,
    pub lemma: String,
    pub gramm: String,
    pub gloss: String,
    pub other_data: Vec<(String, String)>,
    /// Must all match the remaining host string.
    pub host_tests: Vec<Regex>,
    /// Must all hold for the host's analysis.
    pub tests: Vec<RegexTest>,
}

impl Clitic {
    /// Surface form without morpheme breaks.
    pub fn surface(&self) -> String {
        remove_morph_breaks(&self.stem)
    }

    /// Segmentation shown in the glossed form.
    pub fn glossed(&self) -> String {
        replace_morph_breaks(&self.stem)
    }

    pub fn is_compatible_str(&self, host: &str) -> bool {
        self.host_tests.iter().all(|rx| rx.is_match(host))
    }

    pub fn is_compatible(&self, wordform: &Wordform) -> bool {
        self.tests.iter().all(|t| t.check_wordform(wordform))
    }

    /// Attach to an analysis of the host. The caller sets the surface.
    pub fn attach(&self, wordform: &mut Wordform) {
        if !self.lemma.is_empty() {
            wordform.lemma.push('+');
            wordform.lemma.push_str(&self.lemma);
        }
        wordform.add_tags(&self.gramm);
        wordform.other_data.extend(self.other_data.iter().cloned());
        match self.side {
            CliticSide::Proclitic => {
                wordform.gloss = format!("{}={}", self.gloss, wordform.gloss);
                wordform.wf_glossed = format!("{}={}", self.glossed(), wordform.wf_glossed);
            }
            CliticSide::Enclitic | CliticSide::Other => {
                wordform.gloss = format!("{}={}", wordform.gloss, self.gloss);
                wordform.wf_glossed = format!("{}={}", wordform.wf_glossed, self.glossed());
            }
        }
    }
}
