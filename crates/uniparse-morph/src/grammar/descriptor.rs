// Raw grammar descriptors consumed by the compiler

use serde::{Deserialize, Deserializer, Serialize};
use uniparse_core::enums::{CliticSide, Position};

use super::lex_rule::RuleMode;

fn default_true() -> bool {
    true
}

/// Accept either a single string or a list of strings.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDescriptor {
    pub field: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InflexionDescriptor {
    pub flex: String,
    #[serde(default)]
    pub gramm: String,
    #[serde(default)]
    pub gloss: String,
    #[serde(default)]
    pub stem_num: Option<Vec<usize>>,
    #[serde(default)]
    pub tests: Vec<TestDescriptor>,
    #[serde(default)]
    pub lemma_changer: Option<Box<InflexionDescriptor>>,
    #[serde(default)]
    pub position: Position,
    /// Paradigms filling `<.>`.
    #[serde(default, deserialize_with = "one_or_many")]
    pub paradigms: Vec<String>,
    #[serde(default)]
    pub replace_grammar: bool,
    #[serde(default = "default_true")]
    pub keep_other_data: bool,
}

impl InflexionDescriptor {
    pub fn new(flex: impl Into<String>, gramm: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            flex: flex.into(),
            gramm: gramm.into(),
            gloss: gloss.into(),
            stem_num: None,
            tests: Vec::new(),
            lemma_changer: None,
            position: Position::Both,
            paradigms: Vec::new(),
            replace_grammar: false,
            keep_other_data: true,
        }
    }
}

/// Link from a paradigm to a derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivLinkDescriptor {
    pub derivation: String,
    #[serde(default)]
    pub recurs_class: u32,
    /// Overrides the derivation's target paradigms.
    #[serde(default, deserialize_with = "one_or_many")]
    pub paradigms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParadigmDescriptor {
    pub name: String,
    #[serde(default)]
    pub inflexions: Vec<InflexionDescriptor>,
    #[serde(default)]
    pub derivations: Vec<DerivLinkDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationDescriptor {
    pub name: String,
    #[serde(default)]
    pub inflexions: Vec<InflexionDescriptor>,
    /// Paradigms the derived stem inflects in; defaults to the source.
    #[serde(default, deserialize_with = "one_or_many")]
    pub paradigms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncorporationDescriptor {
    pub stem: String,
    #[serde(default)]
    pub gramm: Option<String>,
    #[serde(default)]
    pub gloss: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexemeDescriptor {
    pub lemma: String,
    /// Slots separated by `//`, variants by `|`.
    pub stem: String,
    #[serde(alias = "paradigm", deserialize_with = "one_or_many")]
    pub paradigms: Vec<String>,
    #[serde(default)]
    pub gramm: String,
    #[serde(default)]
    pub gloss: String,
    #[serde(default)]
    pub other_data: Vec<(String, String)>,
    #[serde(default)]
    pub stem_conversion: Option<String>,
    #[serde(default)]
    pub no_incorporation: bool,
    #[serde(default)]
    pub incorporation: Option<IncorporationDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliticDescriptor {
    pub stem: String,
    pub side: CliticSide,
    #[serde(default)]
    pub lemma: String,
    #[serde(default)]
    pub gramm: String,
    #[serde(default)]
    pub gloss: String,
    #[serde(default)]
    pub other_data: Vec<(String, String)>,
    #[serde(default)]
    pub host_regex: Vec<String>,
    #[serde(default)]
    pub tests: Vec<TestDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceDescriptor {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStemDescriptor {
    pub stem: usize,
    pub replace: Vec<ReplaceDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemConversionDescriptor {
    pub name: String,
    pub base: usize,
    pub new_stems: Vec<NewStemDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexRuleDescriptor {
    #[serde(default)]
    pub lemma: Option<String>,
    #[serde(default)]
    pub stem: Option<String>,
    #[serde(default)]
    pub tests: Vec<TestDescriptor>,
    #[serde(default)]
    pub new_lemma: Option<String>,
    #[serde(default)]
    pub gramm: String,
    #[serde(default)]
    pub gloss: Option<String>,
    #[serde(default)]
    pub other_data: Vec<(String, String)>,
    #[serde(default)]
    pub mode: RuleMode,
}

/// A whole grammar in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarDescriptor {
    pub stem_conversions: Vec<StemConversionDescriptor>,
    pub paradigms: Vec<ParadigmDescriptor>,
    pub derivations: Vec<DerivationDescriptor>,
    pub lexemes: Vec<LexemeDescriptor>,
    pub clitics: Vec<CliticDescriptor>,
    pub lex_rules: Vec<LexRuleDescriptor>,
    /// Same format as a stand-alone bad analyses file.
    pub bad_analyses: Option<serde_json::Value>,
    pub categories: Option<serde_json::Value>,
}
