// Morphological analysis result type and its attribute view

use serde::Serialize;
use serde_json::{Map, Value};

/// Prefix of a tag that describes an incorporated or compounded sub-word.
///
/// The full marker is `LEX:lemma:tag1;tag2`; inner tags are `;`-separated so
/// the marker survives inside a `,`-separated tag string.
pub const LEX_MARKER: &str = "LEX:";

/// Extra lexeme fields printed by default.
pub const DEFAULT_PRINTABLE_FIELDS: &[&str] = &[
    "trans_ru", "trans_en", "trans_de", "lex2", "gramm2", "trans_ru2", "trans_en2", "trans_de2",
    "root",
];

/// A sub-word carried by a complex token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SubWord {
    pub lemma: String,
    pub gramm: String,
}

/// One analysis of a surface token.
///
/// A placeholder wordform (no lemma) stands for a token the grammar could
/// not analyze; only `wf` is filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Wordform {
    /// Surface form.
    pub wf: String,
    /// Surface form segmented into morphemes (`test-s`).
    pub wf_glossed: String,
    /// Gloss aligned with `wf_glossed` (`test-PL`).
    pub gloss: String,
    pub lemma: String,
    /// Comma-separated grammatical tags.
    pub gramm: String,
    pub stem: String,
    /// Extra lexeme fields in grammar order; a field may repeat.
    pub other_data: Vec<(String, String)>,
    pub subwords: Vec<SubWord>,
}

impl Wordform {
    /// Placeholder for an unanalyzed token.
    pub fn placeholder(surface: &str) -> Self {
        Self {
            wf: surface.to_string(),
            ..Self::default()
        }
    }

    /// `false` for placeholders.
    pub fn is_analyzed(&self) -> bool {
        !self.lemma.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.gramm.split(',').filter(|t| !t.is_empty())
    }

    /// Append comma-separated tags.
    pub fn add_tags(&mut self, tags: &str) {
        if tags.is_empty() {
            return;
        }
        if !self.gramm.is_empty() {
            self.gramm.push(',');
        }
        self.gramm.push_str(tags);
    }

    /// Values of an extra field, in grammar order.
    pub fn other(&self, field: &str) -> impl Iterator<Item = &str> {
        self.other_data
            .iter()
            .filter(move |(f, _)| f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Move `LEX:lemma:tags` markers out of the tag string into sub-words.
    pub fn expand_lex_markers(&mut self) {
        if !self.gramm.contains(LEX_MARKER) {
            return;
        }
        let mut kept = Vec::new();
        for tag in self.gramm.split(',') {
            match tag.strip_prefix(LEX_MARKER) {
                Some(rest) => {
                    let (lemma, tags) = rest.split_once(':').unwrap_or((rest, ""));
                    self.subwords.push(SubWord {
                        lemma: lemma.to_string(),
                        gramm: tags.replace(';', ","),
                    });
                }
                None => kept.push(tag),
            }
        }
        let joined = kept.join(",");
        self.gramm = joined;
    }

    /// Attribute view used by every renderer.
    pub fn view(&self, config: &FormatConfig) -> AnalysisView {
        let mut lemma = self.lemma.clone();
        let mut tags: Vec<String> = self.tags().map(str::to_string).collect();
        let mut subwords = Vec::new();
        for sub in &self.subwords {
            if config.flatten_subwords {
                lemma.push('+');
                lemma.push_str(&sub.lemma);
                tags.extend(sub.gramm.split(',').filter(|t| !t.is_empty()).map(str::to_string));
            } else {
                subwords.push(AnalysisView {
                    lemma: sub.lemma.clone(),
                    tags: sub.gramm.split(',').filter(|t| !t.is_empty()).map(str::to_string).collect(),
                    ..AnalysisView::default()
                });
            }
        }

        let (parts, gloss) = if config.glossing && !self.wf_glossed.is_empty() {
            (Some(self.wf_glossed.clone()), Some(self.gloss.clone()))
        } else {
            (None, None)
        };

        let mut extra: Vec<(String, String)> = Vec::new();
        for field in &config.printable_fields {
            let values: Vec<&str> = self.other(field).collect();
            if !values.is_empty() {
                extra.push((field.clone(), values.join("|")));
            }
        }

        AnalysisView {
            lemma,
            tags,
            parts,
            gloss,
            extra,
            subwords,
        }
    }

    /// Render as an `<ana>` element.
    pub fn to_xml(&self, config: &FormatConfig) -> String {
        self.view(config).to_xml()
    }

    pub fn to_json(&self, config: &FormatConfig) -> Value {
        let mut value = self.view(config).to_json();
        if let Value::Object(map) = &mut value {
            map.insert("wf".to_string(), Value::String(self.wf.clone()));
        }
        value
    }
}

// ---------------------------------------------------------------------------
// Output configuration and attribute view
// ---------------------------------------------------------------------------

/// Rendering options passed explicitly to every serialization path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Include the glossed segmentation and gloss.
    pub glossing: bool,
    /// Merge sub-words into the parent's lemma (`+`) and tags (`,`)
    /// instead of nesting them.
    pub flatten_subwords: bool,
    /// Extra lexeme fields to print.
    pub printable_fields: Vec<String>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            glossing: true,
            flatten_subwords: false,
            printable_fields: DEFAULT_PRINTABLE_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Format-neutral attributes of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisView {
    pub lemma: String,
    pub tags: Vec<String>,
    pub parts: Option<String>,
    pub gloss: Option<String>,
    pub extra: Vec<(String, String)>,
    pub subwords: Vec<AnalysisView>,
}

impl AnalysisView {
    pub fn to_xml(&self) -> String {
        let mut out = format!(
            "<ana lex=\"{}\" gr=\"{}\"",
            escape_xml(&self.lemma),
            escape_xml(&self.tags.join(","))
        );
        if let (Some(parts), Some(gloss)) = (&self.parts, &self.gloss) {
            out.push_str(&format!(
                " parts=\"{}\" gloss=\"{}\"",
                escape_xml(parts),
                escape_xml(gloss)
            ));
        }
        for (field, value) in &self.extra {
            out.push_str(&format!(" {}=\"{}\"", field, escape_xml(value)));
        }
        out.push('>');
        for sub in &self.subwords {
            out.push_str(&sub.to_xml());
        }
        out.push_str("</ana>");
        out
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("lemma".to_string(), Value::String(self.lemma.clone()));
        map.insert("gramm".to_string(), Value::String(self.tags.join(",")));
        if let (Some(parts), Some(gloss)) = (&self.parts, &self.gloss) {
            map.insert("wfGlossed".to_string(), Value::String(parts.clone()));
            map.insert("gloss".to_string(), Value::String(gloss.clone()));
        }
        for (field, value) in &self.extra {
            map.insert(field.clone(), Value::String(value.clone()));
        }
        if !self.subwords.is_empty() {
            map.insert(
                "subwords".to_string(),
                Value::Array(self.subwords.iter().map(AnalysisView::to_json).collect()),
            );
        }
        Value::Object(map)
    }
}

/// Render a token with its analyses as a `<w>` element.
///
/// Analyses are sorted and de-duplicated by their rendering; placeholders
/// are omitted.
pub fn token_to_xml(token: &str, analyses: &[Wordform], config: &FormatConfig) -> String {
    let mut rendered: Vec<String> = analyses
        .iter()
        .filter(|wf| wf.is_analyzed())
        .map(|wf| wf.to_xml(config))
        .collect();
    rendered.sort();
    rendered.dedup();
    format!("<w>{}{}</w>", rendered.concat(), escape_xml(token))
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Wordform {
        Wordform {
            wf: "houses".to_string(),
            wf_glossed: "house-s".to_string(),
            gloss: "house-PL".to_string(),
            lemma: "house".to_string(),
            gramm: "N,pl".to_string(),
            stem: "house.".to_string(),
            other_data: vec![
                ("trans_en".to_string(), "house".to_string()),
                ("note".to_string(), "hidden".to_string()),
            ],
            subwords: Vec::new(),
        }
    }

    #[test]
    fn placeholder_has_surface_only() {
        let wf = Wordform::placeholder("xyz");
        assert_eq!(wf.wf, "xyz");
        assert!(!wf.is_analyzed());
        assert_eq!(wf.tags().count(), 0);
    }

    #[test]
    fn add_tags_joins_with_comma() {
        let mut wf = Wordform::default();
        wf.add_tags("N");
        wf.add_tags("");
        wf.add_tags("pl,loc");
        assert_eq!(wf.gramm, "N,pl,loc");
    }

    #[test]
    fn lex_markers_become_subwords() {
        let mut wf = sample();
        wf.gramm = "V,LEX:fish:N;sg,pst".to_string();
        wf.expand_lex_markers();
        assert_eq!(wf.gramm, "V,pst");
        assert_eq!(
            wf.subwords,
            vec![SubWord {
                lemma: "fish".to_string(),
                gramm: "N,sg".to_string()
            }]
        );
    }

    #[test]
    fn flatten_switch_changes_view() {
        let mut wf = sample();
        wf.subwords.push(SubWord {
            lemma: "fish".to_string(),
            gramm: "N".to_string(),
        });

        let nested = wf.view(&FormatConfig::default());
        assert_eq!(nested.lemma, "house");
        assert_eq!(nested.subwords.len(), 1);

        let flat = wf.view(&FormatConfig {
            flatten_subwords: true,
            ..FormatConfig::default()
        });
        assert_eq!(flat.lemma, "house+fish");
        assert_eq!(flat.tags, vec!["N", "pl", "N"]);
        assert!(flat.subwords.is_empty());
    }

    #[test]
    fn xml_contains_printable_fields_only() {
        let xml = sample().to_xml(&FormatConfig::default());
        assert_eq!(
            xml,
            "<ana lex=\"house\" gr=\"N,pl\" parts=\"house-s\" gloss=\"house-PL\" trans_en=\"house\"></ana>"
        );
    }

    #[test]
    fn xml_without_glossing() {
        let config = FormatConfig {
            glossing: false,
            printable_fields: Vec::new(),
            ..FormatConfig::default()
        };
        assert_eq!(sample().to_xml(&config), "<ana lex=\"house\" gr=\"N,pl\"></ana>");
    }

    #[test]
    fn json_view() {
        let json = sample().to_json(&FormatConfig::default());
        assert_eq!(json["lemma"], "house");
        assert_eq!(json["gramm"], "N,pl");
        assert_eq!(json["wfGlossed"], "house-s");
        assert_eq!(json["wf"], "houses");
        assert!(json.get("note").is_none());
    }

    #[test]
    fn token_xml_skips_placeholders_and_duplicates() {
        let config = FormatConfig::default();
        let analyses = vec![sample(), sample(), Wordform::placeholder("houses")];
        let xml = token_to_xml("houses", &analyses, &config);
        assert_eq!(xml.matches("<ana ").count(), 1);
        assert!(xml.ends_with("houses</w>"));
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_xml("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
