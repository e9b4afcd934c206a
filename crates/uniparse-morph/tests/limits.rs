// Search limits: derivation count, derivation restriction, inflexion
// repetition, empty inflexion depth, clitic wordform tests

use uniparse_core::wordform::Wordform;
use uniparse_morph::{GrammarConfig, Parser, ParserConfig};

/// `ko` takes three derivations; a higher class may precede a lower one.
const DERIVATIONS: &str = r#"{
    "paradigms": [
        {"name": "V", "inflexions": [{"flex": ".", "gramm": "inf"}],
         "derivations": [
            {"derivation": "da", "recurs_class": 0},
            {"derivation": "db", "recurs_class": 1},
            {"derivation": "dc", "recurs_class": 2}
         ]}
    ],
    "derivations": [
        {"name": "da", "inflexions": [{"flex": ".a", "gramm": "da"}]},
        {"name": "db", "inflexions": [{"flex": ".b", "gramm": "db"}]},
        {"name": "dc", "inflexions": [{"flex": ".c", "gramm": "dc"}]}
    ],
    "lexemes": [
        {"lemma": "ko", "stem": "ko.", "paradigm": "V", "gramm": "V", "gloss": "do"}
    ]
}"#;

/// `.er<.>` continues into its own paradigm.
const REPEATS: &str = r#"{
    "paradigms": [
        {"name": "A", "inflexions": [
            {"flex": ".", "gramm": "pos"},
            {"flex": ".er<.>", "gramm": "cmp", "gloss": "CMP", "paradigms": "A"}
        ]}
    ],
    "lexemes": [
        {"lemma": "tall", "stem": "tall.", "paradigm": "A", "gramm": "A", "gloss": "tall"}
    ]
}"#;

/// Chains of surface-less continuation inflexions in front of `.s`.
const EMPTY_CHAIN: &str = r#"{
    "paradigms": [
        {"name": "Z3", "inflexions": [{"flex": ".<.>", "gramm": "z3", "paradigms": "Z2"}]},
        {"name": "Z2", "inflexions": [{"flex": ".<.>", "gramm": "z2", "paradigms": "Z1"}]},
        {"name": "Z1", "inflexions": [{"flex": ".<.>", "gramm": "z1", "paradigms": "F"}]},
        {"name": "F", "inflexions": [{"flex": ".s", "gramm": "pl", "gloss": "PL"}]}
    ],
    "lexemes": [
        {"lemma": "cat", "stem": "cat.", "paradigm": "Z2", "gramm": "N", "gloss": "cat"},
        {"lemma": "dog", "stem": "dog.", "paradigm": "Z3", "gramm": "N", "gloss": "dog"}
    ]
}"#;

const CLITIC_TESTS: &str = r#"{
    "paradigms": [
        {"name": "N", "inflexions": [{"flex": ".", "gramm": "nom"}]},
        {"name": "V", "inflexions": [{"flex": ".", "gramm": "inf"}]}
    ],
    "lexemes": [
        {"lemma": "house", "stem": "house.", "paradigm": "N", "gramm": "N", "gloss": "house"},
        {"lemma": "walk", "stem": "walk.", "paradigm": "V", "gramm": "V", "gloss": "walk"}
    ],
    "clitics": [
        {"stem": "ka", "side": "enclitic", "gramm": "FOC", "gloss": "FOC",
         "tests": [{"field": "gramm", "pattern": "^V"}]}
    ]
}"#;

fn parser(json: &str, grammar: GrammarConfig, config: ParserConfig) -> Parser {
    let (parser, diagnostics) = Parser::from_json(json, grammar, config).unwrap();
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    parser
}

fn analyzed(p: &Parser, token: &str) -> Vec<Wordform> {
    p.parse(token, 0).into_iter().filter(Wordform::is_analyzed).collect()
}

fn has_tags(ana: &Wordform, tags: &[&str]) -> bool {
    tags.iter().all(|t| ana.tags().any(|own| own == *t))
}

#[test]
fn derivation_count_is_capped() {
    let two = parser(DERIVATIONS, GrammarConfig::default(), ParserConfig::default());
    let found = analyzed(&two, "kocb");
    assert!(found.iter().any(|a| a.lemma == "ko" && has_tags(a, &["dc", "db", "inf"])), "{found:?}");
    assert!(analyzed(&two, "kocba").is_empty());

    let three = parser(
        DERIVATIONS,
        GrammarConfig {
            max_derivations: 3,
            ..GrammarConfig::default()
        },
        ParserConfig::default(),
    );
    let found = analyzed(&three, "kocba");
    assert!(
        found.iter().any(|a| a.lemma == "ko" && has_tags(a, &["dc", "db", "da", "inf"])),
        "{found:?}"
    );
}

#[test]
fn used_derivation_restricts_its_class_and_above() {
    let p = parser(
        DERIVATIONS,
        GrammarConfig {
            max_derivations: 3,
            ..GrammarConfig::default()
        },
        ParserConfig::default(),
    );
    assert!(!analyzed(&p, "koca").is_empty());
    assert!(!analyzed(&p, "koa").is_empty());
    // A lower class cannot be followed by a higher one, nor by itself.
    assert!(analyzed(&p, "koac").is_empty());
    assert!(analyzed(&p, "kocc").is_empty());
    assert!(analyzed(&p, "koaa").is_empty());
}

#[test]
fn inflexion_repeats_are_capped() {
    let two = parser(REPEATS, GrammarConfig::default(), ParserConfig::default());
    assert!(analyzed(&two, "taller").iter().any(|a| a.lemma == "tall"));
    assert!(analyzed(&two, "tallerer").iter().any(|a| a.lemma == "tall"));
    assert!(analyzed(&two, "tallererer").is_empty());

    let three = parser(
        REPEATS,
        GrammarConfig {
            recurs_limit: 3,
            ..GrammarConfig::default()
        },
        ParserConfig::default(),
    );
    assert!(analyzed(&three, "tallererer").iter().any(|a| a.lemma == "tall"));
    assert!(analyzed(&three, "tallerererer").is_empty());
}

#[test]
fn empty_inflexion_depth_is_capped() {
    let no_widening = || GrammarConfig {
        min_flex_length: 0,
        ..GrammarConfig::default()
    };
    let p = parser(EMPTY_CHAIN, no_widening(), ParserConfig::default());
    let cats = analyzed(&p, "cats");
    assert!(cats.iter().any(|a| a.lemma == "cat" && has_tags(a, &["pl"])), "{cats:?}");
    assert!(analyzed(&p, "dogs").is_empty());

    let deeper = parser(
        EMPTY_CHAIN,
        no_widening(),
        ParserConfig {
            max_empty_inflexions: 3,
            ..ParserConfig::default()
        },
    );
    let dogs = analyzed(&deeper, "dogs");
    assert!(dogs.iter().any(|a| a.lemma == "dog" && has_tags(a, &["pl"])), "{dogs:?}");
}

#[test]
fn clitic_wordform_test_filters_hosts() {
    let p = parser(CLITIC_TESTS, GrammarConfig::default(), ParserConfig::default());
    let walkka = analyzed(&p, "walkka");
    assert_eq!(walkka.len(), 1, "{walkka:?}");
    assert_eq!(walkka[0].wf, "walkka");
    assert_eq!(walkka[0].gramm, "V,inf,FOC");
    assert_eq!(walkka[0].wf_glossed, "walk=ka");

    let houseka = p.parse("houseka", 0);
    assert_eq!(houseka, vec![Wordform::placeholder("houseka")]);
}
