// Derivation graph expansion into fork and link paradigms

use std::collections::BTreeMap;

use hashbrown::HashMap;
use uniparse_core::enums::Position;

use super::compiler::{Diagnostics, compile_inflexion};
use super::descriptor::{DerivLinkDescriptor, DerivationDescriptor, ParadigmDescriptor};
use super::inflexion::Inflexion;
use super::paradigm::{DerivInfo, Paradigm, fork_name, unified_name};
use super::{Grammar, GrammarError, ParadigmId};

/// Expand the derivation links of every source paradigm.
///
/// Links are grouped by recursion class and processed in ascending class.
/// A class-`c` fork inflects in its target paradigms and in the forks of all
/// lower classes, and restricts every derivation of class `c` or higher.
/// The forks of a paradigm are reachable from it through one link
/// inflexion, and also through the unified `#deriv#paradigm#P` paradigm.
pub(crate) fn expand_derivations(
    grammar: &mut Grammar,
    sources: &[&ParadigmDescriptor],
    derivations: &[DerivationDescriptor],
    diagnostics: &mut Diagnostics,
) -> Result<usize, GrammarError> {
    let by_name: HashMap<&str, &DerivationDescriptor> =
        derivations.iter().map(|d| (d.name.as_str(), d)).collect();
    let mut created = 0;

    for source in sources {
        let Some(source_id) = grammar.paradigm_id(&source.name) else {
            continue;
        };
        let mut classes: BTreeMap<u32, Vec<&DerivLinkDescriptor>> = BTreeMap::new();
        for link in &source.derivations {
            if by_name.contains_key(link.derivation.as_str()) {
                classes.entry(link.recurs_class).or_default().push(link);
            } else {
                diagnostics.report(GrammarError::UnknownDerivation {
                    name: link.derivation.clone(),
                    paradigm: source.name.clone(),
                });
            }
        }
        if classes.is_empty() {
            continue;
        }

        let mut lower_forks: Vec<String> = Vec::new();
        let mut forks: Vec<ParadigmId> = Vec::new();
        for (&class, links) in &classes {
            let mut restricted: Vec<String> = classes
                .range(class..)
                .flat_map(|(_, ls)| ls.iter().map(|l| l.derivation.clone()))
                .collect();
            restricted.sort();
            restricted.dedup();

            let mut this_class = Vec::new();
            for link in links {
                let deriv = by_name[link.derivation.as_str()];
                let name = fork_name(&deriv.name, &source.name);
                if grammar.paradigm_names.contains_key(&name) {
                    continue;
                }
                let targets = if !link.paradigms.is_empty() {
                    link.paradigms.clone()
                } else if !deriv.paradigms.is_empty() {
                    deriv.paradigms.clone()
                } else {
                    vec![source.name.clone()]
                };
                let mut subsequent = targets;
                subsequent.extend(lower_forks.iter().cloned());

                let mut fork = Paradigm::new(name.clone());
                fork.derivation = Some(DerivInfo {
                    derivation: deriv.name.clone(),
                    restricted: restricted.clone(),
                });
                let id = grammar
                    .paradigms
                    .try_alloc(fork)
                    .map_err(|_| GrammarError::OutOfMemory { what: "derivations" })?;
                grammar.paradigm_names.insert(name.clone(), id);

                let mut inflexions = Vec::with_capacity(deriv.inflexions.len());
                for template in &deriv.inflexions {
                    let mut desc = template.clone();
                    if !desc.flex.contains("<.>") {
                        desc.flex.push_str("<.>");
                    }
                    desc.position = Position::NonFinal;
                    desc.paradigms = subsequent.clone();
                    match compile_inflexion(&desc, &grammar.paradigm_names, &name) {
                        Ok(infl) => inflexions.push(infl),
                        Err(e) => diagnostics.report(e),
                    }
                }
                if let Some(fork) = grammar.paradigms.get_mut(id) {
                    fork.inflexions = inflexions;
                }
                log::debug!("derivation fork {name} (class {class})");
                this_class.push(name);
                forks.push(id);
                created += 1;
            }
            lower_forks.extend(this_class);
        }

        if forks.is_empty() {
            continue;
        }
        let mut unified = Paradigm::new(unified_name(&source.name));
        unified.inflexions.push(Inflexion::link(forks.clone()));
        let unified_id = grammar
            .paradigms
            .try_alloc(unified)
            .map_err(|_| GrammarError::OutOfMemory { what: "derivations" })?;
        grammar
            .paradigm_names
            .insert(unified_name(&source.name), unified_id);
        if let Some(p) = grammar.paradigms.get_mut(source_id) {
            p.inflexions.push(Inflexion::link(forks));
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::descriptor::InflexionDescriptor;
    use crate::grammar::{GrammarBuilder, GrammarConfig};

    fn link(derivation: &str, class: u32) -> DerivLinkDescriptor {
        DerivLinkDescriptor {
            derivation: derivation.into(),
            recurs_class: class,
            paradigms: Vec::new(),
        }
    }

    fn grammar() -> Grammar {
        let mut builder = GrammarBuilder::new(GrammarConfig::default());
        builder
            .add_paradigms([
                ParadigmDescriptor {
                    name: "V".into(),
                    inflexions: vec![InflexionDescriptor::new(".", "inf", "")],
                    derivations: vec![link("agent", 1), link("dim", 0), link("missing", 0)],
                },
                ParadigmDescriptor {
                    name: "N".into(),
                    inflexions: vec![InflexionDescriptor::new(".s", "pl", "PL")],
                    derivations: Vec::new(),
                },
            ])
            .unwrap();
        builder
            .add_derivations([
                DerivationDescriptor {
                    name: "agent".into(),
                    inflexions: vec![InflexionDescriptor::new(".er", "agent", "AG")],
                    paradigms: vec!["N".into()],
                },
                DerivationDescriptor {
                    name: "dim".into(),
                    inflexions: vec![InflexionDescriptor::new(".let", "dim", "DIM")],
                    paradigms: Vec::new(),
                },
            ])
            .unwrap();
        let compiled = builder.compile().unwrap();
        assert!(
            compiled
                .diagnostics
                .iter()
                .any(|e| matches!(e, GrammarError::UnknownDerivation { name, .. } if name == "missing"))
        );
        compiled.grammar
    }

    #[test]
    fn forks_link_to_targets_and_lower_classes() {
        let g = grammar();
        let agent = g.paradigm_by_name("#deriv#agent#paradigm#V").unwrap();
        let info = agent.derivation.as_ref().unwrap();
        assert_eq!(info.restricted, vec!["agent".to_string()]);
        let infl = &agent.inflexions[0];
        assert!(infl.has_next_flex());
        assert_eq!(infl.position, Position::NonFinal);
        let n = g.paradigm_id("N").unwrap();
        let dim = g.paradigm_id("#deriv#dim#paradigm#V").unwrap();
        assert_eq!(infl.subsequent, vec![n, dim]);

        let dim_para = g.paradigm(dim).unwrap();
        assert_eq!(
            dim_para.derivation.as_ref().unwrap().restricted,
            vec!["agent".to_string(), "dim".to_string()]
        );
        let v = g.paradigm_id("V").unwrap();
        assert_eq!(dim_para.inflexions[0].subsequent, vec![v]);
    }

    #[test]
    fn source_and_unified_paradigms_link_to_forks() {
        let g = grammar();
        let v = g.paradigm_by_name("V").unwrap();
        let last = v.inflexions.last().unwrap();
        assert!(last.is_transparent());
        assert_eq!(last.subsequent.len(), 2);
        let unified = g.paradigm_by_name("#deriv#paradigm#V").unwrap();
        assert!(unified.is_derivational());
        assert_eq!(unified.inflexions[0].subsequent, last.subsequent);
        assert!(g.paradigm_by_name("#deriv#paradigm#N").is_none());
    }
}
