// Clitic splitting and re-attachment

use uniparse_core::enums::CliticSide;
use uniparse_core::wordform::Wordform;

use crate::grammar::Clitic;

/// One way to read a token: the stripped clitics in surface order and the
/// host left over.
#[derive(Debug, Clone)]
pub struct Split<'g> {
    pub clitics: Vec<&'g Clitic>,
    pub host: String,
}

/// Every clitic/host split of `word`, the unsplit word first.
pub fn get_hosts<'g>(clitics: &'g [Clitic], word: &str) -> Vec<Split<'g>> {
    let mut out = vec![Split {
        clitics: Vec::new(),
        host: word.to_string(),
    }];
    strip(clitics, word, None, &mut out);
    out
}

/// Append the splits that strip at least one clitic from `word`.
///
/// `only` restricts the sides tried: enclitic recursion strips enclitics
/// only, proclitic recursion keeps the caller's restriction.
fn strip<'g>(clitics: &'g [Clitic], word: &str, only: Option<CliticSide>, out: &mut Vec<Split<'g>>) {
    let word_len = word.chars().count();
    for clitic in clitics {
        let stem = clitic.surface();
        let stem_len = stem.chars().count();
        if stem.is_empty() || word_len <= stem_len {
            continue;
        }
        let host = match clitic.side {
            CliticSide::Enclitic if only != Some(CliticSide::Proclitic) => word.strip_suffix(stem.as_str()),
            CliticSide::Proclitic if only != Some(CliticSide::Enclitic) => word.strip_prefix(stem.as_str()),
            _ => None,
        };
        let Some(host) = host else {
            continue;
        };
        if !clitic.is_compatible_str(host) {
            continue;
        }
        out.push(Split {
            clitics: vec![clitic],
            host: host.to_string(),
        });
        if word_len - stem_len <= 1 {
            continue;
        }

        let mut further = Vec::new();
        let side = match clitic.side {
            CliticSide::Enclitic => Some(CliticSide::Enclitic),
            _ => only,
        };
        strip(clitics, host, side, &mut further);
        for split in further {
            let mut list = split.clitics;
            match clitic.side {
                CliticSide::Proclitic => list.insert(0, clitic),
                _ => list.push(clitic),
            }
            out.push(Split {
                clitics: list,
                host: split.host,
            });
        }
    }
}

/// Re-attach the clitics of a split to the host's analyses.
///
/// An analysis is dropped unless every clitic accepts it. Proclitics are
/// attached innermost first so the outermost ends up leftmost.
pub fn attach_clitics(token: &str, clitics: &[&Clitic], analyses: Vec<Wordform>) -> Vec<Wordform> {
    if clitics.is_empty() {
        return analyses;
    }
    analyses
        .into_iter()
        .filter(|ana| clitics.iter().all(|cl| cl.is_compatible(ana)))
        .map(|mut ana| {
            ana.wf = token.to_string();
            let (proclitics, enclitics): (Vec<&Clitic>, Vec<&Clitic>) = clitics
                .iter()
                .copied()
                .partition(|cl| cl.side == CliticSide::Proclitic);
            for cl in proclitics.into_iter().rev() {
                cl.attach(&mut ana);
            }
            for cl in enclitics {
                cl.attach(&mut ana);
            }
            ana
        })
        .collect()
}
