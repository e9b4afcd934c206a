// Paradigms and derivation bookkeeping

use super::inflexion::Inflexion;

/// Prefix shared by every paradigm generated from a derivation.
pub const DERIV_PREFIX: &str = "#deriv#";

/// Name of the paradigm derivation `derivation` forks off `paradigm`.
pub fn fork_name(derivation: &str, paradigm: &str) -> String {
    format!("{DERIV_PREFIX}{derivation}#paradigm#{paradigm}")
}

/// Name of the paradigm that links `paradigm` to all of its derivations.
pub fn unified_name(paradigm: &str) -> String {
    format!("{DERIV_PREFIX}paradigm#{paradigm}")
}

/// Set on paradigms forked from a derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivInfo {
    pub derivation: String,
    /// Derivations that may not follow this one in the same word.
    pub restricted: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Paradigm {
    pub name: String,
    pub inflexions: Vec<Inflexion>,
    pub derivation: Option<DerivInfo>,
}

impl Paradigm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inflexions: Vec::new(),
            derivation: None,
        }
    }

    /// Forks and unified link paradigms.
    #[inline]
    pub fn is_derivational(&self) -> bool {
        self.derivation.is_some() || self.name.starts_with(DERIV_PREFIX)
    }

    /// Restricts `derivation` once this paradigm has been used.
    pub fn restricts(&self, derivation: &str) -> bool {
        self.derivation
            .as_ref()
            .is_some_and(|info| info.restricted.iter().any(|d| d == derivation))
    }
}
