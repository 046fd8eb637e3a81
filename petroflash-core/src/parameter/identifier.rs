use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A collection of identifiers for a substance or a pseudo-component.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Identifier {
    /// CAS number
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    /// Commonly used english name
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Chemical formula
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Alternative names used in process simulation input
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Identifier {
    /// Create a new identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// # use petroflash_core::parameter::Identifier;
    /// let water = Identifier::new(Some("7732-18-5"), Some("water"), Some("H2O"));
    /// assert!(water.matches("H2O"));
    /// ```
    pub fn new(cas: Option<&str>, name: Option<&str>, formula: Option<&str>) -> Identifier {
        Identifier {
            cas: cas.map(Into::into),
            name: name.map(Into::into),
            formula: formula.map(Into::into),
            aliases: Vec::new(),
        }
    }

    /// Identifier of a pseudo-component that is only known by its name.
    pub fn pseudo(name: &str) -> Identifier {
        Self::new(None, Some(name), None)
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|&a| a.into()).collect();
        self
    }

    /// Check whether `query` refers to this substance.
    ///
    /// Names and aliases are compared case-insensitively, formulas and
    /// CAS numbers exactly.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.name
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case(query))
            || self.formula.as_deref() == Some(query)
            || self.cas.as_deref() == Some(query)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(query))
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids = Vec::new();
        if let Some(n) = &self.cas {
            ids.push(format!("cas={}", n));
        }
        if let Some(n) = &self.name {
            ids.push(format!("name={}", n));
        }
        if let Some(n) = &self.formula {
            ids.push(format!("formula={}", n));
        }
        write!(f, "Identifier({})", ids.join(", "))
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.cas == other.cas && self.name == other.name
    }
}
impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cas.hash(state);
        self.name.hash(state);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fmt() {
        let id = Identifier::new(None, Some("methane"), Some("CH4"));
        assert_eq!(id.to_string(), "Identifier(name=methane, formula=CH4)");
    }

    #[test]
    fn test_matches() {
        let id = Identifier::new(Some("106-97-8"), Some("n-butane"), Some("C4H10"))
            .with_aliases(&["nC4", "butane"]);
        assert!(id.matches("n-butane"));
        assert!(id.matches("N-Butane"));
        assert!(id.matches("NC4"));
        assert!(id.matches("106-97-8"));
        assert!(id.matches("C4H10"));
        assert!(!id.matches("i-butane"));
        assert!(!id.matches("c4h10"));
    }
}
