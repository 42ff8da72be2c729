use std::fmt;

/// Experimental factor kinds that carry sample annotations worth indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactorKind {
    OrganismPart,
    Disease,
}

impl FactorKind {
    /// Case-insensitive match against the SDRF factor name. Unknown kinds yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "organism part" => Some(FactorKind::OrganismPart),
            "disease" => Some(FactorKind::Disease),
            _ => None,
        }
    }

    /// Value of the `name` attribute on the `<field>` element.
    pub fn field_name(self) -> &'static str {
        match self {
            FactorKind::OrganismPart => "tissue",
            FactorKind::Disease => "disease",
        }
    }
}

/// Ontology cross-reference such as `EFO_0000292` or `UBERON_0002369`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OntologyTerm(String);

impl OntologyTerm {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Last `/`-delimited segment of an ontology URL, trimmed.
    pub fn from_url(url: &str) -> Self {
        let tail = url.rsplit('/').next().unwrap_or(url);
        Self(tail.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Database name for the term: the text before the first `_`, lowercased.
    pub fn namespace(&self) -> String {
        self.0
            .split('_')
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }
}

impl fmt::Display for OntologyTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_kind_is_case_insensitive() {
        assert_eq!(
            FactorKind::parse("Organism Part"),
            Some(FactorKind::OrganismPart)
        );
        assert_eq!(FactorKind::parse("DISEASE"), Some(FactorKind::Disease));
        assert_eq!(FactorKind::parse("cell line"), None);
    }

    #[test]
    fn term_namespace_without_underscore() {
        let term = OntologyTerm::new("CL0000057");
        assert_eq!(term.namespace(), "cl0000057");
    }
}
