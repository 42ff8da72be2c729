use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::domain::{FactorKind, OntologyTerm};
use crate::error::EnrichError;

const FACTOR_TOKEN: &str = "factor";

/// Tissue, disease and ontology annotations collected from one condensed SDRF file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleAnnotations {
    pub tissues: BTreeSet<String>,
    pub diseases: BTreeSet<String>,
    pub cross_references: BTreeSet<OntologyTerm>,
}

impl SampleAnnotations {
    /// True when there is nothing to add as a `<field>`. Cross-references alone don't count.
    pub fn is_empty(&self) -> bool {
        self.tissues.is_empty() && self.diseases.is_empty()
    }

    pub fn values(&self, kind: FactorKind) -> &BTreeSet<String> {
        match kind {
            FactorKind::OrganismPart => &self.tissues,
            FactorKind::Disease => &self.diseases,
        }
    }

    fn values_mut(&mut self, kind: FactorKind) -> &mut BTreeSet<String> {
        match kind {
            FactorKind::OrganismPart => &mut self.tissues,
            FactorKind::Disease => &mut self.diseases,
        }
    }
}

/// Reads `path` and extracts its annotations.
pub fn read_condensed_sdrf(path: &Path) -> Result<SampleAnnotations, EnrichError> {
    if !path.exists() {
        return Err(EnrichError::MissingSdrf(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)
        .map_err(|err| EnrichError::Filesystem(format!("read {}: {err}", path.display())))?;
    Ok(parse_condensed_sdrf(&content))
}

/// Collects organism part and disease factor values from condensed SDRF text.
///
/// Columns (0-indexed): 3 is the literal `factor`, 4 the factor kind, 5 the value and
/// 6 an optional ontology URL. Rows that don't fit this shape are skipped. Ontology
/// terms are only taken from rows whose kind is organism part or disease.
pub fn parse_condensed_sdrf(text: &str) -> SampleAnnotations {
    let mut annotations = SampleAnnotations::default();
    for row in text.split('\n') {
        let columns = row.trim().split('\t').collect::<Vec<_>>();
        if columns.len() <= 4 || columns[3] != FACTOR_TOKEN {
            continue;
        }
        let Some(kind) = FactorKind::parse(columns[4]) else {
            continue;
        };
        let Some(value) = columns.get(5) else {
            continue;
        };
        annotations
            .values_mut(kind)
            .insert(value.trim().to_string());
        if let Some(url) = columns.get(6) {
            annotations
                .cross_references
                .insert(OntologyTerm::from_url(url));
        }
    }
    annotations
}
