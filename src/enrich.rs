use crate::domain::{FactorKind, OntologyTerm};
use crate::sdrf::SampleAnnotations;
use crate::xml::Element;

pub const ADDITIONAL_FIELDS: &str = "additional_fields";
pub const CROSS_REFERENCES: &str = "cross_references";
pub const FIELD: &str = "field";
pub const REF: &str = "ref";

/// Appends the annotations to an EB-eye `<entry>`.
///
/// Both containers are created on first use and reused afterwards, so repeated calls
/// never add a second `additional_fields` or `cross_references`. The fields and refs
/// themselves are appended unconditionally. Returns `false` without touching the
/// entry when there is no tissue or disease to add.
pub fn enrich_entry(entry: &mut Element, annotations: &SampleAnnotations) -> bool {
    if annotations.is_empty() {
        return false;
    }

    let fields = entry.ensure_child(ADDITIONAL_FIELDS);
    for kind in [FactorKind::OrganismPart, FactorKind::Disease] {
        for value in annotations.values(kind) {
            fields.push_element(field_element(kind, value));
        }
    }

    let references = entry.ensure_child(CROSS_REFERENCES);
    for term in &annotations.cross_references {
        references.push_element(ref_element(term));
    }
    true
}

pub fn field_element(kind: FactorKind, value: &str) -> Element {
    Element::new(FIELD)
        .with_attribute("name", kind.field_name())
        .with_text(value)
}

pub fn ref_element(term: &OntologyTerm) -> Element {
    Element::new(REF)
        .with_attribute("dbkey", term.as_str())
        .with_attribute("dbName", term.namespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_references_alone_do_nothing() {
        let mut entry = Element::new("entry");
        let mut annotations = SampleAnnotations::default();
        annotations
            .cross_references
            .insert(OntologyTerm::new("EFO_0000292"));

        assert!(!enrich_entry(&mut entry, &annotations));
        assert!(entry.children().is_empty());
    }

    #[test]
    fn new_containers_follow_existing_children() {
        let mut entry = Element::new("entry").with_attribute("id", "E-MTAB-2770");
        entry.push_element(Element::new("name").with_text("Cancer cell line transcriptomes"));

        let mut annotations = SampleAnnotations::default();
        annotations.diseases.insert("lung adenocarcinoma".to_string());
        enrich_entry(&mut entry, &annotations);

        let names = entry
            .child_elements()
            .map(|child| child.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["name", ADDITIONAL_FIELDS, CROSS_REFERENCES]);
        assert!(entry.first_child(CROSS_REFERENCES).unwrap().children().is_empty());
    }

    #[test]
    fn existing_containers_keep_their_position() {
        let mut entry = Element::new("entry").with_attribute("id", "E-MTAB-513");
        entry.push_element(Element::new(CROSS_REFERENCES));
        entry.push_element(Element::new("name").with_text("RNA-seq of human tissues"));

        let mut annotations = SampleAnnotations::default();
        annotations.tissues.insert("adrenal".to_string());
        enrich_entry(&mut entry, &annotations);

        let names = entry
            .child_elements()
            .map(|child| child.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec![CROSS_REFERENCES, "name", ADDITIONAL_FIELDS]);
    }
}
