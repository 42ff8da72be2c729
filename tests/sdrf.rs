use std::path::Path;

use assert_matches::assert_matches;

use ebeye_enrich::domain::OntologyTerm;
use ebeye_enrich::error::EnrichError;
use ebeye_enrich::sdrf::{parse_condensed_sdrf, read_condensed_sdrf};

fn term(value: &str) -> OntologyTerm {
    OntologyTerm::new(value)
}

#[test]
fn empty_text_yields_no_annotations() {
    let annotations = parse_condensed_sdrf("");
    assert!(annotations.tissues.is_empty());
    assert!(annotations.diseases.is_empty());
    assert!(annotations.cross_references.is_empty());
}

#[test]
fn organism_part_row() {
    let annotations = parse_condensed_sdrf(
        "E-MTAB-513\t\tERR030881\tfactor\torganism part\tadrenal\thttp://purl.obolibrary.org/obo/UBERON_0002369",
    );
    assert!(annotations.tissues.contains("adrenal"));
    assert_eq!(annotations.tissues.len(), 1);
    assert!(annotations.cross_references.contains(&term("UBERON_0002369")));
    assert!(annotations.diseases.is_empty());
}

#[test]
fn disease_row() {
    let annotations = parse_condensed_sdrf(
        "E-MTAB-2770\t\trun_5637.2\tfactor\tdisease\tbladder carcinoma\thttp://www.ebi.ac.uk/efo/EFO_0000292",
    );
    assert!(annotations.diseases.contains("bladder carcinoma"));
    assert!(annotations.cross_references.contains(&term("EFO_0000292")));
    assert!(annotations.tissues.is_empty());
}

#[test]
fn other_factor_kinds_contribute_nothing() {
    let annotations = parse_condensed_sdrf(
        "E-MTAB-2770\t\trun_5637.2\tfactor\tcell line\t5637\thttp://www.ebi.ac.uk/efo/EFO_0002096",
    );
    assert!(annotations.tissues.is_empty());
    assert!(annotations.diseases.is_empty());
    assert!(annotations.cross_references.is_empty());
}

#[test]
fn characteristics_and_short_rows_are_ignored() {
    let text = [
        "E-MTAB-513\t\tERR030881\tcharacteristic\torganism part\tadrenal\thttp://purl.obolibrary.org/obo/UBERON_0002369",
        "E-MTAB-513\t\tERR030881\tfactor",
        "E-MTAB-513\t\tERR030881\tFactor\tdisease\tnormal",
        "not a row",
        "",
    ]
    .join("\n");
    let annotations = parse_condensed_sdrf(&text);
    assert!(annotations.is_empty());
    assert!(annotations.cross_references.is_empty());
}

#[test]
fn kind_match_ignores_case_and_values_are_trimmed() {
    let text = "E-MTAB-2770\t\trun_A549.1\tfactor\tDisease\t lung adenocarcinoma \thttp://www.ebi.ac.uk/efo/EFO_0000571 ";
    let annotations = parse_condensed_sdrf(text);
    assert!(annotations.diseases.contains("lung adenocarcinoma"));
    assert!(annotations.cross_references.contains(&term("EFO_0000571")));
}

#[test]
fn row_without_url_adds_value_only() {
    let annotations = parse_condensed_sdrf("E-MTAB-2770\t\trun_HeLa.1\tfactor\tdisease\tnormal");
    assert!(annotations.diseases.contains("normal"));
    assert!(annotations.cross_references.is_empty());
}

#[test]
fn duplicate_rows_collapse() {
    let row = "E-MTAB-513\t\tERR030881\tfactor\torganism part\tadrenal\thttp://purl.obolibrary.org/obo/UBERON_0002369";
    let annotations = parse_condensed_sdrf(&format!("{row}\n{row}\n"));
    assert_eq!(annotations.tissues.len(), 1);
    assert_eq!(annotations.cross_references.len(), 1);
}

#[test]
fn reads_fixture_file() {
    let annotations = read_condensed_sdrf(Path::new(
        "tests/fixtures/sdrf/E-MTAB-2770/E-MTAB-2770.condensed-sdrf.tsv",
    ))
    .unwrap();

    assert_eq!(annotations.diseases.len(), 3);
    assert!(annotations.diseases.contains("bladder carcinoma"));
    assert!(annotations.diseases.contains("lung adenocarcinoma"));
    assert!(annotations.diseases.contains("normal"));
    assert!(annotations.tissues.is_empty());
    assert_eq!(annotations.cross_references.len(), 2);
    assert!(!annotations.cross_references.contains(&term("EFO_0002096")));
    assert!(!annotations.cross_references.contains(&term("NCBITaxon_9606")));
}

#[test]
fn missing_file_names_the_path() {
    let path = Path::new("tests/fixtures/sdrf/E-NOPE-1/E-NOPE-1.condensed-sdrf.tsv");
    let err = read_condensed_sdrf(path).unwrap_err();
    assert_matches!(&err, EnrichError::MissingSdrf(missing) if missing == path);
    assert!(err.to_string().contains("E-NOPE-1.condensed-sdrf.tsv"));
}
