use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::config::ResolvedConfig;
use crate::enrich::enrich_entry;
use crate::error::EnrichError;
use crate::sdrf::read_condensed_sdrf;
use crate::store::{SdrfStore, write_atomic};
use crate::xml::{Document, Element, strip_blank_lines};

pub const ENTRY: &str = "entry";
pub const ENTRY_ID: &str = "id";

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichStats {
    pub entries: usize,
    pub entries_with_metadata: usize,
    pub entries_enriched: usize,
    pub entries_without_id: usize,
    pub tissue_fields: usize,
    pub disease_fields: usize,
    pub cross_references: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub output: String,
    #[serde(flatten)]
    pub stats: EnrichStats,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone)]
pub struct App {
    store: SdrfStore,
    config: ResolvedConfig,
}

impl App {
    pub fn new(store: SdrfStore, config: ResolvedConfig) -> Self {
        Self { store, config }
    }

    pub fn output_path(&self, xml_path: &Utf8Path) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{xml_path}.{}", self.config.output_suffix))
    }

    /// Reads the dump at `xml_path`, enriches every entry and writes `<xml_path>.enriched`.
    pub fn run(
        &self,
        xml_path: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, EnrichError> {
        let started = Instant::now();
        let mut document = Document::read(xml_path.as_std_path())?;
        sink.event(ProgressEvent {
            message: format!("parsed {xml_path}"),
            elapsed: Some(started.elapsed()),
        });

        let stats = self.enrich_document(&mut document, sink)?;

        let output = self.output_path(xml_path);
        let xml = document.to_pretty_string(self.config.indent)?;
        write_atomic(&output, strip_blank_lines(&xml).as_bytes())?;
        sink.event(ProgressEvent {
            message: format!("wrote {output}"),
            elapsed: Some(started.elapsed()),
        });

        Ok(RunSummary {
            input: xml_path.to_string(),
            output: output.to_string(),
            stats,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Enriches every `<entry>` of `document` that has an experiment directory in the store.
    pub fn enrich_document(
        &self,
        document: &mut Document,
        sink: &dyn ProgressSink,
    ) -> Result<EnrichStats, EnrichError> {
        let experiments = self.store.experiment_ids()?;
        let progress_every = self.config.progress_every.max(1);
        let started = Instant::now();
        let mut stats = EnrichStats::default();

        document
            .root_mut()
            .try_visit_named_mut(ENTRY, &mut |entry: &mut Element| {
                self.enrich_one(entry, &experiments, &mut stats)?;
                stats.entries += 1;
                if stats.entries % progress_every == 0 {
                    sink.event(ProgressEvent {
                        message: format!("processed {} entries", stats.entries),
                        elapsed: Some(started.elapsed()),
                    });
                }
                Ok::<(), EnrichError>(())
            })?;

        sink.event(ProgressEvent {
            message: format!(
                "processed {} entries, {} enriched",
                stats.entries, stats.entries_enriched
            ),
            elapsed: Some(started.elapsed()),
        });
        Ok(stats)
    }

    fn enrich_one(
        &self,
        entry: &mut Element,
        experiments: &BTreeSet<String>,
        stats: &mut EnrichStats,
    ) -> Result<(), EnrichError> {
        let Some(accession) = entry.attribute(ENTRY_ID).map(str::to_string) else {
            tracing::warn!("skipping <{ENTRY}> without an {ENTRY_ID} attribute");
            stats.entries_without_id += 1;
            return Ok(());
        };
        if !experiments.contains(&accession) {
            tracing::trace!(%accession, "no experiment directory");
            return Ok(());
        }
        stats.entries_with_metadata += 1;

        let path = self.store.condensed_sdrf_path(&accession);
        let annotations = read_condensed_sdrf(path.as_std_path())?;
        if enrich_entry(entry, &annotations) {
            stats.entries_enriched += 1;
            stats.tissue_fields += annotations.tissues.len();
            stats.disease_fields += annotations.diseases.len();
            stats.cross_references += annotations.cross_references.len();
            tracing::debug!(
                %accession,
                tissues = annotations.tissues.len(),
                diseases = annotations.diseases.len(),
                cross_references = annotations.cross_references.len(),
                "enriched entry"
            );
        }
        Ok(())
    }
}
