//! Merge job execution
//!
//! Orchestrates one merge: seeds the accumulator, merges every source in
//! order, runs token substitution once and serializes the result.

use crate::error::{MergeError, Result};
use crate::merger::{DocumentMerger, MergeOptions, SeedPolicy};
use crate::tokens::{substitute, TokenSet};
use doc_model::OdfDocument;
use serde::Serialize;
use store::{export_odt_bytes, import_odt_bytes, OdtError};

/// One source package and the identifier it is reported under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub id: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            bytes,
        }
    }
}

/// Totals of a finished merge job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub sources_merged: usize,
    pub body_nodes_appended: usize,
    pub styles_renamed: usize,
    pub pictures: usize,
    pub page_breaks: usize,
    pub paragraphs_scanned: usize,
    pub paragraphs_substituted: usize,
}

/// A merge in progress
#[derive(Debug)]
pub struct MergeJob {
    options: MergeOptions,
    merger: DocumentMerger,
    accumulator: Option<OdfDocument>,
    sources_seen: usize,
    summary: MergeSummary,
}

impl MergeJob {
    pub fn new(options: MergeOptions) -> Self {
        let accumulator = match options.seed_policy {
            SeedPolicy::EmptyDocument => Some(OdfDocument::new_text()),
            SeedPolicy::FirstDocument => None,
        };
        Self {
            merger: DocumentMerger::from_options(&options),
            options,
            accumulator,
            sources_seen: 0,
            summary: MergeSummary::default(),
        }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Number of sources added so far
    pub fn sources_seen(&self) -> usize {
        self.sources_seen
    }

    /// Parse one source and merge it into the accumulator
    pub fn add(&mut self, source: SourceDocument) -> Result<()> {
        let index = self.sources_seen;
        let document = parse_source(index, &source)?;

        match self.accumulator.as_mut() {
            None => {
                tracing::info!("Seeding merge from {} ({})", source.id, index);
                self.summary.body_nodes_appended += document.body.len();
                self.accumulator = Some(document);
            }
            Some(accumulator) => {
                let step = self.merger.merge_into(accumulator, document, index)?;
                tracing::info!(
                    "Merged {} ({}): {} body nodes, {} styles renamed",
                    source.id,
                    index,
                    step.body_nodes,
                    step.renames.len()
                );
                self.summary.body_nodes_appended += step.body_nodes;
                self.summary.styles_renamed += step.renames.len();
                if step.page_break {
                    self.summary.page_breaks += 1;
                }
            }
        }

        self.summary.sources_merged += 1;
        self.sources_seen += 1;
        Ok(())
    }

    /// Run token substitution and hand back the merged document
    pub fn finish(self, tokens: &TokenSet) -> Result<(OdfDocument, MergeSummary)> {
        let mut summary = self.summary;
        let mut document = self.accumulator.unwrap_or_else(OdfDocument::new_text);

        let report = substitute(&mut document, tokens)?;
        summary.paragraphs_scanned = report.paragraphs_scanned;
        summary.paragraphs_substituted = report.paragraphs_replaced;
        summary.pictures = document.pictures.len();

        tracing::info!(
            "Merge finished: {} sources, {} body nodes, {} paragraphs substituted",
            summary.sources_merged,
            summary.body_nodes_appended,
            summary.paragraphs_substituted
        );
        Ok((document, summary))
    }
}

/// Merge `sources` in order and serialize the result
pub fn merge_sources<I>(
    sources: I,
    options: MergeOptions,
    tokens: &TokenSet,
) -> Result<(Vec<u8>, MergeSummary)>
where
    I: IntoIterator<Item = SourceDocument>,
{
    let mut job = MergeJob::new(options);
    for source in sources {
        job.add(source)?;
    }
    let (document, summary) = job.finish(tokens)?;
    let bytes = export_odt_bytes(&document)?;
    Ok((bytes, summary))
}

fn parse_source(index: usize, source: &SourceDocument) -> Result<OdfDocument> {
    let imported = import_odt_bytes(&source.bytes).map_err(|e| match e {
        OdtError::UnsupportedSection(section) => MergeError::UnsupportedDocumentSection {
            index,
            id: source.id.clone(),
            section,
        },
        other => MergeError::MalformedSourceDocument {
            index,
            id: source.id.clone(),
            source: other,
        },
    })?;

    for warning in &imported.warnings {
        tracing::warn!("{}: {}", source.id, warning);
    }
    Ok(imported.document)
}
