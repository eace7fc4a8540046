//! Parallel tagging of independent reports.
//!
//! Reports share nothing mutable: each gets its own lines and its own
//! resolved vocabulary, while the alternate names and the tagger are borrowed
//! read-only by every worker.

use crate::assembler::Record;
use crate::document::{index_documents, IndexDocument};
use crate::error::{Result, TaggerError};
use crate::tagger::Tagger;
use crate::toc::TocBounds;
use crate::vocabulary::{AlternateNames, ReportPreface, Vocabulary};
use rayon::prelude::*;
use serde::Serialize;

/// Flattened report text plus its scraped preface
#[derive(Debug, Clone, Default)]
pub struct ReportInput {
    pub id: String,
    pub text: String,
    pub preface: ReportPreface,
}

impl ReportInput {
    /// Identifier falls back to the preface `id`, then to `fallback`
    pub fn new(text: impl Into<String>, preface: ReportPreface, fallback: &str) -> Self {
        let id = preface.id.clone().unwrap_or_else(|| fallback.to_string());
        Self {
            id,
            text: text.into(),
            preface,
        }
    }
}

/// Everything produced for one successfully tagged report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutput {
    pub id: String,
    pub toc: TocBounds,
    pub untagged: usize,
    pub records: Vec<Record>,
    pub documents: Vec<IndexDocument>,
}

/// Run the whole pipeline for one report
pub fn process_report(
    tagger: &Tagger,
    alternates: &AlternateNames,
    input: &ReportInput,
) -> Result<ReportOutput> {
    let vocabulary = Vocabulary::resolve(alternates, &input.preface);
    let report = tagger.tag_text(&input.text, &vocabulary)?;
    let records = report.records(tagger.config())?;
    let documents = index_documents(&input.id, &records);

    log::info!(
        "Report {}: {} lines, {} untagged, {} records, {} documents",
        input.id,
        report.lines.len(),
        report.untagged_count(),
        records.len(),
        documents.len()
    );

    Ok(ReportOutput {
        id: input.id.clone(),
        untagged: report.untagged_count(),
        toc: report.toc,
        records,
        documents,
    })
}

/// Tag many reports in parallel.
///
/// The result vector lines up with `inputs`. A failing report is logged and
/// reported in its own slot; it has no records and does not affect the rest.
pub fn tag_reports(
    tagger: &Tagger,
    alternates: &AlternateNames,
    inputs: &[ReportInput],
) -> Vec<Result<ReportOutput>> {
    inputs
        .par_iter()
        .map(|input| {
            process_report(tagger, alternates, input).inspect_err(|e| {
                log::warn!("Report {} failed: {e}", input.id);
            })
        })
        .collect()
}

/// Count of failed slots whose error is specific to that report
#[must_use]
pub fn report_local_failures(results: &[Result<ReportOutput>]) -> usize {
    results
        .iter()
        .filter(|result| result.as_ref().err().is_some_and(TaggerError::is_report_local))
        .count()
}
