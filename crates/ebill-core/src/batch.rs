//! Directory batch: discover bill files, extract each, collect the table.

use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use tracing::{debug, info, warn};

use crate::bill::{layout_by_name, BillExtractor, Extraction, FieldMismatch, RuleExtractor};
use crate::document::{file_name, BillDocument, DocumentLoader, PdfLoader};
use crate::error::{BatchError, EbillError, ExtractionError, LoadError};
use crate::models::config::{EbillConfig, InputConfig};
use crate::output::OutputTable;

/// List input files in `dir`, non-recursively, in sorted path order.
pub fn discover(dir: &Path, input: &InputConfig) -> Result<Vec<PathBuf>, BatchError> {
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(&input.extension)
    );
    let options = MatchOptions {
        case_sensitive: input.case_sensitive,
        ..MatchOptions::new()
    };

    // Anything that is not a directory goes to the loader, so unreadable
    // entries end up as skipped files instead of vanishing.
    let files: Vec<PathBuf> = glob_with(&pattern, options)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Cannot read {}: {}", e.path().display(), e.error());
                None
            }
        })
        .filter(|path| !path.is_dir())
        .collect();

    debug!("{} matched {} file(s)", pattern, files.len());

    if files.is_empty() {
        return Err(BatchError::NoInput {
            directory: dir.to_path_buf(),
            extension: input.extension.clone(),
        });
    }
    Ok(files)
}

/// A file that produced no record.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: EbillError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of input files.
    pub found: usize,
    /// One record per extracted bill, in input order. Empty when no file
    /// held a bill.
    pub table: OutputTable,
    /// Files that were skipped, in input order.
    pub skipped: Vec<SkippedFile>,
    /// Fields left empty in otherwise extracted bills, by file name.
    pub mismatches: Vec<(String, FieldMismatch)>,
}

/// Runs a loader and an extractor over a list of files.
pub struct BatchProcessor<L, E> {
    loader: L,
    extractor: E,
}

impl BatchProcessor<PdfLoader, RuleExtractor> {
    /// PDF loader plus the configured layout.
    pub fn from_config(config: &EbillConfig) -> Result<Self, EbillError> {
        let layout = layout_by_name(&config.extraction.layout)
            .ok_or_else(|| ExtractionError::UnknownLayout(config.extraction.layout.clone()))?;

        Ok(Self::new(
            PdfLoader::new(layout.tables),
            RuleExtractor::new(layout).with_signature_check(config.extraction.require_signature),
        ))
    }
}

impl<L: DocumentLoader, E: BillExtractor> BatchProcessor<L, E> {
    pub fn new(loader: L, extractor: E) -> Self {
        Self { loader, extractor }
    }

    fn extract(&self, document: Result<BillDocument, LoadError>) -> Result<Vec<Extraction>, EbillError> {
        Ok(self.extractor.extract(&document?)?)
    }

    /// Process every file in order; `on_file` is called after each one.
    ///
    /// Unreadable files are skipped with a warning, they never abort the batch.
    pub fn process<F: FnMut(&Path)>(&self, paths: &[PathBuf], mut on_file: F) -> BatchReport {
        let outcomes: Vec<Result<Vec<Extraction>, SkippedFile>> = self
            .loader
            .load_each(paths)
            .map(|(path, document)| {
                let outcome = self.extract(document).map_err(|reason| SkippedFile {
                    path: path.to_path_buf(),
                    reason,
                });
                on_file(path);
                outcome
            })
            .collect();

        let mut report = BatchReport {
            found: paths.len(),
            ..BatchReport::default()
        };

        for outcome in outcomes {
            match outcome {
                Ok(extractions) => {
                    for extraction in extractions {
                        let file = extraction.record.file.clone();
                        report
                            .mismatches
                            .extend(extraction.mismatches.into_iter().map(|m| (file.clone(), m)));
                        report.table.push(extraction.record);
                    }
                }
                Err(skipped) => {
                    warn!("Skipping {}: {}", file_name(&skipped.path), skipped.reason);
                    report.skipped.push(skipped);
                }
            }
        }

        info!(
            "Extracted {} bill(s), skipped {} of {} file(s)",
            report.table.len(),
            report.skipped.len(),
            report.found
        );
        report
    }
}

/// Discover and process every bill in `dir` with the configured layout.
///
/// Fails only when there is no input; files without a bill are skips.
pub fn run(dir: &Path, config: &EbillConfig) -> Result<BatchReport, EbillError> {
    let files = discover(dir, &config.input)?;
    Ok(BatchProcessor::from_config(config)?.process(&files, |_| {}))
}
