//! Error types for the ebill-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the ebill library.
#[derive(Error, Debug)]
pub enum EbillError {
    /// A document could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Bill field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Batch-level error (no input).
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Output could not be written.
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while turning a file into a [`crate::BillDocument`].
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a usable PDF.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// The PDF has pages but none of them carry text.
    #[error("no text extracted from PDF")]
    NoText,
}

/// Errors related to bill field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The text does not carry the utility's bill header.
    #[error("not a recognised electricity bill")]
    NotABill,

    /// None of the layout's rules matched.
    #[error("no bill fields matched")]
    NoFields,

    /// Unknown layout name.
    #[error("unknown bill layout: {0}")]
    UnknownLayout(String),
}

/// Errors that end a batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    /// The directory has no matching input files.
    #[error("no input found: no .{extension} files in {}", directory.display())]
    NoInput { directory: PathBuf, extension: String },

    /// The discovery pattern could not be built.
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Errors raised while writing or reading output tables.
#[derive(Error, Debug)]
pub enum OutputError {
    /// CSV encoding/decoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV header did not match the bill columns.
    #[error("unexpected CSV header: {0}")]
    Header(String),

    /// A CSV cell could not be parsed back into its field type.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Result type for the ebill library.
pub type Result<T> = std::result::Result<T, EbillError>;
