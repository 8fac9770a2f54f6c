//! Core library for electricity bill extraction.
//!
//! This crate provides:
//! - PDF loading (per-page text via pdf-extract, lopdf fallback)
//! - Text normalization and whitespace-aligned table detection
//! - Rule-based bill field extraction (China Southern Power Grid layout)
//! - CSV output of the bill table and its pivot view

pub mod batch;
pub mod bill;
pub mod document;
pub mod error;
pub mod models;
pub mod output;
pub mod pdf;
pub mod table;
pub mod text;

pub use batch::{discover, run, BatchProcessor, BatchReport, SkippedFile};
pub use bill::{BillExtractor, BillLayout, Extraction, FieldMismatch, RuleExtractor};
pub use document::{BillDocument, DocumentLoader, PdfLoader};
pub use error::{EbillError, Result};
pub use models::bill::{BillRecord, Field, FieldKind, FieldValue, ReadingColumn, ReadingType};
pub use models::config::EbillConfig;
pub use output::{CsvOptions, OutputTable, PivotTable};
pub use pdf::{PdfContent, PdfProcessor};
