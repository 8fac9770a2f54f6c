//! Bill field extraction module.

mod extractor;
pub mod layout;
pub mod patterns;
pub mod rules;
pub mod values;

pub use extractor::{Extraction, RuleExtractor};
pub use layout::{layout_by_name, layouts, BillLayout, CSG};
pub use rules::{FieldMismatch, FieldRule, MatchStrategy, MismatchReason, Normalizer};

use crate::document::BillDocument;
use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for bill field extractors.
pub trait BillExtractor {
    /// Extract one record per bill in a loaded document, in text order.
    fn extract(&self, document: &BillDocument) -> Result<Vec<Extraction>>;
}
