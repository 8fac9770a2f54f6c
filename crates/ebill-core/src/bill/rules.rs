//! Extraction rules: (field, matching strategy, normalizer) triples.

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use super::values::{clean_identifier, clean_text, parse_amount, parse_date, parse_decimal};
use crate::document::BillDocument;
use crate::models::bill::{Field, FieldValue};

/// Where a rule looks for its raw value.
#[derive(Debug, Clone, Copy)]
pub enum MatchStrategy {
    /// Regex search over the document text; the value is the `value` group,
    /// or the whole match when the pattern has no such group.
    Pattern(&'static Regex),

    /// One cell of a detected table. The first row label present wins.
    TableCell {
        table: &'static str,
        rows: &'static [&'static str],
        column: &'static str,
    },

    /// One cell of a row that only some bill variants carry. A missing
    /// table, row or cell gives no value and no mismatch.
    RowCell {
        table: &'static str,
        row: &'static str,
        column: &'static str,
    },

    /// Sum of one column over a set of rows. Groups are alternatives: the
    /// first group with at least one present row is summed.
    TableSum {
        table: &'static str,
        groups: &'static [&'static [&'static str]],
        column: &'static str,
    },
}

/// How matched text becomes a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    /// Trimmed free text.
    Text,
    /// Text with all whitespace removed.
    Identifier,
    /// Calendar date.
    Date,
    /// Money amount; currency symbols and separators are stripped.
    Amount,
    /// Plain decimal number.
    Quantity,
}

impl Normalizer {
    /// Convert one raw string.
    pub fn apply(self, raw: &str) -> Option<FieldValue> {
        match self {
            Normalizer::Text => clean_text(raw).map(FieldValue::Text),
            Normalizer::Identifier => clean_identifier(raw).map(FieldValue::Text),
            Normalizer::Date => parse_date(raw).map(FieldValue::Date),
            Normalizer::Amount => parse_amount(raw).map(FieldValue::Decimal),
            Normalizer::Quantity => parse_decimal(raw).map(FieldValue::Decimal),
        }
    }
}

/// A field that could not be extracted from an otherwise readable bill.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {reason}")]
pub struct FieldMismatch {
    pub field: Field,
    pub reason: MismatchReason,
}

/// Why a rule produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchReason {
    /// The pattern did not match.
    #[error("pattern did not match")]
    NoMatch,

    /// The table was not detected.
    #[error("table {table} not found")]
    NoTable { table: String },

    /// None of the candidate rows is present.
    #[error("no {column} cell in rows {rows:?}")]
    NoCell { rows: Vec<String>, column: String },

    /// Text was found but could not be normalized.
    #[error("invalid value {value:?}")]
    Invalid { value: String },
}

/// One extraction rule.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    pub strategy: MatchStrategy,
    pub normalizer: Normalizer,
}

impl FieldRule {
    pub const fn new(field: Field, strategy: MatchStrategy, normalizer: Normalizer) -> Self {
        Self {
            field,
            strategy,
            normalizer,
        }
    }

    /// Run the rule against a document. `Ok(None)` means the field does
    /// not apply to this bill variant.
    pub fn apply(&self, document: &BillDocument) -> Result<Option<FieldValue>, FieldMismatch> {
        let raw = self.strategy.find(document).map_err(|reason| self.mismatch(reason))?;
        trace!("{} matched {:?}", self.field, raw);

        match raw.as_slice() {
            [] => return Ok(None),
            [single] => {
                return self
                    .normalizer
                    .apply(single)
                    .map(Some)
                    .ok_or_else(|| self.mismatch(MismatchReason::Invalid { value: single.clone() }));
            }
            _ => {}
        }

        // Several line items: each must be numeric, the field value is their sum.
        let mut total = Decimal::ZERO;
        for item in &raw {
            let invalid = || self.mismatch(MismatchReason::Invalid { value: item.clone() });
            match self.normalizer.apply(item) {
                Some(FieldValue::Decimal(d)) => total = total.checked_add(d).ok_or_else(invalid)?,
                _ => return Err(invalid()),
            }
        }
        Ok(Some(FieldValue::Decimal(total)))
    }

    fn mismatch(&self, reason: MismatchReason) -> FieldMismatch {
        FieldMismatch {
            field: self.field,
            reason,
        }
    }
}

impl MatchStrategy {
    /// Raw text for the field; more than one item only for
    /// [`MatchStrategy::TableSum`], none only for [`MatchStrategy::RowCell`].
    pub fn find(&self, document: &BillDocument) -> Result<Vec<String>, MismatchReason> {
        match *self {
            MatchStrategy::Pattern(pattern) => {
                let caps = pattern.captures(&document.text).ok_or(MismatchReason::NoMatch)?;
                let value = caps.name("value").or_else(|| caps.get(0)).ok_or(MismatchReason::NoMatch)?;
                Ok(vec![value.as_str().to_string()])
            }
            MatchStrategy::TableCell { table, rows, column } => {
                let found = document.table(table).ok_or_else(|| MismatchReason::NoTable {
                    table: table.to_string(),
                })?;
                rows.iter()
                    .find(|row| found.row(row).is_some())
                    .and_then(|row| found.cell(row, column))
                    .map(|cell| vec![cell.to_string()])
                    .ok_or_else(|| no_cell(rows, column))
            }
            MatchStrategy::RowCell { table, row, column } => Ok(document
                .table(table)
                .and_then(|found| found.cell(row, column))
                .map(|cell| vec![cell.to_string()])
                .unwrap_or_default()),
            MatchStrategy::TableSum { table, groups, column } => {
                let found = document.table(table).ok_or_else(|| MismatchReason::NoTable {
                    table: table.to_string(),
                })?;
                let group = groups
                    .iter()
                    .find(|group| group.iter().any(|row| found.row(row).is_some()))
                    .ok_or_else(|| no_cell(&groups.concat(), column))?;

                group
                    .iter()
                    .filter(|row| found.row(row).is_some())
                    .map(|row| {
                        found
                            .cell(row, column)
                            .map(str::to_string)
                            .ok_or_else(|| no_cell(&[*row], column))
                    })
                    .collect()
            }
        }
    }
}

fn no_cell(rows: &[&str], column: &str) -> MismatchReason {
    MismatchReason::NoCell {
        rows: rows.iter().map(|r| r.to_string()).collect(),
        column: column.to_string(),
    }
}
