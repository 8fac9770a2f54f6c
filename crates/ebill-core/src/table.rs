//! Detection of space-aligned tables in normalized PDF text.
//!
//! A table is located by its header line, its columns are recognised by
//! scanning the header for known labels in order, and data rows are the
//! following lines whose label cell names a known row.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

lazy_static! {
    // Unit suffixes such as "(千瓦时)" carry no column identity.
    static ref HEADER_NOISE: Regex = Regex::new(r"\([^)]*\)|[/ ]").unwrap();
}

/// Describes a table the loader should look for.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    /// Name used to refer to the table from extraction rules.
    pub name: &'static str,
    /// Every keyword must appear on the header line.
    pub header_keywords: &'static [&'static str],
    /// Known column labels, in the order they appear on the page.
    pub columns: &'static [&'static str],
    /// Index of the cell holding the row label.
    pub label_column: usize,
    /// Labels that identify data rows.
    pub row_labels: &'static [&'static str],
    /// Header columns a row label never carries.
    pub omitted: &'static [(&'static str, &'static [&'static str])],
}

impl TableSpec {
    /// Header columns that apply to rows labelled `label`.
    fn row_columns(&self, label: &str, header: &[String]) -> Vec<String> {
        let omitted = self
            .omitted
            .iter()
            .find(|(row, _)| *row == label)
            .map(|(_, columns)| *columns)
            .unwrap_or_default();

        header
            .iter()
            .filter(|c| !omitted.contains(&c.as_str()))
            .cloned()
            .collect()
    }
}

/// A detected table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextTable {
    /// Name of the spec that matched.
    pub name: String,
    /// Column labels present on the header line.
    pub columns: Vec<String>,
    /// Data rows in page order.
    pub rows: Vec<TableRow>,
}

/// One data row of a [`TextTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Row label (e.g. a reading type).
    pub label: String,
    /// All whitespace-separated cells, including the label cell.
    pub cells: Vec<String>,
    /// Header columns this row carries.
    #[serde(skip)]
    pub columns: Vec<String>,
}

impl TextTable {
    /// First row carrying `label`.
    pub fn row(&self, label: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Cell at (`row`, `column`).
    ///
    /// Columns are aligned from the left over the columns the row carries,
    /// except the final one, which always maps to the last cell: rows may
    /// also leave out optional interior columns.
    pub fn cell(&self, row: &str, column: &str) -> Option<&str> {
        let row = self.row(row)?;
        let index = row.columns.iter().position(|c| c == column)?;
        let last_cell = row.cells.len().checked_sub(1)?;

        if index + 1 == row.columns.len() {
            return row.cells.last().map(String::as_str);
        }
        if index < last_cell {
            return row.cells.get(index).map(String::as_str);
        }
        None
    }
}

/// Find every table described by `specs` in `text`.
pub fn detect_tables(text: &str, specs: &[TableSpec]) -> Vec<TextTable> {
    let lines: Vec<&str> = text.lines().collect();
    let mut tables = Vec::new();

    for spec in specs {
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            i += 1;

            if !spec.header_keywords.iter().all(|kw| line.contains(kw)) {
                continue;
            }

            let columns = parse_header(line, spec);
            let mut rows = Vec::new();

            while i < lines.len() {
                let candidate = lines[i].trim();
                if candidate.is_empty() && rows.is_empty() {
                    i += 1;
                    continue;
                }
                match parse_row(candidate, spec, &columns) {
                    Some(row) => {
                        trace!("{} row {:?}", spec.name, row.cells);
                        rows.push(row);
                        i += 1;
                    }
                    None => break,
                }
            }

            if rows.is_empty() {
                debug!("{} header without rows, skipping", spec.name);
                continue;
            }

            debug!(
                "Detected table {}: {} columns, {} rows",
                spec.name,
                columns.len(),
                rows.len()
            );
            tables.push(TextTable {
                name: spec.name.to_string(),
                columns,
                rows,
            });
        }
    }

    tables
}

fn parse_header(line: &str, spec: &TableSpec) -> Vec<String> {
    let cleaned = HEADER_NOISE.replace_all(line, "");
    let mut rest: &str = &cleaned;
    let mut columns = Vec::new();

    for label in spec.columns {
        if let Some(pos) = rest.find(label) {
            columns.push((*label).to_string());
            rest = &rest[pos + label.len()..];
        }
    }

    columns
}

fn parse_row(line: &str, spec: &TableSpec, header: &[String]) -> Option<TableRow> {
    let cells: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    let label = cells.get(spec.label_column)?;

    if !spec.row_labels.contains(&label.as_str()) {
        return None;
    }

    Some(TableRow {
        label: label.clone(),
        columns: spec.row_columns(label, header),
        cells,
    })
}
