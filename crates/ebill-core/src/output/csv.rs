//! CSV rendering of the bill table.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::OutputTable;
use crate::error::OutputError;
use crate::models::bill::{BillRecord, Field, FieldKind, FieldValue};

/// Header of the source file column.
pub const FILE_COLUMN: &str = "文件";

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Formatting options for CSV output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter.
    pub delimiter: u8,
    /// Prefix the output with a UTF-8 byte order mark.
    pub bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            bom: true,
        }
    }
}

/// Render the table as CSV bytes.
pub fn write_csv(table: &OutputTable, options: &CsvOptions) -> Result<Vec<u8>, OutputError> {
    let mut out = Vec::new();
    if options.bom {
        out.extend_from_slice(BOM);
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(out);

    wtr.write_record(OutputTable::header())?;
    for record in table.records() {
        wtr.write_record(record.to_row())?;
    }

    wtr.into_inner().map_err(|e| OutputError::Csv(e.into_error().into()))
}

/// Write the whole table to `path` in one go.
pub fn write_csv_file(table: &OutputTable, path: &Path, options: &CsvOptions) -> Result<(), OutputError> {
    let bytes = write_csv(table, options)?;
    fs::write(path, &bytes).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Wrote {} rows ({} bytes) to {}", table.len(), bytes.len(), path.display());
    Ok(())
}

/// Parse CSV produced by [`write_csv`] back into a table.
pub fn read_csv<R: Read>(mut reader: R, delimiter: u8) -> Result<OutputTable, OutputError> {
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| OutputError::Csv(e.into()))?;
    let data = data.strip_prefix(BOM).unwrap_or(&data);

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(data);

    let headers = rdr.headers()?.clone();
    let expected = OutputTable::header();
    if headers.iter().ne(expected.iter().copied()) {
        return Err(OutputError::Header(headers.iter().collect::<Vec<_>>().join(",")));
    }

    let mut table = OutputTable::new();
    for row in rdr.records() {
        let row = row?;
        let mut record = BillRecord::new(row.get(0).unwrap_or_default());

        for (field, cell) in Field::all().iter().zip(row.iter().skip(1)) {
            if cell.is_empty() {
                continue;
            }
            record.set(*field, parse_cell(*field, cell)?);
        }
        table.push(record);
    }

    Ok(table)
}

fn parse_cell(field: Field, cell: &str) -> Result<FieldValue, OutputError> {
    let parsed = match field.kind() {
        FieldKind::Text => Some(FieldValue::Text(cell.to_string())),
        FieldKind::Date => NaiveDate::parse_from_str(cell, "%Y-%m-%d").ok().map(FieldValue::Date),
        FieldKind::Decimal => Decimal::from_str(cell).ok().map(FieldValue::Decimal),
    };

    parsed.ok_or_else(|| OutputError::Parse {
        field: field.header().to_string(),
        value: cell.to_string(),
    })
}
