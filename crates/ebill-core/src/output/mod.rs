//! Output table and its CSV serializations.

mod csv;
mod pivot;

pub use self::csv::{read_csv, write_csv, write_csv_file, CsvOptions, FILE_COLUMN};
pub use pivot::PivotTable;

use crate::models::bill::BillRecord;

/// Bill records in file discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTable {
    records: Vec<BillRecord>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record; insertion order is output order.
    pub fn push(&mut self, record: BillRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[BillRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header row: source file column followed by every field.
    pub fn header() -> Vec<&'static str> {
        std::iter::once(FILE_COLUMN)
            .chain(crate::models::bill::Field::all().iter().map(|f| f.header()))
            .collect()
    }
}

impl FromIterator<BillRecord> for OutputTable {
    fn from_iter<I: IntoIterator<Item = BillRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
