//! Billing-period by metering-point view of active energy.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{CsvOptions, OutputTable};
use crate::error::OutputError;
use crate::models::bill::{BillRecord, Field};

type Period = (NaiveDate, NaiveDate);
type Meter = (String, String);

/// Total active energy keyed by billing period (rows) and
/// customer number plus metering point (columns).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotTable {
    periods: BTreeSet<Period>,
    meters: BTreeSet<Meter>,
    cells: BTreeMap<(Period, Meter), Decimal>,
}

impl PivotTable {
    /// Build the pivot from bill records.
    ///
    /// Records missing a key field or the energy value are left out.
    /// When two records share a cell the later one wins.
    pub fn from_table(table: &OutputTable) -> Self {
        let mut pivot = Self::default();

        for record in table.records() {
            let Some((period, meter, value)) = pivot_entry(record) else {
                debug!("{}: not enough fields for the pivot table", record.file);
                continue;
            };

            pivot.periods.insert(period);
            pivot.meters.insert(meter.clone());
            if pivot.cells.insert((period, meter), value).is_some() {
                warn!("{}: duplicate period and metering point, keeping this bill", record.file);
            }
        }

        pivot
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Value for one period and meter.
    pub fn get(&self, period: Period, customer: &str, metering_point: &str) -> Option<Decimal> {
        self.cells
            .get(&(period, (customer.to_string(), metering_point.to_string())))
            .copied()
    }

    /// Render as CSV.
    ///
    /// Two header rows carry the column keys, a third names the row keys,
    /// then one row per billing period. Empty cells mean no bill.
    pub fn write_csv(&self, options: &CsvOptions) -> Result<Vec<u8>, OutputError> {
        let mut out = Vec::new();
        if options.bom {
            out.extend_from_slice(b"\xEF\xBB\xBF");
        }

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .from_writer(out);

        let mut customers = vec![String::new(), Field::CustomerNumber.header().to_string()];
        let mut points = vec![String::new(), Field::MeteringPoint.header().to_string()];
        for (customer, point) in &self.meters {
            customers.push(customer.clone());
            points.push(point.clone());
        }
        wtr.write_record(&customers)?;
        wtr.write_record(&points)?;

        let mut names = vec![
            Field::PeriodStart.header().to_string(),
            Field::PeriodEnd.header().to_string(),
        ];
        names.extend(self.meters.iter().map(|_| String::new()));
        wtr.write_record(&names)?;

        for period in &self.periods {
            let mut row = vec![
                period.0.format("%Y-%m-%d").to_string(),
                period.1.format("%Y-%m-%d").to_string(),
            ];
            for meter in &self.meters {
                row.push(
                    self.cells
                        .get(&(*period, meter.clone()))
                        .map(Decimal::to_string)
                        .unwrap_or_default(),
                );
            }
            wtr.write_record(&row)?;
        }

        wtr.into_inner().map_err(|e| OutputError::Csv(e.into_error().into()))
    }

    /// Write the pivot to `path` in one go.
    pub fn write_csv_file(&self, path: &Path, options: &CsvOptions) -> Result<(), OutputError> {
        let bytes = self.write_csv(options)?;
        fs::write(path, &bytes).map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Wrote pivot of {} periods by {} meters to {}",
            self.periods.len(),
            self.meters.len(),
            path.display()
        );
        Ok(())
    }
}

fn pivot_entry(record: &BillRecord) -> Option<(Period, Meter, Decimal)> {
    let period = (record.date(Field::PeriodStart)?, record.date(Field::PeriodEnd)?);
    let meter = (
        record.text(Field::CustomerNumber)?.to_string(),
        record.text(Field::MeteringPoint)?.to_string(),
    );
    Some((period, meter, record.decimal(Field::TotalActiveEnergy)?))
}
