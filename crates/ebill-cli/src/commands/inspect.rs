//! Inspect command - show what the extractor sees in one bill.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Serialize;

use ebill_core::bill::layout_by_name;
use ebill_core::table::TextTable;
use ebill_core::{BillExtractor, DocumentLoader, Extraction, Field, PdfLoader, RuleExtractor};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Bill PDF to inspect
    file: PathBuf,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Inspection<'a> {
    file: String,
    layout: &'static str,
    pages: usize,
    text: &'a str,
    tables: &'a [TextTable],
    extractions: &'a [Extraction],
    error: Option<String>,
}

pub fn run(args: InspectArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let layout = layout_by_name(&config.extraction.layout)
        .ok_or_else(|| anyhow::anyhow!("Unknown bill layout: {}", config.extraction.layout))?;

    let document = PdfLoader::new(layout.tables).load(&args.file)?;
    let extractor =
        RuleExtractor::new(layout).with_signature_check(config.extraction.require_signature);
    let result = extractor.extract(&document);

    let inspection = Inspection {
        file: document.file_name(),
        layout: layout.name,
        pages: document.pages.len(),
        text: &document.text,
        tables: &document.tables,
        extractions: result.as_deref().unwrap_or_default(),
        error: result.as_ref().err().map(|e| e.to_string()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
    } else {
        print!("{}", format_inspection(&inspection));
    }

    Ok(())
}

fn format_inspection(inspection: &Inspection) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({} page(s), layout {})\n\n",
        style(&inspection.file).bold(),
        inspection.pages,
        inspection.layout
    ));

    output.push_str("Text:\n");
    for line in inspection.text.lines() {
        output.push_str(&format!("  {}\n", line));
    }
    output.push('\n');

    if inspection.tables.is_empty() {
        output.push_str("Tables: none detected\n\n");
    }
    for table in inspection.tables {
        output.push_str(&format!("Table {}: {}\n", table.name, table.columns.join(" | ")));
        for row in &table.rows {
            output.push_str(&format!("  {}: {}\n", row.label, row.cells.join(" | ")));
        }
        output.push('\n');
    }

    if let Some(error) = &inspection.error {
        output.push_str(&format!("{} {}\n", style("✗").red(), error));
    }

    let bills = inspection.extractions.len();
    for (number, extraction) in (1..).zip(inspection.extractions) {
        if bills > 1 {
            output.push_str(&format!("Bill {} of {}:\n", number, bills));
        }
        output.push_str(&format_fields(extraction));
        output.push('\n');
    }

    output
}

/// Summary fields with their value or mismatch, then the readings found.
fn format_fields(extraction: &Extraction) -> String {
    let mut output = String::from("Fields:\n");

    for field in Field::SUMMARY {
        match extraction.record.get(field) {
            Some(value) => {
                output.push_str(&format!("  {} {}: {}\n", style("✓").green(), field, value));
            }
            None => {
                let reason = extraction
                    .mismatches
                    .iter()
                    .find(|m| m.field == field)
                    .map(|m| m.reason.to_string())
                    .unwrap_or_default();
                output.push_str(&format!("  {} {}: {}\n", style("✗").red(), field, reason));
            }
        }
    }

    let readings: Vec<String> = Field::all()
        .iter()
        .filter(|f| f.is_reading())
        .filter_map(|f| extraction.record.get(*f).map(|v| format!("{}={}", f, v)))
        .collect();
    if !readings.is_empty() {
        output.push_str(&format!("Readings:\n  {}\n", readings.join("\n  ")));
    }
    for mismatch in extraction.mismatches.iter().filter(|m| m.field.is_reading()) {
        output.push_str(&format!("  {} {}\n", style("✗").red(), mismatch));
    }

    output
}
