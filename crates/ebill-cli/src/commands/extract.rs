//! Extract command - turn a directory of bill PDFs into a CSV table.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use ebill_core::document::file_name;
use ebill_core::output::write_csv_file;
use ebill_core::{discover, BatchProcessor, BatchReport, CsvOptions, EbillConfig, PivotTable};

/// Arguments for the default extract action.
#[derive(Args)]
pub struct ExtractArgs {
    /// Directory containing the bill PDFs [default: current directory].
    /// A directory named like a subcommand must be written as ./NAME
    dir: Option<PathBuf>,

    /// Output CSV file [default: <DIR>/账单.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the period by metering point pivot table
    #[arg(long)]
    pivot: bool,
}

pub fn run(args: ExtractArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;
    let options = csv_options(&config)?;

    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    let files = discover(&dir, &config.input)?;

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let processor = BatchProcessor::from_config(&config)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let report = processor.process(&files, |path| {
        pb.set_message(file_name(path));
        pb.inc(1);
    });
    pb.finish_and_clear();

    for skipped in &report.skipped {
        println!(
            "{} Skipped {}: {}",
            style("⚠").yellow(),
            file_name(&skipped.path),
            skipped.reason
        );
    }

    if report.table.is_empty() {
        println!(
            "{} No matchable electricity bill found (没有可匹配的电费单), no CSV written",
            style("⚠").yellow()
        );
        print_summary(&report, start);
        return Ok(());
    }

    let output = args
        .output
        .unwrap_or_else(|| dir.join(&config.output.file_name));
    write_csv_file(&report.table, &output, &options)?;

    println!(
        "{} Wrote {} bills to {}",
        style("✓").green(),
        report.table.len(),
        output.display()
    );

    if args.pivot {
        let pivot_path = output.with_file_name(&config.output.pivot_file_name);
        let pivot = PivotTable::from_table(&report.table);
        if pivot.is_empty() {
            println!(
                "{} No bill has a period, metering point and active energy; pivot table is empty",
                style("⚠").yellow()
            );
        }

        pivot.write_csv_file(&pivot_path, &options)?;

        println!(
            "{} Pivot table written to {}",
            style("✓").green(),
            pivot_path.display()
        );
    }

    print_summary(&report, start);
    Ok(())
}

fn print_summary(report: &BatchReport, start: Instant) {
    let incomplete = report.mismatches.len();
    println!();
    println!("Processing complete:");
    println!("  {} {} extracted", style("✓").green(), report.table.len());
    if !report.skipped.is_empty() {
        println!("  {} {} skipped", style("✗").red(), report.skipped.len());
    }
    if incomplete > 0 {
        println!(
            "  {} {} field(s) could not be read (run with -v for details)",
            style("⚠").yellow(),
            incomplete
        );
    }
    println!("  Time: {:.2}s", start.elapsed().as_secs_f64());
}

fn csv_options(config: &EbillConfig) -> anyhow::Result<CsvOptions> {
    let delimiter = config.delimiter_byte().ok_or_else(|| {
        anyhow::anyhow!(
            "Output delimiter must be a single ASCII character, got {:?}",
            config.output.delimiter
        )
    })?;

    Ok(CsvOptions {
        delimiter,
        bom: config.output.bom,
    })
}
