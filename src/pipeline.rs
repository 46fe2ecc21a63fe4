use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::dates::{self, DATE_COLUMN};
use crate::mapper::{self, row::OutputRow, Variant};
use crate::settings::Settings;
use crate::source::{self, SourceRecord};
use crate::template::{self, TargetSchema};
use crate::output;

pub struct Transformed {
    pub rows: Vec<OutputRow>,
    pub dates_blanked: usize,
}

/// Outcome of a run. Filtered-out records are only traced, never reported here.
pub struct RunSummary {
    pub written: usize,
    pub dates_blanked: usize,
    pub output: PathBuf,
}

impl RunSummary {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.dates_blanked > 0 {
            lines.push(format!(
                "{} dates could not be parsed and were left blank.",
                self.dates_blanked
            ));
        }
        lines.push(format!("Done! Wrote {} rows to {}", self.written, self.output.display()));
        lines
    }

    pub fn print(&self) {
        for line in self.lines() {
            println!("{}", line);
        }
    }
}

/// Filter and map every record, then normalize the date column across all rows.
pub fn transform(records: &[SourceRecord], schema: &TargetSchema, variant: Variant) -> Transformed {
    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} records")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut rows = Vec::new();
    let mut skipped = 0;
    for record in records {
        match mapper::map_eligible(record, schema, variant) {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    info!(rows = rows.len(), skipped, ?variant, "records mapped");

    let dates_blanked = if schema.contains(DATE_COLUMN) {
        dates::normalize_column(&mut rows, DATE_COLUMN)
    } else {
        0
    };

    Transformed {
        rows,
        dates_blanked,
    }
}

pub fn run(settings: &Settings) -> Result<RunSummary> {
    let records = source::read_records(&settings.input)
        .with_context(|| format!("Failed to read source records from {}", settings.input.display()))?;
    let schema = template::read_schema(&settings.template)
        .with_context(|| format!("Failed to read template {}", settings.template.display()))?;

    let out = transform(&records, &schema, settings.variant);

    let output_path = settings.output_path();
    let written = output::write_rows(&output_path, &schema, &out.rows)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    Ok(RunSummary {
        written,
        dates_blanked: out.dates_blanked,
        output: output_path,
    })
}

/// Map without writing; returns the rows for display.
pub fn preview(settings: &Settings) -> Result<Vec<OutputRow>> {
    let records = source::read_records(&settings.input)
        .with_context(|| format!("Failed to read source records from {}", settings.input.display()))?;
    let schema = template::read_schema(&settings.template)
        .with_context(|| format!("Failed to read template {}", settings.template.display()))?;
    Ok(transform(&records, &schema, settings.variant).rows)
}

pub struct SourceStats {
    pub total: usize,
    pub eligible: usize,
    /// ACCESSNUM (trimmed) → count; blank codes are keyed as `""`.
    pub codes: BTreeMap<String, usize>,
    /// Field tag → number of records carrying it.
    pub fields: BTreeMap<String, usize>,
}

pub fn source_stats(records: &[SourceRecord]) -> SourceStats {
    let mut codes = BTreeMap::new();
    let mut fields = BTreeMap::new();
    for record in records {
        *codes
            .entry(record.get("ACCESSNUM").trim().to_string())
            .or_insert(0) += 1;
        for (name, _) in record.fields() {
            *fields.entry(name.to_string()).or_insert(0) += 1;
        }
    }
    SourceStats {
        total: records.len(),
        eligible: records.iter().filter(|r| mapper::is_eligible(r)).count(),
        codes,
        fields,
    }
}
