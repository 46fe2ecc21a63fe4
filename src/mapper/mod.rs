pub mod row;
pub mod rules;

use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::source::SourceRecord;
use crate::template::TargetSchema;
use row::{Accumulator, OutputRow};
use rules::Rule;

/// Only records with this ACCESSNUM are microfilm accessions.
pub const MICROFILM_CODE: &str = "MFO";

/// Which rule set to apply. `B` supersedes `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Notes go to the general note, plain accession numbers.
    A,
    /// Processors, provenance notes, resource types and language constants.
    #[default]
    B,
}

impl Variant {
    /// Rules in evaluation order. Appends to a shared column follow this order.
    pub fn rules(self) -> &'static [Rule] {
        match self {
            Variant::A => BASIC_RULES,
            Variant::B => EXTENDED_RULES,
        }
    }

    pub fn default_output(self) -> &'static str {
        match self {
            Variant::A => "output.csv",
            Variant::B => "output_accessions.csv",
        }
    }
}

const BASIC_RULES: &[Rule] = &[
    rules::negative,
    rules::targetby_general_note,
    rules::catalog_general_note,
    rules::ths_provenance,
    rules::acquisition_type,
    rules::extent_size,
    rules::restrictions_basic,
    rules::date_assigned,
    rules::title,
    rules::number_plain,
    rules::reels,
];

const EXTENDED_RULES: &[Rule] = &[
    rules::negative,
    rules::targetby_processors,
    rules::catalog_flag,
    rules::notes_provenance,
    rules::ths_provenance,
    rules::acquisition_type,
    rules::extent_size,
    rules::restrictions_extended,
    rules::date_assigned,
    rules::title_and_resource_type,
    rules::number_prefixed,
    rules::reels,
    rules::language_constants,
];

pub fn is_eligible(record: &SourceRecord) -> bool {
    record.get("ACCESSNUM").trim() == MICROFILM_CODE
}

/// Run every rule of `variant` over a fresh accumulator.
pub fn accumulate(record: &SourceRecord, variant: Variant) -> Accumulator {
    let mut acc = Accumulator::default();
    for rule in variant.rules() {
        rule(record, &mut acc);
    }
    acc
}

/// Map an eligible record to a row shaped by `schema`.
/// Columns the rules set but the template lacks are dropped.
pub fn map_record(record: &SourceRecord, schema: &TargetSchema, variant: Variant) -> OutputRow {
    let acc = accumulate(record, variant);
    for column in acc.dropped_by(schema) {
        debug!(column, "mapped column not in template, dropped");
    }
    acc.finalize(schema)
}

/// Filter then map; `None` for records that are not microfilm accessions.
pub fn map_eligible(record: &SourceRecord, schema: &TargetSchema, variant: Variant) -> Option<OutputRow> {
    is_eligible(record).then(|| map_record(record, schema, variant))
}
