//! Individual mapping rules and the code tables behind them.
//!
//! Each rule reads the record and writes into the accumulator; none of them
//! can fail. A missing field reads as `""`.

use crate::source::SourceRecord;

use super::row::Accumulator;

pub type Rule = fn(&SourceRecord, &mut Accumulator);

pub const MICROFILM_REELS: &str = "microfilm reel(s)";
pub const RESTRICTED_NOTE: &str = "Some materials in this accession are restricted.";
pub const THS_PROVENANCE: &str = "Acquired from THS.";
pub const DEFAULT_RESOURCE_TYPE: &str = "collection";

/// ACQUIS code → acquisition type.
pub const ACQUISITION_TYPES: &[(&str, &str)] = &[
    ("L", "Loan"),
    ("P", "Purchase"),
    ("O", "Originals"),
];

/// SIZE code → container summary. Every listed code also sets the extent type.
pub const SIZE_EXTENTS: &[(&str, Option<&str>)] = &[
    ("35", Some("35 mm")),
    ("16", Some("16 mm")),
    ("", None),
];

/// CATALOG code → cataloged flag (extended rules).
pub const CATALOG_FLAGS: &[(&str, &str)] = &[("YES", "1"), ("NO", "0")];

/// Restriction code → (flag, note).
pub type RestrictionTable = &'static [(&'static str, &'static str, Option<&'static str>)];

pub const RESTRICTIONS_BASIC: RestrictionTable = &[
    ("", "0", None),
    ("Y", "1", Some(RESTRICTED_NOTE)),
];

pub const RESTRICTIONS_EXTENDED: RestrictionTable = &[
    ("N", "0", None),
    ("", "0", None),
    ("Y", "1", Some(RESTRICTED_NOTE)),
];

/// Case-insensitive keyword in COLLECTION → resource type, first match wins.
pub const RESOURCE_TYPES: &[(&str, &str)] = &[
    ("papers", "papers"),
    ("records", "records"),
    ("collection", "collection"),
];

/// Written on every row by the extended rules.
pub const LANGUAGE_CONSTANTS: &[(&str, &str)] = &[
    ("accession_language", "eng"),
    ("accession_script", "Latn"),
    ("lang_material_language", "eng"),
    ("lang_material_script", "Latn"),
    ("date_1_label", "Targeted"),
];

pub fn lookup<T: Copy>(table: &[(&str, T)], code: &str) -> Option<T> {
    table.iter().find(|(k, _)| *k == code).map(|(_, v)| *v)
}

pub fn resource_type(collection: &str) -> &'static str {
    let lower = collection.to_lowercase();
    RESOURCE_TYPES
        .iter()
        .find(|(kw, _)| lower.contains(*kw))
        .map(|(_, t)| *t)
        .unwrap_or(DEFAULT_RESOURCE_TYPE)
}

pub fn negative(rec: &SourceRecord, acc: &mut Accumulator) {
    if rec.get("NEGATIVE") == "Y" {
        acc.set("accession_content_description", "Negatives");
    }
}

fn processed_by(rec: &SourceRecord) -> Option<String> {
    let who = rec.get("TARGETBY");
    (!who.is_empty()).then(|| format!("Processed by {}.", who))
}

pub fn targetby_general_note(rec: &SourceRecord, acc: &mut Accumulator) {
    if let Some(note) = processed_by(rec) {
        acc.append("accession_general_note", &note);
    }
}

pub fn targetby_processors(rec: &SourceRecord, acc: &mut Accumulator) {
    if let Some(note) = processed_by(rec) {
        acc.append("accession_processors", &note);
    }
}

pub fn catalog_general_note(rec: &SourceRecord, acc: &mut Accumulator) {
    let who = rec.get("CATALOG");
    if !who.is_empty() {
        acc.append("accession_general_note", &format!("Cataloged by {}.", who));
    }
}

pub fn catalog_flag(rec: &SourceRecord, acc: &mut Accumulator) {
    if let Some(flag) = lookup(CATALOG_FLAGS, rec.get("CATALOG")) {
        acc.set("accession_cataloged", flag);
    }
}

pub fn notes_provenance(rec: &SourceRecord, acc: &mut Accumulator) {
    acc.append("accession_provenance", rec.get("NOTES"));
}

pub fn ths_provenance(rec: &SourceRecord, acc: &mut Accumulator) {
    if rec.get("THS") == "Y" {
        acc.append("accession_provenance", THS_PROVENANCE);
    }
}

pub fn acquisition_type(rec: &SourceRecord, acc: &mut Accumulator) {
    if let Some(kind) = lookup(ACQUISITION_TYPES, rec.get("ACQUIS").trim()) {
        acc.set("accession_acquisition_type", kind);
    }
}

pub fn extent_size(rec: &SourceRecord, acc: &mut Accumulator) {
    if let Some(summary) = lookup(SIZE_EXTENTS, rec.get("SIZE").trim()) {
        acc.set("extent_type", MICROFILM_REELS);
        if let Some(summary) = summary {
            acc.set("extent_container_summary", summary);
        }
    }
}

fn apply_restrictions(rec: &SourceRecord, acc: &mut Accumulator, table: RestrictionTable, flag_column: &'static str) {
    let code = rec.get("RESTRICTED").trim();
    if let Some((_, flag, note)) = table.iter().find(|(k, _, _)| *k == code) {
        acc.set(flag_column, *flag);
        if let Some(note) = note {
            acc.set("accession_access_restrictions_note", *note);
        }
    }
}

pub fn restrictions_basic(rec: &SourceRecord, acc: &mut Accumulator) {
    apply_restrictions(rec, acc, RESTRICTIONS_BASIC, "accession_access_restrictions");
}

pub fn restrictions_extended(rec: &SourceRecord, acc: &mut Accumulator) {
    apply_restrictions(rec, acc, RESTRICTIONS_EXTENDED, "accession_restrictions_apply");
}

pub fn date_assigned(rec: &SourceRecord, acc: &mut Accumulator) {
    let raw = rec.get("DATE_ASSIGNED");
    if raw.is_empty() {
        return;
    }
    // "2020-05-01T00:00:00" → "2020-05-01"
    let date = raw.split('T').next().unwrap_or_default();
    acc.set("date_1_begin", date);
    acc.set("date_1_type", "single");
}

pub fn title(rec: &SourceRecord, acc: &mut Accumulator) {
    let collection = rec.get("COLLECTION");
    if !collection.is_empty() {
        acc.set("accession_title", collection);
    }
}

pub fn title_and_resource_type(rec: &SourceRecord, acc: &mut Accumulator) {
    let collection = rec.get("COLLECTION");
    if !collection.is_empty() {
        acc.set("accession_title", collection);
        acc.set("accession_resource_type", resource_type(collection));
    }
}

pub fn number_plain(rec: &SourceRecord, acc: &mut Accumulator) {
    let number = rec.get("MFNUMBER");
    if !number.is_empty() {
        acc.set("accession_number_1", number);
    }
}

pub fn number_prefixed(rec: &SourceRecord, acc: &mut Accumulator) {
    let number = rec.get("MFNUMBER");
    if !number.is_empty() {
        acc.set("accession_number_1", format!("MF. {}", number));
    }
}

pub fn reels(rec: &SourceRecord, acc: &mut Accumulator) {
    let reels = rec.get("REELS");
    if !reels.is_empty() {
        acc.set("extent_number", reels);
    }
}

pub fn language_constants(_: &SourceRecord, acc: &mut Accumulator) {
    for (column, value) in LANGUAGE_CONSTANTS {
        acc.set(*column, *value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: Rule, fields: &[(&str, &str)]) -> Accumulator {
        let rec: SourceRecord = fields.iter().copied().collect();
        let mut acc = Accumulator::default();
        rule(&rec, &mut acc);
        acc
    }

    #[test]
    fn acquisition_codes() {
        assert_eq!(run(acquisition_type, &[("ACQUIS", "L")]).get("accession_acquisition_type"), Some("Loan"));
        assert_eq!(run(acquisition_type, &[("ACQUIS", "P")]).get("accession_acquisition_type"), Some("Purchase"));
        assert_eq!(run(acquisition_type, &[("ACQUIS", "O")]).get("accession_acquisition_type"), Some("Originals"));
        assert_eq!(run(acquisition_type, &[("ACQUIS", "X")]).get("accession_acquisition_type"), None);
        assert_eq!(run(acquisition_type, &[]).get("accession_acquisition_type"), None);
    }

    #[test]
    fn size_branches_are_exclusive() {
        let acc = run(extent_size, &[("SIZE", "35")]);
        assert_eq!(acc.get("extent_type"), Some(MICROFILM_REELS));
        assert_eq!(acc.get("extent_container_summary"), Some("35 mm"));

        let acc = run(extent_size, &[("SIZE", "16")]);
        assert_eq!(acc.get("extent_container_summary"), Some("16 mm"));

        let acc = run(extent_size, &[("SIZE", "")]);
        assert_eq!(acc.get("extent_type"), Some(MICROFILM_REELS));
        assert_eq!(acc.get("extent_container_summary"), None);

        // absent reads as blank
        let acc = run(extent_size, &[]);
        assert_eq!(acc.get("extent_type"), Some(MICROFILM_REELS));

        let acc = run(extent_size, &[("SIZE", "105")]);
        assert_eq!(acc.get("extent_type"), None);
        assert_eq!(acc.get("extent_container_summary"), None);
    }

    #[test]
    fn basic_restrictions() {
        let acc = run(restrictions_basic, &[("RESTRICTED", "")]);
        assert_eq!(acc.get("accession_access_restrictions"), Some("0"));
        assert_eq!(acc.get("accession_access_restrictions_note"), None);

        let acc = run(restrictions_basic, &[("RESTRICTED", "Y")]);
        assert_eq!(acc.get("accession_access_restrictions"), Some("1"));
        assert_eq!(acc.get("accession_access_restrictions_note"), Some(RESTRICTED_NOTE));

        // "N" is not a basic code
        let acc = run(restrictions_basic, &[("RESTRICTED", "N")]);
        assert_eq!(acc.get("accession_access_restrictions"), None);
    }

    #[test]
    fn extended_restrictions() {
        for code in ["N", ""] {
            let acc = run(restrictions_extended, &[("RESTRICTED", code)]);
            assert_eq!(acc.get("accession_restrictions_apply"), Some("0"));
            assert_eq!(acc.get("accession_access_restrictions"), None);
        }
        let acc = run(restrictions_extended, &[("RESTRICTED", "Y")]);
        assert_eq!(acc.get("accession_restrictions_apply"), Some("1"));
        assert_eq!(acc.get("accession_access_restrictions_note"), Some(RESTRICTED_NOTE));
    }

    #[test]
    fn catalog_flags() {
        assert_eq!(run(catalog_flag, &[("CATALOG", "YES")]).get("accession_cataloged"), Some("1"));
        assert_eq!(run(catalog_flag, &[("CATALOG", "NO")]).get("accession_cataloged"), Some("0"));
        assert_eq!(run(catalog_flag, &[("CATALOG", "yes")]).get("accession_cataloged"), None);
    }

    #[test]
    fn resource_type_keywords() {
        assert_eq!(resource_type("Smith Family Papers"), "papers");
        assert_eq!(resource_type("CITY RECORDS"), "records");
        assert_eq!(resource_type("Photo Collection"), "collection");
        assert_eq!(resource_type("Miscellany"), DEFAULT_RESOURCE_TYPE);
        // papers outranks records
        assert_eq!(resource_type("Records and Papers"), "papers");
    }

    #[test]
    fn date_assigned_strips_time() {
        let acc = run(date_assigned, &[("DATE_ASSIGNED", "03/14/2021T00:00:00")]);
        assert_eq!(acc.get("date_1_begin"), Some("03/14/2021"));
        assert_eq!(acc.get("date_1_type"), Some("single"));

        let acc = run(date_assigned, &[("DATE_ASSIGNED", "")]);
        assert_eq!(acc.get("date_1_begin"), None);
        assert_eq!(acc.get("date_1_type"), None);
    }

    #[test]
    fn mfnumber_forms() {
        assert_eq!(run(number_plain, &[("MFNUMBER", "12")]).get("accession_number_1"), Some("12"));
        assert_eq!(run(number_prefixed, &[("MFNUMBER", "12")]).get("accession_number_1"), Some("MF. 12"));
        assert_eq!(run(number_prefixed, &[]).get("accession_number_1"), None);
    }

    #[test]
    fn negative_requires_exact_y() {
        assert_eq!(run(negative, &[("NEGATIVE", "Y")]).get("accession_content_description"), Some("Negatives"));
        assert_eq!(run(negative, &[("NEGATIVE", "N")]).get("accession_content_description"), None);
    }

    #[test]
    fn constants_always_written() {
        let acc = run(language_constants, &[]);
        assert_eq!(acc.get("accession_language"), Some("eng"));
        assert_eq!(acc.get("lang_material_script"), Some("Latn"));
        assert_eq!(acc.get("date_1_label"), Some("Targeted"));
    }
}
