use std::sync::LazyLock;

use chrono::{Datelike, Month, NaiveDate};
use regex::Regex;
use tracing::{debug, warn};

use crate::mapper::row::OutputRow;

pub const DATE_COLUMN: &str = "date_1_begin";

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[ T].*)?$").unwrap());
static US_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})(?:\s.*)?$").unwrap());
static US_SHORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2})$").unwrap());
static COMPACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap());
static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)\.?,?\s+(\d{4})$").unwrap());
// Month-name layouts must end in a full year, otherwise %d/%Y split the digits.
static TEXT_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d]\d{4}$").unwrap());

/// Month-name layouts handed to chrono after dots are dropped.
const TEXT_FORMATS: &[&str] = &[
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
];

/// Parse a loosely formatted date. Numeric forms are month-first unless the year leads.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(c) = ISO_RE.captures(s).or_else(|| COMPACT_RE.captures(s)) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = US_RE.captures(s) {
        return ymd(&c[3], &c[1], &c[2]);
    }
    if let Some(c) = US_SHORT_RE.captures(s) {
        let yy: i32 = c[3].parse().ok()?;
        let year = if yy < 69 { 2000 + yy } else { 1900 + yy };
        return ymd(&year.to_string(), &c[1], &c[2]);
    }
    // "March 2021" → first of the month
    if let Some(c) = MONTH_YEAR_RE.captures(s) {
        let month = c[1].parse::<Month>().ok()?;
        return NaiveDate::from_ymd_opt(c[2].parse().ok()?, month.number_from_month(), 1);
    }
    if !TEXT_YEAR_RE.is_match(s) {
        return None;
    }
    let cleaned = s.replace('.', "");
    TEXT_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&cleaned, f).ok())
        .filter(|d| d.year() >= 1000)
}

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

/// `YYYY-MM-DD`, or `""` when the value is not a recognizable date.
pub fn normalize(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Rewrite `column` in every row to ISO form. Unparseable values become blank.
/// Returns how many non-empty cells were blanked.
pub fn normalize_column(rows: &mut [OutputRow], column: &str) -> usize {
    let mut blanked = 0;
    for row in rows.iter_mut() {
        let Some(current) = row.get(column) else {
            continue;
        };
        let normalized = normalize(current);
        if normalized.is_empty() && !current.trim().is_empty() {
            debug!(value = current, "unparseable date blanked");
            blanked += 1;
        }
        row.replace(column, &normalized);
    }
    if blanked > 0 {
        warn!("{} {} value(s) could not be parsed and were left blank", blanked, column);
    }
    blanked
}
