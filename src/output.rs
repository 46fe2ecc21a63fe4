use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::MigrateError;
use crate::mapper::row::OutputRow;
use crate::template::TargetSchema;

const UTF8_BOM: &[u8] = "\u{feff}".as_bytes();

/// Write `rows` to `path` (overwriting), header first, in template column order.
pub fn write_rows(path: &Path, schema: &TargetSchema, rows: &[OutputRow]) -> Result<usize, MigrateError> {
    let written = replace_file(path, |file| {
        write_to(BufWriter::new(file), schema, rows).map_err(|e| match e {
            MigrateError::Io { source, .. } => MigrateError::io(path, source),
            other => other,
        })
    })?;
    debug!("Wrote {} rows to {}", written, path.display());
    Ok(written)
}

/// Fill a temp file beside `path`, then move it over `path`.
/// On error the temp file is removed and `path` is untouched.
fn replace_file<F>(path: &Path, fill: F) -> Result<usize, MigrateError>
where
    F: FnOnce(&File) -> Result<usize, MigrateError>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| MigrateError::io(path, e))?;
    let written = fill(tmp.as_file())?;
    tmp.persist(path).map_err(|e| MigrateError::io(path, e.error))?;
    Ok(written)
}

/// BOM, then the header row, then one record per row.
pub fn write_to<W: Write>(mut out: W, schema: &TargetSchema, rows: &[OutputRow]) -> Result<usize, MigrateError> {
    out.write_all(UTF8_BOM)
        .map_err(|e| MigrateError::io("<output>", e))?;
    let mut wtr = csv::WriterBuilder::new().from_writer(out);
    wtr.write_record(schema.columns())?;
    for row in rows {
        wtr.write_record(row.values())?;
    }
    wtr.flush().map_err(|e| MigrateError::io("<output>", e))?;
    Ok(rows.len())
}
