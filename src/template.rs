use std::path::Path;

use tracing::info;

use crate::error::MigrateError;

/// Ordered output columns, taken from the template's header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSchema {
    columns: Vec<String>,
}

impl TargetSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TargetSchema {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }
}

/// Read only the header row of the template CSV.
pub fn read_schema(path: &Path) -> Result<TargetSchema, MigrateError> {
    let file = std::fs::File::open(path).map_err(|e| MigrateError::io(path, e))?;
    let schema = schema_from_reader(file).map_err(|e| match e {
        MigrateError::MissingHeader(_) => MigrateError::MissingHeader(path.to_path_buf()),
        other => other,
    })?;
    info!("Template columns: {}", schema.len());
    Ok(schema)
}

pub fn schema_from_reader<R: std::io::Read>(reader: R) -> Result<TargetSchema, MigrateError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?;
    if headers.is_empty() {
        return Err(MigrateError::MissingHeader("<reader>".into()));
    }
    let columns = headers.iter().enumerate().map(|(i, h)| {
        if i == 0 {
            h.trim_start_matches('\u{feff}').to_string()
        } else {
            h.to_string()
        }
    });
    Ok(TargetSchema::new(columns))
}
