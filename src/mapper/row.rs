use std::collections::HashMap;

use crate::template::TargetSchema;

const APPEND_SEPARATOR: &str = "; ";

/// Working values for one record, keyed by target column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Accumulator {
    values: HashMap<&'static str, String>,
}

impl Accumulator {
    pub fn set(&mut self, column: &'static str, value: impl Into<String>) {
        self.values.insert(column, value.into());
    }

    /// Join `value` onto whatever the column already holds, separated by `"; "`.
    /// An empty `value` leaves the column untouched.
    pub fn append(&mut self, column: &'static str, value: &str) {
        if value.is_empty() {
            return;
        }
        match self.values.get_mut(column) {
            Some(current) if !current.is_empty() => {
                current.push_str(APPEND_SEPARATOR);
                current.push_str(value);
            }
            _ => {
                self.values.insert(column, value.to_string());
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// Columns that were set but have no slot in `schema`.
    pub fn dropped_by<'a>(&'a self, schema: &'a TargetSchema) -> impl Iterator<Item = &'static str> + 'a {
        self.values.keys().copied().filter(move |c| !schema.contains(c))
    }

    /// One value per schema column, in schema order; unset columns are `""`.
    pub fn finalize(self, schema: &TargetSchema) -> OutputRow {
        let values = schema
            .columns()
            .iter()
            .map(|c| {
                let v = self.values.get(c.as_str()).cloned().unwrap_or_default();
                (c.clone(), v)
            })
            .collect();
        OutputRow { values }
    }
}

/// A finished row. Holds exactly the schema's columns, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    values: Vec<(String, String)>,
}

impl OutputRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrite every cell named `column`. Unknown columns are ignored.
    pub fn replace(&mut self, column: &str, value: &str) {
        for (_, v) in self.values.iter_mut().filter(|(c, _)| c == column) {
            *v = value.to_string();
        }
    }

    #[cfg(test)]
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(_, v)| v.as_str())
    }

    pub fn non_empty(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(c, v)| (c.as_str(), v.as_str()))
    }
}
