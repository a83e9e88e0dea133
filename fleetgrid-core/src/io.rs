use crate::error::{Error, Result};
use crate::models::{Record, TableDefinition};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Non-fatal problem found while reading a record snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The source was not an array of records; `found` names what it was.
    NotAnArray { found: &'static str },
    /// An array element was not an object and was skipped.
    SkippedElement { index: usize, found: &'static str },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NotAnArray { found } => {
                write!(f, "record source is {} rather than an array; showing no data", found)
            }
            Diagnostic::SkippedElement { index, found } => {
                write!(f, "record #{} is {} rather than an object; skipped", index + 1, found)
            }
        }
    }
}

/// Records read from a snapshot together with anything that had to be
/// dropped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedRecords {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turn a raw snapshot into records.
///
/// Accepts an array of objects, or an object wrapping one under `records`.
/// Anything else yields no records and a diagnostic, never an error.
pub fn parse_records(source: Value) -> (Vec<Record>, Vec<Diagnostic>) {
    let items = match source {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return (Vec::new(), vec![Diagnostic::NotAnArray { found: kind_name(&other) }])
            }
            None => return (Vec::new(), vec![Diagnostic::NotAnArray { found: "an object" }]),
        },
        other => return (Vec::new(), vec![Diagnostic::NotAnArray { found: kind_name(&other) }]),
    };

    let mut records = Vec::with_capacity(items.len());
    let mut diagnostics = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let found = kind_name(&item);
        match Record::from_value(item) {
            Some(record) => records.push(record),
            None => diagnostics.push(Diagnostic::SkippedElement { index, found }),
        }
    }

    (records, diagnostics)
}

fn read_json<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a record snapshot from a JSON file.
///
/// Only unreadable files and invalid JSON are errors; a well-formed file of
/// the wrong shape loads as an empty snapshot with diagnostics.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<LoadedRecords> {
    let path = path.as_ref();
    let (records, diagnostics) = parse_records(read_json(path)?);

    for diagnostic in &diagnostics {
        warn!(path = %path.display(), %diagnostic, "record snapshot diagnostic");
    }
    info!(path = %path.display(), records = records.len(), "loaded record snapshot");

    Ok(LoadedRecords {
        records,
        diagnostics,
    })
}

/// Load and validate a table definition from a JSON file.
pub fn load_table_definition<P: AsRef<Path>>(path: P) -> Result<TableDefinition> {
    let path = path.as_ref();
    let definition: TableDefinition =
        serde_json::from_value(read_json(path)?).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
    validate_definition(&definition)?;
    Ok(definition)
}

/// Check a table definition for problems a renderer could not recover from.
///
/// Every problem is reported at once, one per line.
pub fn validate_definition(definition: &TableDefinition) -> Result<()> {
    let mut errors = Vec::new();

    if definition.columns.is_empty() {
        errors.push("at least one column must be defined".to_string());
    }
    if definition.page_size == 0 {
        errors.push("page_size must be at least 1".to_string());
    }

    let mut seen = HashSet::new();
    for (idx, column) in definition.columns.iter().enumerate() {
        let accessor = column.accessor.trim();
        if accessor.is_empty() {
            errors.push(format!("column #{}: accessor cannot be empty", idx + 1));
        } else if accessor.split('.').any(str::is_empty) {
            errors.push(format!(
                "column #{} ('{}'): accessor has an empty path segment",
                idx + 1,
                column.accessor
            ));
        }
        if !seen.insert(column.accessor.as_str()) {
            errors.push(format!(
                "column #{} ('{}'): duplicate accessor",
                idx + 1,
                column.accessor
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidDefinition(errors.join("\n")))
    }
}
