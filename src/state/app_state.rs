use crate::ui::build_columns;
use anyhow::{Context, Result};
use fleetgrid_core::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything the console front-end keeps between commands.
pub struct AppState {
    /// Record snapshot file
    pub records_file: PathBuf,
    /// Table definition file, if one was given
    pub table_file: Option<PathBuf>,
    /// Active definition, loaded or inferred from the records
    pub definition: TableDefinition,
    /// Structured filters applied before the controller sees the records
    pub criteria: Criteria,
    /// Every record from the snapshot file, before criteria
    pub all_records: Vec<Record>,
    /// Problems found while reading the snapshot
    pub diagnostics: Vec<Diagnostic>,
    pub controller: TableController,
}

impl AppState {
    /// Load a record snapshot and, optionally, a table definition.
    pub fn load(records_file: PathBuf, table_file: Option<PathBuf>, criteria: Criteria) -> Result<Self> {
        let loaded = load_records(&records_file)?;
        let definition = read_definition(table_file.as_deref(), &loaded.records)?;
        let columns = build_columns(&definition)
            .with_context(|| format!("building columns for {}", records_file.display()))?;

        let mut state = Self {
            records_file,
            table_file,
            definition,
            criteria,
            all_records: loaded.records,
            diagnostics: loaded.diagnostics,
            controller: TableController::new(columns),
        };
        state.controller.set_page_size(state.definition.page_size);
        state.publish();
        Ok(state)
    }

    /// Re-read both files, keeping search, sort and page.
    pub fn reload(&mut self) -> Result<()> {
        let loaded = load_records(&self.records_file)?;
        let definition = read_definition(self.table_file.as_deref(), &loaded.records)?;
        let columns = build_columns(&definition)?;

        let table_state = self.controller.state().clone();
        self.controller = TableController::new(columns);
        self.controller.set_state(table_state);
        self.definition = definition;
        self.all_records = loaded.records;
        self.diagnostics = loaded.diagnostics;
        self.publish();

        info!(path = %self.records_file.display(), "reloaded");
        Ok(())
    }

    /// Replace the structured filters and republish the filtered snapshot.
    pub fn set_criteria(&mut self, criteria: Criteria) {
        self.criteria = criteria;
        self.publish();
    }

    /// Records that pass the criteria, as handed to the controller.
    pub fn filtered_records(&self) -> &[Record] {
        self.controller.records()
    }

    /// Field used for grouping and counts: the definition's status field,
    /// falling back to `status`.
    pub fn status_field(&self) -> &str {
        self.definition.status_field.as_deref().unwrap_or("status")
    }

    /// Field averaged in the statistics summary, if any.
    pub fn average_field(&self) -> Option<&str> {
        self.definition.average_field.as_deref()
    }

    fn publish(&mut self) {
        let filtered: Vec<Record> = apply_criteria(&self.all_records, &self.criteria)
            .into_iter()
            .cloned()
            .collect();
        self.controller.set_records(filtered);
    }
}

/// The definition file if one was given, otherwise columns inferred from the
/// records. An empty or malformed snapshot infers no columns and renders as
/// an empty table.
fn read_definition(table_file: Option<&Path>, records: &[Record]) -> Result<TableDefinition> {
    match table_file {
        Some(path) => Ok(load_table_definition(path)?),
        None => {
            let definition = TableDefinition::infer(records);
            if definition.columns.is_empty() {
                warn!("no columns to infer; showing an empty table");
            }
            Ok(definition)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_json(value: serde_json::Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(value.to_string().as_bytes()).unwrap();
        file
    }

    fn fleet_file() -> tempfile::NamedTempFile {
        write_json(json!([
            {"id": "v1", "plate": "AB-123", "status": "active", "mileage": 48250},
            {"id": "v2", "plate": "CD-456", "status": "retired", "mileage": 120000},
            {"id": "v3", "plate": "EF-789", "status": "active", "mileage": 9000},
            "not a record"
        ]))
    }

    #[test]
    fn test_load_infers_columns() {
        let file = fleet_file();
        let state = AppState::load(file.path().to_path_buf(), None, Criteria::new()).unwrap();

        let accessors: Vec<&str> = state.controller.columns().iter().map(|c| c.accessor.as_str()).collect();
        assert_eq!(accessors, vec!["id", "mileage", "plate", "status"]);
        assert_eq!(state.all_records.len(), 3);
        assert_eq!(state.diagnostics.len(), 1);
        assert_eq!(state.controller.view().total_filtered, 3);
        assert_eq!(state.status_field(), "status");
    }

    #[test]
    fn test_load_with_definition() {
        let records = fleet_file();
        let table = write_json(json!({
            "columns": [
                {"accessor": "plate", "header": "Plate"},
                {"accessor": "mileage", "format": "number", "searchable": false}
            ],
            "page_size": 2,
            "status_field": "status",
            "average_field": "mileage"
        }));
        let state = AppState::load(
            records.path().to_path_buf(),
            Some(table.path().to_path_buf()),
            Criteria::new(),
        )
        .unwrap();

        assert_eq!(state.controller.columns().len(), 2);
        assert_eq!(state.controller.state().page.page_size, 2);
        assert_eq!(state.controller.view().total_pages, 2);
        assert_eq!(state.average_field(), Some("mileage"));
    }

    #[test]
    fn test_criteria_narrow_the_snapshot() {
        let file = fleet_file();
        let criteria = parse_criteria(&["status=retired".to_string()]).unwrap();
        let mut state = AppState::load(file.path().to_path_buf(), None, criteria).unwrap();

        assert_eq!(state.filtered_records().len(), 1);
        assert_eq!(state.all_records.len(), 3);

        state.set_criteria(Criteria::new());
        assert_eq!(state.filtered_records().len(), 3);
    }

    #[test]
    fn test_reload_keeps_table_state() {
        let file = fleet_file();
        let mut state = AppState::load(file.path().to_path_buf(), None, Criteria::new()).unwrap();
        state.controller.set_search("active");
        state.controller.request_sort("plate");

        state.reload().unwrap();
        assert_eq!(state.controller.state().search, "active");
        assert_eq!(state.controller.state().sort, SortState::asc("plate"));
        assert_eq!(state.controller.view().total_filtered, 2);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = AppState::load(PathBuf::from("/nonexistent/fleet.json"), None, Criteria::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_snapshot_shows_empty_table() {
        let file = write_json(json!({"error": "storage unavailable"}));
        let state = AppState::load(file.path().to_path_buf(), None, Criteria::new()).unwrap();

        assert!(state.controller.columns().is_empty());
        assert!(state.all_records.is_empty());
        assert_eq!(state.diagnostics.len(), 1);

        let view = state.controller.view();
        assert!(view.is_empty());
        assert_eq!(view.total_filtered, 0);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.clamped_page, 1);
    }

    #[test]
    fn test_empty_snapshot_shows_empty_table() {
        let file = write_json(json!([]));
        let mut state = AppState::load(file.path().to_path_buf(), None, Criteria::new()).unwrap();

        assert!(state.diagnostics.is_empty());
        assert!(state.controller.view().is_empty());

        state.controller.set_search("anything");
        state.controller.go_to_page(4);
        assert_eq!(state.controller.view().clamped_page, 1);
    }
}
