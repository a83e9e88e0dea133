use fleetgrid_core::Error;
use std::io::ErrorKind;

/// Map an error from loading or filtering to user-friendly text.
/// Returns (title, message, details)
pub fn map_error(error: &anyhow::Error) -> (String, String, String) {
    match error.downcast_ref::<Error>() {
        Some(core) => map_core_error(core),
        None => (
            "Error".to_string(),
            error.to_string(),
            error
                .chain()
                .skip(1)
                .map(|cause| cause.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        ),
    }
}

fn map_core_error(error: &Error) -> (String, String, String) {
    match error {
        Error::Io { path, source } => match source.kind() {
            ErrorKind::NotFound => (
                "File Not Found".to_string(),
                "The file could not be found.".to_string(),
                format!(
                    "Path: {}\n\nPlease verify the file exists and you have permission to read it.",
                    path.display()
                ),
            ),
            ErrorKind::PermissionDenied => (
                "Permission Denied".to_string(),
                "Permission denied.".to_string(),
                format!("You don't have permission to read this file:\n{}", path.display()),
            ),
            _ => (
                "Error Loading File".to_string(),
                "Failed to read file.".to_string(),
                format!("Path: {}\n\n{}", path.display(), source),
            ),
        },
        Error::Json { path, source } => (
            "Invalid JSON".to_string(),
            "The file is not valid JSON.".to_string(),
            format!(
                "Path: {}\nLine {}, column {}: {}",
                path.display(),
                source.line(),
                source.column(),
                source
            ),
        ),
        Error::InvalidDefinition(problems) => (
            "Invalid Table Definition".to_string(),
            "The table definition has errors.".to_string(),
            problems
                .lines()
                .enumerate()
                .map(|(i, line)| format!("  {}. {}", i + 1, line))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Error::InvalidCriterion { criterion, reason } => (
            "Invalid Filter".to_string(),
            format!("Could not understand '{}'.", criterion),
            reason.clone(),
        ),
        Error::InvalidPattern { column, source } => (
            "Invalid Filter".to_string(),
            format!("The pattern for '{}' is not a valid regular expression.", column),
            source.to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use fleetgrid_core::{load_records, parse_criteria, validate_definition, TableDefinition};
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_missing_file() {
        let err = anyhow::Error::from(load_records("/nonexistent/fleet.json").unwrap_err());
        let (title, _, details) = map_error(&err);
        assert_eq!(title, "File Not Found");
        assert!(details.contains("/nonexistent/fleet.json"));
    }

    #[test]
    fn test_invalid_json_reports_position() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[{\"plate\": }]").unwrap();

        let err = anyhow::Error::from(load_records(file.path()).unwrap_err());
        let (title, _, details) = map_error(&err);
        assert_eq!(title, "Invalid JSON");
        assert!(details.contains("Line 1"));
    }

    #[test]
    fn test_definition_problems_are_numbered() {
        let definition: TableDefinition =
            serde_json::from_value(json!({"columns": [], "page_size": 0})).unwrap();
        let err = anyhow::Error::from(validate_definition(&definition).unwrap_err());

        let (title, _, details) = map_error(&err);
        assert_eq!(title, "Invalid Table Definition");
        assert!(details.contains("  1. "));
        assert!(details.contains("  2. "));
    }

    #[test]
    fn test_criteria_errors() {
        let err = anyhow::Error::from(parse_criteria(&["status".to_string()]).unwrap_err());
        let (title, message, _) = map_error(&err);
        assert_eq!(title, "Invalid Filter");
        assert!(message.contains("'status'"));

        let err = anyhow::Error::from(parse_criteria(&["vin/[".to_string()]).unwrap_err());
        let (_, message, _) = map_error(&err);
        assert!(message.contains("'vin'"));
    }

    #[test]
    fn test_context_does_not_hide_the_cause() {
        let err = load_records("/nonexistent/fleet.json")
            .context("loading records")
            .unwrap_err();
        let (title, _, _) = map_error(&err);
        assert_eq!(title, "File Not Found");
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = anyhow::anyhow!("something odd").context("while rendering");
        let (title, message, details) = map_error(&err);
        assert_eq!(title, "Error");
        assert_eq!(message, "while rendering");
        assert_eq!(details, "something odd");
    }
}
