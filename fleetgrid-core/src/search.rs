use crate::accessor::resolve;
use crate::classify::{display_text, search_fold};
use crate::models::{ColumnDescriptor, Record};

/// Prepared, case-folded search needle. `None` when the query is blank.
fn needle(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(search_fold(trimmed))
    }
}

fn matches_needle<D>(record: &Record, needle: &str, columns: &[ColumnDescriptor<D>]) -> bool {
    columns
        .iter()
        .filter(|column| column.searchable)
        .filter_map(|column| resolve(record, &column.accessor))
        .any(|value| search_fold(&display_text(value)).contains(needle))
}

/// Check whether a single record matches the search query.
///
/// A blank query matches everything. Absent values never match.
pub fn matches_search<D>(record: &Record, query: &str, columns: &[ColumnDescriptor<D>]) -> bool {
    match needle(query) {
        Some(needle) => matches_needle(record, &needle, columns),
        None => true,
    }
}

/// Positions of the records retained by the search, in source order.
pub fn search_indices<D>(
    records: &[Record],
    query: &str,
    columns: &[ColumnDescriptor<D>],
) -> Vec<usize> {
    let Some(needle) = needle(query) else {
        return (0..records.len()).collect();
    };

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| matches_needle(record, &needle, columns))
        .map(|(idx, _)| idx)
        .collect()
}

/// Retain the records for which at least one searchable column contains the
/// query, case-insensitively.
pub fn search_records<'a, D>(
    records: &'a [Record],
    query: &str,
    columns: &[ColumnDescriptor<D>],
) -> Vec<&'a Record> {
    search_indices(records, query, columns)
        .into_iter()
        .map(|idx| &records[idx])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<Record> {
        values.into_iter().filter_map(Record::from_value).collect()
    }

    fn names() -> Vec<Record> {
        records(vec![
            json!({"name": "John Doe"}),
            json!({"name": "Jane Smith"}),
            json!({"name": "Bob Johnson"}),
        ])
    }

    fn columns(paths: &[&str]) -> Vec<ColumnDescriptor> {
        paths.iter().map(|p| ColumnDescriptor::new(*p)).collect()
    }

    #[test]
    fn test_search_single_match() {
        let data = names();
        let found = search_records(&data, "jane", &columns(&["name"]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fields()["name"], "Jane Smith");
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let data = names();
        let found = search_records(&data, "  JOHN ", &columns(&["name"]));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_blank_query_keeps_everything() {
        let data = names();
        assert_eq!(search_records(&data, "", &columns(&["name"])).len(), 3);
        assert_eq!(search_records(&data, "   ", &columns(&["name"])).len(), 3);
        assert_eq!(search_indices(&data, "\t", &columns(&["name"])), vec![0, 1, 2]);
    }

    #[test]
    fn test_unsearchable_columns_are_skipped() {
        let data = records(vec![
            json!({"name": "Van 1", "notes": "needs brakes"}),
            json!({"name": "Van 2", "notes": "ok"}),
        ]);
        let cols = vec![
            ColumnDescriptor::<String>::new("name"),
            ColumnDescriptor::new("notes").searchable(false),
        ];
        assert!(search_records(&data, "brakes", &cols).is_empty());
    }

    #[test]
    fn test_absent_values_never_match() {
        let data = records(vec![json!({"name": "Truck"}), json!({"other": 1})]);
        let found = search_records(&data, "truck", &columns(&["name", "driver.name"]));
        assert_eq!(found.len(), 1);
        assert!(!matches_search(&data[1], "x", &columns(&["name"])));
    }

    #[test]
    fn test_search_numbers_and_nested_fields() {
        let data = records(vec![
            json!({"plate": "AB-1", "odometer": 120500, "driver": {"name": "Ann"}}),
            json!({"plate": "CD-2", "odometer": 900, "driver": {"name": "Bo"}}),
        ]);
        let cols = columns(&["plate", "odometer", "driver.name"]);
        assert_eq!(search_indices(&data, "205", &cols), vec![0]);
        assert_eq!(search_indices(&data, "bo", &cols), vec![1]);
    }

    #[test]
    fn test_accents_are_not_dropped() {
        let data = records(vec![json!({"make": "\u{160}koda"}), json!({"make": "Caf\u{e9}"})]);
        let cols = columns(&["make"]);
        assert!(search_indices(&data, "skoda", &cols).is_empty());
        assert!(search_indices(&data, "cafe", &cols).is_empty());
        assert!(search_indices(&data, "e", &cols).is_empty());
        assert_eq!(search_indices(&data, "CAF\u{c9}", &cols), vec![1]);
        // decomposed query against composed text
        assert_eq!(search_indices(&data, "s\u{30c}koda", &cols), vec![0]);
        assert_eq!(search_indices(&data, "cafe\u{301}", &cols), vec![1]);
    }
}
