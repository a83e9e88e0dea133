use crate::accessor::resolve;
use crate::classify::display_text;
use crate::models::Record;
use serde_json::Value;
use std::collections::HashMap;

/// Group keys a value contributes: its text, or one key per element for
/// arrays. Absent values and empty strings contribute none.
pub(crate) fn group_keys(value: Option<&Value>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .flat_map(|item| group_keys(Some(item)))
            .collect(),
        Some(value) => {
            let key = display_text(value);
            if key.trim().is_empty() {
                Vec::new()
            } else {
                vec![key.into_owned()]
            }
        }
    }
}

/// Group records by a status-like field.
///
/// Records whose field is absent are left out entirely rather than collected
/// under a placeholder key. Records with an array value appear in the group
/// of each element.
pub fn group_by_field<'a>(records: &'a [Record], path: &str) -> HashMap<String, Vec<&'a Record>> {
    let mut groups: HashMap<String, Vec<&'a Record>> = HashMap::new();

    for record in records {
        for key in group_keys(resolve(record, path)) {
            groups.entry(key).or_default().push(record);
        }
    }

    groups
}

/// Get sorted group names from a grouped records map
pub fn sorted_group_names<T>(groups: &HashMap<String, T>) -> Vec<String> {
    let mut group_names: Vec<String> = groups.keys().cloned().collect();
    group_names.sort();
    group_names
}
