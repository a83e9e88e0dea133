use crate::models::Record;
use serde_json::Value;

/// Resolve a dot-separated accessor path against a record.
///
/// Returns `None` (absent) as soon as a segment is missing or the value walked
/// so far is not a container. JSON `null` is reported as absent too, so
/// callers only ever deal with one kind of missing value. Numeric segments
/// index into arrays.
pub fn resolve<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = record.fields().get(first)?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    match current {
        Value::Null => None,
        value => Some(value),
    }
}

/// Whether the path resolves to a present value.
pub fn is_present(record: &Record, path: &str) -> bool {
    resolve(record, path).is_some()
}
