use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use fleetgrid_core::{
    as_number, as_timestamp, display_text, resolve, ColumnDescriptor, ColumnSpec, Record,
    RenderError, TableDefinition,
};
use serde_json::Value;

/// Column formats understood by the console renderer.
pub const FORMATS: [&str; 3] = ["number", "date", "list"];

/// Build the column descriptors for a definition, attaching a renderer to
/// every column that names a format.
pub fn build_columns(definition: &TableDefinition) -> Result<Vec<ColumnDescriptor>> {
    definition.columns.iter().cloned().map(build_column).collect()
}

fn build_column(spec: ColumnSpec) -> Result<ColumnDescriptor> {
    let format = spec.format.clone();
    let accessor = spec.accessor.clone();
    let column = spec.into_descriptor();

    let Some(format) = format else {
        return Ok(column);
    };

    Ok(match format.as_str() {
        "number" => column.with_renderer(move |record: &Record| render_number(record, &accessor)),
        "date" => column.with_renderer(move |record: &Record| render_date(record, &accessor)),
        "list" => column.with_renderer(move |record: &Record| Ok(render_list(record, &accessor))),
        other => bail!(
            "column '{}' has unknown format '{}' (expected one of: {})",
            column.accessor,
            other,
            FORMATS.join(", ")
        ),
    })
}

fn render_number(record: &Record, accessor: &str) -> Result<String, RenderError> {
    let Some(value) = resolve(record, accessor) else {
        return Ok(String::new());
    };
    as_number(value)
        .map(format_number)
        .ok_or_else(|| RenderError(format!("'{}' is not a number", display_text(value))))
}

fn render_date(record: &Record, accessor: &str) -> Result<String, RenderError> {
    let Some(value) = resolve(record, accessor) else {
        return Ok(String::new());
    };
    as_timestamp(value)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .ok_or_else(|| RenderError(format!("'{}' is not a date", display_text(value))))
}

fn render_list(record: &Record, accessor: &str) -> String {
    match resolve(record, accessor) {
        Some(Value::Array(items)) => items
            .iter()
            .map(display_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(value) => display_text(value).into_owned(),
        None => String::new(),
    }
}

/// Whole numbers get thousands separators; anything else two decimals.
pub fn format_number(n: f64) -> String {
    if n.fract() != 0.0 || n.abs() >= 1e15 {
        return format!("{:.2}", n);
    }

    let digits = format!("{}", n.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0.0 {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetgrid_core::{render_cell, Cell};
    use serde_json::json;

    fn definition(columns: Value) -> TableDefinition {
        serde_json::from_value(json!({ "columns": columns })).unwrap()
    }

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(48250.0), "48,250");
        assert_eq!(format_number(-1234567.0), "-1,234,567");
        assert_eq!(format_number(12.5), "12.50");
    }

    #[test]
    fn test_number_and_date_columns() {
        let columns = build_columns(&definition(json!([
            {"accessor": "mileage", "format": "number"},
            {"accessor": "serviced", "format": "date"},
        ])))
        .unwrap();
        let vehicle = record(json!({"mileage": "48250", "serviced": "2024-03-01T09:30:00Z"}));

        assert_eq!(
            render_cell(&vehicle, &columns[0]),
            Cell::Rendered("48,250".to_string())
        );
        assert_eq!(
            render_cell(&vehicle, &columns[1]),
            Cell::Rendered("2024-03-01".to_string())
        );
    }

    #[test]
    fn test_bad_values_render_empty() {
        let columns = build_columns(&definition(json!([
            {"accessor": "mileage", "format": "number"},
            {"accessor": "serviced", "format": "date"},
        ])))
        .unwrap();
        let vehicle = record(json!({"mileage": "lots", "serviced": "soon"}));

        assert!(render_cell(&vehicle, &columns[0]).is_empty());
        assert!(render_cell(&vehicle, &columns[1]).is_empty());
    }

    #[test]
    fn test_list_column() {
        let columns = build_columns(&definition(json!([
            {"accessor": "tags", "format": "list"},
        ])))
        .unwrap();

        let tagged = record(json!({"tags": ["urgent", null, "depot-2"]}));
        assert_eq!(
            render_cell(&tagged, &columns[0]),
            Cell::Rendered("urgent, depot-2".to_string())
        );

        let single = record(json!({"tags": "urgent"}));
        assert_eq!(
            render_cell(&single, &columns[0]),
            Cell::Rendered("urgent".to_string())
        );
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let err = build_columns(&definition(json!([
            {"accessor": "plate", "format": "currency"},
        ])))
        .unwrap_err();
        assert!(err.to_string().contains("unknown format 'currency'"));
    }

    #[test]
    fn test_plain_columns_have_no_renderer() {
        let columns = build_columns(&definition(json!([
            {"accessor": "plate", "header": "Plate"},
        ])))
        .unwrap();
        assert!(columns[0].renderer.is_none());
        assert_eq!(columns[0].header, "Plate");
    }
}
