use colored::Colorize;
use fleetgrid_core::{
    display_text, render_row, Cell, CollectionStats, ColumnDescriptor, Direction, FieldSummary,
    PageItem, Record, SortState, TableState, TableView,
};
use std::collections::HashMap;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a column is allowed to grow before its cells are truncated.
pub const MAX_COLUMN_WIDTH: usize = 32;

const COLUMN_GAP: &str = "  ";

/// Display text of a rendered cell.
pub fn cell_text(cell: &Cell<'_, String>) -> String {
    match cell {
        Cell::Value(value) => display_text(value).into_owned(),
        Cell::Rendered(text) => text.clone(),
        Cell::Empty => String::new(),
    }
}

/// Truncate `text` to `width` terminal columns, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Left-align `text` in a cell exactly `width` terminal columns wide.
pub fn pad(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn sort_indicator(sort: &SortState, accessor: &str) -> &'static str {
    match (&sort.key, sort.direction) {
        (Some(key), Direction::Asc) if key == accessor => " ▲",
        (Some(key), Direction::Desc) if key == accessor => " ▼",
        _ => "",
    }
}

/// Render the visible page as an aligned text table.
pub fn format_table(columns: &[ColumnDescriptor], view: &TableView<'_>, sort: &SortState) -> String {
    if columns.is_empty() {
        return "No columns defined.".dimmed().to_string();
    }

    let headers: Vec<String> = columns
        .iter()
        .map(|c| format!("{}{}", c.header, sort_indicator(sort, &c.accessor)))
        .collect();
    let rows: Vec<Vec<String>> = view
        .visible_rows
        .iter()
        .map(|row| render_row(row.record, columns).iter().map(cell_text).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row[idx].width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(
        headers
            .iter()
            .zip(&widths)
            .map(|(header, &width)| pad(header, width).bold().to_string())
            .collect::<Vec<_>>()
            .join(COLUMN_GAP),
    );
    lines.push(
        widths
            .iter()
            .map(|&width| "─".repeat(width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP)
            .dimmed()
            .to_string(),
    );

    if rows.is_empty() {
        lines.push("No matching records.".dimmed().to_string());
    }
    for row in &rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(text, &width)| pad(text, width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

/// Page links, with the current page highlighted.
pub fn format_page_nav(items: &[PageItem], current_page: usize) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(n) if *n == current_page => format!("[{}]", n).bold().cyan().to_string(),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => item.to_string().dimmed().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One-line summary of what the view is showing.
pub fn format_status(view: &TableView<'_>, state: &TableState, total_records: usize) -> String {
    let mut parts = Vec::new();

    if view.is_empty() {
        parts.push(format!("No records of {}", total_records));
    } else {
        let first = (view.clamped_page - 1) * state.page.page_size + 1;
        let last = first + view.visible_rows.len() - 1;
        let mut shown = format!("Showing {}-{} of {}", first, last, view.total_filtered);
        if view.total_filtered != total_records {
            shown.push_str(&format!(" (filtered from {})", total_records));
        }
        parts.push(shown);
    }

    parts.push(format!("page {}/{}", view.clamped_page, view.total_pages));

    if !state.search.trim().is_empty() {
        parts.push(format!("search \"{}\"", state.search));
    }
    if let Some(key) = &state.sort.key {
        parts.push(format!("sort {}{}", key, sort_indicator(&state.sort, key)));
    }

    parts.join(" · ").dimmed().to_string()
}

fn row_label(record: &Record, columns: &[ColumnDescriptor]) -> String {
    record.id().unwrap_or_else(|| {
        columns
            .first()
            .and_then(|c| render_row(record, std::slice::from_ref(c)).first().map(cell_text))
            .unwrap_or_default()
    })
}

/// Records listed under each group, groups in name order.
pub fn format_groups(
    groups: &HashMap<String, Vec<&Record>>,
    names: &[String],
    field: &str,
    columns: &[ColumnDescriptor],
) -> String {
    let mut out = format!("{} {}\n", "Grouped by".bold(), field);

    if names.is_empty() {
        out.push_str(&format!("{}\n", "No records have a value here.".dimmed()));
        return out;
    }

    for name in names {
        let members = groups.get(name).map(Vec::as_slice).unwrap_or_default();
        out.push_str(&format!("\n{} ({})\n", name.bold().green(), members.len()));
        for record in members {
            out.push_str(&format!("  • {}\n", row_label(record, columns)));
        }
    }
    out
}

/// Status counts and the numeric summary.
pub fn format_stats(stats: &CollectionStats, status_field: &str, summary: Option<(&str, &FieldSummary)>) -> String {
    let mut out = format!("{} {}\n", "Total records:".bold(), stats.total);

    out.push_str(&format!("{} {}\n", "By".bold(), status_field));
    if stats.by_status.is_empty() {
        out.push_str(&format!("  {}\n", "none".dimmed()));
    }
    for (status, count) in &stats.by_status {
        out.push_str(&format!("  {:<20} {}\n", status, count));
    }

    if let Some((field, summary)) = summary {
        out.push_str(&format!(
            "{} {}: count {}, mean {:.2}",
            "Numeric".bold(),
            field,
            summary.count,
            summary.mean
        ));
        if let (Some(min), Some(max)) = (summary.min, summary.max) {
            out.push_str(&format!(", min {}, max {}", min, max));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetgrid_core::{collection_stats, field_summary, group_by_field, sorted_group_names, TableController};
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<Record> {
        values.into_iter().filter_map(Record::from_value).collect()
    }

    fn fleet() -> Vec<Record> {
        records(vec![
            json!({"id": "v1", "plate": "AB-123", "status": "active", "mileage": 48250}),
            json!({"id": "v2", "plate": "CD-456", "status": "retired", "mileage": 120000}),
            json!({"id": "v3", "plate": "EF-789", "status": "active"}),
        ])
    }

    fn controller() -> TableController {
        TableController::new(vec![
            ColumnDescriptor::new("plate").with_header("Plate"),
            ColumnDescriptor::new("status").with_header("Status"),
        ])
        .with_records(fleet())
    }

    #[test]
    fn test_truncate_and_pad() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long plate", 6), "a lon…");
        assert_eq!(truncate("anything", 0), "");
        assert_eq!(pad("ab", 4), "ab  ");
        // Wide characters count double
        assert_eq!(truncate("車両管理", 5), "車両…");
        assert_eq!(pad("車", 3).width(), 3);
    }

    #[test]
    fn test_table_shows_headers_and_rows() {
        let mut controller = controller();
        controller.request_sort("plate");
        let table = format_table(controller.columns(), &controller.view(), &controller.state().sort);

        assert!(table.contains("Plate ▲"));
        assert!(table.contains("AB-123"));
        assert!(table.contains("EF-789"));
        let ab = table.find("AB-123").unwrap();
        let cd = table.find("CD-456").unwrap();
        assert!(ab < cd);
    }

    #[test]
    fn test_empty_view_says_so() {
        let mut controller = controller();
        controller.set_search("zz-no-match");
        let view = controller.view();

        let table = format_table(controller.columns(), &view, &controller.state().sort);
        assert!(table.contains("No matching records."));

        let status = format_status(&view, controller.state(), 3);
        assert!(status.contains("No records of 3"));
        assert!(status.contains("page 1/1"));
    }

    #[test]
    fn test_status_line() {
        let mut controller = controller();
        controller.set_page_size(2);
        controller.go_to_page(2);
        let status = format_status(&controller.view(), controller.state(), 3);
        assert!(status.contains("Showing 3-3 of 3"));
        assert!(status.contains("page 2/2"));

        controller.set_search("active");
        let status = format_status(&controller.view(), controller.state(), 3);
        assert!(status.contains("Showing 1-2 of 2 (filtered from 3)"));
        assert!(status.contains("search \"active\""));
    }

    #[test]
    fn test_page_nav_marks_current_page() {
        let items = vec![PageItem::Page(1), PageItem::Ellipsis, PageItem::Page(4), PageItem::Page(5)];
        let nav = format_page_nav(&items, 4);
        assert!(nav.contains("[4]"));
        assert!(nav.contains('…'));
        assert!(!nav.contains("[1]"));
    }

    #[test]
    fn test_groups_and_stats() {
        let data = fleet();
        let columns = vec![ColumnDescriptor::new("plate")];
        let groups = group_by_field(&data, "status");
        let names = sorted_group_names(&groups);
        let text = format_groups(&groups, &names, "status", &columns);
        assert!(text.contains("active"));
        assert!(text.contains("(2)"));
        assert!(text.contains("• v2"));

        let stats = collection_stats(&data, "status", "mileage");
        let summary = field_summary(&data, "mileage");
        let text = format_stats(&stats, "status", Some(("mileage", &summary)));
        assert!(text.contains("Total records:"));
        assert!(text.contains("retired"));
        assert!(text.contains("mean 84125.00"));
        assert!(text.contains("min 48250, max 120000"));
    }
}
