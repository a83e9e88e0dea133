//! Rendering boundary between the table engine and whatever draws it.
//!
//! A column either shows the raw value at its accessor path or hands the
//! whole record to a custom renderer. Renderer failures are contained here:
//! the failing cell comes back empty and the rest of the row still renders.

use crate::accessor::resolve;
use crate::models::{ColumnDescriptor, Record};
use serde_json::Value;
use tracing::warn;

/// Content of one rendered cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a, D> {
    /// Raw value at the column's accessor path.
    Value(&'a Value),
    /// Output of the column's custom renderer.
    Rendered(D),
    /// Absent value, or a renderer that failed.
    Empty,
}

impl<D> Cell<'_, D> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Render one cell of `record` for `column`.
pub fn render_cell<'a, D>(record: &'a Record, column: &ColumnDescriptor<D>) -> Cell<'a, D> {
    match &column.renderer {
        Some(render) => match render(record) {
            Ok(display) => Cell::Rendered(display),
            Err(err) => {
                warn!(column = %column.accessor, error = %err, "cell renderer failed");
                Cell::Empty
            }
        },
        None => resolve(record, &column.accessor).map_or(Cell::Empty, Cell::Value),
    }
}

/// Render every column of `record`, in column order.
pub fn render_row<'a, D>(record: &'a Record, columns: &[ColumnDescriptor<D>]) -> Vec<Cell<'a, D>> {
    columns
        .iter()
        .map(|column| render_cell(record, column))
        .collect()
}
