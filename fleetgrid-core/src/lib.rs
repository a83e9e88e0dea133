// Public modules
pub mod accessor;
pub mod classify;
pub mod controller;
pub mod error;
pub mod filtering;
pub mod grouping;
pub mod io;
pub mod models;
pub mod pagination;
pub mod render;
pub mod search;
pub mod sorting;
pub mod stats;

// Re-export commonly used types for convenience
pub use accessor::{is_present, resolve};
pub use classify::{as_number, as_timestamp, classify, display_text, fold_case, search_fold, typed, Typed, ValueKind};
pub use controller::{compute, RowKey, TableController, TableView, VisibleRow};
pub use error::Error;
pub use filtering::{apply_criteria, has_criteria, matches_criteria, parse_criteria, Criteria, Criterion};
pub use grouping::{group_by_field, sorted_group_names};
pub use io::{load_records, load_table_definition, parse_records, validate_definition, Diagnostic, LoadedRecords};
pub use models::{
    ColumnDescriptor, ColumnSpec, Direction, PageState, Record, RenderError, Renderer, Snapshot,
    SortState, TableDefinition, TableState,
};
pub use pagination::{clamp_page, page_numbers, paginate, total_pages, Page, PageItem, PAGE_WINDOW};
pub use render::{render_cell, render_row, Cell};
pub use search::{matches_search, search_indices, search_records};
pub use sorting::{compare, compare_by_keys, compare_values, sort_indices, sort_records, sort_records_by, SortKey};
pub use stats::{average, collection_stats, count_by, field_summary, CollectionStats, FieldSummary};
