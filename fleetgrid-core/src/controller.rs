use crate::io::{parse_records, Diagnostic};
use crate::models::{ColumnDescriptor, PageState, Record, Snapshot, TableDefinition, TableState};
use crate::pagination::{page_numbers, page_range, PageItem};
use crate::search::search_indices;
use crate::sorting::sort_indices;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identity of a rendered row: the record's `id`, or its position on the
/// page when it has none. Positions are only stable within one render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RowKey {
    Id(String),
    Position(usize),
}

/// A record on the current page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleRow<'a> {
    pub key: RowKey,
    /// Position of the record in the source snapshot.
    pub source_index: usize,
    pub record: &'a Record,
}

/// Derived view published after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView<'a> {
    pub visible_rows: Vec<VisibleRow<'a>>,
    pub total_filtered: usize,
    pub total_pages: usize,
    pub clamped_page: usize,
}

impl TableView<'_> {
    pub fn page_numbers(&self) -> Vec<PageItem> {
        page_numbers(self.total_pages, self.clamped_page)
    }

    pub fn is_empty(&self) -> bool {
        self.visible_rows.is_empty()
    }
}

/// Positions making up a view, independent of the snapshot's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewIndex {
    visible: Vec<usize>,
    total_filtered: usize,
    total_pages: usize,
    clamped_page: usize,
}

impl ViewIndex {
    fn build<D>(records: &[Record], columns: &[ColumnDescriptor<D>], state: &TableState) -> Self {
        let mut matched = search_indices(records, &state.search, columns);
        sort_indices(records, &mut matched, &state.sort);
        let (range, total_pages, clamped_page) = page_range(matched.len(), &state.page);

        Self {
            total_filtered: matched.len(),
            visible: matched[range].to_vec(),
            total_pages,
            clamped_page,
        }
    }

    fn view<'a>(&self, records: &'a [Record]) -> TableView<'a> {
        let visible_rows = self
            .visible
            .iter()
            .enumerate()
            .map(|(position, &source_index)| {
                let record = &records[source_index];
                VisibleRow {
                    key: record
                        .id()
                        .map_or(RowKey::Position(position), RowKey::Id),
                    source_index,
                    record,
                }
            })
            .collect();

        TableView {
            visible_rows,
            total_filtered: self.total_filtered,
            total_pages: self.total_pages,
            clamped_page: self.clamped_page,
        }
    }
}

/// Run the full pipeline once: search, then sort, then paginate.
pub fn compute<'a, D>(
    records: &'a [Record],
    columns: &[ColumnDescriptor<D>],
    state: &TableState,
) -> TableView<'a> {
    ViewIndex::build(records, columns, state).view(records)
}

/// Owns the column schema, the current record snapshot and the table state,
/// and keeps the derived view in step with them.
///
/// Every mutator replaces the state and recomputes the view from scratch.
/// The only reuse is when the (snapshot, state) pair is exactly unchanged.
pub struct TableController<D = String> {
    columns: Vec<ColumnDescriptor<D>>,
    records: Snapshot,
    generation: u64,
    state: TableState,
    index: ViewIndex,
    computed_for: Option<(u64, TableState)>,
    diagnostics: Vec<Diagnostic>,
}

impl<D> TableController<D> {
    pub fn new(columns: Vec<ColumnDescriptor<D>>) -> Self {
        let mut controller = Self {
            columns,
            records: Arc::from(Vec::new()),
            generation: 0,
            state: TableState::default(),
            index: ViewIndex::default(),
            computed_for: None,
            diagnostics: Vec::new(),
        };
        controller.refresh();
        controller
    }

    /// Controller for a table definition, starting at its page size.
    pub fn from_definition(definition: &TableDefinition) -> Self {
        let mut controller = Self::new(definition.descriptors());
        controller.set_page_size(definition.page_size);
        controller
    }

    pub fn with_records(mut self, records: impl Into<Snapshot>) -> Self {
        self.set_records(records);
        self
    }

    pub fn columns(&self) -> &[ColumnDescriptor<D>] {
        &self.columns
    }

    pub fn records(&self) -> &Snapshot {
        &self.records
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    /// Problems found in the most recent snapshot supplied as raw JSON.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn view(&self) -> TableView<'_> {
        self.index.view(&self.records)
    }

    pub fn page_numbers(&self) -> Vec<PageItem> {
        page_numbers(self.index.total_pages, self.index.clamped_page)
    }

    /// Replace the record snapshot.
    pub fn set_records(&mut self, records: impl Into<Snapshot>) {
        self.records = records.into();
        self.generation += 1;
        self.diagnostics.clear();
        self.refresh();
    }

    /// Replace the snapshot from raw JSON. Anything other than an array of
    /// objects degrades to the usable part (possibly nothing) plus
    /// diagnostics.
    pub fn set_records_json(&mut self, source: Value) {
        let (records, diagnostics) = parse_records(source);
        for diagnostic in &diagnostics {
            warn!(%diagnostic, "record snapshot diagnostic");
        }
        self.set_records(records);
        self.diagnostics = diagnostics;
    }

    /// Replace the whole state at once.
    pub fn set_state(&mut self, state: TableState) {
        self.state = state;
        self.refresh();
    }

    /// New search text; returns to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let state = self.state.with_search(search);
        self.set_state(state);
    }

    /// Header click on `column`. Unknown or non-sortable columns are ignored.
    pub fn request_sort(&mut self, column: &str) -> bool {
        let sortable = self
            .columns
            .iter()
            .any(|c| c.accessor == column && c.sortable);
        if !sortable {
            debug!(column, "sort requested on a column that is not sortable");
            return false;
        }

        let state = self.state.with_sort(self.state.sort.toggled(column));
        self.set_state(state);
        true
    }

    pub fn go_to_page(&mut self, page: usize) {
        let state = self.state.with_page(page);
        self.set_state(state);
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.state.page.current_page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.state.page.current_page.saturating_sub(1));
    }

    /// New page size; returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        let state = self.state.with_page_size(page_size);
        self.set_state(state);
    }

    fn refresh(&mut self) {
        let key = (self.generation, self.state.clone());
        if self.computed_for.as_ref() == Some(&key) {
            return;
        }

        self.index = ViewIndex::build(&self.records, &self.columns, &self.state);
        self.state.page = PageState::new(self.state.page.page_size, self.index.clamped_page);

        debug!(
            generation = self.generation,
            records = self.records.len(),
            filtered = self.index.total_filtered,
            page = self.index.clamped_page,
            pages = self.index.total_pages,
            "recomputed table view"
        );

        self.computed_for = Some((self.generation, self.state.clone()));
    }
}
