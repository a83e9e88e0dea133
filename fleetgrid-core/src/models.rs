use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// One schema-less row of the in-memory collection.
///
/// Records are plain JSON objects. Nothing in this crate mutates a record once
/// it has been handed over by the record source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from a JSON value, returning `None` for anything that is
    /// not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The record's `id` field as text, if it has one.
    ///
    /// Strings are used verbatim and numbers by their JSON text; any other
    /// shape means the record has no usable identity.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Immutable snapshot of the record collection as supplied by the source.
pub type Snapshot = Arc<[Record]>;

/// Custom cell renderer attached to a column.
///
/// The display type `D` is opaque to the engine; only the rendering boundary
/// in [`crate::render`] ever calls it.
pub type Renderer<D> = Arc<dyn Fn(&Record) -> Result<D, RenderError> + Send + Sync>;

/// Failure reported by a custom cell renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError(pub String);

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "renderer failed: {}", self.0)
    }
}

impl std::error::Error for RenderError {}

/// Describes how a column maps onto record data and whether it takes part in
/// sorting and searching.
pub struct ColumnDescriptor<D = String> {
    /// Dot-separated path into the record, e.g. `vehicle.plate`.
    pub accessor: String,
    /// Header label; defaults to the accessor.
    pub header: String,
    pub sortable: bool,
    pub searchable: bool,
    pub renderer: Option<Renderer<D>>,
}

impl<D> ColumnDescriptor<D> {
    /// A sortable, searchable column with no custom renderer.
    pub fn new(accessor: impl Into<String>) -> Self {
        let accessor = accessor.into();
        Self {
            header: accessor.clone(),
            accessor,
            sortable: true,
            searchable: true,
            renderer: None,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(&Record) -> Result<D, RenderError> + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(render));
        self
    }
}

impl<D> Clone for ColumnDescriptor<D> {
    fn clone(&self) -> Self {
        Self {
            accessor: self.accessor.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            searchable: self.searchable,
            renderer: self.renderer.clone(),
        }
    }
}

impl<D> fmt::Debug for ColumnDescriptor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("accessor", &self.accessor)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}

/// Serialized form of a column in a table definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub accessor: String,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default = "default_true")]
    pub sortable: bool,
    #[serde(default = "default_true")]
    pub searchable: bool,
    /// Display format hint for renderers, e.g. `number` or `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ColumnSpec {
    pub fn into_descriptor<D>(self) -> ColumnDescriptor<D> {
        let header = self.header.unwrap_or_else(|| self.accessor.clone());
        ColumnDescriptor::new(self.accessor)
            .with_header(header)
            .sortable(self.sortable)
            .searchable(self.searchable)
    }
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> usize {
    10
}

/// A table definition: column schema plus display defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub columns: Vec<ColumnSpec>,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Field used for status grouping and statistics.
    #[serde(default)]
    pub status_field: Option<String>,
    /// Numeric field averaged in the statistics summary.
    #[serde(default)]
    pub average_field: Option<String>,
}

impl TableDefinition {
    /// Derive a definition from the union of the records' top-level keys.
    ///
    /// Records are visited in order and each contributes its unseen keys,
    /// ordered by key within the record (`serde_json::Map` keeps keys
    /// sorted). No records means no columns.
    pub fn infer(records: &[Record]) -> Self {
        let mut columns: Vec<ColumnSpec> = Vec::new();
        for record in records {
            for key in record.fields().keys() {
                if !columns.iter().any(|c| &c.accessor == key) {
                    columns.push(ColumnSpec {
                        accessor: key.clone(),
                        header: None,
                        sortable: true,
                        searchable: true,
                        format: None,
                    });
                }
            }
        }

        Self {
            columns,
            page_size: default_page_size(),
            status_field: None,
            average_field: None,
        }
    }

    pub fn descriptors<D>(&self) -> Vec<ColumnDescriptor<D>> {
        self.columns
            .iter()
            .cloned()
            .map(ColumnSpec::into_descriptor)
            .collect()
    }
}

/// Sort direction applied on top of the ascending base order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Current sort of the table. `key == None` keeps the source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: Direction,
}

impl SortState {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            direction: Direction::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            direction: Direction::Desc,
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.key.is_some()
    }

    /// Next state after clicking the header of `column`.
    ///
    /// Unsorted or another column goes to ascending, ascending goes to
    /// descending, and descending goes back to unsorted.
    pub fn toggled(&self, column: &str) -> Self {
        match (&self.key, self.direction) {
            (Some(key), Direction::Asc) if key == column => Self::desc(column),
            (Some(key), Direction::Desc) if key == column => Self::unsorted(),
            _ => Self::asc(column),
        }
    }
}

/// Requested page size and page number, both 1-based and positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageState {
    pub page_size: usize,
    pub current_page: usize,
}

impl PageState {
    /// Page sizes below one are raised to one.
    pub fn new(page_size: usize, current_page: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page,
        }
    }

    pub fn first(page_size: usize) -> Self {
        Self::new(page_size, 1)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::first(default_page_size())
    }
}

/// Every piece of interactive table state, replaced as a whole on each
/// transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableState {
    pub search: String,
    pub sort: SortState,
    pub page: PageState,
}

impl TableState {
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            page: PageState::first(self.page.page_size),
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort: SortState) -> Self {
        Self {
            sort,
            ..self.clone()
        }
    }

    pub fn with_page(&self, page: usize) -> Self {
        Self {
            page: PageState::new(self.page.page_size, page),
            ..self.clone()
        }
    }

    pub fn with_page_size(&self, page_size: usize) -> Self {
        Self {
            page: PageState::first(page_size),
            ..self.clone()
        }
    }
}
