use crate::accessor::resolve;
use crate::classify::{fold_case, typed, Typed};
use crate::models::{Direction, Record, SortState};
use serde_json::Value;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// One level of a multi-column sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub path: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn asc(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            direction: Direction::Desc,
        }
    }
}

impl SortState {
    /// The single sort key this state describes, if any.
    pub fn sort_key(&self) -> Option<SortKey> {
        self.key.as_ref().map(|path| SortKey {
            path: path.clone(),
            direction: self.direction,
        })
    }
}

/// Comparable form of one resolved value.
#[derive(Debug, Clone)]
enum SortCell {
    Number(f64),
    Date(i64),
    Text { folded: String, raw: String },
    Absent,
}

impl SortCell {
    fn from_value(value: Option<&Value>) -> Self {
        match typed(value) {
            Typed::Number(n) => SortCell::Number(n),
            Typed::Date(ts) => SortCell::Date(ts),
            Typed::Text(text) => SortCell::Text {
                folded: fold_case(&text),
                raw: text.into_owned(),
            },
            Typed::Absent => SortCell::Absent,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortCell::Number(_) => 0,
            SortCell::Date(_) => 1,
            SortCell::Text { .. } => 2,
            SortCell::Absent => 3,
        }
    }

    /// Ascending order between two present cells.
    ///
    /// Values of different kinds order by kind so the comparison stays
    /// transitive over columns that mix numbers, dates and text.
    fn ascending(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortCell::Number(a), SortCell::Number(b)) => a.total_cmp(b),
            (SortCell::Date(a), SortCell::Date(b)) => a.cmp(b),
            (
                SortCell::Text { folded: fa, raw: ra },
                SortCell::Text { folded: fb, raw: rb },
            ) => fa.cmp(fb).then_with(|| ra.cmp(rb)),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Directional order. Absent cells sink to the end in both directions.
    fn compare(&self, other: &Self, direction: Direction) -> Ordering {
        match (self, other) {
            (SortCell::Absent, SortCell::Absent) => Ordering::Equal,
            (SortCell::Absent, _) => Ordering::Greater,
            (_, SortCell::Absent) => Ordering::Less,
            _ => apply_direction(self.ascending(other), direction),
        }
    }
}

fn apply_direction(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

/// Precomputed sort cells for one record, compared level by level.
struct SortRow {
    cells: Vec<(SortCell, Direction)>,
}

impl SortRow {
    fn build(record: &Record, keys: &[SortKey]) -> Self {
        Self {
            cells: keys
                .iter()
                .map(|key| (SortCell::from_value(resolve(record, &key.path)), key.direction))
                .collect(),
        }
    }
}

impl PartialEq for SortRow {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortRow {}

impl PartialOrd for SortRow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortRow {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cells
            .iter()
            .zip(&other.cells)
            .map(|((a, direction), (b, _))| a.compare(b, *direction))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Compare two resolved values under a direction, absent values last.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    SortCell::from_value(a).compare(&SortCell::from_value(b), direction)
}

/// Compare two records under the table's sort state.
///
/// An unsorted state reports every pair as equal, which leaves a stable sort
/// in source order.
pub fn compare(a: &Record, b: &Record, sort: &SortState) -> Ordering {
    match &sort.key {
        Some(path) => compare_values(resolve(a, path), resolve(b, path), sort.direction),
        None => Ordering::Equal,
    }
}

/// Compare two records by each key in turn until one differs.
pub fn compare_by_keys(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    keys.iter()
        .map(|key| compare_values(resolve(a, &key.path), resolve(b, &key.path), key.direction))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable sort by several keys, primary first. Ties keep their input order.
pub fn sort_records_by<R: Borrow<Record>>(records: &mut [R], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    records.sort_by_cached_key(|record| SortRow::build(record.borrow(), keys));
}

/// Stable sort by the table's sort state; a no-op when unsorted.
pub fn sort_records<R: Borrow<Record>>(records: &mut [R], sort: &SortState) {
    if let Some(key) = sort.sort_key() {
        sort_records_by(records, std::slice::from_ref(&key));
    }
}

/// Sort positions into `records` instead of the records themselves.
pub fn sort_indices(records: &[Record], indices: &mut [usize], sort: &SortState) {
    let Some(key) = sort.sort_key() else {
        return;
    };
    let keys = std::slice::from_ref(&key);
    indices.sort_by_cached_key(|&idx| SortRow::build(&records[idx], keys));
}
