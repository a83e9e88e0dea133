use crate::accessor::resolve;
use crate::classify::as_number;
use crate::grouping::group_keys;
use crate::models::Record;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary figures for a dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    /// Every record, including those without a status.
    pub total: usize,
    /// Records per status. Records without a status are not counted here.
    pub by_status: BTreeMap<String, usize>,
    /// Mean of the numeric field, `0.0` when no record has a number there.
    pub average: f64,
}

/// Count records per status and average a numeric field.
pub fn collection_stats(records: &[Record], status_path: &str, numeric_path: &str) -> CollectionStats {
    CollectionStats {
        total: records.len(),
        by_status: count_by(records, status_path),
        average: average(records, numeric_path),
    }
}

/// Number of records per value of `path`, absent values skipped.
pub fn count_by(records: &[Record], path: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        for key in group_keys(resolve(record, path)) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

/// Mean of the numeric values at `path`; non-numeric and absent values are
/// ignored and an empty input averages to zero.
pub fn average(records: &[Record], path: &str) -> f64 {
    field_summary(records, path).mean
}

/// Numeric profile of one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSummary {
    pub count: usize,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: f64,
}

pub fn field_summary(records: &[Record], path: &str) -> FieldSummary {
    let mut summary = FieldSummary {
        count: 0,
        sum: 0.0,
        min: None,
        max: None,
        mean: 0.0,
    };

    for value in records.iter().filter_map(|r| resolve(r, path).and_then(as_number)) {
        summary.count += 1;
        summary.sum += value;
        summary.min = Some(summary.min.map_or(value, |m| m.min(value)));
        summary.max = Some(summary.max.map_or(value, |m| m.max(value)));
    }

    if summary.count > 0 {
        summary.mean = summary.sum / summary.count as f64;
    }
    summary
}
