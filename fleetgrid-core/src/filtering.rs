use crate::accessor::resolve;
use crate::classify::{as_number, as_timestamp, display_text, search_fold};
use crate::error::{Error, Result};
use crate::models::Record;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Predicate over a resolved value; `None` means the value is absent.
pub type ValuePredicate = Arc<dyn Fn(Option<&Value>) -> bool + Send + Sync>;

/// One structured condition on a column.
#[derive(Clone)]
pub enum Criterion {
    /// Same number, same instant, or same text ignoring case.
    Equals(Value),
    /// Case-insensitive substring of the value's text.
    Contains(String),
    /// Regular expression over the value's text.
    Matches(Regex),
    /// Equal to any of the listed values.
    OneOf(Vec<Value>),
    /// Arbitrary predicate; the only criterion that sees absent values.
    Predicate(ValuePredicate),
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            Criterion::Contains(s) => f.debug_tuple("Contains").field(s).finish(),
            Criterion::Matches(re) => f.debug_tuple("Matches").field(&re.as_str()).finish(),
            Criterion::OneOf(vs) => f.debug_tuple("OneOf").field(vs).finish(),
            Criterion::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl Criterion {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Criterion::Predicate(Arc::new(f))
    }

    /// Whether a resolved value satisfies this criterion.
    pub fn accepts(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Criterion::Predicate(f), value) => f(value),
            (_, None) => false,
            (Criterion::Equals(expected), Some(value)) => values_equal(value, expected),
            (Criterion::Contains(needle), Some(value)) => {
                search_fold(&display_text(value)).contains(&search_fold(needle.trim()))
            }
            (Criterion::Matches(re), Some(value)) => re.is_match(&display_text(value)),
            (Criterion::OneOf(options), Some(value)) => {
                options.iter().any(|o| values_equal(value, o))
            }
        }
    }
}

/// Loose equality matching how values are classified: numbers by value,
/// dates by instant, everything else by case-insensitive text.
fn values_equal(value: &Value, expected: &Value) -> bool {
    if let (Some(a), Some(b)) = (as_number(value), as_number(expected)) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (as_timestamp(value), as_timestamp(expected)) {
        return a == b;
    }
    search_fold(&display_text(value)) == search_fold(&display_text(expected))
}

/// Structured filters keyed by accessor path.
///
/// Criteria on the same column are OR-ed, different columns are AND-ed.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    pub columns: BTreeMap<String, Vec<Criterion>>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, criterion: Criterion) {
        self.columns.entry(path.into()).or_default().push(criterion);
    }

    pub fn with(mut self, path: impl Into<String>, criterion: Criterion) -> Self {
        self.add(path, criterion);
        self
    }
}

/// Parse criteria strings into a criteria map.
///
/// `column=value` is equality, `column~value` a substring match and
/// `column/pattern` a regular expression. The earliest operator character
/// splits the column from the operand.
pub fn parse_criteria(criteria_strings: &[String]) -> Result<Criteria> {
    let mut criteria = Criteria::new();

    for raw in criteria_strings {
        let Some(split) = raw.find(['=', '~', '/']) else {
            return Err(Error::InvalidCriterion {
                criterion: raw.clone(),
                reason: "expected column=value, column~text or column/pattern".to_string(),
            });
        };

        let column = raw[..split].trim();
        let operand = raw[split + 1..].trim();
        if column.is_empty() {
            return Err(Error::InvalidCriterion {
                criterion: raw.clone(),
                reason: "missing column name".to_string(),
            });
        }

        let criterion = match &raw[split..split + 1] {
            "=" => Criterion::Equals(Value::String(operand.to_string())),
            "~" => Criterion::Contains(operand.to_string()),
            _ => Criterion::Matches(Regex::new(operand).map_err(|source| {
                Error::InvalidPattern {
                    column: column.to_string(),
                    source,
                }
            })?),
        };
        criteria.add(column, criterion);
    }

    Ok(criteria)
}

/// Apply criteria to a list of records, returning only those that match
pub fn apply_criteria<'a>(records: &'a [Record], criteria: &Criteria) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| matches_criteria(record, criteria))
        .collect()
}

/// Check if a record matches the given criteria
pub fn matches_criteria(record: &Record, criteria: &Criteria) -> bool {
    criteria.columns.iter().all(|(path, options)| {
        let value = resolve(record, path);
        options.iter().any(|criterion| criterion.accepts(value))
    })
}

/// Check if criteria are empty
pub fn has_criteria(criteria: &Criteria) -> bool {
    criteria.columns.values().any(|options| !options.is_empty())
}
