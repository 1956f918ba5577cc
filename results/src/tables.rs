//! Typed record schemas for every accessor in §4.7.
//!
//! The original source models every result as a dynamically-typed data
//! frame column. In a statically typed client one struct per schema reads
//! better and catches shape mistakes at compile time (Design Notes §9).
//!

use chrono::{DateTime, Utc};

/// `state(condition, state, count_kind)` row. `value` carries whichever
/// `count_kind` (`count`/`new`/`cumulative`) was requested; the kind itself
/// is the call's input, not a column, since each call returns a single
/// homogeneous column.
#[derive(Clone, Debug, PartialEq)]
pub struct StateRow {
    pub sim_day: i64,
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PopSizeRow {
    pub sim_day: i64,
    pub pop_size: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EpiWeekRow {
    pub sim_day: i64,
    pub epi_week: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DateRow {
    pub sim_day: i64,
    pub sim_date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumericVarRow {
    pub sim_day: i64,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListVarRow {
    pub sim_day: i64,
    pub list_index: usize,
    pub value: f64,
}

/// A `list_var(.., wide=true)` row: one row per `sim_day`, with `items[i]`
/// holding `item_i` (`None` where the source day had fewer entries than the
/// widest day).
#[derive(Clone, Debug, PartialEq)]
pub struct WideRow {
    pub sim_day: i64,
    pub items: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableVarRow {
    pub sim_day: i64,
    pub key: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListTableVarRow {
    pub sim_day: i64,
    pub key: String,
    pub list_index: usize,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListTableWideRow {
    pub sim_day: i64,
    pub key: String,
    pub items: Vec<Option<f64>>,
}

/// A user CSV output file, parsed with its own header row; no schema is
/// enforced beyond "a table" (§4.7).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Pivot a set of long-form `(sim_day, list_index, value)` tuples into wide
/// form, padding missing indices with `None` (§4.7).
pub(crate) fn pivot_wide(
    long: impl Iterator<Item = (i64, usize, f64)>,
) -> Vec<WideRow> {
    use std::collections::BTreeMap;

    let mut by_day: BTreeMap<i64, BTreeMap<usize, f64>> = BTreeMap::new();
    let mut max_index = 0usize;
    for (day, idx, value) in long {
        max_index = max_index.max(idx);
        by_day.entry(day).or_default().insert(idx, value);
    }

    by_day
        .into_iter()
        .map(|(sim_day, values)| {
            let items = (0..=max_index).map(|i| values.get(&i).copied()).collect();
            WideRow { sim_day, items }
        })
        .collect()
}
