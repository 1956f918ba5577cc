//! Thin owning wrapper around [`JobResultAggregator`] for a [`crate::Job`]'s
//! completed runs.
//!

use simrun_common::Result;
use simrun_fs::CountKind;
use simrun_results::{
    AggCsvTable, AggDateRow, AggEpiWeekRow, AggGraph, AggListTableVarRow, AggListTableWideRow,
    AggListVarRow, AggNumericVarRow, AggPopSizeRow, AggStateRow, AggTableVarRow, AggWideRow,
    JobResultAggregator, RunResultReader,
};

/// Owns the [`RunResultReader`] for each completed run in a job, keyed by
/// `run_id` (the run's index within the job).
pub struct JobResults {
    readers: Vec<(u64, RunResultReader)>,
}

impl JobResults {
    pub(crate) fn new(readers: Vec<(u64, RunResultReader)>) -> Self {
        Self { readers }
    }

    fn aggregator(&self) -> JobResultAggregator<'_> {
        JobResultAggregator::new(self.readers.iter().map(|(id, r)| (*id, r)).collect())
    }

    pub fn state(&self, condition: &str, state: &str, kind: CountKind) -> Result<Vec<AggStateRow>> {
        self.aggregator().state(condition, state, kind)
    }

    pub fn pop_size(&self) -> Result<Vec<AggPopSizeRow>> {
        self.aggregator().pop_size()
    }

    pub fn epi_weeks(&self) -> Result<Vec<AggEpiWeekRow>> {
        self.aggregator().epi_weeks()
    }

    pub fn dates(&self) -> Result<Vec<AggDateRow>> {
        self.aggregator().dates()
    }

    pub fn numeric_var(&self, name: &str) -> Result<Vec<AggNumericVarRow>> {
        self.aggregator().numeric_var(name)
    }

    pub fn list_var(&self, name: &str) -> Result<Vec<AggListVarRow>> {
        self.aggregator().list_var(name)
    }

    pub fn list_var_wide(&self, name: &str) -> Result<Vec<AggWideRow>> {
        self.aggregator().list_var_wide(name)
    }

    pub fn table_var(&self, name: &str) -> Result<Vec<AggTableVarRow>> {
        self.aggregator().table_var(name)
    }

    pub fn list_table_var(&self, name: &str) -> Result<Vec<AggListTableVarRow>> {
        self.aggregator().list_table_var(name)
    }

    pub fn list_table_var_wide(&self, name: &str) -> Result<Vec<AggListTableWideRow>> {
        self.aggregator().list_table_var_wide(name)
    }

    pub fn csv_output(&self, name: &str) -> Result<Vec<AggCsvTable>> {
        self.aggregator().csv_output(name)
    }

    pub fn network(&self, name: &str, sim_day: Option<i64>, directed: bool) -> Result<Vec<AggGraph>> {
        self.aggregator().network(name, sim_day, directed)
    }
}
