//! Job Result Aggregator (§4.10): concatenates per-run tables along a new
//! leading `run_id` column.
//!

use crate::graph::Graph;
use crate::reader::RunResultReader;
use crate::tables::{
    CsvTable, DateRow, EpiWeekRow, ListTableVarRow, ListTableWideRow, ListVarRow, NumericVarRow,
    PopSizeRow, StateRow, TableVarRow, WideRow,
};
use simrun_common::Result;
use simrun_fs::CountKind;

macro_rules! aggregated_row {
    ($name:ident, $inner:ty) => {
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            pub run_id: u64,
            pub row: $inner,
        }

        impl IntoAgg for $inner {
            type Agg = $name;
            fn into_agg(self, run_id: u64) -> $name {
                $name { run_id, row: self }
            }
        }
    };
}

trait IntoAgg: Sized {
    type Agg;
    fn into_agg(self, run_id: u64) -> Self::Agg;
}

aggregated_row!(AggStateRow, StateRow);
aggregated_row!(AggPopSizeRow, PopSizeRow);
aggregated_row!(AggEpiWeekRow, EpiWeekRow);
aggregated_row!(AggDateRow, DateRow);
aggregated_row!(AggNumericVarRow, NumericVarRow);
aggregated_row!(AggListVarRow, ListVarRow);
aggregated_row!(AggWideRow, WideRow);
aggregated_row!(AggTableVarRow, TableVarRow);
aggregated_row!(AggListTableVarRow, ListTableVarRow);
aggregated_row!(AggListTableWideRow, ListTableWideRow);
aggregated_row!(AggCsvTable, CsvTable);

/// A `(run_id, Graph)` pair, in run order (§4.10: network accessor
/// aggregates into an indexed sequence of graphs rather than a table).
#[derive(Clone, Debug, PartialEq)]
pub struct AggGraph {
    pub run_id: u64,
    pub graph: Graph,
}

/// One completed run contributing to a job's aggregated results, keyed by
/// its `run_id` (the run's index within the job, per §4.9).
pub struct JobResultAggregator<'a> {
    runs: Vec<(u64, &'a RunResultReader)>,
}

impl<'a> JobResultAggregator<'a> {
    pub fn new(runs: Vec<(u64, &'a RunResultReader)>) -> Self {
        Self { runs }
    }

    pub fn state(&self, condition: &str, state: &str, kind: CountKind) -> Result<Vec<AggStateRow>> {
        self.concat(|r| r.state(condition, state, kind))
    }

    pub fn pop_size(&self) -> Result<Vec<AggPopSizeRow>> {
        self.concat(|r| r.pop_size())
    }

    pub fn epi_weeks(&self) -> Result<Vec<AggEpiWeekRow>> {
        self.concat(|r| r.epi_weeks())
    }

    pub fn dates(&self) -> Result<Vec<AggDateRow>> {
        self.concat(|r| r.dates())
    }

    pub fn numeric_var(&self, name: &str) -> Result<Vec<AggNumericVarRow>> {
        self.concat(|r| r.numeric_var(name))
    }

    pub fn list_var(&self, name: &str) -> Result<Vec<AggListVarRow>> {
        self.concat(|r| r.list_var(name))
    }

    pub fn list_var_wide(&self, name: &str) -> Result<Vec<AggWideRow>> {
        self.concat(|r| r.list_var_wide(name))
    }

    pub fn table_var(&self, name: &str) -> Result<Vec<AggTableVarRow>> {
        self.concat(|r| r.table_var(name))
    }

    pub fn list_table_var(&self, name: &str) -> Result<Vec<AggListTableVarRow>> {
        self.concat(|r| r.list_table_var(name))
    }

    pub fn list_table_var_wide(&self, name: &str) -> Result<Vec<AggListTableWideRow>> {
        self.concat(|r| r.list_table_var_wide(name))
    }

    pub fn csv_output(&self, name: &str) -> Result<Vec<AggCsvTable>> {
        self.concat(|r| r.csv_output(name).map(|t| vec![t]))
    }

    pub fn network(&self, name: &str, sim_day: Option<i64>, directed: bool) -> Result<Vec<AggGraph>> {
        let mut out = Vec::with_capacity(self.runs.len());
        for (run_id, reader) in &self.runs {
            let graph = reader.network(name, sim_day, directed)?;
            out.push(AggGraph { run_id: *run_id, graph });
        }
        Ok(out)
    }

    /// Run each run's accessor and flatten in `(run_id, original row index)`
    /// order, preserving within-run order (§4.10).
    fn concat<T, F>(&self, f: F) -> Result<Vec<T::Agg>>
    where
        F: Fn(&RunResultReader) -> Result<Vec<T>>,
        T: IntoAgg,
    {
        let mut out = Vec::new();
        for (run_id, reader) in &self.runs {
            for row in f(reader)? {
                out.push(row.into_agg(*run_id));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::StateRow;
    use simrun_fs::PathResolver;
    use simrun_submit::EngineVersion;
    use std::fs;

    fn reader_for(dir: &std::path::Path) -> RunResultReader {
        let resolver = PathResolver::new(dir, EngineVersion::parse("latest").unwrap(), 1);
        RunResultReader::new(resolver)
    }

    #[test]
    fn state_concatenates_with_run_id_preserving_order() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let reader_a = reader_for(dir_a.path());
        let reader_b = reader_for(dir_b.path());

        let path_a = PathResolver::new(dir_a.path(), EngineVersion::parse("latest").unwrap(), 1)
            .state_count("INF", "Exposed", CountKind::Count);
        fs::create_dir_all(path_a.parent().unwrap()).unwrap();
        fs::write(&path_a, "1\n2\n").unwrap();

        let path_b = PathResolver::new(dir_b.path(), EngineVersion::parse("latest").unwrap(), 1)
            .state_count("INF", "Exposed", CountKind::Count);
        fs::create_dir_all(path_b.parent().unwrap()).unwrap();
        fs::write(&path_b, "9\n").unwrap();

        let agg = JobResultAggregator::new(vec![(0, &reader_a), (1, &reader_b)]);
        let rows = agg.state("INF", "Exposed", CountKind::Count).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], AggStateRow { run_id: 0, row: StateRow { sim_day: 0, value: 1 } });
        assert_eq!(rows[1], AggStateRow { run_id: 0, row: StateRow { sim_day: 1, value: 2 } });
        assert_eq!(rows[2], AggStateRow { run_id: 1, row: StateRow { sim_day: 0, value: 9 } });
    }
}
