//! Run Result Reader and Job Result Aggregator for the simrun client
//! (components C7 and C9).
//!

mod aggregate;
mod graph;
mod reader;
mod tables;

pub use aggregate::{
    AggCsvTable, AggDateRow, AggEpiWeekRow, AggGraph, AggListTableVarRow, AggListTableWideRow,
    AggListVarRow, AggNumericVarRow, AggPopSizeRow, AggStateRow, AggTableVarRow, AggWideRow,
    JobResultAggregator,
};
pub use graph::{parse_dot, parse_vna, Graph, GraphEdge, GraphNode};
pub use reader::RunResultReader;
pub use tables::{
    CsvTable, DateRow, EpiWeekRow, ListTableVarRow, ListTableWideRow, ListVarRow, NumericVarRow,
    PopSizeRow, StateRow, TableVarRow, WideRow,
};
