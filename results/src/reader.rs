//! Run Result Reader (§4.7): parses a completed run's artifacts into the
//! typed tables of [`crate::tables`].
//!

use crate::graph::{parse_dot, parse_vna, Graph};
use crate::tables::{
    pivot_wide, CsvTable, DateRow, EpiWeekRow, ListTableVarRow, ListTableWideRow, ListVarRow,
    NumericVarRow, PopSizeRow, StateRow, TableVarRow, WideRow,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use simrun_common::{ClientError, Result};
use simrun_fs::{CountKind, PathResolver};
use std::path::Path;

/// Reads every result artifact of a single completed run, through its
/// [`PathResolver`].
#[derive(Clone, Debug)]
pub struct RunResultReader {
    resolver: PathResolver,
}

impl RunResultReader {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    pub fn state(&self, condition: &str, state: &str, kind: CountKind) -> Result<Vec<StateRow>> {
        let path = self.resolver.state_count(condition, state, kind);
        if !path.exists() {
            return Err(ClientError::ArtifactNotFound(path));
        }
        read_day_value_lines(&path)?
            .into_iter()
            .map(|(sim_day, raw)| {
                let value: u64 = raw.trim().parse().map_err(|_| malformed(&path, &raw))?;
                Ok(StateRow { sim_day, value })
            })
            .collect()
    }

    /// `DAILY/Popsize.txt` is one bare count per line under both engine
    /// majors (§4.5: unlike the scalar/list/table variable artifacts, the
    /// day-count files never move under `VARIABLES/` as CSV).
    pub fn pop_size(&self) -> Result<Vec<PopSizeRow>> {
        let path = self.resolver.pop_size();
        Ok(read_day_value_lines_or_empty(&path)?
            .into_iter()
            .filter_map(|(sim_day, raw)| raw.trim().parse().ok().map(|pop_size| PopSizeRow { sim_day, pop_size }))
            .collect())
    }

    pub fn epi_weeks(&self) -> Result<Vec<EpiWeekRow>> {
        let path = self.resolver.epi_weeks();
        Ok(read_day_value_lines_or_empty(&path)?
            .into_iter()
            .map(|(sim_day, epi_week)| EpiWeekRow { sim_day, epi_week })
            .collect())
    }

    pub fn dates(&self) -> Result<Vec<DateRow>> {
        let path = self.resolver.dates();
        let mut rows = Vec::new();
        for (sim_day, raw) in read_day_value_lines_or_empty(&path)? {
            let Some(sim_date) = parse_sim_date(&raw) else {
                continue;
            };
            rows.push(DateRow { sim_day, sim_date });
        }
        Ok(rows)
    }

    pub fn print_output(&self) -> Result<Vec<String>> {
        let path = self.resolver.print_output();
        if !path.exists() {
            return Err(ClientError::ArtifactNotFound(path));
        }
        Ok(std::fs::read_to_string(&path)?.lines().map(str::to_string).collect())
    }

    pub fn file_output(&self, name: &str) -> Result<Vec<String>> {
        let path = self.resolver.user_text(name);
        if !path.exists() {
            return Err(ClientError::ArtifactNotFound(path));
        }
        Ok(std::fs::read_to_string(&path)?.lines().map(str::to_string).collect())
    }

    pub fn csv_output(&self, name: &str) -> Result<CsvTable> {
        let path = self.resolver.user_csv(name);
        if !path.exists() {
            return Err(ClientError::ArtifactNotFound(path));
        }
        read_csv_table(&path)
    }

    /// The older major writes one value per physical line (`RUN<n>/DAILY/
    /// FRED.<name>.txt`, sim_day implied by line number); the newer major
    /// writes a single `VARIABLES/numeric.<name>.csv` spanning every day,
    /// with `sim_day` as its own column, so the two layouts need distinct
    /// parsers (§4.5).
    pub fn numeric_var(&self, name: &str) -> Result<Vec<NumericVarRow>> {
        let path = self.resolver.numeric_var(name);
        if self.resolver.version().is_older_major() {
            Ok(read_day_value_lines_or_empty(&path)?
                .into_iter()
                .filter_map(|(sim_day, raw)| raw.trim().parse().ok().map(|value| NumericVarRow { sim_day, value }))
                .collect())
        } else {
            read_numeric_var_csv(&path)
        }
    }

    /// Each per-day artifact (`LIST/<name>-<d>.txt` older, `VARIABLES/
    /// list.<name>-<d>.csv` newer) is a single header-less row of
    /// comma-separated values, with `sim_day` coming from the filename
    /// rather than a column, under both majors, so
    /// [`read_list_values`]'s token split already reads the newer layout's
    /// `.csv` correctly.
    pub fn list_var(&self, name: &str) -> Result<Vec<ListVarRow>> {
        let mut rows = Vec::new();
        for (sim_day, path) in self.resolver.list_var_days(name) {
            for (list_index, value) in read_list_values(&path)?.into_iter().enumerate() {
                rows.push(ListVarRow { sim_day, list_index, value });
            }
        }
        Ok(rows)
    }

    pub fn list_var_wide(&self, name: &str) -> Result<Vec<WideRow>> {
        let long = self.list_var(name)?;
        Ok(pivot_wide(long.into_iter().map(|r| (r.sim_day, r.list_index, r.value))))
    }

    /// Same per-day, header-less, single-row layout as [`Self::list_var`],
    /// but each token is a `key,value` pair rather than a bare value.
    pub fn table_var(&self, name: &str) -> Result<Vec<TableVarRow>> {
        let mut rows = Vec::new();
        for (sim_day, path) in self.resolver.table_var_days(name) {
            for (key, value) in read_keyed_values(&path)? {
                rows.push(TableVarRow { sim_day, key, value });
            }
        }
        Ok(rows)
    }

    pub fn list_table_var(&self, name: &str) -> Result<Vec<ListTableVarRow>> {
        let mut rows = Vec::new();
        for (sim_day, path) in self.resolver.list_table_var_days(name) {
            for (key, values) in read_keyed_list_values(&path)? {
                for (list_index, value) in values.into_iter().enumerate() {
                    rows.push(ListTableVarRow { sim_day, key: key.clone(), list_index, value });
                }
            }
        }
        Ok(rows)
    }

    pub fn list_table_var_wide(&self, name: &str) -> Result<Vec<ListTableWideRow>> {
        use std::collections::BTreeMap;

        let long = self.list_table_var(name)?;
        let mut by_day_key: BTreeMap<(i64, String), BTreeMap<usize, f64>> = BTreeMap::new();
        let mut max_index = 0usize;
        for row in &long {
            max_index = max_index.max(row.list_index);
            by_day_key
                .entry((row.sim_day, row.key.clone()))
                .or_default()
                .insert(row.list_index, row.value);
        }
        Ok(by_day_key
            .into_iter()
            .map(|((sim_day, key), values)| {
                let items = (0..=max_index).map(|i| values.get(&i).copied()).collect();
                ListTableWideRow { sim_day, key, items }
            })
            .collect())
    }

    /// `sim_day = None` resolves to the end-of-simulation snapshot: the
    /// highest-numbered per-day artifact for `name`.
    pub fn network(&self, name: &str, sim_day: Option<i64>, directed: bool) -> Result<Graph> {
        let days = self.resolver.network_days(name);
        let path = match sim_day {
            Some(day) => days.into_iter().find(|(d, _)| *d == day).map(|(_, p)| p),
            None => days.into_iter().last().map(|(_, p)| p),
        };
        let Some(path) = path else {
            return Ok(Graph { directed, nodes: vec![], edges: vec![] });
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("vna") => parse_vna(&path, directed),
            _ => parse_dot(&path, directed),
        }
    }
}

fn malformed(path: &Path, raw: &str) -> ClientError {
    ClientError::MalformedArtifact {
        path: path.to_path_buf(),
        reason: format!("unparseable value: {raw:?}"),
    }
}

/// Read a `DAILY`-style artifact of one value per line, paired with its
/// 0-based line number as `sim_day`.
fn read_day_value_lines(path: &Path) -> Result<Vec<(i64, String)>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i as i64, l.trim().to_string()))
        .collect())
}

fn read_day_value_lines_or_empty(path: &Path) -> Result<Vec<(i64, String)>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    read_day_value_lines(path)
}

fn parse_sim_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|dt| Utc.from_local_datetime(&dt).single())
}

fn read_list_values(path: &Path) -> Result<Vec<f64>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse().ok())
        .collect())
}

fn read_keyed_values(path: &Path) -> Result<Vec<(String, f64)>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let content = std::fs::read_to_string(path)?;
    let mut out = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        if let Some((key, value)) = line.split_once(',').or_else(|| line.split_once(' ')) {
            if let Ok(value) = value.trim().parse() {
                out.push((key.trim().to_string(), value));
            }
        }
    }
    Ok(out)
}

fn read_keyed_list_values(path: &Path) -> Result<Vec<(String, Vec<f64>)>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let content = std::fs::read_to_string(path)?;
    let mut out = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let mut parts = line.split(',');
        let Some(key) = parts.next() else { continue };
        let values = parts.filter_map(|t| t.trim().parse().ok()).collect();
        out.push((key.trim().to_string(), values));
    }
    Ok(out)
}

/// Read a newer-major `numeric.<name>.csv`: a `sim_day,value` header and
/// rows, unlike the older major's bare per-line values.
fn read_numeric_var_csv(path: &Path) -> Result<Vec<NumericVarRow>> {
    if !path.exists() {
        return Ok(vec![]);
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(sim_day) = record.get(0).and_then(|s| s.trim().parse().ok()) else {
            continue;
        };
        let Some(value) = record.get(1).and_then(|s| s.trim().parse().ok()) else {
            continue;
        };
        rows.push(NumericVarRow { sim_day, value });
    }
    Ok(rows)
}

fn read_csv_table(path: &Path) -> Result<CsvTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(CsvTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use simrun_submit::EngineVersion;
    use std::fs;

    fn resolver(dir: &Path) -> PathResolver {
        PathResolver::new(dir, EngineVersion::parse("latest").unwrap(), 1)
    }

    #[test]
    fn state_missing_is_artifact_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let reader = RunResultReader::new(resolver(dir.path()));
        let err = reader.state("INF", "Exposed", CountKind::Count).unwrap_err();
        assert!(matches!(err, ClientError::ArtifactNotFound(_)));
    }

    #[test]
    fn state_reads_count_lines() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        let path = r.state_count("INF", "Exposed", CountKind::Count);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "10\n20\n30\n").unwrap();

        let reader = RunResultReader::new(r);
        let rows = reader.state("INF", "Exposed", CountKind::Count).unwrap();
        assert_eq!(rows, vec![
            StateRow { sim_day: 0, value: 10 },
            StateRow { sim_day: 1, value: 20 },
            StateRow { sim_day: 2, value: 30 },
        ]);
    }

    #[test]
    fn numeric_var_missing_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let reader = RunResultReader::new(resolver(dir.path()));
        assert_eq!(reader.numeric_var("anything").unwrap(), vec![]);
    }

    #[test]
    fn numeric_var_reads_newer_csv_with_sim_day_column() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        let path = r.numeric_var("sample");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "sim_day,value\n0,1.5\n1,2.25\n").unwrap();

        let reader = RunResultReader::new(r);
        let rows = reader.numeric_var("sample").unwrap();
        assert_eq!(rows, vec![
            NumericVarRow { sim_day: 0, value: 1.5 },
            NumericVarRow { sim_day: 1, value: 2.25 },
        ]);
    }

    #[test]
    fn numeric_var_reads_older_txt_by_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let r = PathResolver::new(dir.path(), EngineVersion::parse("10.1.1").unwrap(), 1);
        let path = r.numeric_var("sample");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "1.5\n2.25\n").unwrap();

        let reader = RunResultReader::new(r);
        let rows = reader.numeric_var("sample").unwrap();
        assert_eq!(rows, vec![
            NumericVarRow { sim_day: 0, value: 1.5 },
            NumericVarRow { sim_day: 1, value: 2.25 },
        ]);
    }

    #[test]
    fn list_var_wide_pivots_with_padding() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        let p0 = r.list_var_by_day("ages", 0);
        let p1 = r.list_var_by_day("ages", 1);
        fs::create_dir_all(p0.parent().unwrap()).unwrap();
        fs::write(&p0, "1,2,3").unwrap();
        fs::write(&p1, "4").unwrap();

        let reader = RunResultReader::new(r);
        let wide = reader.list_var_wide("ages").unwrap();
        assert_eq!(wide, vec![
            WideRow { sim_day: 0, items: vec![Some(1.0), Some(2.0), Some(3.0)] },
            WideRow { sim_day: 1, items: vec![Some(4.0), None, None] },
        ]);
    }

    #[test]
    fn network_missing_is_empty_graph() {
        let dir = tempfile::tempdir().unwrap();
        let reader = RunResultReader::new(resolver(dir.path()));
        let g = reader.network("contacts", None, true).unwrap();
        assert!(g.nodes.is_empty() && g.edges.is_empty());
    }

    #[test]
    fn network_absent_day_uses_latest_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let r = resolver(dir.path());
        let p0 = r.network("contacts", 0);
        let p5 = r.network("contacts", 5);
        fs::create_dir_all(p0.parent().unwrap()).unwrap();
        fs::write(&p0, "digraph c {\n A;\n}\n").unwrap();
        fs::write(&p5, "digraph c {\n A;\n B;\n}\n").unwrap();

        let reader = RunResultReader::new(r);
        let g = reader.network("contacts", None, true).unwrap();
        assert_eq!(g.nodes.len(), 2);
    }
}
