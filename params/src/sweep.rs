//! Cartesian sweep expansion (§4.2).
//!

use crate::pop::PopRef;
use crate::run_params::{random_seed, RunParams};
use crate::value::{ModelParams, SimDate};
use chrono::NaiveDate;
use simrun_common::{ClientError, Result};

/// A date as supplied by a sweep caller, before normalization.
#[derive(Clone, Debug)]
pub enum DateInput {
    Str(String),
    Date(NaiveDate),
}

impl DateInput {
    fn into_sim_date(self) -> Result<SimDate> {
        match self {
            DateInput::Str(s) => SimDate::parse(s),
            DateInput::Date(d) => Ok(SimDate::from_date(d)),
        }
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Str(s.to_string())
    }
}

impl From<NaiveDate> for DateInput {
    fn from(d: NaiveDate) -> Self {
        DateInput::Date(d)
    }
}

/// One axis of a [`ConfigSweep`]: either a single value or an ordered
/// sequence of values to expand over.
///
/// `One` is distinct from a one-element `Many`: both have length 1, but the
/// distinction exists purely for caller ergonomics (callers building a
/// sweep in code write the common case, a single value, without wrapping
/// it in a vector).
#[derive(Clone, Debug)]
pub enum Axis<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> Axis<T> {
    pub fn len(&self) -> usize {
        match self {
            Axis::One(_) => 1,
            Axis::Many(v) => v.len().max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Values in iteration order. A `Many` axis with no elements still
    /// degrades to "absent contributes one placeholder" semantics at the
    /// call site constructing it (see [`Axis::absent`]).
    fn values(&self) -> Vec<T> {
        match self {
            Axis::One(v) => vec![v.clone()],
            Axis::Many(v) => v.clone(),
        }
    }
}

/// Build an "absent" axis: contributes exactly one `None` placeholder,
/// never zero elements (Design Notes §9, "Absent vs null").
pub fn absent_axis<T>() -> Axis<Option<T>> {
    Axis::One(None)
}

/// How seeds are assigned across an expanded sweep (§4.2).
#[derive(Clone, Debug, Default)]
pub enum SeedSpec {
    #[default]
    Absent,
    Single(u64),
    Many(Vec<u64>),
}

/// Declarative multi-valued configuration; see §3 and §4.2.
#[derive(Clone, Debug)]
pub struct ConfigSweep {
    pub program: String,
    pub pop: Axis<PopRef>,
    pub start_date: Axis<Option<DateInput>>,
    pub end_date: Axis<Option<DateInput>>,
    pub model_params: Axis<Option<ModelParams>>,
    pub n_reps: u32,
    pub seed: SeedSpec,
    pub compile_only: bool,
}

impl ConfigSweep {
    /// Construct a sweep over a single population, with the date and
    /// model-param axes defaulted to absent and `n_reps = 1`.
    pub fn new(program: impl Into<String>, pop: Axis<PopRef>) -> Self {
        Self {
            program: program.into(),
            pop,
            start_date: absent_axis(),
            end_date: absent_axis(),
            model_params: absent_axis(),
            n_reps: 1,
            seed: SeedSpec::Absent,
            compile_only: false,
        }
    }

    pub fn with_start_date(mut self, axis: Axis<Option<DateInput>>) -> Self {
        self.start_date = axis;
        self
    }

    pub fn with_end_date(mut self, axis: Axis<Option<DateInput>>) -> Self {
        self.end_date = axis;
        self
    }

    pub fn with_model_params(mut self, axis: Axis<Option<ModelParams>>) -> Self {
        self.model_params = axis;
        self
    }

    pub fn with_n_reps(mut self, n_reps: u32) -> Self {
        self.n_reps = n_reps;
        self
    }

    pub fn with_seed(mut self, seed: SeedSpec) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_compile_only(mut self, compile_only: bool) -> Self {
        self.compile_only = compile_only;
        self
    }

    /// Size of the Cartesian product over `{pop, start_date, end_date,
    /// model_params}`, before replication by `n_reps`.
    pub fn product_size(&self) -> usize {
        self.pop.len() * self.start_date.len() * self.end_date.len() * self.model_params.len()
    }

    /// Total number of runs this sweep expands to: the sweep size law in
    /// §8, `n_reps * product_size`.
    pub fn expanded_len(&self) -> usize {
        self.product_size() * self.n_reps.max(1) as usize
    }

    /// Expand this sweep into its ordered sequence of [`RunParams`].
    pub fn expand(&self) -> Result<SweepExpander> {
        let product_size = self.product_size();
        let n_reps = self.n_reps.max(1) as usize;
        let n = product_size * n_reps;

        let seeds = assign_seeds(&self.seed, product_size, n_reps)?;

        let mut records = Vec::with_capacity(n);
        let mut i = 0usize;
        for pop in self.pop.values() {
            for start in self.start_date.values() {
                for end in self.end_date.values() {
                    for mp in self.model_params.values() {
                        for _rep in 0..n_reps {
                            let start_date = start.clone().map(|d| d.into_sim_date()).transpose()?;
                            let end_date = end.clone().map(|d| d.into_sim_date()).transpose()?;
                            let params = RunParams::new(
                                self.program.clone(),
                                pop.clone(),
                                start_date,
                                end_date,
                                mp.clone(),
                                Some(seeds[i]),
                                self.compile_only,
                            )?;
                            records.push(params);
                            i += 1;
                        }
                    }
                }
            }
        }

        Ok(SweepExpander { records, pos: 0 })
    }
}

/// Assign seeds to the `n_reps * product_size` expanded records, per the
/// seed policy in §4.2. A scalar seed is shared across every record,
/// including the degenerate `product_size == 1, n_reps > 1` case.
fn assign_seeds(spec: &SeedSpec, product_size: usize, n_reps: usize) -> Result<Vec<u64>> {
    let n = product_size * n_reps;
    match spec {
        SeedSpec::Absent => Ok((0..n).map(|_| random_seed()).collect()),
        SeedSpec::Single(s) => Ok(vec![*s; n]),
        SeedSpec::Many(seeds) => {
            if seeds.len() != n {
                return Err(ClientError::SeedCountMismatch {
                    expected: n,
                    got: seeds.len(),
                });
            }
            Ok(seeds.clone())
        }
    }
}

/// A finite, restartable iterator over the expanded [`RunParams`] sequence.
///
/// The full sequence is computed eagerly at [`ConfigSweep::expand`] time
/// (the product is bounded and cheap to materialize); this type just
/// provides iterator/indexing ergonomics with a known-upfront length, per
/// Design Notes §9 ("lazy iterator").
#[derive(Clone, Debug)]
pub struct SweepExpander {
    records: Vec<RunParams>,
    pos: usize,
}

impl SweepExpander {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[RunParams] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<RunParams> {
        self.records
    }

    /// Rewind the iterator to the start without recomputing the expansion.
    pub fn reset(&mut self) {
        self.pos = 0;
    }
}

impl Iterator for SweepExpander {
    type Item = RunParams;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.records.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.records.len().saturating_sub(self.pos);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepExpander {}
