//! Normalized single-run parameter bundle (§4.1).
//!

use crate::pop::PopRef;
use crate::value::{ModelParams, SimDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use simrun_common::{ClientError, Result};
use std::fmt;

/// Draw a fresh 64-bit seed uniformly from `[1, 2^64)`.
///
/// `rand`'s default `ThreadRng` is a CSPRNG (ChaCha-based), which satisfies
/// the "cryptographically adequate" requirement in §4.1 without pulling in
/// a dedicated RNG dependency.
pub fn random_seed() -> u64 {
    rand::thread_rng().gen_range(1..=u64::MAX)
}

/// Materialize an optional caller-supplied seed: `Some(0)` is treated the
/// same as `None` since the invariant in §3 forbids a zero seed.
pub fn materialize_seed(seed: Option<u64>) -> u64 {
    match seed {
        Some(s) if s != 0 => s,
        _ => random_seed(),
    }
}

/// A fully normalized, immutable parameter bundle for one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    pub program: String,
    pub pop: PopRef,
    pub start_date: Option<SimDate>,
    pub end_date: Option<SimDate>,
    pub model_params: Option<ModelParams>,
    pub seed: u64,
    #[serde(default)]
    pub compile_only: bool,
}

impl RunParams {
    /// Construct a `RunParams`, validating the cross-field invariants in §3
    /// and materializing a seed if the caller did not supply one.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        program: impl Into<String>,
        pop: PopRef,
        start_date: Option<SimDate>,
        end_date: Option<SimDate>,
        model_params: Option<ModelParams>,
        seed: Option<u64>,
        compile_only: bool,
    ) -> Result<Self> {
        pop.validate()?;
        if let (Some(s), Some(e)) = (&start_date, &end_date) {
            if e.date() < s.date() {
                return Err(ClientError::InvalidParams(format!(
                    "end_date {} is before start_date {}",
                    e, s
                )));
            }
        }
        Ok(Self {
            program: program.into(),
            pop,
            start_date,
            end_date,
            model_params,
            seed: materialize_seed(seed),
            compile_only,
        })
    }
}

impl fmt::Display for RunParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RunParams(program={}, pop={}, start_date={}, end_date={}, seed={}, compile_only={})",
            self.program,
            self.pop.name,
            self.start_date
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "None".to_string()),
            self.end_date
                .as_ref()
                .map(|d| d.to_string())
                .unwrap_or_else(|| "None".to_string()),
            self.seed,
            self.compile_only
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pop() -> PopRef {
        PopRef::new("US_County", vec!["42003".into()]).unwrap()
    }

    #[test]
    fn materializes_seed_when_absent() {
        let p = RunParams::new("model.fred", pop(), None, None, None, None, false).unwrap();
        assert_ne!(p.seed, 0);
    }

    #[test]
    fn keeps_explicit_nonzero_seed() {
        let p = RunParams::new("model.fred", pop(), None, None, None, Some(42), false).unwrap();
        assert_eq!(p.seed, 42);
    }

    #[test]
    fn rejects_end_before_start() {
        let s = SimDate::parse("2024-02-01").unwrap();
        let e = SimDate::parse("2024-01-01").unwrap();
        let err = RunParams::new("model.fred", pop(), Some(s), Some(e), None, None, false)
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidParams(_)));
    }

    #[test]
    fn display_is_single_line() {
        let p = RunParams::new("model.fred", pop(), None, None, None, Some(1), false).unwrap();
        let s = p.to_string();
        assert!(!s.contains('\n'));
        assert!(s.contains("seed=1"));
    }
}
