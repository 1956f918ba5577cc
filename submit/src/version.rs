//! Version Adapter (§4.3): rewrites a parameter record for a target engine
//! major version.
//!

use simrun_common::{ClientError, Result};
use simrun_params::RunParams;

/// The newest engine major version this client knows the wire layout for.
/// The literal `latest` resolves to this.
pub const NEWEST_MAJOR: u32 = 11;

/// A parsed engine version: either `MAJOR.MINOR.PATCH` or the literal
/// `latest`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineVersion {
    major: u32,
    raw: String,
}

impl EngineVersion {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw == "latest" {
            return Ok(Self {
                major: NEWEST_MAJOR,
                raw,
            });
        }
        let major = raw
            .split('.')
            .next()
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or_else(|| ClientError::InvalidParams(format!("invalid engine version: {raw}")))?;
        Ok(Self { major, raw })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this version uses the older argument/path layout (anything
    /// older than [`NEWEST_MAJOR`]).
    pub fn is_older_major(&self) -> bool {
        self.major < NEWEST_MAJOR
    }
}

impl std::fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Rescale a 64-bit seed into the `[1, 2^16]` range the older engine major
/// accepts for its run number, per §4.3/§8's seed rescaling law.
pub fn rescale_seed(seed: u64) -> u32 {
    (1 + (seed % 65_536)) as u32
}

/// Adapt a [`RunParams`] for submission against `version`.
///
/// Never mutates `params`; always returns an adapted copy. For the older
/// major this rescales the seed into the 16-bit run-number range; the
/// newer major is returned unchanged.
pub fn adapt(params: &RunParams, version: &EngineVersion) -> RunParams {
    let mut adapted = params.clone();
    if version.is_older_major() {
        adapted.seed = rescale_seed(params.seed) as u64;
    }
    adapted
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn latest_resolves_to_newest_major() {
        let v = EngineVersion::parse("latest").unwrap();
        assert_eq!(v.major(), NEWEST_MAJOR);
        assert!(!v.is_older_major());
    }

    #[test]
    fn parses_major_minor_patch() {
        let v = EngineVersion::parse("10.1.1").unwrap();
        assert_eq!(v.major(), 10);
        assert!(v.is_older_major());

        let v = EngineVersion::parse("11.0.1").unwrap();
        assert_eq!(v.major(), 11);
        assert!(!v.is_older_major());
    }

    #[test]
    fn rescale_seed_law() {
        assert_eq!(rescale_seed(0), 1);
        assert_eq!(rescale_seed(u64::MAX), 65_536);
    }

    #[rstest]
    #[case(1)]
    #[case(42)]
    #[case(65_535)]
    #[case(65_536)]
    #[case(65_537)]
    #[case(u64::MAX - 1)]
    fn rescale_seed_stays_in_range(#[case] s: u64) {
        let r = rescale_seed(s);
        assert!((1..=65_536).contains(&r));
    }

    #[test]
    fn adapt_rescales_only_for_older_major() {
        use simrun_params::PopRef;
        let pop = PopRef::new("US_County", vec!["42003".into()]).unwrap();
        let params = RunParams::new("model.fred", pop, None, None, None, Some(42), false).unwrap();

        let older = EngineVersion::parse("10.1.1").unwrap();
        let adapted = adapt(&params, &older);
        assert_eq!(adapted.seed, rescale_seed(42) as u64);
        assert_eq!(params.seed, 42, "original must not be mutated");

        let newer = EngineVersion::parse("11.0.1").unwrap();
        let adapted = adapt(&params, &newer);
        assert_eq!(adapted.seed, 42);
    }
}
