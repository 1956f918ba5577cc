//! Synthetic population reference.
//!

use serde::{Deserialize, Serialize};
use simrun_common::{ClientError, Result};

/// A reference to a synthetic population: its registered name and the
/// ordered list of locations (counties, admin regions, ...) it covers.
///
/// Immutable once built; [`PopRef::new`] enforces the non-empty `locations`
/// invariant at construction time so no other component needs to re-check
/// it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopRef {
    pub name: String,
    pub locations: Vec<String>,
}

impl PopRef {
    /// Build a `PopRef`, rejecting an empty `locations` list.
    pub fn new(name: impl Into<String>, locations: Vec<String>) -> Result<Self> {
        let pop = PopRef {
            name: name.into(),
            locations,
        };
        pop.validate()?;
        Ok(pop)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.locations.is_empty() {
            return Err(ClientError::InvalidParams(format!(
                "population {:?} has no locations",
                self.name
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for PopRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:?}", self.name, self.locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_locations() {
        let err = PopRef::new("US_County", vec![]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidParams(_)));
    }

    #[test]
    fn accepts_non_empty_locations() {
        let pop = PopRef::new("US_County", vec!["42003".into()]).unwrap();
        assert_eq!(pop.locations, vec!["42003".to_string()]);
    }
}
