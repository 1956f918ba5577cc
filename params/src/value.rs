//! Calendar dates and model-parameter values carried on a [`crate::RunParams`].
//!

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use simrun_common::{ClientError, Result};
use std::fmt;

/// A calendar date as it travels through the client.
///
/// Per §4.1, a caller may supply a date as a plain string; that string is
/// preserved verbatim (`raw`) for storage/diagnostics, while the parsed
/// [`NaiveDate`] is what the wire protocol and date-ordering invariants use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimDate {
    raw: String,
    date: NaiveDate,
}

impl SimDate {
    /// Parse a caller-supplied date string. Tries the canonical
    /// `YYYY-MM-DD` format first, then falls back to a more permissive
    /// parser for human-typed dates, before giving up with `InvalidDate`.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            return Ok(Self { raw, date });
        }
        if let Ok(dt) = dateparser::parse(&raw) {
            return Ok(Self {
                raw,
                date: dt.date_naive(),
            });
        }
        Err(ClientError::InvalidDate(raw))
    }

    /// Build directly from an already-parsed calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            raw: date.format("%Y-%m-%d").to_string(),
            date,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Canonical `YYYY-MM-DD` rendering, for the wire protocol.
    pub fn wire_format(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The original textual form supplied by the caller, if any.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for SimDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A single `model_params` value: either a number or a free-form string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

/// Ordered `model_params` mapping.
///
/// A plain `HashMap`/`BTreeMap` would lose the caller's iteration order,
/// which the wire protocol needs to preserve (§6.2: one `-o key=value` per
/// entry, in caller order). `ModelParams` keeps entries as a `Vec` and
/// (de)serializes to/from a JSON object manually so the order survives a
/// round trip through the cache file regardless of the `serde_json` crate's
/// map-ordering feature flags.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ModelParams(Vec<(String, ParamValue)>);

impl ModelParams {
    pub fn new(entries: Vec<(String, ParamValue)>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ParamValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for ModelParams {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ModelParams {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor;

        impl<'de> Visitor<'de> for OrderedMapVisitor {
            type Value = ModelParams;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping names to numbers or strings")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((k, v)) = map.next_entry::<String, ParamValue>()? {
                    entries.push((k, v));
                }
                Ok(ModelParams(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_parses_canonical_form_and_preserves_raw() {
        let d = SimDate::parse("2024-01-15").unwrap();
        assert_eq!(d.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(d.raw(), "2024-01-15");
        assert_eq!(d.wire_format(), "2024-01-15");
    }

    #[test]
    fn date_rejects_garbage() {
        assert!(matches!(
            SimDate::parse("not-a-date"),
            Err(ClientError::InvalidDate(_))
        ));
    }

    #[test]
    fn model_params_round_trips_order_through_json() {
        let mp = ModelParams::new(vec![
            ("c".to_string(), ParamValue::Number(3.0)),
            ("a".to_string(), ParamValue::Text("x".to_string())),
            ("b".to_string(), ParamValue::Number(1.0)),
        ]);
        let json = serde_json::to_string(&mp).unwrap();
        let back: ModelParams = serde_json::from_str(&json).unwrap();
        let keys: Vec<_> = back.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }
}
