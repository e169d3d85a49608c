//! Unit-definition tables.
//!
//! Quantities and their units are data, not code: they are described in TOML
//! and registered with [`Registry::load_table`](crate::Registry::load_table).
//! The table bundled with the crate (`units.toml`) is loaded the first time the
//! global registry is used.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dims::Dims;
use crate::error::Result;
use crate::prefix::PrefixPolicy;

const BUNDLED: &str = include_str!("units.toml");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitTable {
    #[serde(default, rename = "quantity")]
    pub quantities: Vec<QuantityDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuantityDef {
    pub name: String,
    pub dimensions: Dims,
    /// Name of the absolute quantity paired with this (relative) one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute: Option<String>,
    /// Name of the relative quantity paired with this (absolute) one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
    /// Add the units to an already registered quantity of the same name.
    #[serde(default)]
    pub extend: bool,
    #[serde(default, rename = "unit")]
    pub units: Vec<UnitDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitDef {
    pub name: String,
    pub abbreviations: Vec<String>,
    #[serde(default = "one", with = "ratio")]
    pub scale: Decimal,
    #[serde(default, with = "ratio")]
    pub offset: Decimal,
    #[serde(default)]
    pub standard: bool,
    #[serde(default)]
    pub prefixes: PrefixPolicy,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localized: BTreeMap<String, Vec<String>>,
}

fn one() -> Decimal {
    Decimal::ONE
}

impl UnitTable {
    /// Parse from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// The default table shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED)
    }
}

/// Parse a table number: a decimal (`0.3048`), scientific (`1.602e-19`) or
/// rational (`5/9`) literal.
pub fn parse_ratio(text: &str) -> Option<Decimal> {
    fn decimal(s: &str) -> Option<Decimal> {
        let s = s.trim();
        if s.contains(['e', 'E']) {
            Decimal::from_scientific(s).ok()
        } else {
            Decimal::from_str(s).ok()
        }
    }
    match text.split_once('/') {
        Some((num, den)) => {
            let den = decimal(den)?;
            if den.is_zero() {
                return None;
            }
            decimal(num)?.checked_div(den)
        }
        None => decimal(text),
    }
}

mod ratio {
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Int(i) => Ok(Decimal::from(i)),
            Raw::Float(f) => Decimal::from_f64(f)
                .ok_or_else(|| de::Error::custom(format!("number {f} is out of range"))),
            Raw::Text(s) => super::parse_ratio(&s)
                .ok_or_else(|| de::Error::custom(format!("invalid number '{s}'"))),
        }
    }
}
