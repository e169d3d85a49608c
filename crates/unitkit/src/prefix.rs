use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Smallest and largest decimal exponent with an SI prefix.
pub const MIN_PREFIX_EXPONENT: i32 = -24;
pub const MAX_PREFIX_EXPONENT: i32 = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiPrefix {
    pub exponent: i32,
    /// Canonical textual prefix, e.g. `k` or `µ`.
    pub symbol: &'static str,
    /// Additional accepted spellings (`u` and Greek mu for micro).
    pub alternates: &'static [&'static str],
    pub name: &'static str,
}

impl SiPrefix {
    const fn new(exponent: i32, symbol: &'static str, name: &'static str) -> Self {
        Self {
            exponent,
            symbol,
            alternates: &[],
            name,
        }
    }

    /// Canonical symbol followed by the alternates.
    pub fn symbols(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.symbol).chain(self.alternates.iter().copied())
    }

    pub fn factor(&self) -> Decimal {
        pow10(self.exponent)
    }
}

pub const SI_PREFIXES: [SiPrefix; 20] = [
    SiPrefix::new(24, "Y", "yotta"),
    SiPrefix::new(21, "Z", "zetta"),
    SiPrefix::new(18, "E", "exa"),
    SiPrefix::new(15, "P", "peta"),
    SiPrefix::new(12, "T", "tera"),
    SiPrefix::new(9, "G", "giga"),
    SiPrefix::new(6, "M", "mega"),
    SiPrefix::new(3, "k", "kilo"),
    SiPrefix::new(2, "h", "hecto"),
    SiPrefix::new(1, "da", "deca"),
    SiPrefix::new(-1, "d", "deci"),
    SiPrefix::new(-2, "c", "centi"),
    SiPrefix::new(-3, "m", "milli"),
    SiPrefix {
        exponent: -6,
        symbol: "µ",
        alternates: &["μ", "u"],
        name: "micro",
    },
    SiPrefix::new(-9, "n", "nano"),
    SiPrefix::new(-12, "p", "pico"),
    SiPrefix::new(-15, "f", "femto"),
    SiPrefix::new(-18, "a", "atto"),
    SiPrefix::new(-21, "z", "zepto"),
    SiPrefix::new(-24, "y", "yocto"),
];

pub fn prefix_for_exponent(exponent: i32) -> Option<&'static SiPrefix> {
    SI_PREFIXES.iter().find(|p| p.exponent == exponent)
}

/// How prefixed variants of a declared unit are generated when a table is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixPolicy {
    /// No prefixed variants.
    #[default]
    None,
    /// `m` -> `km`, `mm`, ... with the prefix factor applied to the scale.
    All,
    /// `1/m` -> `1/km`, `1/mm`, ... with the inverse factor applied to the scale.
    Per,
}

impl PrefixPolicy {
    /// The abbreviation and scale multiplier of the prefixed variant of `abbreviation`.
    pub fn apply(self, prefix: &str, exponent: i32, abbreviation: &str) -> Option<(String, Decimal)> {
        match self {
            PrefixPolicy::None => None,
            PrefixPolicy::All if abbreviation.starts_with("1/") => None,
            PrefixPolicy::All => Some((format!("{prefix}{abbreviation}"), pow10(exponent))),
            PrefixPolicy::Per => {
                let stem = abbreviation.strip_prefix("1/")?;
                Some((format!("1/{prefix}{stem}"), pow10(-exponent)))
            }
        }
    }
}

#[inline]
pub(crate) fn pow10(exp: i32) -> Decimal {
    if exp >= 0 {
        Decimal::from_i128_with_scale(10i128.pow(exp as u32), 0)
    } else {
        Decimal::new(1, (-exp) as u32)
    }
}
