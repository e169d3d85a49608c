use std::collections::BTreeMap;
use std::fmt;

use crate::prefix::PrefixPolicy;
use crate::quantity::Quantity;

/// A linearly convertible unit of one [`Quantity`]: `si = raw * scale + offset`.
///
/// Units are created by the registry when a table is loaded and live for the
/// rest of the process; they are compared by identity.
pub struct Unit {
    name: String,
    abbreviations: Vec<String>,
    localized: BTreeMap<String, Vec<String>>,
    scale: f64,
    offset: f64,
    standard: bool,
    prefixes: PrefixPolicy,
    quantity: &'static Quantity,
}

pub(crate) struct UnitSpec {
    pub name: String,
    pub abbreviations: Vec<String>,
    pub localized: BTreeMap<String, Vec<String>>,
    pub scale: f64,
    pub offset: f64,
    pub standard: bool,
    pub prefixes: PrefixPolicy,
}

impl Unit {
    pub(crate) fn leak(spec: UnitSpec, quantity: &'static Quantity) -> &'static Unit {
        Box::leak(Box::new(Unit {
            name: spec.name,
            abbreviations: spec.abbreviations,
            localized: spec.localized,
            scale: spec.scale,
            offset: spec.offset,
            standard: spec.standard,
            prefixes: spec.prefixes,
            quantity,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical (first) abbreviation.
    pub fn abbreviation(&self) -> &str {
        &self.abbreviations[0]
    }

    pub fn abbreviations(&self) -> &[String] {
        &self.abbreviations
    }

    /// Textual forms registered for a locale tag, empty when there are none.
    pub fn localized_abbreviations(&self, locale_tag: &str) -> &[String] {
        self.localized
            .get(locale_tag)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn localized(&self) -> &BTreeMap<String, Vec<String>> {
        &self.localized
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_standard(&self) -> bool {
        self.standard
    }

    /// True when converting to SI needs an offset (e.g. degree Celsius).
    pub fn is_affine(&self) -> bool {
        self.offset != 0.0
    }

    pub fn prefixes(&self) -> PrefixPolicy {
        self.prefixes
    }

    pub fn quantity(&self) -> &'static Quantity {
        self.quantity
    }

    pub fn standard_unit(&self) -> &'static Unit {
        self.quantity.standard_unit()
    }

    #[inline]
    pub fn to_si(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }

    #[inline]
    pub fn from_si(&self, si: f64) -> f64 {
        (si - self.offset) / self.scale
    }

    /// The unit of the paired absolute/relative quantity with the same
    /// canonical abbreviation and scale (°C absolute <-> °C difference).
    pub fn counterpart(&self) -> Option<&'static Unit> {
        let paired = self.quantity.paired()?;
        paired
            .units()
            .into_iter()
            .find(|u| u.abbreviation() == self.abbreviation() && u.scale == self.scale)
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Unit {}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("name", &self.name)
            .field("abbreviations", &self.abbreviations)
            .field("scale", &self.scale)
            .field("offset", &self.offset)
            .field("quantity", &self.quantity.name())
            .finish()
    }
}
