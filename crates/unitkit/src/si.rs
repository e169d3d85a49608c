use std::fmt;
use std::str::FromStr;

use crate::dims::Dims;
use crate::error::{Result, UnitsError};
use crate::format;
use crate::locale::Locale;
use crate::parse;
use crate::prefix::{MAX_PREFIX_EXPONENT, MIN_PREFIX_EXPONENT};
use crate::quantity::Quantity;
use crate::registry::registry;
use crate::scalar::{Kind, Scalar};
use crate::storage::Storage;
use crate::unit::Unit;

/// A scalar whose quantity is only known at run time.
///
/// Produced by the dynamic operations in [`crate::arith`] and by parsing
/// arbitrary unit text; the quantity is a named one when the dimension vector
/// is registered and a synthesized one otherwise. Convert to a typed
/// [`Scalar`] with [`SiScalar::as_quantity`] or one of the `as_<kind>` shortcuts.
#[derive(Clone, Copy)]
pub struct SiScalar<S: Storage = f64> {
    si: S,
    unit: &'static Unit,
}

impl<S: Storage> SiScalar<S> {
    pub(crate) fn from_parts(si: S, unit: &'static Unit) -> Self {
        Self { si, unit }
    }

    /// A computed SI value of `quantity`, shown in its standard unit.
    pub(crate) fn from_si_f64(si: f64, quantity: &'static Quantity) -> Self {
        Self::from_parts(S::from_f64(si), quantity.standard_unit())
    }

    /// `value` in `unit` of any registered or synthesized quantity.
    pub fn new(value: S, unit: &'static Unit) -> Self {
        Self::from_parts(S::from_f64(unit.to_si(value.to_f64())), unit)
    }

    /// `value` in a registered abbreviation (`km/h`) or an SI-dimensions
    /// expression (`kg.m/s2`).
    pub fn of(value: S, unit_text: &str) -> Result<Self> {
        let unit_text = unit_text.trim();
        if unit_text.is_empty() {
            return Err(UnitsError::NullInput {
                what: "unit text",
            });
        }
        let unit = registry().resolve_si_unit(unit_text)?;
        Ok(Self::new(value, unit))
    }

    /// A value of the quantity with dimensions `dims`, in its standard unit.
    pub fn with_dims(si: S, dims: Dims) -> Self {
        Self::from_parts(si, registry().lookup_or_create(dims).standard_unit())
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_locale(text, &Locale::current())
    }

    pub fn parse_with_locale(text: &str, locale: &Locale) -> Result<Self> {
        let (value, unit_text) = parse::split_literal(text, locale)?;
        let unit = registry().resolve_si_unit(unit_text)?;
        Ok(Self::new(S::from_f64(value), unit))
    }

    pub fn si_value(&self) -> S {
        self.si
    }

    pub fn in_unit(&self) -> S {
        S::from_f64(self.unit.from_si(self.si.to_f64()))
    }

    pub fn display_unit(&self) -> &'static Unit {
        self.unit
    }

    pub fn quantity(&self) -> &'static Quantity {
        self.unit.quantity()
    }

    pub fn dims(&self) -> Dims {
        self.unit.quantity().dims()
    }

    /// Cast to a typed scalar, keeping the display unit when it belongs to `Q`.
    ///
    /// Relative quantities accept any scalar with the same dimension vector;
    /// absolute quantities only accept their own values.
    pub fn as_quantity<Q: Kind>(&self) -> Result<Scalar<Q, S>> {
        let target = Q::quantity();
        self.check_cast(target)?;
        let unit = if std::ptr::eq(self.unit.quantity(), target) {
            self.unit
        } else {
            target.standard_unit()
        };
        Scalar::instantiate(self.si, unit)
    }

    /// Cast to a typed scalar shown in `unit`.
    pub fn as_quantity_in<Q: Kind>(&self, unit: &'static Unit) -> Result<Scalar<Q, S>> {
        self.check_cast(Q::quantity())?;
        Scalar::instantiate(self.si, unit)
    }

    fn check_cast(&self, target: &'static Quantity) -> Result<()> {
        let source = self.quantity();
        let compatible = std::ptr::eq(source, target)
            || (source.dims() == target.dims() && !source.is_absolute() && !target.is_absolute());
        if compatible {
            Ok(())
        } else {
            Err(UnitsError::DimensionMismatch {
                computed: source.describe(),
                expected: target.describe(),
            })
        }
    }

    pub fn format_with_locale(&self, locale: &Locale) -> String {
        format::format_value(self.in_unit(), self.unit, locale)
    }

    pub fn to_string_si_prefixed(&self) -> String {
        self.to_string_si_prefixed_in(MIN_PREFIX_EXPONENT, MAX_PREFIX_EXPONENT)
    }

    pub fn to_string_si_prefixed_in(&self, min_exp: i32, max_exp: i32) -> String {
        format::si_prefixed(self.si.to_f64(), self.quantity(), min_exp, max_exp)
    }
}

impl<Q: Kind, S: Storage> From<Scalar<Q, S>> for SiScalar<S> {
    fn from(scalar: Scalar<Q, S>) -> Self {
        Self::from_parts(scalar.si_value(), scalar.display_unit())
    }
}

impl<S: Storage> PartialEq for SiScalar<S> {
    /// Equal when the dimension vectors match and the SI values are equal.
    fn eq(&self, other: &Self) -> bool {
        self.dims() == other.dims() && self.si == other.si
    }
}

impl<S: Storage> fmt::Display for SiScalar<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::format_value(self.in_unit(), self.unit, &Locale::english()))
    }
}

impl<S: Storage> fmt::Debug for SiScalar<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiScalar")
            .field("quantity", &self.quantity().name())
            .field("si", &self.si)
            .field("unit", &self.unit.abbreviation())
            .finish()
    }
}

impl<S: Storage> FromStr for SiScalar<S> {
    type Err = UnitsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
