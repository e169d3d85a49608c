use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Div, Mul};
use std::str::FromStr;

use crate::dims::Dims;
use crate::error::{Result, UnitsError};
use crate::format;
use crate::locale::Locale;
use crate::parse;
use crate::prefix::{MAX_PREFIX_EXPONENT, MIN_PREFIX_EXPONENT};
use crate::quantity::{Quantity, Role};
use crate::storage::Storage;
use crate::unit::Unit;

/// A named quantity known at compile time.
///
/// Implemented by the marker types in [`crate::kind`]; the registered
/// [`Quantity`] is looked up by name once and cached.
pub trait Kind: Copy + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;
    const DIMS: Dims;
    const ROLE: Role;

    fn quantity() -> &'static Quantity;
}

/// An immutable measurement: the value in the standard (SI) unit of `Q`
/// plus the unit it is presented in.
///
/// The display unit never changes the stored magnitude; equality and
/// ordering compare SI values only.
pub struct Scalar<Q: Kind, S: Storage = f64> {
    si: S,
    unit: &'static Unit,
    kind: PhantomData<Q>,
}

impl<Q: Kind, S: Storage> Clone for Scalar<Q, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Q: Kind, S: Storage> Copy for Scalar<Q, S> {}

impl<Q: Kind, S: Storage> Scalar<Q, S> {
    pub(crate) fn from_parts(si: S, unit: &'static Unit) -> Self {
        Self {
            si,
            unit,
            kind: PhantomData,
        }
    }

    /// A computed SI value, shown in the standard unit.
    pub(crate) fn from_si_f64(si: f64) -> Self {
        Self::from_parts(S::from_f64(si), Q::quantity().standard_unit())
    }

    /// Same display unit, new SI value.
    pub(crate) fn with_si_f64(self, si: f64) -> Self {
        Self::from_parts(S::from_f64(si), self.unit)
    }

    /// Same display unit, value changed in that unit.
    pub(crate) fn map_in_unit(self, f: impl FnOnce(f64) -> f64) -> Self {
        let value = f(self.unit.from_si(self.si.to_f64()));
        self.with_si_f64(self.unit.to_si(value))
    }

    fn check_unit(unit: &'static Unit) -> Result<()> {
        if std::ptr::eq(unit.quantity(), Q::quantity()) {
            Ok(())
        } else {
            Err(UnitsError::UnknownUnit {
                quantity: Q::NAME.to_string(),
                unit: format!("{} ({})", unit.abbreviation(), unit.quantity().name()),
            })
        }
    }

    /// `value` expressed in `unit`, which must belong to this quantity.
    pub fn new(value: S, unit: &'static Unit) -> Result<Self> {
        Self::check_unit(unit)?;
        Ok(Self::from_parts(S::from_f64(unit.to_si(value.to_f64())), unit))
    }

    /// `value` in the unit with this abbreviation (active locale first).
    pub fn of(value: S, abbreviation: &str) -> Result<Self> {
        Self::of_with_locale(value, abbreviation, &Locale::current())
    }

    pub fn of_with_locale(value: S, abbreviation: &str, locale: &Locale) -> Result<Self> {
        let unit = Self::lookup(abbreviation, locale)?;
        Self::new(value, unit)
    }

    fn lookup(abbreviation: &str, locale: &Locale) -> Result<&'static Unit> {
        let abbreviation = abbreviation.trim();
        let quantity = Q::quantity();
        match quantity.unit_by_abbreviation_in(abbreviation, locale) {
            Some(unit) => Ok(unit),
            None if abbreviation.is_empty() => Err(UnitsError::NullInput {
                what: "unit abbreviation",
            }),
            None => Err(UnitsError::UnknownUnit {
                quantity: quantity.name().to_string(),
                unit: abbreviation.to_string(),
            }),
        }
    }

    /// A value in the standard unit.
    pub fn si(value: S) -> Self {
        Self::from_parts(value, Q::quantity().standard_unit())
    }

    /// Rewrap an SI value with a display unit of this quantity.
    pub fn instantiate(si: S, unit: &'static Unit) -> Result<Self> {
        Self::check_unit(unit)?;
        Ok(Self::from_parts(si, unit))
    }

    pub fn zero() -> Self {
        Self::si(S::default())
    }

    pub fn nan() -> Self {
        Self::from_si_f64(f64::NAN)
    }

    pub fn positive_infinity() -> Self {
        Self::from_si_f64(f64::INFINITY)
    }

    pub fn negative_infinity() -> Self {
        Self::from_si_f64(f64::NEG_INFINITY)
    }

    pub fn si_value(&self) -> S {
        self.si
    }

    /// The value in the display unit.
    pub fn in_unit(&self) -> S {
        S::from_f64(self.unit.from_si(self.si.to_f64()))
    }

    pub fn in_unit_of(&self, unit: &'static Unit) -> Result<S> {
        Self::check_unit(unit)?;
        Ok(S::from_f64(unit.from_si(self.si.to_f64())))
    }

    pub fn display_unit(&self) -> &'static Unit {
        self.unit
    }

    pub fn with_display_unit(self, unit: &'static Unit) -> Result<Self> {
        Self::instantiate(self.si, unit)
    }

    pub fn quantity(&self) -> &'static Quantity {
        Q::quantity()
    }

    pub fn is_zero(&self) -> bool {
        self.si.to_f64() == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.si.to_f64().is_finite()
    }

    pub fn is_nan(&self) -> bool {
        self.si.to_f64().is_nan()
    }

    /// The larger of two values; `self` on ties.
    pub fn max(self, other: Self) -> Self {
        if other.si > self.si {
            other
        } else {
            self
        }
    }

    /// The smaller of two values; `self` on ties.
    pub fn min(self, other: Self) -> Self {
        if other.si < self.si {
            other
        } else {
            self
        }
    }

    pub fn max_of(first: Self, rest: impl IntoIterator<Item = Self>) -> Self {
        rest.into_iter().fold(first, Self::max)
    }

    pub fn min_of(first: Self, rest: impl IntoIterator<Item = Self>) -> Self {
        rest.into_iter().fold(first, Self::min)
    }

    /// Linear interpolation in the display unit of `zero`; `ratio` must lie
    /// in `[0, 1]`.
    pub fn interpolate(zero: Self, one: Self, ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(UnitsError::RangeViolation { ratio });
        }
        Ok(Self::extrapolate(zero, one, ratio))
    }

    /// Like [`Scalar::interpolate`] but accepts any ratio.
    pub fn extrapolate(zero: Self, one: Self, ratio: f64) -> Self {
        let unit = zero.unit;
        let start = unit.from_si(zero.si.to_f64());
        let end = unit.from_si(one.si.to_f64());
        if ratio == 0.0 {
            return zero;
        }
        if ratio == 1.0 {
            return Self::from_parts(one.si, unit);
        }
        zero.with_si_f64(unit.to_si(start * (1.0 - ratio) + end * ratio))
    }

    /// `self * rhs`, for any pairing with a declared result.
    pub fn times<R>(self, rhs: R) -> <Self as Mul<R>>::Output
    where
        Self: Mul<R>,
    {
        self * rhs
    }

    /// `self / rhs`, for any pairing with a declared result.
    pub fn divide<R>(self, rhs: R) -> <Self as Div<R>>::Output
    where
        Self: Div<R>,
    {
        self / rhs
    }

    /// Parse `<number> <abbreviation>`; an empty abbreviation means the
    /// standard unit.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with_locale(text, &Locale::current())
    }

    pub fn parse_with_locale(text: &str, locale: &Locale) -> Result<Self> {
        let (value, abbreviation) = parse::split_literal(text, locale)?;
        let unit = if abbreviation.is_empty() {
            Q::quantity().standard_unit()
        } else {
            Self::lookup(abbreviation, locale)?
        };
        Self::new(S::from_f64(value), unit)
    }

    pub fn format_in(&self, unit: &'static Unit) -> Result<String> {
        let value = self.in_unit_of(unit)?;
        Ok(format::format_value(value, unit, &Locale::english()))
    }

    /// Display-unit text with the locale's decimal separator and abbreviation.
    pub fn format_with_locale(&self, locale: &Locale) -> String {
        format::format_value(self.in_unit(), self.unit, locale)
    }

    /// Text in the SI-prefixed unit that keeps the mantissa in `[1, 1000)`.
    pub fn to_string_si_prefixed(&self) -> String {
        self.to_string_si_prefixed_in(MIN_PREFIX_EXPONENT, MAX_PREFIX_EXPONENT)
    }

    pub fn to_string_si_prefixed_in(&self, min_exp: i32, max_exp: i32) -> String {
        format::si_prefixed(self.si.to_f64(), Q::quantity(), min_exp, max_exp)
    }
}

/// SI product of two scalars, shown in the standard unit of the result.
pub(crate) fn product<A: Kind, B: Kind, O: Kind, S: Storage>(a: Scalar<A, S>, b: Scalar<B, S>) -> Scalar<O, S> {
    Scalar::from_si_f64(a.si.to_f64() * b.si.to_f64())
}

/// SI quotient of two scalars, shown in the standard unit of the result.
pub(crate) fn quotient<A: Kind, B: Kind, O: Kind, S: Storage>(a: Scalar<A, S>, b: Scalar<B, S>) -> Scalar<O, S> {
    Scalar::from_si_f64(a.si.to_f64() / b.si.to_f64())
}

/// `a - b` of an absolute quantity as its relative partner `R`, shown in the
/// counterpart of `a`'s display unit when `R` has one.
pub(crate) fn relative_difference<A: Kind, R: Kind, S: Storage>(a: Scalar<A, S>, b: Scalar<A, S>) -> Scalar<R, S> {
    let unit = a
        .unit
        .counterpart()
        .filter(|unit| std::ptr::eq(unit.quantity(), R::quantity()))
        .unwrap_or_else(|| R::quantity().standard_unit());
    Scalar::from_parts(S::from_f64(a.si.to_f64() - b.si.to_f64()), unit)
}

impl<Q: Kind, S: Storage> PartialEq for Scalar<Q, S> {
    fn eq(&self, other: &Self) -> bool {
        self.si == other.si
    }
}

impl<Q: Kind, S: Storage> PartialOrd for Scalar<Q, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.si.partial_cmp(&other.si)
    }
}

impl<Q: Kind, S: Storage> fmt::Display for Scalar<Q, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::format_value(self.in_unit(), self.unit, &Locale::english()))
    }
}

impl<Q: Kind, S: Storage> fmt::Debug for Scalar<Q, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalar")
            .field("kind", &Q::NAME)
            .field("si", &self.si)
            .field("unit", &self.unit.abbreviation())
            .finish()
    }
}

impl<Q: Kind, S: Storage> FromStr for Scalar<Q, S> {
    type Err = UnitsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
