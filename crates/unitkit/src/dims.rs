use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnitsError;

/// Number of slots in a [`Dims`] vector.
pub const BASE_COUNT: usize = 9;

/// The base dimensions a [`Dims`] vector has an exponent for, in slot order.
///
/// Plane angle and solid angle are carried as pseudo-dimensions so that, for
/// example, angular velocity (rad/s) and frequency (1/s) stay distinct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BaseDimension {
    Mass,
    Length,
    Time,
    Current,
    Temperature,
    Amount,
    LuminousIntensity,
    Angle,
    SolidAngle,
}

impl BaseDimension {
    pub const ALL: [BaseDimension; BASE_COUNT] = [
        BaseDimension::Mass,
        BaseDimension::Length,
        BaseDimension::Time,
        BaseDimension::Current,
        BaseDimension::Temperature,
        BaseDimension::Amount,
        BaseDimension::LuminousIntensity,
        BaseDimension::Angle,
        BaseDimension::SolidAngle,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// SI symbol of the base unit for this dimension.
    pub const fn symbol(self) -> &'static str {
        match self {
            BaseDimension::Mass => "kg",
            BaseDimension::Length => "m",
            BaseDimension::Time => "s",
            BaseDimension::Current => "A",
            BaseDimension::Temperature => "K",
            BaseDimension::Amount => "mol",
            BaseDimension::LuminousIntensity => "cd",
            BaseDimension::Angle => "rad",
            BaseDimension::SolidAngle => "sr",
        }
    }
}

/// Exponent vector over the SI base dimensions.
///
/// Addition, subtraction and negation are component-wise and wrap on `i8`
/// overflow, so `(a + b) - b == a` holds for every pair of vectors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dims([i8; BASE_COUNT]);

impl Dims {
    pub const DIMENSIONLESS: Self = Self([0; BASE_COUNT]);
    pub const MASS: Self = Self::base(BaseDimension::Mass);
    pub const LENGTH: Self = Self::base(BaseDimension::Length);
    pub const TIME: Self = Self::base(BaseDimension::Time);
    pub const CURRENT: Self = Self::base(BaseDimension::Current);
    pub const TEMPERATURE: Self = Self::base(BaseDimension::Temperature);
    pub const AMOUNT: Self = Self::base(BaseDimension::Amount);
    pub const LUMINOUS_INTENSITY: Self = Self::base(BaseDimension::LuminousIntensity);
    pub const ANGLE: Self = Self::base(BaseDimension::Angle);
    pub const SOLID_ANGLE: Self = Self::base(BaseDimension::SolidAngle);

    pub const fn new(exponents: [i8; BASE_COUNT]) -> Self {
        Self(exponents)
    }

    const fn base(dim: BaseDimension) -> Self {
        let mut exponents = [0; BASE_COUNT];
        exponents[dim.index()] = 1;
        Self(exponents)
    }

    pub const fn exponent(self, dim: BaseDimension) -> i8 {
        self.0[dim.index()]
    }

    pub const fn exponents(self) -> [i8; BASE_COUNT] {
        self.0
    }

    pub const fn plus(self, rhs: Self) -> Self {
        let mut out = [0; BASE_COUNT];
        let mut i = 0;
        while i < BASE_COUNT {
            out[i] = self.0[i].wrapping_add(rhs.0[i]);
            i += 1;
        }
        Self(out)
    }

    pub const fn minus(self, rhs: Self) -> Self {
        let mut out = [0; BASE_COUNT];
        let mut i = 0;
        while i < BASE_COUNT {
            out[i] = self.0[i].wrapping_sub(rhs.0[i]);
            i += 1;
        }
        Self(out)
    }

    pub const fn negate(self) -> Self {
        Self::DIMENSIONLESS.minus(self)
    }

    pub const fn powi(self, n: i8) -> Self {
        let mut out = [0; BASE_COUNT];
        let mut i = 0;
        while i < BASE_COUNT {
            out[i] = self.0[i].wrapping_mul(n);
            i += 1;
        }
        Self(out)
    }

    /// Structural equality usable in const context (compile-time table checks).
    pub const fn same_as(self, other: Self) -> bool {
        let mut i = 0;
        while i < BASE_COUNT {
            if self.0[i] != other.0[i] {
                return false;
            }
            i += 1;
        }
        true
    }

    pub const fn is_dimensionless(self) -> bool {
        self.same_as(Self::DIMENSIONLESS)
    }

    /// Human readable form used in error messages, e.g. `[kg.m/s2]`.
    pub fn describe(&self) -> String {
        format!("[{self}]")
    }

    fn write_factors(
        f: &mut fmt::Formatter<'_>,
        factors: &[(BaseDimension, i8)],
    ) -> fmt::Result {
        for (i, (dim, exp)) in factors.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(dim.symbol())?;
            if *exp != 1 {
                write!(f, "{exp}")?;
            }
        }
        Ok(())
    }
}

impl std::ops::Add for Dims {
    type Output = Dims;
    fn add(self, rhs: Self) -> Self::Output {
        self.plus(rhs)
    }
}

impl std::ops::Sub for Dims {
    type Output = Dims;
    fn sub(self, rhs: Self) -> Self::Output {
        self.minus(rhs)
    }
}

impl std::ops::Neg for Dims {
    type Output = Dims;
    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut num = Vec::new();
        let mut den = Vec::new();
        for dim in BaseDimension::ALL {
            match self.exponent(dim) {
                0 => {}
                n if n > 0 => num.push((dim, n)),
                n => den.push((dim, n.wrapping_neg())),
            }
        }
        match (num.is_empty(), den.is_empty()) {
            (true, true) => f.write_str("1"),
            (false, true) => Self::write_factors(f, &num),
            (true, false) => {
                f.write_str("1/")?;
                Self::write_factors(f, &den)
            }
            (false, false) => {
                Self::write_factors(f, &num)?;
                f.write_str("/")?;
                Self::write_factors(f, &den)
            }
        }
    }
}

impl fmt::Debug for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dims({self})")
    }
}

// Longer symbols first so that "mol" is not read as "m" followed by garbage.
const SYMBOLS: [(&str, BaseDimension); BASE_COUNT] = [
    ("mol", BaseDimension::Amount),
    ("rad", BaseDimension::Angle),
    ("kg", BaseDimension::Mass),
    ("cd", BaseDimension::LuminousIntensity),
    ("sr", BaseDimension::SolidAngle),
    ("m", BaseDimension::Length),
    ("s", BaseDimension::Time),
    ("A", BaseDimension::Current),
    ("K", BaseDimension::Temperature),
];

fn superscript_digit(c: char) -> Option<char> {
    let digit = match c {
        '⁰' => '0',
        '¹' => '1',
        '²' => '2',
        '³' => '3',
        '⁴' => '4',
        '⁵' => '5',
        '⁶' => '6',
        '⁷' => '7',
        '⁸' => '8',
        '⁹' => '9',
        _ => return None,
    };
    Some(digit)
}

/// Read an optional exponent (`2`, `-2`, `^2`, `^-2`, `²`, `⁻¹`) at the start of `s`.
/// Returns the exponent (1 when absent) and the remaining input.
fn take_exponent(s: &str) -> Option<(i8, &str)> {
    let (caret, s) = match s.strip_prefix('^') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let mut digits = String::new();
    let mut consumed = 0;
    for (i, c) in s.char_indices() {
        let mapped = match c {
            '-' | '⁻' if i == 0 => Some('-'),
            c if c.is_ascii_digit() => Some(c),
            c => superscript_digit(c),
        };
        match mapped {
            Some(ch) => {
                digits.push(ch);
                consumed = i + c.len_utf8();
            }
            None => break,
        }
    }
    if digits.is_empty() {
        return (!caret).then_some((1, s));
    }
    let exp = digits.parse::<i8>().ok()?;
    Some((exp, &s[consumed..]))
}

/// Parse a product of base symbols, backtracking over symbol choices so that
/// concatenated forms like `srad` resolve to `s.rad`.
fn parse_factors(s: &str) -> Option<Dims> {
    let s = s.trim_start_matches(['.', '·', '*', ' ']);
    if s.is_empty() {
        return Some(Dims::DIMENSIONLESS);
    }
    for (symbol, dim) in SYMBOLS {
        let Some(rest) = s.strip_prefix(symbol) else {
            continue;
        };
        let Some((exp, rest)) = take_exponent(rest) else {
            continue;
        };
        if let Some(tail) = parse_factors(rest) {
            return Some(Dims::base(dim).powi(exp).plus(tail));
        }
    }
    None
}

fn strip_parens(s: &str) -> &str {
    s.strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .unwrap_or(s)
}

impl FromStr for Dims {
    type Err = UnitsError;

    /// Parse the SI-dimensions grammar: `kg.m/s2`, `kgm/s2`, `m^2`, `1/s`, `s-1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let unknown = || UnitsError::UnknownUnit {
            quantity: "SI".to_string(),
            unit: text.to_string(),
        };
        if text.is_empty() || text == "1" {
            return Ok(Dims::DIMENSIONLESS);
        }
        let (num, den) = match text.split_once('/') {
            None => (text, None),
            Some((lhs, rhs)) => {
                if rhs.contains('/') {
                    return Err(unknown());
                }
                let lhs = lhs.trim();
                let lhs = if lhs == "1" { "" } else { lhs };
                (lhs, Some(strip_parens(rhs.trim())))
            }
        };
        let mut dims = parse_factors(strip_parens(num)).ok_or_else(unknown)?;
        if let Some(den) = den {
            if den.is_empty() {
                return Err(unknown());
            }
            dims = dims.minus(parse_factors(den).ok_or_else(unknown)?);
        }
        Ok(dims)
    }
}

impl Serialize for Dims {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dims {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
