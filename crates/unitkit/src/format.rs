use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::locale::Locale;
use crate::prefix::{prefix_for_exponent, PrefixPolicy, MAX_PREFIX_EXPONENT, MIN_PREFIX_EXPONENT};
use crate::quantity::Quantity;
use crate::storage::Storage;
use crate::unit::Unit;

/// Magnitudes printed without an exponent: `[PLAIN_MIN, PLAIN_MAX)`.
const PLAIN_MIN: f64 = 1e-4;
const PLAIN_MAX: f64 = 1e7;

const SIGNIFICANT_DIGITS: u32 = 6;

/// Shortest round-tripping text for a value; scientific outside `[1e-4, 1e7)`.
pub(crate) fn format_number<S: Storage>(value: S) -> String {
    let x = value.to_f64();
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = x.abs();
    if magnitude == 0.0 || (PLAIN_MIN..PLAIN_MAX).contains(&magnitude) {
        format!("{value}")
    } else {
        format!("{value:e}")
    }
}

fn join(number: String, abbreviation: &str) -> String {
    if abbreviation.is_empty() {
        number
    } else {
        format!("{number} {abbreviation}")
    }
}

/// `<value> <abbreviation>` with the locale's decimal separator and, when the
/// unit has one, the locale's own abbreviation.
pub(crate) fn format_value<S: Storage>(value: S, unit: &Unit, locale: &Locale) -> String {
    let mut number = format_number(value);
    if locale.decimal_separator() != '.' {
        number = number.replace('.', &locale.decimal_separator().to_string());
    }
    let abbreviation = unit
        .localized_abbreviations(locale.tag())
        .first()
        .map(String::as_str)
        .unwrap_or_else(|| unit.abbreviation());
    join(number, abbreviation)
}

/// Round to a fixed number of significant digits and drop trailing zeros.
fn fmt_significant(x: f64) -> String {
    match Decimal::from_f64(x).and_then(|d| d.round_sf(SIGNIFICANT_DIGITS)) {
        Some(d) => d.normalize().to_string(),
        None => format_number(x),
    }
}

/// Decimal exponent of `x` as it prints after rounding to the mantissa
/// precision, so 999.9999 counts as 1e3.
fn decimal_exponent(x: f64) -> i32 {
    let text = format!("{:.5e}", x.abs());
    text.split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

fn scientific(si: f64, standard: &Unit) -> String {
    join(format!("{si:.4e}"), standard.abbreviation())
}

/// Format an SI value of `quantity` with the SI prefix that keeps the
/// mantissa in `[1, 1000)`.
///
/// Falls back to the standard unit when the value is not finite or the
/// quantity has no prefixable unit, and to scientific notation when the
/// exponent lies outside `[min_exp, max_exp]` or the prefixed unit does not
/// exist.
pub(crate) fn si_prefixed(si: f64, quantity: &'static Quantity, min_exp: i32, max_exp: i32) -> String {
    let english = Locale::english();
    let standard = quantity.standard_unit();
    if !si.is_finite() {
        return format_value(si, standard, &english);
    }
    let Some(base) = quantity.prefix_base() else {
        return format_value(si, standard, &english);
    };
    let value = base.from_si(si);
    if value == 0.0 {
        return format_value(value, base, &english);
    }

    let exponent = decimal_exponent(value);
    let low = min_exp.max(MIN_PREFIX_EXPONENT);
    let high = max_exp.min(MAX_PREFIX_EXPONENT) + 2;
    if exponent < low || exponent > high {
        return scientific(si, standard);
    }
    // Prefix exponents are multiples of three inside [low, max_exp].
    let first = (low + 2).div_euclid(3) * 3;
    let last = max_exp.min(MAX_PREFIX_EXPONENT).div_euclid(3) * 3;
    if first > last {
        return scientific(si, standard);
    }
    let rounded = (exponent.div_euclid(3) * 3).clamp(first, last);

    let key = match (base.prefixes(), rounded) {
        (_, 0) => base.abbreviation().to_string(),
        (PrefixPolicy::Per, _) => {
            let stem = base.abbreviation().trim_start_matches("1/");
            match prefix_for_exponent(-rounded) {
                Some(prefix) => format!("1/{}{stem}", prefix.symbol),
                None => return scientific(si, standard),
            }
        }
        (_, _) => match prefix_for_exponent(rounded) {
            Some(prefix) => format!("{}{}", prefix.symbol, base.abbreviation()),
            None => return scientific(si, standard),
        },
    };
    let Some(unit) = quantity.unit_by_abbreviation_in(&key, &english) else {
        log::trace!("No unit '{key}' for {}", quantity.name());
        return scientific(si, standard);
    };
    join(fmt_significant(unit.from_si(si)), &key)
}
