use crate::error::{Result, UnitsError};
use crate::locale::Locale;

const NON_FINITE: [(&str, f64); 4] = [
    ("-Infinity", f64::NEG_INFINITY),
    ("+Infinity", f64::INFINITY),
    ("Infinity", f64::INFINITY),
    ("NaN", f64::NAN),
];

/// Split `<number><ws?><abbreviation>` into the leading numeric literal and
/// the trimmed rest.
///
/// The literal takes an optional sign, `.` or the locale's decimal separator,
/// and an exponent only when digits follow the marker, so `2eV` is two
/// electronvolts.
pub(crate) fn split_literal<'a>(text: &'a str, locale: &Locale) -> Result<(f64, &'a str)> {
    let text = text.trim();
    if text.is_empty() {
        return Err(UnitsError::NullInput { what: "text" });
    }
    for (word, value) in NON_FINITE {
        if let Some(rest) = text.strip_prefix(word) {
            return Ok((value, rest.trim()));
        }
    }

    let malformed = || UnitsError::MalformedLiteral {
        text: text.to_string(),
        locale: locale.tag().to_string(),
    };
    let bytes: Vec<(usize, char)> = text.char_indices().collect();
    let mut literal = String::new();
    let mut pos = 0;
    let at = |pos: usize| bytes.get(pos).map(|(_, c)| *c);
    let is_digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());

    if let Some(sign @ ('+' | '-')) = at(pos) {
        literal.push(sign);
        pos += 1;
    }
    let mut digits = 0;
    while is_digit(at(pos)) {
        literal.extend(at(pos));
        pos += 1;
        digits += 1;
    }
    if let Some(c) = at(pos) {
        if (c == '.' || c == locale.decimal_separator()) && (digits > 0 || is_digit(at(pos + 1))) {
            literal.push('.');
            pos += 1;
            while is_digit(at(pos)) {
                literal.extend(at(pos));
                pos += 1;
                digits += 1;
            }
        }
    }
    if digits == 0 {
        return Err(malformed());
    }
    if let Some('e' | 'E') = at(pos) {
        let sign = matches!(at(pos + 1), Some('+' | '-'));
        let first = pos + 1 + usize::from(sign);
        if is_digit(at(first)) {
            literal.push('e');
            literal.extend(sign.then(|| at(pos + 1)).flatten());
            pos = first;
            while is_digit(at(pos)) {
                literal.extend(at(pos));
                pos += 1;
            }
        }
    }

    let value: f64 = literal.parse().map_err(|_| malformed())?;
    let rest = bytes.get(pos).map_or("", |(i, _)| &text[*i..]).trim();
    log::trace!("Split '{text}' into {value} and '{rest}'");
    Ok((value, rest))
}
