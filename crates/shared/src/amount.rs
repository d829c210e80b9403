//! Fixed-point fee amounts.
//!
//! Fees arrive as integers in the smallest unit of the native asset
//! (9 implied decimals). They routinely exceed 2^53, so everything here
//! works on `u128` and never goes through `f64`.

use rust_decimal::Decimal;
use serde::{de, Deserializer, Serializer};

use crate::{Error, Result};

/// Implied decimals of every fee amount returned by the upstream APIs.
pub const FEE_DECIMALS: u32 = 9;

const MIN_FRACTION_DIGITS: usize = 2;
const MAX_FRACTION_DIGITS: u32 = 4;
// 10^38 is the largest power of ten a u128 can hold.
const MAX_DECIMALS: u32 = 38;

/// Parse the decimal string form used on the wire.
pub fn parse_amount(raw: &str) -> Result<u128> {
    raw.trim()
        .parse::<u128>()
        .map_err(|e| Error::InvalidAmount(format!("{:?}: {}", raw, e)))
}

/// Render a raw amount with a thousands separator and 2 to 4 fractional
/// digits. The fourth fractional digit is rounded half-up.
pub fn format_amount(raw: Option<u128>, decimals: u32) -> String {
    let Some(raw) = raw else {
        return "0".to_string();
    };

    let decimals = decimals.min(MAX_DECIMALS);
    let scale = 10u128.pow(decimals);
    let mut whole = raw / scale;
    let remainder = raw % scale;

    let mut fraction = if decimals >= MAX_FRACTION_DIGITS {
        let divisor = 10u128.pow(decimals - MAX_FRACTION_DIGITS);
        let digits = remainder / divisor;
        let dropped = remainder % divisor;
        if divisor > 1 && dropped >= divisor - dropped {
            digits + 1
        } else {
            digits
        }
    } else {
        remainder * 10u128.pow(MAX_FRACTION_DIGITS - decimals)
    };

    if fraction == 10u128.pow(MAX_FRACTION_DIGITS) {
        whole += 1;
        fraction = 0;
    }

    let mut fraction = format!("{:04}", fraction);
    while fraction.len() > MIN_FRACTION_DIGITS && fraction.ends_with('0') {
        fraction.pop();
    }

    format!("{}.{}", group_thousands(&whole.to_string()), fraction)
}

/// [`format_amount`] for the wire string form. Absent or empty input renders `"0"`.
pub fn format_amount_str(raw: Option<&str>) -> Result<String> {
    match raw.map(str::trim) {
        None | Some("") => Ok("0".to_string()),
        Some(value) => Ok(format_amount(Some(parse_amount(value)?), FEE_DECIMALS)),
    }
}

/// `claimed / total` as a percentage at basis-point precision.
///
/// Integer division truncates toward zero; a zero total yields zero.
pub fn percentage(claimed: u128, total: u128) -> Decimal {
    if total == 0 {
        return Decimal::ZERO;
    }
    let basis_points = claimed.saturating_mul(10_000) / total;
    i64::try_from(basis_points)
        .map(|bp| Decimal::new(bp, 2))
        .unwrap_or(Decimal::MAX)
}

/// Whole-dollar USD rendering, e.g. `$29,999`.
pub fn format_currency_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let whole = amount.abs().round() as u128;
    let sign = if amount < 0.0 && whole > 0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(&whole.to_string()))
}

/// `AbCd...MnOp` style shortening for addresses: first 4 and last 4
/// characters, overlapping for short input. Empty stays empty.
pub fn shorten_identifier(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    let head: String = chars[..chars.len().min(4)].iter().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// Rounds up to 2^128, so it works as an exclusive bound.
const U128_LIMIT_F64: f64 = u128::MAX as f64;

struct AmountVisitor;

impl<'de> de::Visitor<'de> for AmountVisitor {
    type Value = Option<u128>;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("a non-negative integer amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, text: &str) -> std::result::Result<Self::Value, E> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        parse_amount(text).map(Some).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Self::Value, E> {
        Ok(Some(u128::from(value)))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> std::result::Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Self::Value, E> {
        u128::try_from(value)
            .map(Some)
            .map_err(|_| E::custom(format!("negative amount: {}", value)))
    }

    // JSON integers beyond u64 arrive as floats
    fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Self::Value, E> {
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < U128_LIMIT_F64 {
            Ok(Some(value as u128))
        } else {
            Err(E::custom(format!("not a whole non-negative amount: {}", value)))
        }
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts a decimal string, a JSON integer of any size or null (zero).
pub fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_amount(deserializer)?.unwrap_or(0))
}

pub fn deserialize_opt_amount<'de, D>(deserializer: D) -> std::result::Result<Option<u128>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(AmountVisitor)
}

/// Amounts leave the service as strings so JavaScript clients keep full precision.
pub fn serialize_amount<S>(value: &u128, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}
