//! Resource quantity parsing
//!
//! The API types carry quantities as strings such as `500m`, `2`, `64Mi`
//! or `1e3`. This module parses them into an exact decimal/binary form and
//! scales them to integer units, rounding away from zero the way the
//! Kubernetes quantity system does.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;
use tracing::warn;

/// Errors produced while parsing a quantity string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityParseError {
    #[error("quantity is empty")]
    Empty,
    #[error("invalid number in quantity {0:?}")]
    InvalidNumber(String),
    #[error("unknown suffix {suffix:?} in quantity {quantity:?}")]
    UnknownSuffix { quantity: String, suffix: String },
}

/// Significant digits kept in the mantissa; more do not fit in an `i128`
const MAX_MANTISSA_DIGITS: usize = 38;

/// Value of a quantity: `mantissa * 10^exp10 * 2^exp2`.
///
/// `truncated` is set when nonzero digits beyond the mantissa were dropped,
/// i.e. the true magnitude is slightly above `mantissa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedQuantity {
    mantissa: i128,
    exp10: i32,
    exp2: u32,
    truncated: bool,
}

impl ParsedQuantity {
    /// Parse a quantity string
    pub fn parse(input: &str) -> Result<Self, QuantityParseError> {
        if input.is_empty() {
            return Err(QuantityParseError::Empty);
        }

        let (negative, unsigned) = match input.as_bytes()[0] {
            b'-' => (true, &input[1..]),
            b'+' => (false, &input[1..]),
            _ => (false, input),
        };

        let number_len = unsigned
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_len);

        let invalid = || QuantityParseError::InvalidNumber(input.to_string());

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.contains('.') {
            return Err(invalid());
        }

        let digits = format!("{whole}{fraction}");
        let significant = digits.trim_start_matches('0');
        let (kept, dropped) = significant.split_at(significant.len().min(MAX_MANTISSA_DIGITS));
        let truncated = dropped.bytes().any(|b| b != b'0');
        let mut mantissa: i128 = if kept.is_empty() {
            0
        } else {
            kept.parse().map_err(|_| invalid())?
        };
        if negative {
            mantissa = -mantissa;
        }

        let (suffix_exp10, exp2) = parse_suffix(suffix).ok_or_else(|| {
            QuantityParseError::UnknownSuffix {
                quantity: input.to_string(),
                suffix: suffix.to_string(),
            }
        })?;

        let fraction_len = i32::try_from(fraction.len()).map_err(|_| invalid())?;
        let dropped_len = i32::try_from(dropped.len()).map_err(|_| invalid())?;
        let exp10 = suffix_exp10
            .checked_sub(fraction_len)
            .and_then(|e| e.checked_add(dropped_len))
            .ok_or_else(invalid)?;

        Ok(Self {
            mantissa,
            exp10,
            exp2,
            truncated,
        })
    }

    /// Value in thousandths of the base unit, rounded away from zero
    pub fn milli_value(&self) -> i64 {
        self.scaled_value(-3)
    }

    /// Value in the base unit, rounded away from zero
    pub fn value(&self) -> i64 {
        self.scaled_value(0)
    }

    /// Value in units of `10^scale`, rounded away from zero and saturated
    /// to the `i64` range
    pub fn scaled_value(&self, scale: i32) -> i64 {
        if self.mantissa == 0 {
            return 0;
        }

        let saturated = if self.mantissa > 0 { i64::MAX } else { i64::MIN };
        let sign = self.mantissa.signum();

        let Some(n) = 2i128
            .checked_pow(self.exp2)
            .and_then(|factor| self.mantissa.checked_mul(factor))
        else {
            return saturated;
        };

        let exp = i64::from(self.exp10) - i64::from(scale);
        let scaled = if exp >= 0 {
            let factor = u32::try_from(exp).ok().and_then(|e| 10i128.checked_pow(e));
            let extra = if self.truncated { sign } else { 0 };
            match factor
                .and_then(|f| n.checked_mul(f))
                .and_then(|v| v.checked_add(extra))
            {
                Some(v) => v,
                None => return saturated,
            }
        } else {
            let divisor = u32::try_from(-exp).ok().and_then(|e| 10i128.checked_pow(e));
            match divisor {
                Some(d) => {
                    let q = n / d;
                    if n % d != 0 || self.truncated {
                        q + sign
                    } else {
                        q
                    }
                }
                // Smaller than one unit of the target scale
                None => sign,
            }
        };

        i64::try_from(scaled).unwrap_or(saturated)
    }
}

/// Returns (decimal exponent, binary exponent) for a suffix
fn parse_suffix(suffix: &str) -> Option<(i32, u32)> {
    let exps = match suffix {
        "" => (0, 0),
        "n" => (-9, 0),
        "u" => (-6, 0),
        "m" => (-3, 0),
        "k" => (3, 0),
        "M" => (6, 0),
        "G" => (9, 0),
        "T" => (12, 0),
        "P" => (15, 0),
        "E" => (18, 0),
        "Ki" => (0, 10),
        "Mi" => (0, 20),
        "Gi" => (0, 30),
        "Ti" => (0, 40),
        "Pi" => (0, 50),
        "Ei" => (0, 60),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            if exponent.is_empty() {
                return None;
            }
            (exponent.parse().ok()?, 0)
        }
    };
    Some(exps)
}

/// Integer conversions for API quantities
pub trait QuantityExt {
    fn try_milli_value(&self) -> Result<i64, QuantityParseError>;
    fn try_value(&self) -> Result<i64, QuantityParseError>;

    /// Milli-value of a well-formed quantity; malformed input yields 0
    fn milli_value(&self) -> i64;

    /// Integer value of a well-formed quantity; malformed input yields 0
    fn value(&self) -> i64;
}

impl QuantityExt for Quantity {
    fn try_milli_value(&self) -> Result<i64, QuantityParseError> {
        ParsedQuantity::parse(&self.0).map(|q| q.milli_value())
    }

    fn try_value(&self) -> Result<i64, QuantityParseError> {
        ParsedQuantity::parse(&self.0).map(|q| q.value())
    }

    fn milli_value(&self) -> i64 {
        self.try_milli_value().unwrap_or_else(|e| {
            warn!(quantity = %self.0, error = %e, "Unparseable quantity, using 0");
            0
        })
    }

    fn value(&self) -> i64 {
        self.try_value().unwrap_or_else(|e| {
            warn!(quantity = %self.0, error = %e, "Unparseable quantity, using 0");
            0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        Quantity(s.to_string())
    }

    #[test]
    fn test_cpu_milli_values() {
        assert_eq!(q("500m").milli_value(), 500);
        assert_eq!(q("2").milli_value(), 2000);
        assert_eq!(q("0.5").milli_value(), 500);
        assert_eq!(q("1.25").milli_value(), 1250);
        assert_eq!(q("250000u").milli_value(), 250);
    }

    #[test]
    fn test_milli_value_rounds_up() {
        assert_eq!(q("0.1m").milli_value(), 1);
        assert_eq!(q("1n").milli_value(), 1);
        assert_eq!(q("-0.1m").milli_value(), -1);
    }

    #[test]
    fn test_memory_values() {
        assert_eq!(q("128Mi").value(), 128 * 1024 * 1024);
        assert_eq!(q("64Mi").value(), 67_108_864);
        assert_eq!(q("1Gi").value(), 1 << 30);
        assert_eq!(q("1.5Gi").value(), 1_610_612_736);
        assert_eq!(q("500M").value(), 500_000_000);
        assert_eq!(q("1k").value(), 1000);
        assert_eq!(q("129e6").value(), 129_000_000);
        assert_eq!(q("1E3").value(), 1000);
        assert_eq!(q("1E").value(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_value_rounds_up() {
        assert_eq!(q("100m").value(), 1);
        assert_eq!(q("1500m").value(), 2);
        assert_eq!(q("2000m").value(), 2);
    }

    #[test]
    fn test_zero_and_signs() {
        assert_eq!(q("0").value(), 0);
        assert_eq!(q("0Mi").value(), 0);
        assert_eq!(q("+1Ki").value(), 1024);
        assert_eq!(q("-1Ki").value(), -1024);
    }

    #[test]
    fn test_saturates_on_overflow() {
        assert_eq!(q("16Ei").value(), i64::MAX);
        assert_eq!(q("-16Ei").value(), i64::MIN);
        assert_eq!(q("100E").milli_value(), i64::MAX);
    }

    #[test]
    fn test_long_mantissa() {
        let huge = format!("1{}", "0".repeat(40));
        assert_eq!(q(&huge).value(), i64::MAX);
        assert_eq!(q(&format!("-{}", huge)).milli_value(), i64::MIN);

        let near_one = format!("1.{}1", "0".repeat(38));
        assert_eq!(q(&near_one).value(), 2);
        assert_eq!(q(&near_one).milli_value(), 1001);

        let exact = format!("1.{}", "0".repeat(45));
        assert_eq!(q(&exact).value(), 1);
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        assert!(matches!(
            q(" 1").try_value(),
            Err(QuantityParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            q("1Mi ").try_value(),
            Err(QuantityParseError::UnknownSuffix { .. })
        ));
        assert_eq!(q(" 500m").milli_value(), 0);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(q("").try_value(), Err(QuantityParseError::Empty));
        assert!(matches!(
            q("abc").try_value(),
            Err(QuantityParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            q("1.2.3").try_value(),
            Err(QuantityParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            q("5Xi").try_value(),
            Err(QuantityParseError::UnknownSuffix { .. })
        ));
        assert!(matches!(
            q("5e").try_value(),
            Err(QuantityParseError::UnknownSuffix { .. })
        ));
    }

    #[test]
    fn test_malformed_quantity_is_zero() {
        assert_eq!(q("garbage").milli_value(), 0);
        assert_eq!(q("garbage").value(), 0);
    }
}
