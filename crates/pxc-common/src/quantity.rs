//! Kubernetes resource quantities
//!
//! Parses quantity strings such as `128Mi`, `1.5G`, `500m` or `1e3` into an
//! exact nano-unit amount, supports the integer arithmetic the restore job
//! needs, and renders values back in Kubernetes canonical form.

use std::fmt;
use std::str::FromStr;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;

/// Nano-units per whole unit
const NANOS_PER_UNIT: i128 = 1_000_000_000;

/// Largest power of 1024 with a suffix (`Ei`)
const MAX_BINARY_EXPONENT: u32 = 6;

/// Largest power of 10 with a suffix (`E`)
const MAX_DECIMAL_EXPONENT: i32 = 18;

/// Smallest power of 10 with a suffix (`n`)
const MIN_DECIMAL_EXPONENT: i32 = -9;

/// Errors produced while parsing a quantity string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// The input was empty
    #[error("quantity is empty")]
    Empty,

    /// The numeric part could not be parsed
    #[error("invalid number in quantity '{0}'")]
    InvalidNumber(String),

    /// The unit suffix is not a known Kubernetes suffix
    #[error("unknown suffix '{suffix}' in quantity '{input}'")]
    InvalidSuffix {
        /// Full quantity string
        input: String,
        /// The unrecognised suffix
        suffix: String,
    },

    /// The value does not fit the internal representation
    #[error("quantity '{0}' is out of range")]
    OutOfRange(String),
}

/// Suffix family a quantity was written in
///
/// Canonical rendering keeps the family, so `1Gi` stays binary and `1G`
/// stays decimal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantityFormat {
    /// Powers of 1024 (`Ki`, `Mi`, `Gi`, ...)
    BinarySI,
    /// Powers of 1000 (`m`, `k`, `M`, `G`, ...) or no suffix
    DecimalSI,
    /// Scientific notation (`1e3`, `5E-2`)
    DecimalExponent,
}

/// An exact resource quantity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedQuantity {
    nanos: i128,
    format: QuantityFormat,
}

impl ParsedQuantity {
    /// Build a quantity holding `value` whole units
    pub fn from_value(value: i128, format: QuantityFormat) -> Self {
        Self {
            nanos: value.saturating_mul(NANOS_PER_UNIT),
            format,
        }
    }

    /// Suffix family of this quantity
    pub fn format(&self) -> QuantityFormat {
        self.format
    }

    /// Value rounded up to a whole unit
    pub fn value(&self) -> i128 {
        let whole = self.nanos.div_euclid(NANOS_PER_UNIT);
        if self.nanos.rem_euclid(NANOS_PER_UNIT) == 0 {
            whole
        } else {
            whole + 1
        }
    }

    /// Subtract `other`, keeping this quantity's format
    pub fn sub(&self, other: &ParsedQuantity) -> Self {
        Self {
            nanos: self.nanos - other.nanos,
            format: self.format,
        }
    }

    /// Convert to the k8s-openapi wire type using the canonical rendering
    pub fn to_k8s(&self) -> Quantity {
        Quantity(self.to_string())
    }

    /// Binary rendering, or `None` when the value must fall back to decimal
    fn binary_repr(&self) -> Option<(i128, &'static str)> {
        if self.nanos % NANOS_PER_UNIT != 0 {
            return None;
        }
        let mut mantissa = self.nanos / NANOS_PER_UNIT;
        if mantissa.abs() < 1024 {
            return None;
        }
        let mut exponent = 0;
        while exponent < MAX_BINARY_EXPONENT && mantissa % 1024 == 0 {
            mantissa /= 1024;
            exponent += 1;
        }
        Some((mantissa, binary_suffix(exponent)))
    }

    /// Mantissa and power of ten, stripping trailing zeros in groups of three
    fn decimal_parts(&self) -> (i128, i32) {
        let mut mantissa = self.nanos;
        let mut exponent = MIN_DECIMAL_EXPONENT;
        while exponent < MAX_DECIMAL_EXPONENT && mantissa % 1000 == 0 {
            mantissa /= 1000;
            exponent += 3;
        }
        (mantissa, exponent)
    }
}

impl fmt::Display for ParsedQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nanos == 0 {
            return f.write_str("0");
        }

        if self.format == QuantityFormat::BinarySI {
            if let Some((mantissa, suffix)) = self.binary_repr() {
                return write!(f, "{}{}", mantissa, suffix);
            }
        }

        let (mantissa, exponent) = self.decimal_parts();
        match self.format {
            QuantityFormat::DecimalExponent if exponent == 0 => write!(f, "{}", mantissa),
            QuantityFormat::DecimalExponent => write!(f, "{}e{}", mantissa, exponent),
            _ => write!(f, "{}{}", mantissa, decimal_suffix(exponent)),
        }
    }
}

impl FromStr for ParsedQuantity {
    type Err = QuantityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, unsigned) = match input.as_bytes()[0] {
            b'-' => (true, &input[1..]),
            b'+' => (false, &input[1..]),
            _ => (false, input),
        };

        let number_end = unsigned
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(unsigned.len());
        let (number, suffix) = unsigned.split_at(number_end);

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }

        let (format, multiplier, power_of_ten) = parse_suffix(suffix).ok_or_else(|| {
            QuantityError::InvalidSuffix {
                input: input.to_string(),
                suffix: suffix.to_string(),
            }
        })?;

        let out_of_range = || QuantityError::OutOfRange(input.to_string());

        let digits = format!("{}{}", whole, fraction);
        let mantissa: i128 = digits.parse().map_err(|_| out_of_range())?;
        let scaled = mantissa.checked_mul(multiplier).ok_or_else(out_of_range)?;

        // nanos = scaled * 10^(9 + power_of_ten - fraction digits)
        let shift = 9i32
            .checked_add(power_of_ten)
            .and_then(|s| s.checked_sub(i32::try_from(fraction.len()).ok()?))
            .ok_or_else(out_of_range)?;
        let magnitude = if shift >= 0 {
            10i128
                .checked_pow(shift as u32)
                .and_then(|factor| scaled.checked_mul(factor))
                .ok_or_else(out_of_range)?
        } else {
            // precision below a nano-unit rounds away from zero
            let divisor = 10i128.checked_pow(shift.unsigned_abs()).ok_or_else(out_of_range)?;
            let truncated = scaled / divisor;
            if scaled % divisor == 0 {
                truncated
            } else {
                truncated + 1
            }
        };

        Ok(Self {
            nanos: if negative { -magnitude } else { magnitude },
            format,
        })
    }
}

/// Resolve a suffix into (format, binary multiplier, power of ten)
fn parse_suffix(suffix: &str) -> Option<(QuantityFormat, i128, i32)> {
    let binary = |exponent: u32| Some((QuantityFormat::BinarySI, 1024i128.pow(exponent), 0));
    let decimal = |exponent: i32| Some((QuantityFormat::DecimalSI, 1, exponent));

    match suffix {
        "Ki" => binary(1),
        "Mi" => binary(2),
        "Gi" => binary(3),
        "Ti" => binary(4),
        "Pi" => binary(5),
        "Ei" => binary(6),
        "n" => decimal(-9),
        "u" => decimal(-6),
        "m" => decimal(-3),
        "" => decimal(0),
        "k" => decimal(3),
        "M" => decimal(6),
        "G" => decimal(9),
        "T" => decimal(12),
        "P" => decimal(15),
        "E" => decimal(18),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            let exponent: i32 = exponent.parse().ok()?;
            Some((QuantityFormat::DecimalExponent, 1, exponent))
        }
    }
}

fn binary_suffix(exponent: u32) -> &'static str {
    match exponent {
        1 => "Ki",
        2 => "Mi",
        3 => "Gi",
        4 => "Ti",
        5 => "Pi",
        6 => "Ei",
        _ => "",
    }
}

fn decimal_suffix(exponent: i32) -> &'static str {
    match exponent {
        -9 => "n",
        -6 => "u",
        -3 => "m",
        3 => "k",
        6 => "M",
        9 => "G",
        12 => "T",
        15 => "P",
        18 => "E",
        _ => "",
    }
}
