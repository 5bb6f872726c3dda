//! Integer-cents money newtype.
//!
//! Every amount in the system (deposits, quotes, refunds) is an integer
//! number of US cents. Keeping it a distinct type stops arithmetic from
//! silently mixing dollars and cents, which is the easiest way to corrupt a
//! payment amount.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Applies the emergency surcharge: `round(1.5 * base)`.
    pub fn with_emergency_surcharge(self, is_emergency: bool) -> Cents {
        if !is_emergency {
            return self;
        }
        let scaled = Decimal::from(self.0) * Decimal::new(15, 1);
        Cents(scaled.round().try_into().unwrap_or(self.0))
    }

    /// Parses a free-text price like `"75"`, `"75.00"`, `"$75.5"` into cents.
    /// Returns `None` if the text isn't a valid non-negative decimal.
    pub fn parse_dollars(text: &str) -> Option<Cents> {
        let cleaned = text.trim().trim_start_matches('$').trim();
        let value: Decimal = cleaned.parse().ok()?;
        if value.is_sign_negative() {
            return None;
        }
        let cents = (value * Decimal::from(100)).round();
        Some(Cents(cents.try_into().ok()?))
    }

    pub fn as_dollars_display(self) -> String {
        format!("${}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_dollars_display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emergency_surcharge_rounds() {
        assert_eq!(Cents(9900).with_emergency_surcharge(true), Cents(14850));
        assert_eq!(Cents(4900).with_emergency_surcharge(false), Cents(4900));
    }

    #[test]
    fn parse_dollars_handles_dollar_sign_and_decimals() {
        assert_eq!(Cents::parse_dollars("$75.00"), Some(Cents(7500)));
        assert_eq!(Cents::parse_dollars("75"), Some(Cents(7500)));
        assert_eq!(Cents::parse_dollars("75.5"), Some(Cents(7550)));
        assert_eq!(Cents::parse_dollars("not a price"), None);
        assert_eq!(Cents::parse_dollars("-5"), None);
    }

    #[test]
    fn display_is_dollar_formatted() {
        assert_eq!(Cents(7500).to_string(), "$75.00");
        assert_eq!(Cents(4900).to_string(), "$49.00");
    }
}
