//! Canonical phone number normalization (spec.md §4.3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(pub String);

impl Phone {
    /// Strips all non-digits; prefixes `+1` for 10-digit numbers, `+` for
    /// 11-digit numbers already starting with `1`, and `+` otherwise.
    /// Idempotent: normalizing an already-normalized phone is a no-op.
    pub fn normalize(raw: &str) -> Phone {
        if raw.starts_with('+') && raw[1..].chars().all(|c| c.is_ascii_digit()) {
            return Phone(raw.to_string());
        }
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        let normalized = match digits.len() {
            10 => format!("+1{digits}"),
            11 if digits.starts_with('1') => format!("+{digits}"),
            _ => format!("+{digits}"),
        };
        Phone(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_ten_digit_numbers() {
        assert_eq!(Phone::normalize("9565550101").0, "+19565550101");
        assert_eq!(Phone::normalize("(956) 555-0101").0, "+19565550101");
    }

    #[test]
    fn normalizes_eleven_digit_numbers_starting_with_one() {
        assert_eq!(Phone::normalize("19565550101").0, "+19565550101");
    }

    #[test]
    fn is_idempotent_for_arbitrary_input() {
        for raw in ["9565550101", "+19565550101", "19565550101", "+442071838750"] {
            let once = Phone::normalize(raw);
            let twice = Phone::normalize(&once.0);
            assert_eq!(once, twice, "normalize not idempotent for {raw}");
        }
    }
}
