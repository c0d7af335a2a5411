//! FREQUENCY NORMALIZER
//!
//! Converts weekly and yearly recurrences into a monthly-equivalent count so
//! every task reaching the heatmap carries the same unit.
//!
//! Conversion factors:
//!   - WK → MD: count × 0.25 (4 weeks per month)
//!   - JR → MD: count × 12
//!   - MD → MD: unchanged

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

const MONTHS_PER_WEEK: f64 = 0.25;
const MONTHS_PER_YEAR: f64 = 12.0;

/// Recurrence unit of a maintenance task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrequencyUnit {
    Week,
    Month,
    Year,
}

impl FrequencyUnit {
    /// Two-letter Ultimo code
    pub fn code(&self) -> &'static str {
        match self {
            FrequencyUnit::Week => "WK",
            FrequencyUnit::Month => "MD",
            FrequencyUnit::Year => "JR",
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Unit text outside the known codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFrequencyUnit(pub String);

impl FromStr for FrequencyUnit {
    type Err = UnknownFrequencyUnit;

    /// Accepts Ultimo codes (WK, MD, JR) and English names, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WK" | "WEEK" => Ok(FrequencyUnit::Week),
            "MD" | "MONTH" => Ok(FrequencyUnit::Month),
            "JR" | "YEAR" => Ok(FrequencyUnit::Year),
            _ => Err(UnknownFrequencyUnit(s.to_string())),
        }
    }
}

/// Recurrence of a task: `count` times per `unit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Frequency {
    pub unit: FrequencyUnit,
    pub count: f64,
}

impl Frequency {
    pub fn new(unit: FrequencyUnit, count: f64) -> Self {
        Self { unit, count }
    }

    /// Monthly-equivalent frequency. Idempotent.
    pub fn normalized(self) -> Self {
        let count = match self.unit {
            FrequencyUnit::Week => self.count * MONTHS_PER_WEEK,
            FrequencyUnit::Year => self.count * MONTHS_PER_YEAR,
            FrequencyUnit::Month => self.count,
        };
        Self {
            unit: FrequencyUnit::Month,
            count,
        }
    }
}

/// Parse raw unit text and normalize in one step
pub fn normalize_frequency(unit: &str, count: f64) -> Result<Frequency, UnknownFrequencyUnit> {
    let unit: FrequencyUnit = unit.parse()?;
    Ok(Frequency::new(unit, count).normalized())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_week_to_month() {
        let freq = normalize_frequency("WK", 2.0).unwrap();
        assert_eq!(freq.unit, FrequencyUnit::Month);
        assert_relative_eq!(freq.count, 0.5);
    }

    #[test]
    fn test_year_to_month() {
        let freq = normalize_frequency("JR", 1.0).unwrap();
        assert_eq!(freq.unit, FrequencyUnit::Month);
        assert_relative_eq!(freq.count, 12.0);
    }

    #[test]
    fn test_month_is_identity() {
        let freq = normalize_frequency("MD", 3.0).unwrap();
        assert_eq!(freq, Frequency::new(FrequencyUnit::Month, 3.0));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = Frequency::new(FrequencyUnit::Week, 6.0).normalized();
        let twice = once.normalized();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_accepts_names_and_case() {
        assert_eq!(" wk ".parse::<FrequencyUnit>(), Ok(FrequencyUnit::Week));
        assert_eq!("Year".parse::<FrequencyUnit>(), Ok(FrequencyUnit::Year));
        assert_eq!("md".parse::<FrequencyUnit>(), Ok(FrequencyUnit::Month));
    }

    #[test]
    fn test_unknown_unit_is_rejected() {
        let err = normalize_frequency("DG", 1.0).unwrap_err();
        assert_eq!(err, UnknownFrequencyUnit("DG".to_string()));
    }
}
