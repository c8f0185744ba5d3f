//! Weight display rules: unit suffix, decimal handling, special-case labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::plates::WEIGHT_EPSILON;

/// Unit suffix style for displayed weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    /// `320 lbs`
    #[default]
    Lbs,
    /// `320#`
    PoundsSign,
    /// `320 pounds`
    Pounds,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lbs => "lbs",
            Self::PoundsSign => "pounds_sign",
            Self::Pounds => "pounds",
        };
        f.write_str(s)
    }
}

impl FromStr for WeightUnit {
    type Err = WeightUnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lbs" => Ok(Self::Lbs),
            "pounds_sign" | "#" => Ok(Self::PoundsSign),
            "pounds" => Ok(Self::Pounds),
            other => Err(WeightUnitParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`WeightUnit`] string.
#[derive(Debug, Clone)]
pub struct WeightUnitParseError(pub String);

impl fmt::Display for WeightUnitParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid weight unit: {:?} (expected lbs, pounds_sign, or pounds)",
            self.0
        )
    }
}

impl std::error::Error for WeightUnitParseError {}

/// Resolved formatting preferences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightFormat {
    pub unit: WeightUnit,
    /// Show `.0` on whole-number weights.
    pub show_decimals: bool,
    /// Label for a set loaded with the bar alone.
    pub bar_indicator: String,
    /// Label for a bodyweight-only set.
    pub bodyweight_label: String,
}

impl Default for WeightFormat {
    fn default() -> Self {
        Self {
            unit: WeightUnit::Lbs,
            show_decimals: false,
            bar_indicator: "Bar".to_string(),
            bodyweight_label: "Bodyweight".to_string(),
        }
    }
}

impl WeightFormat {
    /// Format a weight with its unit, e.g. `320 lbs`, `137.5#`.
    ///
    /// Whole numbers drop the decimal unless `show_decimals` is set;
    /// fractional weights always keep theirs.
    pub fn weight(&self, weight: f64) -> String {
        let number = if is_whole(weight) && self.show_decimals {
            format!("{weight:.1}")
        } else {
            format_number(weight)
        };

        match self.unit {
            WeightUnit::Lbs => format!("{number} lbs"),
            WeightUnit::PoundsSign => format!("{number}#"),
            WeightUnit::Pounds => format!("{number} pounds"),
        }
    }
}

/// Format a number with no trailing zeros: `45`, `2.5`, `1.25`.
pub fn format_number(value: f64) -> String {
    if is_whole(value) {
        return format!("{}", value.round() as i64);
    }
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn is_whole(value: f64) -> bool {
    (value - value.round()).abs() < WEIGHT_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numbers_without_trailing_zeros() {
        assert_eq!(format_number(45.0), "45");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.25), "1.25");
        assert_eq!(format_number(137.5), "137.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn unit_styles() {
        let mut fmt = WeightFormat::default();
        assert_eq!(fmt.weight(320.0), "320 lbs");
        fmt.unit = WeightUnit::PoundsSign;
        assert_eq!(fmt.weight(320.0), "320#");
        fmt.unit = WeightUnit::Pounds;
        assert_eq!(fmt.weight(320.0), "320 pounds");
    }

    #[test]
    fn decimals() {
        let mut fmt = WeightFormat::default();
        assert_eq!(fmt.weight(47.5), "47.5 lbs");
        fmt.show_decimals = true;
        assert_eq!(fmt.weight(320.0), "320.0 lbs");
        assert_eq!(fmt.weight(47.5), "47.5 lbs");
    }

    #[test]
    fn unit_round_trips_through_strings() {
        for unit in [WeightUnit::Lbs, WeightUnit::PoundsSign, WeightUnit::Pounds] {
            assert_eq!(unit.to_string().parse::<WeightUnit>().unwrap(), unit);
        }
        assert!("kg".parse::<WeightUnit>().is_err());
    }
}
