//! Week percentage table and week selection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Highest week percentage accepted from configuration.
pub const MAX_WEEK_PERCENT: f64 = 150.0;

/// Errors in the week percentage table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeekTableError {
    #[error("week percentage table is empty")]
    Empty,

    #[error("week numbers must run 1, 2, 3, ... without gaps; expected week {expected}, found {found}")]
    NonContiguous { expected: u32, found: u32 },

    #[error("week {week} percentage {percent} is out of range (must be above 0 and at most {max})", max = MAX_WEEK_PERCENT)]
    PercentOutOfRange { week: u32, percent: f64 },
}

/// Week number → percentage of 1RM, ordered by week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekTable(BTreeMap<u32, f64>);

impl WeekTable {
    /// Validate and build a table. Weeks must be numbered from 1 without
    /// gaps and every percentage must be in `(0, MAX_WEEK_PERCENT]`.
    pub fn new(weeks: BTreeMap<u32, f64>) -> Result<Self, WeekTableError> {
        if weeks.is_empty() {
            return Err(WeekTableError::Empty);
        }
        for (expected, (&week, &percent)) in (1u32..).zip(&weeks) {
            if week != expected {
                return Err(WeekTableError::NonContiguous {
                    expected,
                    found: week,
                });
            }
            if !(percent.is_finite() && percent > 0.0 && percent <= MAX_WEEK_PERCENT) {
                return Err(WeekTableError::PercentOutOfRange { week, percent });
            }
        }
        Ok(Self(weeks))
    }

    pub fn percent(&self, week: u32) -> Option<f64> {
        self.0.get(&week).copied()
    }

    /// Week numbers in ascending order.
    pub fn weeks(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    /// Highest week number. Weeks run `1..=last_week()`.
    pub fn last_week(&self) -> u32 {
        self.0.keys().next_back().copied().unwrap_or(0)
    }
}

/// Which weeks to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeekSelection {
    #[default]
    All,
    Single(u32),
}

impl WeekSelection {
    /// Resolve against a table, returning the weeks in ascending order.
    pub fn resolve(&self, table: &WeekTable) -> Result<Vec<u32>, UnknownWeek> {
        match *self {
            Self::All => Ok(table.weeks().collect()),
            Self::Single(week) if table.percent(week).is_some() => Ok(vec![week]),
            Self::Single(week) => Err(UnknownWeek {
                week,
                available: table.last_week(),
            }),
        }
    }
}

impl fmt::Display for WeekSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Single(week) => write!(f, "{week}"),
        }
    }
}

impl FromStr for WeekSelection {
    type Err = WeekSelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed
            .parse::<u32>()
            .map(Self::Single)
            .map_err(|_| WeekSelectionParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`WeekSelection`] string.
#[derive(Debug, Clone)]
pub struct WeekSelectionParseError(pub String);

impl fmt::Display for WeekSelectionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid week: {:?} (expected a week number or \"all\")", self.0)
    }
}

impl std::error::Error for WeekSelectionParseError {}

/// A requested week that the table does not define.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("week {week} is not in the week table (weeks 1-{available} are defined)")]
pub struct UnknownWeek {
    pub week: u32,
    pub available: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(u32, f64)]) -> Result<WeekTable, WeekTableError> {
        WeekTable::new(entries.iter().copied().collect())
    }

    #[test]
    fn accepts_default_table() {
        let t = table(&[(1, 70.0), (2, 80.0), (3, 90.0), (4, 75.0), (5, 85.0), (6, 95.0)])
            .unwrap();
        assert_eq!(t.last_week(), 6);
        assert_eq!(t.percent(4), Some(75.0));
        assert_eq!(t.weeks().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn rejects_gaps_and_zero_week() {
        assert_eq!(
            table(&[(1, 70.0), (3, 90.0)]).unwrap_err(),
            WeekTableError::NonContiguous {
                expected: 2,
                found: 3
            }
        );
        assert_eq!(
            table(&[(0, 70.0)]).unwrap_err(),
            WeekTableError::NonContiguous {
                expected: 1,
                found: 0
            }
        );
    }

    #[test]
    fn rejects_out_of_range_percentages() {
        assert!(matches!(
            table(&[(1, 0.0)]),
            Err(WeekTableError::PercentOutOfRange { week: 1, .. })
        ));
        assert!(matches!(
            table(&[(1, 70.0), (2, 200.0)]),
            Err(WeekTableError::PercentOutOfRange { week: 2, .. })
        ));
        assert_eq!(table(&[]).unwrap_err(), WeekTableError::Empty);
    }

    #[test]
    fn selection_parses_and_resolves() {
        let t = table(&[(1, 70.0), (2, 80.0), (3, 90.0)]).unwrap();
        assert_eq!("all".parse::<WeekSelection>().unwrap(), WeekSelection::All);
        assert_eq!("3".parse::<WeekSelection>().unwrap(), WeekSelection::Single(3));
        assert!("three".parse::<WeekSelection>().is_err());

        assert_eq!(WeekSelection::All.resolve(&t).unwrap(), vec![1, 2, 3]);
        assert_eq!(WeekSelection::Single(2).resolve(&t).unwrap(), vec![2]);
        assert_eq!(
            WeekSelection::Single(7).resolve(&t).unwrap_err(),
            UnknownWeek {
                week: 7,
                available: 3
            }
        );
    }
}
