//! Set and rep counts: a fixed number or an auto-regulated range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A set or rep count such as `5` or `3-5`.
///
/// In configuration a count is written either as an integer or as a
/// `"min-max"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CountRepr", into = "CountRepr")]
pub enum Count {
    Fixed(u32),
    Range { min: u32, max: u32 },
}

/// Errors produced when parsing a [`Count`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CountParseError {
    #[error("count must be at least 1")]
    Zero,

    #[error("invalid count {0:?} (expected a number like 5 or a range like 3-5)")]
    Malformed(String),

    #[error("count range {min}-{max} is descending")]
    Descending { min: u32, max: u32 },
}

impl Count {
    /// Build a range, collapsing `n-n` to a fixed count.
    pub fn range(min: u32, max: u32) -> Result<Self, CountParseError> {
        if min == 0 {
            return Err(CountParseError::Zero);
        }
        if min > max {
            return Err(CountParseError::Descending { min, max });
        }
        if min == max {
            return Ok(Self::Fixed(min));
        }
        Ok(Self::Range { min, max })
    }

    pub fn fixed(count: u32) -> Result<Self, CountParseError> {
        if count == 0 {
            return Err(CountParseError::Zero);
        }
        Ok(Self::Fixed(count))
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Range { min, max } => write!(f, "({min}-{max})"),
        }
    }
}

impl FromStr for Count {
    type Err = CountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| CountParseError::Malformed(s.to_owned()))
        };

        match trimmed.split_once('-') {
            Some((min, max)) => Self::range(parse(min)?, parse(max)?),
            None => Self::fixed(parse(trimmed)?),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CountRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<CountRepr> for Count {
    type Error = CountParseError;

    fn try_from(repr: CountRepr) -> Result<Self, Self::Error> {
        match repr {
            CountRepr::Number(n) => Self::fixed(n),
            CountRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Count> for CountRepr {
    fn from(count: Count) -> Self {
        match count {
            Count::Fixed(n) => Self::Number(n),
            Count::Range { min, max } => Self::Text(format!("{min}-{max}")),
        }
    }
}
