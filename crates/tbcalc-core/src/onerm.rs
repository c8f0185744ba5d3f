//! One-rep-max estimation from a set performed for reps.

use std::str::FromStr;

use thiserror::Error;

/// Errors from 1RM estimation and parsing of performance strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OneRepMaxParseError {
    #[error("invalid 1RM or set {0:?} (expected e.g. 455, 240x5 or 240 5)")]
    Malformed(String),

    #[error("weight must be positive, got {0}")]
    NonPositiveWeight(f64),

    #[error("reps must be at least 1")]
    ZeroReps,

    #[error("added weight cannot be negative, got {0}")]
    NegativeAddedWeight(f64),

    #[error("bodyweight must be positive, got {0}")]
    NonPositiveBodyweight(f64),
}

/// Epley estimate `weight × (1 + reps / 30)`, rounded to the nearest whole
/// number. A single rep returns the weight itself, rounded.
pub fn estimate_one_rep_max(weight: f64, reps: u32) -> Result<f64, OneRepMaxParseError> {
    if !(weight.is_finite() && weight > 0.0) {
        return Err(OneRepMaxParseError::NonPositiveWeight(weight));
    }
    match reps {
        0 => Err(OneRepMaxParseError::ZeroReps),
        1 => Ok(weight.round()),
        _ => Ok((weight * (1.0 + f64::from(reps) / 30.0)).round()),
    }
}

/// A set as typed on the command line: `455`, `255.6`, `240x5`, `240 x 5`
/// or `240 5`. A bare number is a single rep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Performance {
    pub weight: f64,
    pub reps: u32,
}

impl Performance {
    pub fn one_rep_max(&self) -> Result<f64, OneRepMaxParseError> {
        estimate_one_rep_max(self.weight, self.reps)
    }
}

impl FromStr for Performance {
    type Err = OneRepMaxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (weight, reps) = split_performance(s)?;
        let weight = weight
            .parse::<f64>()
            .map_err(|_| OneRepMaxParseError::Malformed(s.to_owned()))?;
        let reps = parse_reps(reps, s)?;
        Ok(Self { weight, reps })
    }
}

/// Added weight on a belt for a set of pull-ups. Accepts the [`Performance`]
/// forms plus `bw`, `bwx4`, `bw x 4` and `bw 4` for no added weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddedPerformance {
    pub added: f64,
    pub reps: u32,
}

impl AddedPerformance {
    /// Estimate on total mass, then take the bodyweight back off.
    pub fn added_one_rep_max(&self, bodyweight: f64) -> Result<f64, OneRepMaxParseError> {
        if !(bodyweight.is_finite() && bodyweight > 0.0) {
            return Err(OneRepMaxParseError::NonPositiveBodyweight(bodyweight));
        }
        let total = estimate_one_rep_max(bodyweight + self.added, self.reps)?;
        Ok(total - bodyweight)
    }
}

impl FromStr for AddedPerformance {
    type Err = OneRepMaxParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("bw") {
            let rest = rest.trim_start();
            let rest = rest.strip_prefix('x').unwrap_or(rest).trim();
            let reps = if rest.is_empty() { None } else { Some(rest) };
            return Ok(Self {
                added: 0.0,
                reps: parse_reps(reps, s)?,
            });
        }

        let (weight, reps) = split_performance(s)?;
        let added = weight
            .parse::<f64>()
            .map_err(|_| OneRepMaxParseError::Malformed(s.to_owned()))?;
        if added < 0.0 {
            return Err(OneRepMaxParseError::NegativeAddedWeight(added));
        }
        let reps = parse_reps(reps, s)?;
        Ok(Self { added, reps })
    }
}

/// Split into a weight token and an optional reps token.
fn split_performance(s: &str) -> Result<(&str, Option<&str>), OneRepMaxParseError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(OneRepMaxParseError::Malformed(s.to_owned()));
    }

    if let Some(idx) = trimmed.find(['x', 'X']) {
        let (weight, reps) = (trimmed[..idx].trim(), trimmed[idx + 1..].trim());
        if weight.is_empty() || reps.is_empty() {
            return Err(OneRepMaxParseError::Malformed(s.to_owned()));
        }
        return Ok((weight, Some(reps)));
    }

    let mut parts = trimmed.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(weight), reps, None) => Ok((weight, reps)),
        _ => Err(OneRepMaxParseError::Malformed(s.to_owned())),
    }
}

fn parse_reps(reps: Option<&str>, original: &str) -> Result<u32, OneRepMaxParseError> {
    match reps {
        None => Ok(1),
        Some(reps) => reps
            .parse::<u32>()
            .map_err(|_| OneRepMaxParseError::Malformed(original.to_owned())),
    }
}
