//! Lift identifiers and validated lift inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plates::Implement;

/// A programmable lift.
///
/// Declaration order is the canonical output order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lift {
    Squat,
    FrontSquat,
    ZercherSquat,
    BenchPress,
    OverheadPress,
    Deadlift,
    ZercherDeadlift,
    TrapBarDeadlift,
    #[serde(rename = "weighted_pullup")]
    WeightedPullUp,
}

impl Lift {
    /// Every lift, in canonical order.
    pub const ALL: [Lift; 9] = [
        Lift::Squat,
        Lift::FrontSquat,
        Lift::ZercherSquat,
        Lift::BenchPress,
        Lift::OverheadPress,
        Lift::Deadlift,
        Lift::ZercherDeadlift,
        Lift::TrapBarDeadlift,
        Lift::WeightedPullUp,
    ];

    /// Human-readable name, e.g. `Bench Press`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Squat => "Squat",
            Self::FrontSquat => "Front Squat",
            Self::ZercherSquat => "Zercher Squat",
            Self::BenchPress => "Bench Press",
            Self::OverheadPress => "Overhead Press",
            Self::Deadlift => "Deadlift",
            Self::ZercherDeadlift => "Zercher Deadlift",
            Self::TrapBarDeadlift => "Trap Bar Deadlift",
            Self::WeightedPullUp => "Weighted Pull-Up",
        }
    }

    /// Configuration key, e.g. `bench_press`.
    pub fn key(self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::FrontSquat => "front_squat",
            Self::ZercherSquat => "zercher_squat",
            Self::BenchPress => "bench_press",
            Self::OverheadPress => "overhead_press",
            Self::Deadlift => "deadlift",
            Self::ZercherDeadlift => "zercher_deadlift",
            Self::TrapBarDeadlift => "trap_bar_deadlift",
            Self::WeightedPullUp => "weighted_pullup",
        }
    }

    /// How the lift is loaded.
    pub fn implement(self) -> Implement {
        match self {
            Self::WeightedPullUp => Implement::Belt,
            _ => Implement::Barbell,
        }
    }

    pub fn is_bodyweight(self) -> bool {
        self.implement() == Implement::Belt
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lift {
    type Err = LiftParseError;

    /// Accepts keys (`bench_press`), names (`Bench Press`) and the short
    /// forms used on the command line (`bench`, `ohp`, `wpu`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "squat" => Ok(Self::Squat),
            "front_squat" => Ok(Self::FrontSquat),
            "zercher_squat" => Ok(Self::ZercherSquat),
            "bench_press" | "bench" => Ok(Self::BenchPress),
            "overhead_press" | "ohp" => Ok(Self::OverheadPress),
            "deadlift" => Ok(Self::Deadlift),
            "zercher_deadlift" => Ok(Self::ZercherDeadlift),
            "trap_bar_deadlift" => Ok(Self::TrapBarDeadlift),
            "weighted_pullup" | "weighted_pull_up" | "wpu" => Ok(Self::WeightedPullUp),
            _ => Err(LiftParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an unknown [`Lift`] name.
#[derive(Debug, Clone)]
pub struct LiftParseError(pub String);

impl fmt::Display for LiftParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown lift: {:?}", self.0)
    }
}

impl std::error::Error for LiftParseError {}

/// Errors for lift inputs that cannot be programmed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiftInputError {
    #[error("{lift} 1RM must be positive, got {value}")]
    NonPositiveOneRepMax { lift: Lift, value: f64 },

    #[error("{0} requires a bodyweight")]
    MissingBodyweight(Lift),

    #[error("{lift} bodyweight must be positive, got {value}")]
    NonPositiveBodyweight { lift: Lift, value: f64 },

    #[error("{0} is not a bodyweight lift; drop the bodyweight")]
    UnexpectedBodyweight(Lift),

    #[error("{lift} bar weight must be zero or positive, got {value}")]
    InvalidBarWeight { lift: Lift, value: f64 },

    #[error("{0} was entered more than once")]
    Duplicate(Lift),
}

/// One lift to program.
///
/// For the weighted pull-up `one_rep_max` is the added weight only; the
/// bodyweight is carried separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiftInput {
    pub lift: Lift,
    pub one_rep_max: f64,
    pub bodyweight: Option<f64>,
    /// Bar weight for this lift when it differs from the configured bar.
    pub bar_weight: Option<f64>,
}

impl LiftInput {
    pub fn new(lift: Lift, one_rep_max: f64) -> Self {
        Self {
            lift,
            one_rep_max,
            bodyweight: None,
            bar_weight: None,
        }
    }

    /// Weighted pull-up with an added-weight 1RM at the given bodyweight.
    pub fn weighted_pull_up(added_one_rep_max: f64, bodyweight: f64) -> Self {
        Self {
            lift: Lift::WeightedPullUp,
            one_rep_max: added_one_rep_max,
            bodyweight: Some(bodyweight),
            bar_weight: None,
        }
    }

    /// Set a bar weight for this lift only.
    pub fn bar_weight(mut self, bar_weight: f64) -> Self {
        self.bar_weight = Some(bar_weight);
        self
    }

    /// Check the input can be programmed.
    pub fn validate(&self) -> Result<(), LiftInputError> {
        let lift = self.lift;
        if !(self.one_rep_max.is_finite() && self.one_rep_max > 0.0) {
            return Err(LiftInputError::NonPositiveOneRepMax {
                lift,
                value: self.one_rep_max,
            });
        }

        match (lift.is_bodyweight(), self.bodyweight) {
            (true, None) => return Err(LiftInputError::MissingBodyweight(lift)),
            (true, Some(bw)) if !(bw.is_finite() && bw > 0.0) => {
                return Err(LiftInputError::NonPositiveBodyweight { lift, value: bw });
            }
            (false, Some(_)) => return Err(LiftInputError::UnexpectedBodyweight(lift)),
            _ => {}
        }

        if let Some(bar) = self.bar_weight {
            if !(bar.is_finite() && bar >= 0.0) {
                return Err(LiftInputError::InvalidBarWeight { lift, value: bar });
            }
        }

        Ok(())
    }
}
