//! Ramp policies and the per-lift set generator.
//!
//! A ramp is an ordered list of steps, each a set count, a rep count and a
//! fraction of the day's top weight. The last step is the top set: it is
//! always loaded at the full top weight and rendered with its bracketed
//! range. Fractions are data; the generator only multiplies and rounds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::breakdown::{PlateLoad, plate_breakdown};
use crate::count::Count;
use crate::format::WeightFormat;
use crate::lift::LiftInput;
use crate::plates::{Implement, PlateError, PlateInventory, WEIGHT_EPSILON};
use crate::rounding::nearest_loadable;
use crate::warmup::WarmupPolicy;

/// One rung of a ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RampStep {
    pub sets: Count,
    pub reps: Count,
    /// Fraction of the top weight, `0.0` meaning the empty bar.
    #[serde(default = "default_fraction")]
    pub fraction: f64,
}

fn default_fraction() -> f64 {
    1.0
}

/// Set and rep counts that replace the top step in a specific week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSet {
    pub sets: Count,
    pub reps: Count,
}

/// Errors in a ramp definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RampError {
    #[error("ramp must have at least one step")]
    Empty,

    #[error("step {index} fraction {fraction} is outside 0.0..=1.0")]
    FractionOutOfRange { index: usize, fraction: f64 },

    #[error("step {index} fraction {fraction} is lighter than the step before it")]
    Descending { index: usize, fraction: f64 },
}

/// A validated ramp: fractions in `[0, 1]`, non-decreasing, at least one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RampPolicy {
    steps: Vec<RampStep>,
}

impl RampPolicy {
    pub fn new(steps: Vec<RampStep>) -> Result<Self, RampError> {
        if steps.is_empty() {
            return Err(RampError::Empty);
        }
        let mut previous = 0.0;
        for (index, step) in steps.iter().enumerate() {
            let fraction = step.fraction;
            if !(0.0..=1.0).contains(&fraction) {
                return Err(RampError::FractionOutOfRange { index, fraction });
            }
            if fraction < previous {
                return Err(RampError::Descending { index, fraction });
            }
            previous = fraction;
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[RampStep] {
        &self.steps
    }

    /// Every step before the top set.
    pub fn ramp(&self) -> &[RampStep] {
        &self.steps[..self.steps.len() - 1]
    }

    pub fn top(&self) -> &RampStep {
        &self.steps[self.steps.len() - 1]
    }

    /// The same ramp with the top step's counts replaced.
    pub fn with_top(&self, top: TopSet) -> Self {
        let mut steps = self.steps.clone();
        if let Some(last) = steps.last_mut() {
            last.sets = top.sets;
            last.reps = top.reps;
        }
        Self { steps }
    }
}

/// A lift's configured ramp plus week-specific top sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiftRamp {
    policy: RampPolicy,
    week_tops: BTreeMap<u32, TopSet>,
}

impl LiftRamp {
    pub fn new(steps: Vec<RampStep>, week_tops: BTreeMap<u32, TopSet>) -> Result<Self, RampError> {
        Ok(Self {
            policy: RampPolicy::new(steps)?,
            week_tops,
        })
    }

    /// The ramp to use in `week`.
    pub fn policy_for_week(&self, week: u32) -> RampPolicy {
        match self.week_tops.get(&week) {
            Some(top) => self.policy.with_top(*top),
            None => self.policy.clone(),
        }
    }
}

/// What to do with a set whose weight cannot be built from the plates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnloadablePolicy {
    /// Fail the whole generation.
    #[default]
    Abort,
    /// Keep the set, mark it unloadable and carry on.
    Flag,
}

/// One prescribed line of a lift's day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetPrescription {
    pub sets: Count,
    pub reps: Count,
    /// Resolved weight: the barbell total, or the added weight for a belt.
    pub weight: f64,
    pub weight_label: String,
    /// Plate string; `None` for bodyweight-only or unloadable sets.
    pub plates: Option<String>,
    pub breakdown: Option<PlateLoad>,
    /// Why the plates could not be worked out, when flagged.
    pub unloadable: Option<String>,
    pub top_set: bool,
}

impl SetPrescription {
    /// `(3-5) x 5 - 320 lbs - (45 × 3) 2.5`
    pub fn line(&self) -> String {
        let mut line = format!("{} x {} - {}", self.sets, self.reps, self.weight_label);
        if let Some(plates) = &self.plates {
            line.push_str(" - ");
            line.push_str(plates);
        } else if self.unloadable.is_some() {
            line.push_str(" - unloadable");
        }
        line
    }
}

/// Turns a lift input, week percentage and ramp into set prescriptions.
#[derive(Debug, Clone)]
pub struct SchemeGenerator<'a> {
    format: &'a WeightFormat,
    unloadable: UnloadablePolicy,
    warmups: Option<WarmupPolicy>,
}

impl<'a> SchemeGenerator<'a> {
    pub fn new(format: &'a WeightFormat) -> Self {
        Self {
            format,
            unloadable: UnloadablePolicy::default(),
            warmups: None,
        }
    }

    pub fn on_unloadable(mut self, policy: UnloadablePolicy) -> Self {
        self.unloadable = policy;
        self
    }

    /// Smooth barbell warm-ups with `policy`; `None` keeps the raw ramp.
    pub fn smooth_warmups(mut self, policy: Option<WarmupPolicy>) -> Self {
        self.warmups = policy;
        self
    }

    /// Generate the day's sets, lightest first, top set last.
    ///
    /// The top weight is the loadable weight nearest `1RM × percent / 100`;
    /// each earlier step is the loadable weight nearest its fraction of the
    /// top weight. For belt-loaded lifts, ramp steps that round to no added
    /// weight are dropped; the top set is always kept. Barbell warm-ups are
    /// then smoothed if a [`WarmupPolicy`] is set.
    pub fn generate(
        &self,
        input: &LiftInput,
        week_percent: f64,
        policy: &RampPolicy,
        inventory: &PlateInventory,
    ) -> Result<Vec<SetPrescription>, PlateError> {
        let implement = input.lift.implement();
        let top_weight = nearest_loadable(
            input.one_rep_max * week_percent / 100.0,
            inventory,
            implement,
        )?;

        let mut steps = Vec::with_capacity(policy.ramp().len());
        let mut weights = Vec::with_capacity(policy.ramp().len());
        for step in policy.ramp() {
            let weight = nearest_loadable(top_weight * step.fraction, inventory, implement)?;
            if implement == Implement::Belt && weight <= WEIGHT_EPSILON {
                debug!(lift = %input.lift, fraction = step.fraction, "dropping bodyweight-only ramp set");
                continue;
            }
            steps.push(step);
            weights.push(weight);
        }
        if let (Implement::Barbell, Some(warmups)) = (implement, &self.warmups) {
            warmups.smooth(&mut weights, top_weight, inventory)?;
        }

        let mut sets = Vec::with_capacity(policy.steps().len());
        for (step, weight) in steps.into_iter().zip(weights) {
            sets.push(self.prescribe(step, weight, false, inventory, implement)?);
        }
        sets.push(self.prescribe(policy.top(), top_weight, true, inventory, implement)?);

        debug!(
            lift = %input.lift,
            week_percent,
            top_weight,
            sets = sets.len(),
            "generated scheme"
        );
        Ok(sets)
    }

    fn prescribe(
        &self,
        step: &RampStep,
        weight: f64,
        top_set: bool,
        inventory: &PlateInventory,
        implement: Implement,
    ) -> Result<SetPrescription, PlateError> {
        let mut set = SetPrescription {
            sets: step.sets,
            reps: step.reps,
            weight,
            weight_label: self.format.weight(weight),
            plates: None,
            breakdown: None,
            unloadable: None,
            top_set,
        };

        match plate_breakdown(weight, inventory, implement) {
            Ok(PlateLoad::Bodyweight) => {
                set.weight_label = self.format.bodyweight_label.clone();
                set.breakdown = Some(PlateLoad::Bodyweight);
            }
            Ok(load) => {
                set.plates = Some(load.describe(self.format));
                set.breakdown = Some(load);
            }
            Err(err) => match self.unloadable {
                UnloadablePolicy::Abort => return Err(err),
                UnloadablePolicy::Flag => {
                    warn!(weight, error = %err, "flagging unloadable set");
                    set.unloadable = Some(err.to_string());
                }
            },
        }

        Ok(set)
    }
}
