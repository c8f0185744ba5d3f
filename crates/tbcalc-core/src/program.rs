//! Program assembly: lifts × weeks into a [`ProgramDocument`].

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ProgramConfig;
use crate::lift::{Lift, LiftInput, LiftInputError};
use crate::plates::{PlateError, PlateInventory};
use crate::scheme::{SchemeGenerator, SetPrescription, UnloadablePolicy};
use crate::week::{UnknownWeek, WeekSelection};

/// Errors raised while building a program.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("no lifts to program")]
    NoLifts,

    #[error(transparent)]
    Input(#[from] LiftInputError),

    #[error(transparent)]
    Week(#[from] UnknownWeek),

    #[error("no ramp configured for {0}")]
    MissingRamp(Lift),

    #[error("{lift}: {source}")]
    Plate {
        lift: Lift,
        #[source]
        source: PlateError,
    },
}

/// A complete programming sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramDocument {
    pub title: String,
    pub weeks: Vec<ProgramWeek>,
}

/// One training week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramWeek {
    pub week: u32,
    pub percent: f64,
    pub lifts: Vec<ProgramLift>,
}

/// One lift's day within a week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramLift {
    pub lift: Lift,
    pub name: String,
    pub one_rep_max: f64,
    pub bodyweight: Option<f64>,
    /// `1RM: 455 lbs`, or `1RM: 67 lbs @ BW of 200 lbs` for belt lifts.
    pub summary: String,
    pub sets: Vec<SetPrescription>,
}

/// Builds program documents from a resolved configuration.
#[derive(Debug, Clone)]
pub struct ProgramBuilder<'a> {
    config: &'a ProgramConfig,
    unloadable: UnloadablePolicy,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(config: &'a ProgramConfig) -> Self {
        Self {
            config,
            unloadable: UnloadablePolicy::default(),
        }
    }

    pub fn on_unloadable(mut self, policy: UnloadablePolicy) -> Self {
        self.unloadable = policy;
        self
    }

    /// Build the document for `weeks`.
    ///
    /// Every input is validated before anything is generated. Weeks come out
    /// in ascending order and lifts in canonical order, whatever order the
    /// inputs were given in.
    pub fn build(
        &self,
        inputs: &[LiftInput],
        weeks: WeekSelection,
        title: impl Into<String>,
    ) -> Result<ProgramDocument, ProgramError> {
        if inputs.is_empty() {
            return Err(ProgramError::NoLifts);
        }

        let mut seen = BTreeSet::new();
        for input in inputs {
            input.validate()?;
            if !seen.insert(input.lift) {
                return Err(LiftInputError::Duplicate(input.lift).into());
            }
        }

        let mut ordered: Vec<&LiftInput> = inputs.iter().collect();
        ordered.sort_by_key(|input| input.lift);

        let mut plans = Vec::with_capacity(ordered.len());
        for input in ordered {
            let ramp = self
                .config
                .ramp(input.lift)
                .ok_or(ProgramError::MissingRamp(input.lift))?;
            let inventory = self.inventory_for(input)?;
            plans.push((input, ramp, inventory));
        }

        let week_numbers = weeks.resolve(self.config.weeks())?;
        let format = self.config.format();
        let generator = SchemeGenerator::new(format)
            .on_unloadable(self.unloadable)
            .smooth_warmups(self.config.warmup().copied());

        let mut document = ProgramDocument {
            title: title.into(),
            weeks: Vec::with_capacity(week_numbers.len()),
        };

        for week in week_numbers {
            let Some(percent) = self.config.weeks().percent(week) else {
                continue;
            };
            let mut lifts = Vec::with_capacity(plans.len());
            for (input, ramp, inventory) in &plans {
                let policy = ramp.policy_for_week(week);
                let sets = generator
                    .generate(input, percent, &policy, inventory)
                    .map_err(|source| ProgramError::Plate {
                        lift: input.lift,
                        source,
                    })?;
                debug!(week, lift = %input.lift, sets = sets.len(), "built lift day");
                lifts.push(ProgramLift {
                    lift: input.lift,
                    name: input.lift.name().to_owned(),
                    one_rep_max: input.one_rep_max,
                    bodyweight: input.bodyweight,
                    summary: self.summary(input),
                    sets,
                });
            }
            document.weeks.push(ProgramWeek {
                week,
                percent,
                lifts,
            });
        }

        info!(
            weeks = document.weeks.len(),
            lifts = plans.len(),
            "program built"
        );
        Ok(document)
    }

    fn inventory_for(&self, input: &LiftInput) -> Result<PlateInventory, ProgramError> {
        let base = self.config.inventory();
        match input.bar_weight {
            Some(bar) => base
                .with_bar_weight(bar)
                .map_err(|source| ProgramError::Plate {
                    lift: input.lift,
                    source,
                }),
            None => Ok(base.clone()),
        }
    }

    fn summary(&self, input: &LiftInput) -> String {
        let format = self.config.format();
        match input.bodyweight {
            Some(bw) => format!(
                "1RM: {} @ BW of {}",
                format.weight(input.one_rep_max),
                format.weight(bw)
            ),
            None => format!("1RM: {}", format.weight(input.one_rep_max)),
        }
    }
}
