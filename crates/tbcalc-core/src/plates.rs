//! Plate inventory and the integer plate ladder.
//!
//! Plate weights are floating point in configuration (`2.5`, `1.25`) but all
//! reachability questions are answered on an integer ladder: every plate is
//! expressed as a whole number of steps, where one step is the greatest
//! common divisor of the plate sizes. Rounding ([`crate::rounding`]) and
//! decomposition ([`PlateInventory::decompose`]) both go through the same
//! ladder, so any weight the rounder produces is one the decomposer accepts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance for comparing weights computed in floating point.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Plates are quantized to thousandths before building the ladder.
const MILLI: f64 = 1000.0;

/// Tolerance in ladder steps when snapping a target to the ladder.
const STEP_EPSILON: f64 = 1e-6;

/// Largest lookup table the ladder builds, in steps.
const MAX_TABLE_STEPS: u64 = 1 << 20;

/// Largest amount the ladder handles, in steps. Past this an `f64` no longer
/// holds every whole step.
const MAX_AMOUNT_STEPS: f64 = 4.0e15;

/// Errors raised by plate inventory construction, rounding and decomposition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlateError {
    #[error("plate weight must be positive, got {0}")]
    InvalidPlate(f64),

    #[error("duplicate plate weight: {0}")]
    DuplicatePlate(f64),

    #[error("bar weight must be zero or positive, got {0}")]
    InvalidBarWeight(f64),

    #[error("plate sizes only share a step of {step}; use coarser plate sizes")]
    PlatesTooFine { step: f64 },

    #[error("target weight must be a number, got {0}")]
    InvalidTarget(f64),

    #[error("target weight {0} is too large to load")]
    TargetTooLarge(f64),

    #[error("cannot load {target} with an empty plate inventory (base weight is {base})")]
    UnloadableTarget { target: f64, base: f64 },

    #[error("{weight} cannot be loaded exactly: {per_point} per loading point does not decompose into the available plates")]
    UnloadableWeight { weight: f64, per_point: f64 },
}

/// How plates are attached to the lift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implement {
    /// A barbell: the bar weight plus plates loaded symmetrically on two sleeves.
    Barbell,
    /// A dip belt or vest: no bar, a single loading point.
    Belt,
}

impl Implement {
    /// Number of loading points plates are split across.
    pub fn loading_points(self) -> u32 {
        match self {
            Self::Barbell => 2,
            Self::Belt => 1,
        }
    }
}

/// One plate size and how many of it go on a loading point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlateCount {
    pub plate: f64,
    pub count: u64,
}

/// Available plate sizes plus the bar they are loaded onto.
///
/// Supply of each plate size is unlimited. Plates are kept sorted
/// heaviest-first.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateInventory {
    plates: Vec<f64>,
    bar_weight: f64,
    ladder: PlateLadder,
}

impl PlateInventory {
    /// Build an inventory, validating that plates are distinct and positive
    /// and that the bar weight is not negative. Plate sets whose sizes only
    /// share a tiny common step (`45` with `44.999`) are rejected.
    ///
    /// An empty plate list is accepted here; it can still load the bar alone.
    pub fn new(
        plates: impl IntoIterator<Item = f64>,
        bar_weight: f64,
    ) -> Result<Self, PlateError> {
        if !bar_weight.is_finite() || bar_weight < 0.0 {
            return Err(PlateError::InvalidBarWeight(bar_weight));
        }

        let mut sorted = Vec::new();
        for plate in plates {
            if !plate.is_finite() || to_milli(plate) == 0 {
                return Err(PlateError::InvalidPlate(plate));
            }
            sorted.push(plate);
        }
        sorted.sort_by(|a, b| b.total_cmp(a));

        if let Some(pair) = sorted
            .windows(2)
            .find(|pair| to_milli(pair[0]) == to_milli(pair[1]))
        {
            return Err(PlateError::DuplicatePlate(pair[0]));
        }

        let ladder = PlateLadder::new(&sorted)?;
        Ok(Self {
            plates: sorted,
            bar_weight,
            ladder,
        })
    }

    /// Plate sizes, heaviest first.
    pub fn plates(&self) -> &[f64] {
        &self.plates
    }

    pub fn bar_weight(&self) -> f64 {
        self.bar_weight
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }

    /// The same plates on a different bar.
    pub fn with_bar_weight(&self, bar_weight: f64) -> Result<Self, PlateError> {
        if !bar_weight.is_finite() || bar_weight < 0.0 {
            return Err(PlateError::InvalidBarWeight(bar_weight));
        }
        Ok(Self {
            bar_weight,
            ..self.clone()
        })
    }

    /// Weight on the implement before any plate is added.
    pub fn base_weight(&self, implement: Implement) -> f64 {
        match implement {
            Implement::Barbell => self.bar_weight,
            Implement::Belt => 0.0,
        }
    }

    /// Split `per_point` into plates using the fewest plates possible,
    /// preferring the heaviest plate whenever several splits tie.
    ///
    /// For a canonical ladder such as `[45, 35, 25, 15, 10, 5, 2.5]` this is
    /// exactly the greedy largest-plate-first split. Returns `None` when the
    /// amount cannot be made from the available plates.
    pub fn decompose(&self, per_point: f64) -> Option<Vec<PlateCount>> {
        self.ladder.decompose(per_point)
    }

    pub(crate) fn ladder(&self) -> &PlateLadder {
        &self.ladder
    }
}

/// Integer representation of a plate set.
///
/// Any split of `n` steps that uses fewer plates than another keeps at most
/// `heaviest - 1` plates lighter than the heaviest (a larger group always
/// contains a subset summing to a multiple of the heaviest, which fewer
/// heaviest plates replace). So from `window = heaviest × second` steps up,
/// an optimal split always contains a heaviest plate, reachability repeats
/// with period `heaviest`, and the table only ever has to cover
/// `window + 2 × heaviest` steps however large the amount.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlateLadder {
    /// Plate sizes in steps, heaviest first.
    steps: Vec<u64>,
    /// Plate sizes in weight units, parallel to `steps`.
    plates: Vec<f64>,
    /// Weight of one step.
    step_weight: f64,
    /// Amounts at or above this many steps always take a heaviest plate.
    window: u64,
}

impl PlateLadder {
    fn new(plates: &[f64]) -> Result<Self, PlateError> {
        let milli: Vec<u64> = plates.iter().map(|p| to_milli(*p)).collect();
        let divisor = milli.iter().copied().fold(0, gcd);
        let steps: Vec<u64> = if divisor == 0 {
            Vec::new()
        } else {
            milli.iter().map(|m| m / divisor).collect()
        };
        let step_weight = divisor as f64 / MILLI;

        let heaviest = steps.first().copied().unwrap_or(0);
        let second = steps.get(1).copied().unwrap_or(0);
        let window = heaviest.saturating_mul(second);
        if window.saturating_add(heaviest.saturating_mul(2)) > MAX_TABLE_STEPS {
            return Err(PlateError::PlatesTooFine { step: step_weight });
        }

        Ok(Self {
            steps,
            plates: plates.to_vec(),
            step_weight,
            window,
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether `amount` is small enough to be counted in whole steps.
    pub(crate) fn in_range(&self, amount: f64) -> bool {
        self.is_empty() || amount / self.step_weight <= MAX_AMOUNT_STEPS
    }

    /// Whole heaviest plates to set aside so that `amount` steps land in
    /// `window..window + heaviest`.
    fn heaviest_prefix(&self, amount: u64) -> u64 {
        let heaviest = self.steps[0];
        if amount < self.window + heaviest {
            0
        } else {
            (amount - self.window) / heaviest
        }
    }

    /// The reachable per-point amounts immediately at or below and at or
    /// above `amount`.
    ///
    /// Zero plates is always reachable, so the lower bound exists for any
    /// non-negative amount. The upper bound is searched up to one heaviest
    /// plate past the target, where a multiple of that plate is guaranteed.
    /// `amount` must be [`in_range`](Self::in_range).
    pub(crate) fn bracket(&self, amount: f64) -> (f64, f64) {
        let Some(&heaviest) = self.steps.first() else {
            return (0.0, 0.0);
        };

        let target = (amount / self.step_weight).max(0.0);
        let floor = (target + STEP_EPSILON).floor() as u64;
        let ceil = (target - STEP_EPSILON).ceil().max(0.0) as u64;

        let shift = self.heaviest_prefix(floor) * heaviest;
        let floor = floor - shift;
        let ceil = ceil.saturating_sub(shift);
        let limit = floor + heaviest;
        let counts = self.min_counts(limit);

        let below = (0..=floor)
            .rev()
            .find(|s| counts[*s as usize].is_some())
            .unwrap_or(0);
        let above = (ceil..=limit)
            .find(|s| counts[*s as usize].is_some())
            .unwrap_or(below);

        (
            (below + shift) as f64 * self.step_weight,
            (above + shift) as f64 * self.step_weight,
        )
    }

    fn decompose(&self, amount: f64) -> Option<Vec<PlateCount>> {
        if self.is_empty() {
            return (amount.abs() <= WEIGHT_EPSILON).then(Vec::new);
        }
        if !self.in_range(amount) {
            return None;
        }

        let exact = amount / self.step_weight;
        let rounded = exact.round();
        if rounded < 0.0 || ((exact - rounded) * self.step_weight).abs() > WEIGHT_EPSILON {
            return None;
        }

        let total = rounded as u64;
        let mut tally = vec![0u64; self.steps.len()];
        let prefix = self.heaviest_prefix(total);
        tally[0] = prefix;

        let mut remaining = total - prefix * self.steps[0];
        let counts = self.min_counts(remaining);
        counts[remaining as usize]?;

        while remaining > 0 {
            let needed = counts[remaining as usize]?;
            let idx = self.steps.iter().position(|&step| {
                step <= remaining && counts[(remaining - step) as usize] == Some(needed - 1)
            })?;
            tally[idx] += 1;
            remaining -= self.steps[idx];
        }

        Some(
            self.plates
                .iter()
                .zip(tally)
                .filter(|(_, count)| *count > 0)
                .map(|(&plate, count)| PlateCount { plate, count })
                .collect(),
        )
    }

    /// Fewest plates needed to reach each amount `0..=limit` in steps.
    fn min_counts(&self, limit: u64) -> Vec<Option<u32>> {
        let len = limit as usize + 1;
        let mut counts: Vec<Option<u32>> = vec![None; len];
        counts[0] = Some(0);

        for total in 1..len {
            let mut best: Option<u32> = None;
            for &step in &self.steps {
                let step = step as usize;
                if step > total {
                    continue;
                }
                if let Some(prev) = counts[total - step] {
                    let candidate = prev + 1;
                    if best.is_none_or(|b| candidate < b) {
                        best = Some(candidate);
                    }
                }
            }
            counts[total] = best;
        }

        counts
    }
}

fn to_milli(weight: f64) -> u64 {
    if weight <= 0.0 {
        return 0;
    }
    (weight * MILLI).round() as u64
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
