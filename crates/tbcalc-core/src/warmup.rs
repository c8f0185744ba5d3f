//! Warm-up smoothing for barbell ramps.
//!
//! Each ramp weight is rounded on its own, so consecutive warm-ups often
//! need plates stripped between sets (`35 2.5`, then `45 15 2.5`).
//! [`WarmupPolicy::smooth`] nudges warm-ups upward so that, where it can, a
//! warm-up's plates are a subset of the next set's and the lifter only ever
//! adds plates on the way to the top set.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::plates::{Implement, PlateCount, PlateError, PlateInventory, WEIGHT_EPSILON};
use crate::rounding::nearest_loadable;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WarmupError {
    #[error("warmup.{key} must be zero or positive, got {value}")]
    Negative { key: &'static str, value: f64 },
}

/// How far warm-ups may move to simplify plate changes.
///
/// Slack and threshold are per side; `max_increase` is on the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WarmupPolicy {
    /// Load the next set's heaviest plate when a warm-up is within this much
    /// of it.
    pub preload_slack: f64,
    /// Replace the small plates past the heaviest ones with a single plate
    /// when it adds at most this much.
    pub clutter_threshold: f64,
    /// Largest increase allowed to make a warm-up a subset of the next set.
    pub max_increase: f64,
}

impl Default for WarmupPolicy {
    fn default() -> Self {
        Self {
            preload_slack: 10.0,
            clutter_threshold: 2.5,
            max_increase: 20.0,
        }
    }
}

impl WarmupPolicy {
    pub fn new(
        preload_slack: f64,
        clutter_threshold: f64,
        max_increase: f64,
    ) -> Result<Self, WarmupError> {
        for (key, value) in [
            ("preload_slack", preload_slack),
            ("clutter_threshold", clutter_threshold),
            ("max_increase", max_increase),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(WarmupError::Negative { key, value });
            }
        }
        Ok(Self {
            preload_slack,
            clutter_threshold,
            max_increase,
        })
    }

    /// Adjust barbell warm-up weights, lightest first, leading to
    /// `top_weight`.
    ///
    /// Works back from the top set so each warm-up is compared with the
    /// weight that will actually follow it. Weights only ever move up, stay
    /// strictly below the set after them and remain loadable.
    pub fn smooth(
        &self,
        warmups: &mut [f64],
        top_weight: f64,
        inventory: &PlateInventory,
    ) -> Result<(), PlateError> {
        let mut next = top_weight;
        for weight in warmups.iter_mut().rev() {
            let adjusted = self.adjust(*weight, next, inventory)?;
            if (adjusted - *weight).abs() > WEIGHT_EPSILON {
                debug!(from = *weight, to = adjusted, next, "smoothed warm-up");
                *weight = adjusted;
            }
            next = *weight;
        }
        Ok(())
    }

    fn adjust(&self, weight: f64, next: f64, inventory: &PlateInventory) -> Result<f64, PlateError> {
        let bar = inventory.bar_weight();
        let side = (weight - bar) / 2.0;
        let next_side = (next - bar) / 2.0;
        if side <= WEIGHT_EPSILON || next_side <= side + WEIGHT_EPSILON {
            return Ok(weight);
        }
        let Some(next_plates) = inventory.decompose(next_side) else {
            return Ok(weight);
        };
        let below_next = |amount: f64| amount < next_side - WEIGHT_EPSILON;

        if let Some(big) = next_plates.first() {
            let gap = big.plate - side;
            if gap > WEIGHT_EPSILON
                && gap <= self.preload_slack + WEIGHT_EPSILON
                && below_next(big.plate)
            {
                return loaded(bar, big.plate, inventory);
            }
        }

        let is_step_up = |amount: f64| {
            inventory
                .decompose(amount)
                .is_some_and(|plates| is_subset(&plates, &next_plates))
        };

        let mut side = side;
        if let Some(decluttered) = self.declutter(side, inventory.plates()) {
            // Never trade a clean step up for fewer plates.
            if below_next(decluttered) && (is_step_up(decluttered) || !is_step_up(side)) {
                side = decluttered;
            }
        }
        if is_step_up(side) {
            return loaded(bar, side, inventory);
        }

        let ceiling = side + self.max_increase / 2.0;
        let candidate = subset_sums(&next_plates, side, ceiling)
            .into_iter()
            .find(|&amount| below_next(amount) && is_step_up(amount));
        loaded(bar, candidate.unwrap_or(side), inventory)
    }

    /// `side` with the plates past the heaviest ones replaced by the single
    /// smallest plate that covers them, if that costs little enough.
    fn declutter(&self, side: f64, plates: &[f64]) -> Option<f64> {
        let heaviest = *plates.first()?;
        let whole = ((side + WEIGHT_EPSILON) / heaviest).floor() * heaviest;
        let remainder = side - whole;
        if remainder <= WEIGHT_EPSILON {
            return None;
        }
        let plate = *plates
            .iter()
            .rev()
            .find(|&&plate| plate >= remainder - WEIGHT_EPSILON)?;
        let cost = plate - remainder;
        (cost > WEIGHT_EPSILON && cost <= self.clutter_threshold + WEIGHT_EPSILON)
            .then_some(whole + plate)
    }
}

fn loaded(bar: f64, side: f64, inventory: &PlateInventory) -> Result<f64, PlateError> {
    nearest_loadable(bar + 2.0 * side, inventory, Implement::Barbell)
}

/// Every plate in `inner` is also in `outer`, at least as many times.
fn is_subset(inner: &[PlateCount], outer: &[PlateCount]) -> bool {
    inner.iter().all(|a| {
        outer
            .iter()
            .any(|b| (a.plate - b.plate).abs() <= WEIGHT_EPSILON && b.count >= a.count)
    })
}

/// Sums of sub-multisets of `plates` within `lo..=hi`, ascending.
fn subset_sums(plates: &[PlateCount], lo: f64, hi: f64) -> Vec<f64> {
    let mut found = Vec::new();
    collect_sums(plates, 0.0, lo, hi, &mut found);
    found.sort_by(f64::total_cmp);
    found.dedup_by(|a, b| (*a - *b).abs() <= WEIGHT_EPSILON);
    found
}

fn collect_sums(plates: &[PlateCount], acc: f64, lo: f64, hi: f64, found: &mut Vec<f64>) {
    let Some((first, rest)) = plates.split_first() else {
        if acc >= lo - WEIGHT_EPSILON && acc <= hi + WEIGHT_EPSILON {
            found.push(acc);
        }
        return;
    };

    // Only counts of `first` that can still land in range.
    let rest_total: f64 = rest.iter().map(|p| p.plate * p.count as f64).sum();
    let most = ((hi - acc + WEIGHT_EPSILON) / first.plate).floor();
    if most < 0.0 {
        return;
    }
    let least = ((lo - acc - rest_total - WEIGHT_EPSILON) / first.plate)
        .ceil()
        .max(0.0) as u64;
    for count in least..=(most as u64).min(first.count) {
        collect_sums(rest, acc + first.plate * count as f64, lo, hi, found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> PlateInventory {
        PlateInventory::new([45.0, 35.0, 25.0, 15.0, 10.0, 5.0, 2.5], 45.0).unwrap()
    }

    fn smoothed(warmups: &[f64], top: f64) -> Vec<f64> {
        let mut weights = warmups.to_vec();
        WarmupPolicy::default()
            .smooth(&mut weights, top, &standard())
            .unwrap();
        weights
    }

    #[test]
    fn preloads_the_next_big_plate() {
        // 120 is 35 2.5 a side; 170 is 45 15 2.5.
        assert_eq!(
            smoothed(&[45.0, 120.0, 170.0, 225.0], 280.0),
            vec![45.0, 135.0, 170.0, 225.0]
        );
    }

    #[test]
    fn rounds_small_plate_clutter_up() {
        // 180 is 45 15 5 2.5 a side; 185 is 45 25, a subset of 45 45 25.
        assert_eq!(smoothed(&[180.0], 275.0), vec![185.0]);
    }

    #[test]
    fn moves_up_to_a_subset_of_the_next_set() {
        // 185 (45 25) would have to lose the 25 on the way to 210 (45 35 2.5).
        assert_eq!(smoothed(&[185.0], 210.0), vec![205.0]);
    }

    #[test]
    fn leaves_sets_alone_when_nothing_fits() {
        assert_eq!(
            smoothed(&[45.0, 135.0, 190.0, 255.0], 320.0),
            vec![45.0, 135.0, 190.0, 255.0]
        );
    }

    #[test]
    fn never_reaches_the_next_weight() {
        // Pre-loading the 45 would make 130 equal to the top set.
        assert_eq!(smoothed(&[130.0], 135.0), vec![130.0]);
    }

    #[test]
    fn smoothing_keeps_order_and_loadability() {
        let inv = standard();
        let policy = WarmupPolicy::default();
        for one_rm in (100..800).step_by(11) {
            let top = nearest_loadable(f64::from(one_rm) * 0.8, &inv, Implement::Barbell).unwrap();
            let mut weights: Vec<f64> = [0.4, 0.6, 0.8]
                .iter()
                .map(|f| nearest_loadable(top * f, &inv, Implement::Barbell).unwrap())
                .collect();
            let raw = weights.clone();
            policy.smooth(&mut weights, top, &inv).unwrap();

            for (before, after) in raw.iter().zip(&weights) {
                assert!(after >= before, "{one_rm}: {before} moved down to {after}");
                assert_eq!(nearest_loadable(*after, &inv, Implement::Barbell).unwrap(), *after);
            }
            weights.push(top);
            assert!(weights.windows(2).all(|w| w[0] <= w[1]), "{one_rm}: {weights:?}");
        }
    }

    #[test]
    fn rejects_negative_settings() {
        assert_eq!(
            WarmupPolicy::new(10.0, -1.0, 20.0).unwrap_err(),
            WarmupError::Negative {
                key: "clutter_threshold",
                value: -1.0
            }
        );
        assert!(WarmupPolicy::new(0.0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn subset_sums_stay_in_range() {
        let plates = [
            PlateCount { plate: 45.0, count: 1 },
            PlateCount { plate: 35.0, count: 1 },
            PlateCount { plate: 2.5, count: 1 },
        ];
        assert_eq!(subset_sums(&plates, 70.0, 82.5), vec![80.0, 82.5]);
        assert!(subset_sums(&plates, 90.0, 100.0).is_empty());
    }
}
