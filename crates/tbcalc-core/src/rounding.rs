//! Rounding arbitrary targets to weights the plate inventory can build.

use tracing::trace;

use crate::plates::{Implement, PlateError, PlateInventory, WEIGHT_EPSILON};

/// Return the loadable weight closest to `target`.
///
/// A barbell weight is `bar + 2 × plates`; a belt weight is just `plates`.
/// Ties round up. Targets at or below the base weight (the bar, or zero for
/// a belt) return the base weight.
///
/// Fails when `target` is not a number or is too large to count in plate
/// steps, and when the inventory has no plates and `target` is above the
/// base weight.
pub fn nearest_loadable(
    target: f64,
    inventory: &PlateInventory,
    implement: Implement,
) -> Result<f64, PlateError> {
    let base = inventory.base_weight(implement);
    if target.is_nan() {
        return Err(PlateError::InvalidTarget(target));
    }
    if target <= base {
        return Ok(base);
    }

    let ladder = inventory.ladder();
    if ladder.is_empty() {
        return Err(PlateError::UnloadableTarget { target, base });
    }

    let points = f64::from(implement.loading_points());
    let per_point = (target - base) / points;
    if !per_point.is_finite() || !ladder.in_range(per_point) {
        return Err(PlateError::TargetTooLarge(target));
    }
    let (below, above) = ladder.bracket(per_point);
    let below = base + points * below;
    let above = base + points * above;

    let chosen = if above - target <= target - below + WEIGHT_EPSILON {
        above
    } else {
        below
    };
    trace!(target, below, above, chosen, "rounded to loadable weight");
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> PlateInventory {
        PlateInventory::new([45.0, 35.0, 25.0, 15.0, 10.0, 5.0, 2.5], 45.0).unwrap()
    }

    #[test]
    fn rounds_to_nearest_five_on_standard_bar() {
        let inv = standard();
        assert_eq!(nearest_loadable(318.5, &inv, Implement::Barbell).unwrap(), 320.0);
        assert_eq!(nearest_loadable(134.4, &inv, Implement::Barbell).unwrap(), 135.0);
        assert_eq!(nearest_loadable(192.0, &inv, Implement::Barbell).unwrap(), 190.0);
        assert_eq!(nearest_loadable(256.0, &inv, Implement::Barbell).unwrap(), 255.0);
    }

    #[test]
    fn exact_ties_round_up() {
        let inv = standard();
        assert_eq!(nearest_loadable(317.5, &inv, Implement::Barbell).unwrap(), 320.0);
        assert_eq!(nearest_loadable(47.5, &inv, Implement::Barbell).unwrap(), 50.0);
    }

    #[test]
    fn below_bar_returns_bar() {
        let inv = standard();
        assert_eq!(nearest_loadable(0.0, &inv, Implement::Barbell).unwrap(), 45.0);
        assert_eq!(nearest_loadable(31.5, &inv, Implement::Barbell).unwrap(), 45.0);
        assert_eq!(nearest_loadable(45.0, &inv, Implement::Barbell).unwrap(), 45.0);
    }

    #[test]
    fn belt_loading_is_not_halved() {
        let inv = standard();
        // 46.9 sits between 45 and 47.5 on a single loading point.
        assert_eq!(nearest_loadable(46.9, &inv, Implement::Belt).unwrap(), 47.5);
        assert_eq!(nearest_loadable(-3.0, &inv, Implement::Belt).unwrap(), 0.0);
    }

    #[test]
    fn coarse_plates_can_round_belt_load_to_zero() {
        let inv = PlateInventory::new([100.0], 45.0).unwrap();
        assert_eq!(nearest_loadable(46.9, &inv, Implement::Belt).unwrap(), 0.0);
        assert_eq!(nearest_loadable(50.0, &inv, Implement::Belt).unwrap(), 100.0);
    }

    #[test]
    fn empty_inventory_only_loads_the_bar() {
        let inv = PlateInventory::new([], 45.0).unwrap();
        assert_eq!(nearest_loadable(40.0, &inv, Implement::Barbell).unwrap(), 45.0);
        assert!(matches!(
            nearest_loadable(100.0, &inv, Implement::Barbell),
            Err(PlateError::UnloadableTarget { .. })
        ));
    }

    #[test]
    fn nan_target_is_invalid_not_unloadable() {
        let err = nearest_loadable(f64::NAN, &standard(), Implement::Barbell).unwrap_err();
        assert!(matches!(err, PlateError::InvalidTarget(t) if t.is_nan()));
        assert_eq!(err.to_string(), "target weight must be a number, got NaN");
    }

    #[test]
    fn huge_targets_round_without_a_huge_table() {
        let inv = standard();
        assert_eq!(
            nearest_loadable(1.0e12 + 1.0, &inv, Implement::Barbell).unwrap(),
            1.0e12
        );
        assert_eq!(
            nearest_loadable(1.0e12 + 1.5, &inv, Implement::Belt).unwrap(),
            1.0e12 + 2.5
        );
        assert_eq!(
            nearest_loadable(f64::INFINITY, &inv, Implement::Barbell).unwrap_err(),
            PlateError::TargetTooLarge(f64::INFINITY)
        );
        assert_eq!(
            nearest_loadable(1.0e300, &inv, Implement::Barbell).unwrap_err(),
            PlateError::TargetTooLarge(1.0e300)
        );
    }

    #[test]
    fn rounding_is_idempotent() {
        let inv = PlateInventory::new([20.0, 10.0, 5.0, 2.5, 1.25], 20.0).unwrap();
        let mut target = 0.0;
        while target < 300.0 {
            for implement in [Implement::Barbell, Implement::Belt] {
                let once = nearest_loadable(target, &inv, implement).unwrap();
                let twice = nearest_loadable(once, &inv, implement).unwrap();
                assert_eq!(once, twice, "target {target} on {implement:?}");
            }
            target += 0.7;
        }
    }

    #[test]
    fn rounding_is_monotonic() {
        let inv = PlateInventory::new([10.0, 4.0], 15.0).unwrap();
        let mut previous = 0.0;
        for i in 0..400 {
            let target = f64::from(i) * 0.5;
            let rounded = nearest_loadable(target, &inv, Implement::Barbell).unwrap();
            assert!(rounded >= previous, "{target} rounded down to {rounded}");
            previous = rounded;
        }
    }

    #[test]
    fn rounded_weights_always_decompose() {
        let inv = PlateInventory::new([25.0, 15.0, 10.0, 4.0], 35.0).unwrap();
        for i in 0..300 {
            let target = f64::from(i) * 1.3;
            let rounded = nearest_loadable(target, &inv, Implement::Barbell).unwrap();
            let per_side = (rounded - inv.bar_weight()) / 2.0;
            let plates = inv.decompose(per_side).expect("rounded weight should decompose");
            let total: f64 = plates.iter().map(|p| p.plate * p.count as f64).sum();
            assert!((inv.bar_weight() + 2.0 * total - rounded).abs() < 1e-9);
        }
    }
}
