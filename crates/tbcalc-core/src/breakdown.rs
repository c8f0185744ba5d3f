//! Per-side plate breakdowns and their display strings.

use serde::Serialize;

use crate::format::{WeightFormat, format_number};
use crate::plates::{Implement, PlateCount, PlateError, PlateInventory, WEIGHT_EPSILON};

/// What goes on one loading point for a given total weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "plates", rename_all = "snake_case")]
pub enum PlateLoad {
    /// The empty bar.
    Bar,
    /// No added weight on a belt.
    Bodyweight,
    /// Plates per loading point, heaviest first.
    Plates(Vec<PlateCount>),
}

impl PlateLoad {
    /// Sum of plates on one loading point.
    pub fn per_point(&self) -> f64 {
        match self {
            Self::Bar | Self::Bodyweight => 0.0,
            Self::Plates(plates) => plates.iter().map(|p| p.plate * p.count as f64).sum(),
        }
    }

    /// Render as `(45 × 3) 2.5`, or the configured bar / bodyweight label.
    pub fn describe(&self, format: &WeightFormat) -> String {
        match self {
            Self::Bar => format.bar_indicator.clone(),
            Self::Bodyweight => format.bodyweight_label.clone(),
            Self::Plates(plates) => plates
                .iter()
                .map(|p| {
                    if p.count > 1 {
                        format!("({} × {})", format_number(p.plate), p.count)
                    } else {
                        format_number(p.plate)
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Work out the plates for `weight` on the given implement.
///
/// Barbell weights are split across two sleeves after removing the bar; belt
/// weights are loaded whole. Amounts at or below zero are the bar-only or
/// bodyweight-only case. Anything the plates cannot build exactly is an
/// [`PlateError::UnloadableWeight`]; the remainder is never dropped.
pub fn plate_breakdown(
    weight: f64,
    inventory: &PlateInventory,
    implement: Implement,
) -> Result<PlateLoad, PlateError> {
    let base = inventory.base_weight(implement);
    let per_point = (weight - base) / f64::from(implement.loading_points());

    if per_point <= WEIGHT_EPSILON {
        return Ok(match implement {
            Implement::Barbell => PlateLoad::Bar,
            Implement::Belt => PlateLoad::Bodyweight,
        });
    }

    inventory
        .decompose(per_point)
        .map(PlateLoad::Plates)
        .ok_or(PlateError::UnloadableWeight { weight, per_point })
}

/// [`plate_breakdown`] rendered straight to its display string.
pub fn format_breakdown(
    weight: f64,
    inventory: &PlateInventory,
    implement: Implement,
    format: &WeightFormat,
) -> Result<String, PlateError> {
    plate_breakdown(weight, inventory, implement).map(|load| load.describe(format))
}
