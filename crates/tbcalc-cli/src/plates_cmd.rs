//! `tbcalc plates`: round one weight and show how to load it.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use tbcalc_core::plates::WEIGHT_EPSILON;
use tbcalc_core::{Implement, PlateLoad, ProgramConfig, nearest_loadable, plate_breakdown};

use crate::config::{self, Overrides};

#[derive(Debug, Serialize)]
struct PlateReport {
    target: f64,
    weight: f64,
    implement: Implement,
    label: String,
    breakdown: PlateLoad,
}

fn report(config: &ProgramConfig, target: f64, implement: Implement) -> Result<PlateReport> {
    let inventory = config.inventory();
    let weight = nearest_loadable(target, inventory, implement)
        .with_context(|| format!("cannot round {target}"))?;
    let breakdown = plate_breakdown(weight, inventory, implement)
        .with_context(|| format!("cannot load {weight}"))?;
    Ok(PlateReport {
        target,
        weight,
        implement,
        label: breakdown.describe(config.format()),
        breakdown,
    })
}

/// Execute `tbcalc plates`.
pub fn run_plates(
    weight: f64,
    belt: bool,
    json: bool,
    overrides: Overrides,
    cli_config: Option<&Path>,
) -> Result<()> {
    let config = config::load(cli_config, overrides)?;
    let implement = if belt {
        Implement::Belt
    } else {
        Implement::Barbell
    };
    let report = report(&config, weight, implement)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize plates")?
        );
        return Ok(());
    }

    let format = config.format();
    if (report.weight - report.target).abs() > WEIGHT_EPSILON {
        println!(
            "{} rounds to {}",
            format.weight(report.target),
            format.weight(report.weight)
        );
    }
    let per = match implement {
        Implement::Barbell if matches!(report.breakdown, PlateLoad::Plates(_)) => " per side",
        _ => "",
    };
    println!("{} - {}{per}", format.weight(report.weight), report.label);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_then_breaks_down() {
        let config = ProgramConfig::builtin();
        let r = report(&config, 318.5, Implement::Barbell).unwrap();
        assert_eq!(r.weight, 320.0);
        assert_eq!(r.label, "(45 × 3) 2.5");

        let r = report(&config, 20.0, Implement::Barbell).unwrap();
        assert_eq!(r.weight, 45.0);
        assert_eq!(r.label, "Bar");

        let r = report(&config, 46.9, Implement::Belt).unwrap();
        assert_eq!(r.weight, 47.5);
        assert_eq!(r.label, "45 2.5");
    }

    #[test]
    fn report_serializes() {
        let config = ProgramConfig::builtin();
        let r = report(&config, 135.0, Implement::Barbell).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["implement"], "barbell");
        assert_eq!(json["breakdown"]["kind"], "plates");
        assert_eq!(json["label"], "45");
    }
}
