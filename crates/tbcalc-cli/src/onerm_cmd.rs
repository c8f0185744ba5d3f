//! `tbcalc one-rm`: Epley estimate from a set.

use anyhow::{Context, Result};

use tbcalc_core::format_number;
use tbcalc_core::onerm::{AddedPerformance, Performance};

/// Estimate from the joined `SET` words; with a bodyweight, the set is
/// read as added weight on a belt (`35x4`, `bw x 8`).
pub fn estimate(set: &[String], bodyweight: Option<f64>) -> Result<String> {
    let raw = set.join(" ");
    match bodyweight {
        Some(bw) => {
            let performance: AddedPerformance = raw
                .parse()
                .with_context(|| format!("invalid set {raw:?}"))?;
            let added = performance.added_one_rep_max(bw)?;
            Ok(format!(
                "Estimated 1RM: +{} lb @ BW of {} lb ({} lb total)",
                format_number(added),
                format_number(bw),
                format_number(added + bw)
            ))
        }
        None => {
            let performance: Performance = raw
                .parse()
                .with_context(|| format!("invalid set {raw:?}"))?;
            let one_rep_max = performance.one_rep_max()?;
            Ok(format!("Estimated 1RM: {} lb", format_number(one_rep_max)))
        }
    }
}

/// Execute `tbcalc one-rm`.
pub fn run_one_rm(set: &[String], bodyweight: Option<f64>) -> Result<()> {
    println!("{}", estimate(set, bodyweight)?);
    Ok(())
}
