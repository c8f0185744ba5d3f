//! `tbcalc program`: build and write a programming sheet.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use tracing::info;

use tbcalc_core::onerm::{AddedPerformance, Performance};
use tbcalc_core::{
    Lift, LiftInput, MarkdownRenderer, OutputSettings, PlainRenderer, ProgramBuilder,
    UnloadablePolicy, WeekSelection, WeightUnit, render_document,
};

use crate::config::{self, Overrides};
use crate::pdf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

/// Config values that can be overridden for a single run.
#[derive(Debug, Clone, Default, Args)]
pub struct OverrideArgs {
    /// Bar weight for every barbell lift
    #[arg(long)]
    pub bar_weight: Option<f64>,
    /// Comma-separated plate sizes (e.g. 45,35,25,10,5,2.5)
    #[arg(long, value_delimiter = ',')]
    pub plates: Option<Vec<f64>>,
    /// Weight unit: lbs, pounds_sign, or pounds
    #[arg(long)]
    pub unit: Option<WeightUnit>,
    /// Always show one decimal place (320.0 lbs)
    #[arg(long)]
    pub decimals: bool,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            bar_weight: args.bar_weight,
            plates: args.plates,
            unit: args.unit,
            decimals: args.decimals,
            raw_warmups: false,
        }
    }
}

/// Lift maxes accept a 1RM (`455`) or a set to estimate from (`240x5`, `240 5`).
#[derive(Debug, Clone, Default, Args)]
pub struct ProgramArgs {
    /// Squat 1RM or set
    #[arg(long, value_name = "1RM")]
    pub squat: Option<Performance>,
    /// Front squat 1RM or set
    #[arg(long, value_name = "1RM")]
    pub front_squat: Option<Performance>,
    /// Zercher squat 1RM or set
    #[arg(long, value_name = "1RM")]
    pub zercher_squat: Option<Performance>,
    /// Bench press 1RM or set
    #[arg(long, value_name = "1RM")]
    pub bench: Option<Performance>,
    /// Overhead press 1RM or set
    #[arg(long, value_name = "1RM")]
    pub overhead_press: Option<Performance>,
    /// Deadlift 1RM or set
    #[arg(long, value_name = "1RM")]
    pub deadlift: Option<Performance>,
    /// Zercher deadlift 1RM or set
    #[arg(long, value_name = "1RM")]
    pub zercher_deadlift: Option<Performance>,
    /// Trap bar deadlift 1RM or set
    #[arg(long, value_name = "1RM")]
    pub trap_bar_deadlift: Option<Performance>,
    /// Weighted pull-up added-weight 1RM (or set, or bw x reps) and bodyweight
    #[arg(long, num_args = 2, value_names = ["ADDED", "BODYWEIGHT"])]
    pub weighted_pullup: Option<Vec<String>>,
    /// Bar weight for one lift, e.g. trap_bar_deadlift=60 (repeatable)
    #[arg(long = "lift-bar", value_name = "LIFT=WEIGHT")]
    pub lift_bars: Vec<String>,

    /// Week number to generate, or "all"
    #[arg(long, default_value = "all")]
    pub week: WeekSelection,
    /// Document title (default from output.default_title)
    #[arg(long)]
    pub title: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Write a PDF via pandoc (default path from output.pdf_output_dir)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub pdf: Option<Option<PathBuf>>,
    /// Mark unloadable sets instead of failing
    #[arg(long)]
    pub flag_unloadable: bool,
    /// Keep raw ramp weights; skip warm-up plate smoothing
    #[arg(long)]
    pub raw_warmups: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

impl ProgramArgs {
    /// Collect the lift inputs given on the command line.
    pub fn lift_inputs(&self) -> Result<Vec<LiftInput>> {
        let barbell = [
            (Lift::Squat, self.squat),
            (Lift::FrontSquat, self.front_squat),
            (Lift::ZercherSquat, self.zercher_squat),
            (Lift::BenchPress, self.bench),
            (Lift::OverheadPress, self.overhead_press),
            (Lift::Deadlift, self.deadlift),
            (Lift::ZercherDeadlift, self.zercher_deadlift),
            (Lift::TrapBarDeadlift, self.trap_bar_deadlift),
        ];

        let mut inputs = Vec::new();
        for (lift, performance) in barbell {
            let Some(performance) = performance else {
                continue;
            };
            let one_rep_max = performance
                .one_rep_max()
                .with_context(|| format!("invalid {lift} input"))?;
            inputs.push(LiftInput::new(lift, one_rep_max));
        }

        if let Some(values) = &self.weighted_pullup {
            let [added, bodyweight] = values.as_slice() else {
                bail!("--weighted-pullup takes ADDED and BODYWEIGHT");
            };
            let bodyweight: f64 = bodyweight
                .trim()
                .parse()
                .with_context(|| format!("invalid bodyweight {bodyweight:?}"))?;
            let added: AddedPerformance = added
                .parse()
                .with_context(|| format!("invalid weighted pull-up input {added:?}"))?;
            let one_rep_max = added
                .added_one_rep_max(bodyweight)
                .context("invalid weighted pull-up input")?;
            inputs.push(LiftInput::weighted_pull_up(one_rep_max, bodyweight));
        }

        for entry in &self.lift_bars {
            let (lift, weight) = parse_lift_bar(entry)?;
            let Some(input) = inputs.iter_mut().find(|input| input.lift == lift) else {
                bail!("--lift-bar {entry}: no 1RM given for {lift}");
            };
            input.bar_weight = Some(weight);
        }

        Ok(inputs)
    }
}

fn parse_lift_bar(entry: &str) -> Result<(Lift, f64)> {
    let Some((lift, weight)) = entry.split_once('=') else {
        bail!("invalid --lift-bar {entry:?} (expected LIFT=WEIGHT)");
    };
    let lift: Lift = lift.parse()?;
    let weight: f64 = weight
        .trim()
        .parse()
        .with_context(|| format!("invalid bar weight in --lift-bar {entry:?}"))?;
    Ok((lift, weight))
}

/// Today's date in `output.date_format`.
fn today(output: &OutputSettings) -> String {
    chrono::Local::now().format(&output.date_format).to_string()
}

/// `{date}` in the template replaced with today's date.
pub fn default_title(output: &OutputSettings) -> String {
    output.default_title.replace("{date}", &today(output))
}

/// Execute `tbcalc program`.
pub fn run_program(args: ProgramArgs, cli_config: Option<&Path>) -> Result<()> {
    let inputs = args.lift_inputs()?;
    if inputs.is_empty() {
        bail!(
            "no lifts given; pass at least one of --squat, --bench, --deadlift, --weighted-pullup, ..."
        );
    }

    let mut overrides: Overrides = args.overrides.clone().into();
    overrides.raw_warmups = args.raw_warmups;
    let config = config::load(cli_config, overrides)?;
    let title = args
        .title
        .clone()
        .unwrap_or_else(|| default_title(config.output()));

    let policy = if args.flag_unloadable {
        UnloadablePolicy::Flag
    } else {
        UnloadablePolicy::Abort
    };
    let document = ProgramBuilder::new(&config)
        .on_unloadable(policy)
        .build(&inputs, args.week, title)
        .context("failed to build program")?;

    if let Some(pdf_path) = &args.pdf {
        let path = match pdf_path {
            Some(path) => config::expand_home(&path.to_string_lossy()),
            None => pdf::default_pdf_path(&config.output().pdf_output_dir, &document.title),
        };
        let markdown = render_document(&document, &MarkdownRenderer { page_breaks: true }, false);
        pdf::write_pdf(&markdown, &path, &document.title, &today(config.output()))?;
        println!("PDF written to {}", path.display());
        return Ok(());
    }

    let rendered = match args.format {
        OutputFormat::Text => render_document(&document, &PlainRenderer::default(), true),
        OutputFormat::Markdown => {
            render_document(&document, &MarkdownRenderer { page_breaks: false }, true)
        }
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&document).context("failed to serialize program")?;
            json.push('\n');
            json
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote program");
            println!("Program written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
