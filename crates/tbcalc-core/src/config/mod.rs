//! Layered program configuration.
//!
//! A [`ConfigLayer`] is one partially-filled TOML document. Layers are merged
//! lowest to highest (embedded defaults, user file, explicit file, command
//! line overrides) and the result is validated into a [`ProgramConfig`].
//! Finding and reading the files is the caller's job.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::format::{WeightFormat, WeightUnit};
use crate::lift::Lift;
use crate::plates::{PlateError, PlateInventory};
use crate::scheme::{LiftRamp, RampError, RampStep, TopSet};
use crate::warmup::{WarmupError, WarmupPolicy};
use crate::week::{WeekTable, WeekTableError};

/// The built-in configuration, also written out by `tbcalc init`.
pub const DEFAULT_CONFIG_TOML: &str = include_str!("defaults.toml");

/// Errors from parsing or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("plate inventory is empty; configure at least one plate")]
    NoPlates,

    #[error("invalid plate inventory: {0}")]
    Plates(#[from] PlateError),

    #[error("invalid week table: {0}")]
    Weeks(#[from] WeekTableError),

    #[error("invalid week number {0:?}")]
    WeekKey(String),

    #[error("unknown lift in ramps: {0:?}")]
    UnknownLift(String),

    #[error("invalid warm-up settings: {0}")]
    Warmup(#[from] WarmupError),

    #[error("invalid ramp for {lift}: {source}")]
    Ramp {
        lift: Lift,
        #[source]
        source: RampError,
    },
}

// -----------------------------------------------------------------------
// Layers
// -----------------------------------------------------------------------

/// One configuration source. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    pub plates: PlatesLayer,
    /// Week number (as a string key) to percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub format: FormatLayer,
    #[serde(default)]
    pub output: OutputLayer,
    #[serde(default)]
    pub warmup: WarmupLayer,
    /// Ramps keyed by lift key, e.g. `bench_press`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ramps: BTreeMap<String, RampLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatesLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<WeightUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_weight_decimals: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bodyweight_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_output_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarmupLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload_slack: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clutter_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_increase: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RampLayer {
    pub steps: Vec<RampStep>,
    #[serde(default)]
    pub week_tops: BTreeMap<String, TopSet>,
}

impl ConfigLayer {
    /// The embedded defaults.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `defaults.toml` is malformed. It is compiled
    /// into the binary, so a build that passes its tests cannot hit this.
    pub fn defaults() -> Self {
        Self::from_toml_str(DEFAULT_CONFIG_TOML).expect("embedded defaults.toml is invalid")
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Overlay `higher` on top of `self`.
    ///
    /// Scalars replace individually; the plate list, the week table and each
    /// lift's ramp replace wholesale.
    pub fn merge(mut self, higher: ConfigLayer) -> Self {
        let ConfigLayer {
            plates,
            weeks,
            format,
            output,
            warmup,
            ramps,
        } = higher;

        overlay(&mut self.plates.bar_weight, plates.bar_weight);
        overlay(&mut self.plates.available, plates.available);
        overlay(&mut self.weeks, weeks);

        overlay(&mut self.format.weight_unit, format.weight_unit);
        overlay(&mut self.format.show_weight_decimals, format.show_weight_decimals);
        overlay(&mut self.format.bar_indicator, format.bar_indicator);
        overlay(&mut self.format.bodyweight_label, format.bodyweight_label);

        overlay(&mut self.output.default_title, output.default_title);
        overlay(&mut self.output.date_format, output.date_format);
        overlay(&mut self.output.pdf_output_dir, output.pdf_output_dir);

        overlay(&mut self.warmup.optimize, warmup.optimize);
        overlay(&mut self.warmup.preload_slack, warmup.preload_slack);
        overlay(&mut self.warmup.clutter_threshold, warmup.clutter_threshold);
        overlay(&mut self.warmup.max_increase, warmup.max_increase);

        self.ramps.extend(ramps);
        self
    }

    /// Validate the merged layer into a usable configuration.
    pub fn resolve(self) -> Result<ProgramConfig, ConfigError> {
        let bar_weight = self
            .plates
            .bar_weight
            .ok_or(ConfigError::Missing("plates.bar_weight"))?;
        let available = self
            .plates
            .available
            .ok_or(ConfigError::Missing("plates.available"))?;
        if available.is_empty() {
            return Err(ConfigError::NoPlates);
        }
        let inventory = PlateInventory::new(available, bar_weight)?;

        let weeks = self.weeks.ok_or(ConfigError::Missing("weeks"))?;
        let weeks = WeekTable::new(parse_week_keys(weeks)?)?;

        let mut ramps = BTreeMap::new();
        for (key, layer) in self.ramps {
            let lift: Lift = key.parse().map_err(|_| ConfigError::UnknownLift(key.clone()))?;
            let week_tops = parse_week_keys(layer.week_tops)?;
            let ramp = LiftRamp::new(layer.steps, week_tops)
                .map_err(|source| ConfigError::Ramp { lift, source })?;
            ramps.insert(lift, ramp);
        }

        let defaults = WeightFormat::default();
        let format = WeightFormat {
            unit: self.format.weight_unit.unwrap_or(defaults.unit),
            show_decimals: self
                .format
                .show_weight_decimals
                .unwrap_or(defaults.show_decimals),
            bar_indicator: self
                .format
                .bar_indicator
                .unwrap_or(defaults.bar_indicator),
            bodyweight_label: self
                .format
                .bodyweight_label
                .unwrap_or(defaults.bodyweight_label),
        };

        let defaults = OutputSettings::default();
        let output = OutputSettings {
            default_title: self.output.default_title.unwrap_or(defaults.default_title),
            date_format: self.output.date_format.unwrap_or(defaults.date_format),
            pdf_output_dir: self
                .output
                .pdf_output_dir
                .unwrap_or(defaults.pdf_output_dir),
        };

        let defaults = WarmupPolicy::default();
        let policy = WarmupPolicy::new(
            self.warmup.preload_slack.unwrap_or(defaults.preload_slack),
            self.warmup
                .clutter_threshold
                .unwrap_or(defaults.clutter_threshold),
            self.warmup.max_increase.unwrap_or(defaults.max_increase),
        )?;
        let warmup = self.warmup.optimize.unwrap_or(true).then_some(policy);

        debug!(
            bar_weight,
            plates = inventory.plates().len(),
            weeks = weeks.last_week(),
            ramps = ramps.len(),
            smooth_warmups = warmup.is_some(),
            "resolved configuration"
        );

        Ok(ProgramConfig {
            inventory,
            weeks,
            ramps,
            format,
            output,
            warmup,
        })
    }
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn parse_week_keys<V>(map: BTreeMap<String, V>) -> Result<BTreeMap<u32, V>, ConfigError> {
    map.into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<u32>()
                .map(|week| (week, value))
                .map_err(|_| ConfigError::WeekKey(key))
        })
        .collect()
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Output preferences consumed by the command line, not the engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSettings {
    /// Title template; `{date}` is substituted.
    pub default_title: String,
    /// chrono format string for `{date}`.
    pub date_format: String,
    /// Directory for PDFs written without an explicit path. `~` expands.
    pub pdf_output_dir: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            default_title: "Tactical Barbell Max Strength: {date}".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            pdf_output_dir: "~/Downloads".to_string(),
        }
    }
}

/// Fully resolved and validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramConfig {
    inventory: PlateInventory,
    weeks: WeekTable,
    ramps: BTreeMap<Lift, LiftRamp>,
    format: WeightFormat,
    output: OutputSettings,
    warmup: Option<WarmupPolicy>,
}

impl ProgramConfig {
    /// The embedded defaults, resolved.
    ///
    /// # Panics
    ///
    /// Panics if the embedded defaults do not validate.
    pub fn builtin() -> Self {
        ConfigLayer::defaults()
            .resolve()
            .expect("embedded defaults.toml does not validate")
    }

    pub fn inventory(&self) -> &PlateInventory {
        &self.inventory
    }

    pub fn weeks(&self) -> &WeekTable {
        &self.weeks
    }

    pub fn ramp(&self, lift: Lift) -> Option<&LiftRamp> {
        self.ramps.get(&lift)
    }

    pub fn format(&self) -> &WeightFormat {
        &self.format
    }

    pub fn output(&self) -> &OutputSettings {
        &self.output
    }

    /// Warm-up smoothing, or `None` when `warmup.optimize` is off.
    pub fn warmup(&self) -> Option<&WarmupPolicy> {
        self.warmup.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::count::Count;

    #[test]
    fn defaults_resolve() {
        let config = ProgramConfig::builtin();
        assert_eq!(
            config.inventory().plates(),
            &[45.0, 35.0, 25.0, 15.0, 10.0, 5.0, 2.5]
        );
        assert_eq!(config.inventory().bar_weight(), 45.0);
        assert_eq!(
            config.weeks().weeks().map(|w| config.weeks().percent(w).unwrap()).collect::<Vec<_>>(),
            vec![70.0, 80.0, 90.0, 75.0, 85.0, 95.0]
        );
        for lift in Lift::ALL {
            assert!(config.ramp(lift).is_some(), "missing default ramp for {lift}");
        }
        assert_eq!(config.format(), &WeightFormat::default());
        assert_eq!(config.output(), &OutputSettings::default());
        assert_eq!(config.warmup(), Some(&WarmupPolicy::default()));
    }

    #[test]
    fn warmup_settings_layer_and_validate() {
        let resolve = |toml: &str| {
            ConfigLayer::defaults()
                .merge(ConfigLayer::from_toml_str(toml).unwrap())
                .resolve()
        };

        let config = resolve("[warmup]
preload_slack = 5
").unwrap();
        let policy = config.warmup().unwrap();
        assert_eq!(policy.preload_slack, 5.0);
        assert_eq!(policy.max_increase, 20.0);

        assert_eq!(resolve("[warmup]
optimize = false
").unwrap().warmup(), None);
        assert!(matches!(
            resolve("[warmup]
max_increase = -5
"),
            Err(ConfigError::Warmup(WarmupError::Negative {
                key: "max_increase",
                ..
            }))
        ));
    }

    #[test]
    fn default_deadlift_week_six_top_set() {
        let config = ProgramConfig::builtin();
        let policy = config.ramp(Lift::Deadlift).unwrap().policy_for_week(6);
        assert_eq!(policy.top().sets, Count::Range { min: 1, max: 3 });
        assert_eq!(policy.top().reps, Count::Range { min: 1, max: 2 });
        assert_eq!(policy.ramp()[0].fraction, 0.4);
    }

    #[test]
    fn scalars_merge_individually() {
        let user = ConfigLayer::from_toml_str(
            r#"
            [plates]
            bar_weight = 35

            [format]
            weight_unit = "pounds_sign"
            "#,
        )
        .unwrap();
        let explicit = ConfigLayer::from_toml_str("[format]\nshow_weight_decimals = true\n").unwrap();

        let config = ConfigLayer::defaults()
            .merge(user)
            .merge(explicit)
            .resolve()
            .unwrap();
        assert_eq!(config.inventory().bar_weight(), 35.0);
        assert_eq!(config.inventory().plates().len(), 7);
        assert_eq!(config.format().unit, WeightUnit::PoundsSign);
        assert!(config.format().show_decimals);
        assert_eq!(config.format().weight(320.0), "320.0#");
    }

    #[test]
    fn tables_replace_wholesale() {
        let layer = ConfigLayer::from_toml_str(
            r#"
            [plates]
            available = [20, 10, 5, 2.5, 1.25]

            [weeks]
            1 = 65
            2 = 75

            [ramps.squat]
            steps = [{ sets = 1, reps = 5, fraction = 0.5 }, { sets = 3, reps = 5 }]
            "#,
        )
        .unwrap();
        let config = ConfigLayer::defaults().merge(layer).resolve().unwrap();

        assert_eq!(config.inventory().plates(), &[20.0, 10.0, 5.0, 2.5, 1.25]);
        assert_eq!(config.weeks().last_week(), 2);
        let squat = config.ramp(Lift::Squat).unwrap().policy_for_week(3);
        assert_eq!(squat.steps().len(), 2);
        assert_eq!(squat.top().sets, Count::Fixed(3));
        assert_eq!(squat.top().fraction, 1.0);
        // Other lifts keep their defaults.
        assert_eq!(config.ramp(Lift::BenchPress).unwrap().policy_for_week(1).steps().len(), 5);
    }

    #[test]
    fn rejects_invalid_layers() {
        let resolve = |toml: &str| {
            ConfigLayer::defaults()
                .merge(ConfigLayer::from_toml_str(toml).unwrap())
                .resolve()
        };

        assert!(matches!(
            resolve("[plates]\navailable = []\n"),
            Err(ConfigError::NoPlates)
        ));
        assert!(matches!(
            resolve("[plates]\navailable = [45, -5]\n"),
            Err(ConfigError::Plates(PlateError::InvalidPlate(_)))
        ));
        assert!(matches!(
            resolve("[weeks]\n1 = 70\n3 = 90\n"),
            Err(ConfigError::Weeks(WeekTableError::NonContiguous { .. }))
        ));
        assert!(matches!(
            resolve("[weeks]\none = 70\n"),
            Err(ConfigError::WeekKey(_))
        ));
        assert!(matches!(
            resolve("[ramps.curl]\nsteps = [{ sets = 1, reps = 5 }]\n"),
            Err(ConfigError::UnknownLift(_))
        ));
        assert!(matches!(
            resolve("[ramps.squat]\nsteps = [{ sets = 1, reps = 5, fraction = 0.9 }, { sets = 1, reps = 5, fraction = 0.5 }]\n"),
            Err(ConfigError::Ramp {
                lift: Lift::Squat,
                source: RampError::Descending { .. }
            })
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            ConfigLayer::from_toml_str("[plates]\nbar = 45\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn empty_layer_changes_nothing() {
        let merged = ConfigLayer::defaults().merge(ConfigLayer::default());
        assert_eq!(merged, ConfigLayer::defaults());
    }
}
