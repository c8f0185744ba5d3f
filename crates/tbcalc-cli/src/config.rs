//! Configuration file discovery and layering for tbcalc.
//!
//! Resolution chain, lowest to highest: embedded defaults, the user file at
//! `~/.config/tbcalc/config.toml`, an explicit file (`--config` flag, else
//! `TBCALC_CONFIG`), then command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use tbcalc_core::config::{DEFAULT_CONFIG_TOML, FormatLayer, PlatesLayer, WarmupLayer};
use tbcalc_core::{ConfigLayer, ProgramConfig, WeightUnit};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TBCALC_CONFIG";

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the tbcalc config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/tbcalc` or `~/.config/tbcalc`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("tbcalc");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("tbcalc")
}

/// Return the path to the user config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// The explicit config file, if any: CLI flag > env var.
pub fn explicit_config_path(cli_config: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_config {
        return Some(path.to_path_buf());
    }
    std::env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest.trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}

// -----------------------------------------------------------------------
// Overrides
// -----------------------------------------------------------------------

/// Configuration values given directly on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub bar_weight: Option<f64>,
    pub plates: Option<Vec<f64>>,
    pub unit: Option<WeightUnit>,
    pub decimals: bool,
    /// Keep raw ramp weights instead of smoothing warm-ups.
    pub raw_warmups: bool,
}

impl Overrides {
    pub fn into_layer(self) -> ConfigLayer {
        ConfigLayer {
            plates: PlatesLayer {
                bar_weight: self.bar_weight,
                available: self.plates,
            },
            format: FormatLayer {
                weight_unit: self.unit,
                show_weight_decimals: self.decimals.then_some(true),
                ..FormatLayer::default()
            },
            warmup: WarmupLayer {
                optimize: self.raw_warmups.then_some(false),
                ..WarmupLayer::default()
            },
            ..ConfigLayer::default()
        }
    }
}

// -----------------------------------------------------------------------
// Loading
// -----------------------------------------------------------------------

/// Read one TOML layer from disk.
pub fn read_layer(path: &Path) -> Result<ConfigLayer> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    ConfigLayer::from_toml_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

/// Merge the layers found at the given paths.
///
/// A missing user file is skipped; a missing explicit file is an error.
pub fn load_from(
    user_path: &Path,
    explicit_path: Option<&Path>,
    overrides: Overrides,
) -> Result<ProgramConfig> {
    let mut layer = ConfigLayer::defaults();

    if user_path.exists() {
        debug!(path = %user_path.display(), "loading user config");
        layer = layer.merge(read_layer(user_path)?);
    }

    if let Some(path) = explicit_path {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
        debug!(path = %path.display(), "loading explicit config");
        layer = layer.merge(read_layer(path)?);
    }

    layer
        .merge(overrides.into_layer())
        .resolve()
        .context("invalid configuration")
}

/// Resolve configuration using the full chain.
pub fn load(cli_config: Option<&Path>, overrides: Overrides) -> Result<ProgramConfig> {
    let explicit = explicit_config_path(cli_config);
    load_from(&config_path(), explicit.as_deref(), overrides)
}

/// Write the embedded defaults to `path`, creating parent dirs as needed.
pub fn write_defaults(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    #[test]
    fn missing_user_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = load_from(&tmp.path().join("absent.toml"), None, Overrides::default()).unwrap();
        assert_eq!(config, ProgramConfig::builtin());
    }

    #[test]
    fn layers_apply_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let user = tmp.path().join("user.toml");
        let explicit = tmp.path().join("explicit.toml");
        std::fs::write(&user, "[plates]\nbar_weight = 35\n\n[format]\nweight_unit = \"pounds\"\n")
            .unwrap();
        std::fs::write(&explicit, "[plates]\nbar_weight = 55\n").unwrap();

        let config = load_from(&user, Some(&explicit), Overrides::default()).unwrap();
        assert_eq!(config.inventory().bar_weight(), 55.0);
        assert_eq!(config.format().unit, WeightUnit::Pounds);

        let overrides = Overrides {
            bar_weight: Some(20.0),
            plates: Some(vec![25.0, 10.0, 5.0]),
            unit: None,
            decimals: true,
            raw_warmups: true,
        };
        let config = load_from(&user, Some(&explicit), overrides).unwrap();
        assert_eq!(config.inventory().bar_weight(), 20.0);
        assert_eq!(config.inventory().plates(), &[25.0, 10.0, 5.0]);
        assert_eq!(config.format().unit, WeightUnit::Pounds);
        assert!(config.format().show_decimals);
        assert_eq!(config.warmup(), None);

        let config = load_from(&user, None, Overrides::default()).unwrap();
        assert!(config.warmup().is_some());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = load_from(
            &tmp.path().join("absent.toml"),
            Some(&tmp.path().join("nope.toml")),
            Overrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("config file not found"), "{err}");
    }

    #[test]
    fn invalid_file_reports_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let user = tmp.path().join("user.toml");
        std::fs::write(&user, "[weeks]\n1 = 70\n3 = 90\n").unwrap();
        let err = load_from(&user, None, Overrides::default()).unwrap_err();
        assert!(format!("{err:#}").contains("week"), "{err:#}");

        std::fs::write(&user, "[plates\n").unwrap();
        let err = load_from(&user, None, Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("user.toml"), "{err}");
    }

    #[test]
    fn explicit_path_prefers_flag_over_env() {
        let _lock = lock_env();

        unsafe { std::env::set_var(CONFIG_ENV, "/tmp/from-env.toml") };
        assert_eq!(
            explicit_config_path(Some(Path::new("/tmp/from-flag.toml"))),
            Some(PathBuf::from("/tmp/from-flag.toml"))
        );
        assert_eq!(
            explicit_config_path(None),
            Some(PathBuf::from("/tmp/from-env.toml"))
        );

        unsafe { std::env::remove_var(CONFIG_ENV) };
        assert_eq!(explicit_config_path(None), None);
    }

    #[test]
    fn config_dir_honours_xdg() {
        let _lock = lock_env();

        let orig_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", "/tmp/xdg") };
        let path = config_path();
        match orig_xdg {
            Some(x) => unsafe { std::env::set_var("XDG_CONFIG_HOME", x) },
            None => unsafe { std::env::remove_var("XDG_CONFIG_HOME") },
        }

        assert_eq!(path, PathBuf::from("/tmp/xdg/tbcalc/config.toml"));
    }

    #[test]
    fn write_defaults_refuses_to_overwrite() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("tbcalc").join("config.toml");

        write_defaults(&path, false).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, DEFAULT_CONFIG_TOML);
        assert_eq!(read_layer(&path).unwrap(), ConfigLayer::defaults());

        let err = write_defaults(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"), "{err}");
        write_defaults(&path, true).unwrap();
    }

    #[test]
    fn expands_home() {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        assert_eq!(expand_home("~/Downloads"), home.join("Downloads"));
        assert_eq!(expand_home("/srv/pdfs"), PathBuf::from("/srv/pdfs"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
    }
}
