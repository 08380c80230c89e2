use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::conditions::StatThresholds;

pub const DEFAULT_API_BASE: &str = "https://swd.weatherflow.com/swd/rest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_PREVIEW_PATH: &str = "dashboard-preview.jpg";
pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration, passed explicitly through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub station: Option<StationConfig>,
    pub display: Option<DisplayConfig>,
    pub output: Option<OutputConfig>,
    /// replaces the built-in stat colour table when present
    pub thresholds: Option<StatThresholds>,
}

/// Which station to read and how to reach the API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StationConfig {
    pub station_id: Option<String>,
    pub token: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub title: Option<String>,
    pub time_format: Option<String>,
    /// directory holding the three .ttf files
    pub assets_dir: Option<PathBuf>,
}

/// Where the rendered frame goes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    pub preview_path: Option<PathBuf>,
    /// skip the panel probe and always write the preview file
    pub force_preview: Option<bool>,
    /// push the "Connect Error" frame when the fetch fails (default true)
    pub show_errors: Option<bool>,
    pub i2c_bus: Option<String>,    // e.g. "/dev/i2c-1"
    pub spi_bus: Option<String>,    // e.g. "/dev/spidev0.0"
    pub gpio_chip: Option<String>,  // e.g. "/dev/gpiochip0"
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "tempest-dash", about = "Tempest weather dashboard for e-ink panels", version)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub station_id: Option<String>,
    #[arg(long)]
    pub token: Option<String>,
    #[arg(long)]
    pub api_base: Option<String>,
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub assets_dir: Option<PathBuf>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub preview_path: Option<PathBuf>,
    /// always write the JPEG preview, even when a panel is attached
    #[arg(long, action = ArgAction::SetTrue)]
    pub preview: bool,
    /// leave the last frame on the panel when the fetch fails
    #[arg(long, action = ArgAction::SetTrue)]
    pub keep_on_error: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Read YAML (explicit path or search), merge CLI overrides, validate.
pub fn load_from(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/tempest-dash/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/tempest-dash.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["tempest-dash.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()  { dst.log_level = src.log_level; }
    if src.thresholds.is_some() { dst.thresholds = src.thresholds; }
    match (&mut dst.station, src.station) {
        (None, Some(s)) => dst.station = Some(s),
        (Some(d), Some(s)) => merge_station(d, s),
        _ => {}
    }
    match (&mut dst.display, src.display) {
        (None, Some(s)) => dst.display = Some(s),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.output, src.output) {
        (None, Some(s)) => dst.output = Some(s),
        (Some(d), Some(s)) => merge_output(d, s),
        _ => {}
    }
}

fn merge_station(dst: &mut StationConfig, src: StationConfig) {
    if src.station_id.is_some()   { dst.station_id = src.station_id; }
    if src.token.is_some()        { dst.token = src.token; }
    if src.api_base.is_some()     { dst.api_base = src.api_base; }
    if src.timeout_secs.is_some() { dst.timeout_secs = src.timeout_secs; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.title.is_some()       { dst.title = src.title; }
    if src.time_format.is_some() { dst.time_format = src.time_format; }
    if src.assets_dir.is_some()  { dst.assets_dir = src.assets_dir; }
}

fn merge_output(dst: &mut OutputConfig, src: OutputConfig) {
    if src.preview_path.is_some()  { dst.preview_path = src.preview_path; }
    if src.force_preview.is_some() { dst.force_preview = src.force_preview; }
    if src.show_errors.is_some()   { dst.show_errors = src.show_errors; }
    if src.i2c_bus.is_some()       { dst.i2c_bus = src.i2c_bus; }
    if src.spi_bus.is_some()       { dst.spi_bus = src.spi_bus; }
    if src.gpio_chip.is_some()     { dst.gpio_chip = src.gpio_chip; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }

    if cli.station_id.is_some() || cli.token.is_some() || cli.api_base.is_some() {
        let station = cfg.station.get_or_insert_with(StationConfig::default);
        if cli.station_id.is_some() { station.station_id = cli.station_id.clone(); }
        if cli.token.is_some()      { station.token = cli.token.clone(); }
        if cli.api_base.is_some()   { station.api_base = cli.api_base.clone(); }
    }
    if cli.assets_dir.is_some() {
        cfg.display.get_or_insert_with(DisplayConfig::default).assets_dir = cli.assets_dir.clone();
    }
    if cli.preview_path.is_some() || cli.preview || cli.keep_on_error {
        let output = cfg.output.get_or_insert_with(OutputConfig::default);
        if cli.preview_path.is_some() { output.preview_path = cli.preview_path.clone(); }
        if cli.preview                { output.force_preview = Some(true); }
        if cli.keep_on_error          { output.show_errors = Some(false); }
    }
}

/// Put any invariants here (ranges, formats). Missing credentials are
/// not a config error: the fetch fails and the error frame is shown.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(station) = cfg.station.as_ref() {
        if station.timeout_secs == Some(0) {
            return Err(ConfigError::Validation("station.timeout_secs must be > 0".into()));
        }
    }
    if let Some(fmt) = cfg.display.as_ref().and_then(|d| d.time_format.as_deref()) {
        check_time_format(fmt).map_err(ConfigError::Validation)?;
    }
    if let Some(t) = cfg.thresholds.as_ref() {
        t.validate().map_err(ConfigError::Validation)?;
    }
    Ok(())
}

/// Reject strftime patterns chrono cannot render.
pub fn check_time_format(fmt: &str) -> Result<(), String> {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(format!("display.time_format '{}' is not a valid strftime pattern", fmt));
    }
    Ok(())
}

impl Config {
    pub fn station(&self) -> StationConfig {
        self.station.clone().unwrap_or_default()
    }

    pub fn display(&self) -> DisplayConfig {
        self.display.clone().unwrap_or_default()
    }

    pub fn output(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }

    pub fn thresholds(&self) -> StatThresholds {
        self.thresholds.clone().unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

impl StationConfig {
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE).trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

impl DisplayConfig {
    pub fn assets_dir(&self) -> PathBuf {
        self.assets_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR))
    }
}

impl OutputConfig {
    pub fn preview_path(&self) -> PathBuf {
        self.preview_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_PREVIEW_PATH))
    }

    pub fn force_preview(&self) -> bool {
        self.force_preview.unwrap_or(false)
    }

    pub fn show_errors(&self) -> bool {
        self.show_errors.unwrap_or(true)
    }

    pub fn i2c_bus(&self) -> &str {
        self.i2c_bus.as_deref().unwrap_or("/dev/i2c-1")
    }

    pub fn spi_bus(&self) -> &str {
        self.spi_bus.as_deref().unwrap_or("/dev/spidev0.0")
    }

    pub fn gpio_chip(&self) -> &str {
        self.gpio_chip.as_deref().unwrap_or("/dev/gpiochip0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
log_level: debug
station:
  station_id: "12345"
  token: abc-def
display:
  title: Back Garden
output:
  preview_path: /tmp/dash.jpg
"#;

    #[test]
    fn test_yaml_then_cli_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(YAML.as_bytes()).unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            token: Some("from-cli".to_string()),
            preview: true,
            ..Default::default()
        };
        let cfg = load_from(&cli).unwrap();
        let station = cfg.station();
        assert_eq!(station.station_id.as_deref(), Some("12345"));
        assert_eq!(station.token.as_deref(), Some("from-cli"));
        assert_eq!(station.api_base(), DEFAULT_API_BASE);
        assert_eq!(station.timeout(), Duration::from_secs(20));
        assert_eq!(cfg.display().title.as_deref(), Some("Back Garden"));
        assert_eq!(cfg.output().preview_path(), PathBuf::from("/tmp/dash.jpg"));
        assert!(cfg.output().force_preview());
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn test_missing_credentials_still_load() {
        let cfg = parse_yaml("station:\n  station_id: \"1\"\n").unwrap();
        assert!(validate(&cfg).is_ok());
        assert!(validate(&Config::default()).is_ok());
        assert_eq!(cfg.station().token, None);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cfg = parse_yaml("station:\n  timeout_secs: 0\n").unwrap();
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_time_format_checked() {
        assert!(check_time_format("%b %d, %-I:%M %p").is_ok());
        assert!(check_time_format("%H:%M").is_ok());
        assert!(check_time_format("%Q").is_err());
        let cfg = parse_yaml("display:\n  time_format: \"%Q at %H\"\n").unwrap();
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here.yaml")),
            ..Default::default()
        };
        assert!(matches!(load_from(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_threshold_override_validated() {
        let cfg = parse_yaml(
            "station:\n  station_id: \"1\"\n  token: t\nthresholds:\n  wind: { caution: 20.0, alert: 10.0 }\n",
        )
        .unwrap();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.output().preview_path(), PathBuf::from("dashboard-preview.jpg"));
        assert_eq!(cfg.display().assets_dir(), PathBuf::from("assets"));
        assert_eq!(cfg.output().spi_bus(), "/dev/spidev0.0");
        assert_eq!(cfg.log_level(), "info");
        assert!(cfg.output().show_errors());
    }

    #[test]
    fn test_keep_on_error_flag() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here.yaml")),
            keep_on_error: true,
            ..Default::default()
        };
        let mut cfg = parse_yaml("output:\n  show_errors: true\n").unwrap();
        apply_cli_overrides(&mut cfg, &cli);
        assert!(!cfg.output().show_errors());
    }
}
