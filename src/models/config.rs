//! Configuration types.
//!
//! Configuration is layered: built-in defaults, then `/etc/batchmon/config.toml`,
//! then the user file, then `BATCHMON_*` environment variables, then command
//! line flags. The interactive dashboard writes the user file back on exit so
//! the last queue, region, theme and filter-panel visibility are remembered.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub aws: AwsConfig,

    pub queue: QueueConfig,

    pub refresh: RefreshConfig,

    pub display: DisplayConfig,

    pub behavior: BehaviorConfig,
}

/// How to reach AWS
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Path to the `aws` executable. Auto-detected via PATH when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_path: Option<PathBuf>,

    /// Region passed to every call
    pub region: String,

    /// Named profile from `~/.aws/config` (default credentials chain when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// CloudWatch log group that AWS Batch writes container logs to
    pub log_group: String,

    /// Number of jobs requested per listing page
    pub page_size: u32,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            bin_path: None,
            region: "eu-west-1".to_string(),
            profile: None,
            log_group: "/aws/batch/job".to_string(),
            page_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Job queue shown on startup
    pub name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between automatic refreshes (0 disables auto-refresh)
    pub auto_interval: u64,
}

/// Smallest accepted auto-refresh interval; listing a large queue takes a while
const MIN_AUTO_INTERVAL: u64 = 5;

/// Largest page size accepted by the job listing API
const MAX_PAGE_SIZE: u32 = 100;

const MIN_NAME_LENGTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Theme name ("dark" or "light")
    pub theme: String,

    /// Show the filter panel next to the job table
    pub show_filter: bool,

    /// Maximum length for job names before truncation (default: 48)
    pub job_name_max_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            show_filter: true,
            job_name_max_length: 48,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Require confirmation before terminating jobs
    pub confirm_terminate: bool,

    /// Enable clipboard support
    pub copy_to_clipboard: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            confirm_terminate: true,
            copy_to_clipboard: true,
        }
    }
}

/// Errors from writing the configuration back to disk
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config directory could be determined")]
    NoConfigDir,
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Correct `value` to `default` when `invalid` holds.
/// In strict mode the problem is returned as an error instead.
fn check_field<T: std::fmt::Display + Copy>(
    value: &mut T,
    invalid: bool,
    field: &str,
    requirement: &str,
    default: T,
    strict: bool,
    warnings: &mut Vec<String>,
) -> Result<(), String> {
    if invalid {
        let msg = format!("{field} {requirement}, got {value}", value = *value);
        if strict {
            return Err(msg);
        }
        warnings.push(format!("{msg} - using default ({default})"));
        *value = default;
    }
    Ok(())
}

impl AppConfig {
    /// Get the user config file path, respecting XDG_CONFIG_HOME
    ///
    /// Resolution order:
    /// 1. $XDG_CONFIG_HOME/batchmon/config.toml (if XDG_CONFIG_HOME is set)
    /// 2. $HOME/.config/batchmon/config.toml (if HOME is set)
    /// 3. dirs::config_dir()/batchmon/config.toml
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(PathBuf::from(xdg_config).join("batchmon/config.toml"));
        }

        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config/batchmon/config.toml"));
        }

        dirs::config_dir().map(|dir| dir.join("batchmon/config.toml"))
    }

    /// Load configuration from files and environment.
    /// Returns the config and any warnings encountered during loading.
    pub fn load() -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let strict = Self::is_strict_mode();

        Self::load_config_file(&mut config, Path::new("/etc/batchmon/config.toml"), &mut warnings);

        if let Some(user_path) = Self::user_config_path() {
            Self::load_config_file(&mut config, &user_path, &mut warnings);
        }

        let env_result = config.apply_env_overrides(|name| std::env::var(name).ok(), strict);
        let validation = env_result.and_then(|env_warnings| {
            warnings.extend(env_warnings);
            config.validate(strict)
        });

        match validation {
            Ok(validation_warnings) => warnings.extend(validation_warnings),
            Err(err) => Self::strict_exit(&err),
        }

        (config, warnings)
    }

    /// Check if strict config mode is enabled via BATCHMON_STRICT_CONFIG
    fn is_strict_mode() -> bool {
        std::env::var("BATCHMON_STRICT_CONFIG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn strict_exit(msg: &str) -> ! {
        eprintln!("Error: {msg}");
        eprintln!("(BATCHMON_STRICT_CONFIG is set - config errors are fatal)");
        std::process::exit(1);
    }

    /// Load a config file, collecting warnings on parse errors but not on missing files.
    fn load_config_file(config: &mut Self, path: &Path, warnings: &mut Vec<String>) {
        let strict = Self::is_strict_mode();

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(parsed) => config.merge(parsed),
                Err(e) => {
                    let msg = format!("Config parse error in '{}': {}", path.display(), e);
                    if strict {
                        Self::strict_exit(&msg);
                    }
                    warnings.push(msg);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                let msg = format!("Could not read config '{}': {}", path.display(), e);
                if strict {
                    Self::strict_exit(&msg);
                }
                warnings.push(msg);
            }
        }
    }

    fn merge(&mut self, other: AppConfig) {
        let bin_path = other.aws.bin_path.clone().or(self.aws.bin_path.take());
        let profile = other.aws.profile.clone().or(self.aws.profile.take());
        self.aws = other.aws;
        self.aws.bin_path = bin_path;
        self.aws.profile = profile;
        self.queue = other.queue;
        self.refresh = other.refresh;
        self.display = other.display;
        self.behavior = other.behavior;
    }

    /// Apply `BATCHMON_*` overrides read through `lookup`.
    ///
    /// Invalid values are reported as warnings (or as an error in strict mode)
    /// and leave the current value untouched.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
        strict: bool,
    ) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();
        let mut report = |var: &str, value: &str, reason: &str| -> Result<(), String> {
            let msg = format!("Invalid value '{value}' for {var}: {reason}");
            if strict {
                return Err(msg);
            }
            warnings.push(format!("{msg} - ignored"));
            Ok(())
        };

        if let Some(val) = lookup("BATCHMON_AWS_PATH")
            && !val.is_empty()
        {
            let path = PathBuf::from(&val);
            if path.is_file() {
                self.aws.bin_path = Some(path);
            } else {
                report("BATCHMON_AWS_PATH", &val, "not an existing file")?;
            }
        }

        if let Some(val) = lookup("BATCHMON_QUEUE")
            && !val.is_empty()
        {
            self.queue.name = val;
        }
        if let Some(val) = lookup("BATCHMON_REGION")
            && !val.is_empty()
        {
            self.aws.region = val;
        }
        if let Some(val) = lookup("BATCHMON_PROFILE")
            && !val.is_empty()
        {
            self.aws.profile = Some(val);
        }
        if let Some(val) = lookup("BATCHMON_THEME") {
            self.display.theme = val;
        }

        if let Some(val) = lookup("BATCHMON_AUTO_REFRESH") {
            match val.parse::<u64>() {
                Ok(secs) if secs == 0 || secs >= MIN_AUTO_INTERVAL => {
                    self.refresh.auto_interval = secs;
                }
                Ok(_) => report(
                    "BATCHMON_AUTO_REFRESH",
                    &val,
                    &format!("must be 0 or at least {MIN_AUTO_INTERVAL} seconds"),
                )?,
                Err(_) => report(
                    "BATCHMON_AUTO_REFRESH",
                    &val,
                    "expected a non-negative integer (seconds)",
                )?,
            }
        }

        if lookup("BATCHMON_NO_CLIPBOARD").is_some() {
            self.behavior.copy_to_clipboard = false;
        }

        Ok(warnings)
    }

    /// Apply command line overrides (highest precedence)
    pub fn apply_cli_overrides(
        &mut self,
        queue: Option<String>,
        region: Option<String>,
        profile: Option<String>,
    ) {
        if let Some(queue) = queue {
            self.queue.name = queue;
        }
        if let Some(region) = region {
            self.aws.region = region;
        }
        if profile.is_some() {
            self.aws.profile = profile;
        }
    }

    /// Validate configuration values.
    /// Returns warnings for invalid values that were corrected to defaults.
    /// If `strict` is true, returns Err instead of correcting values.
    pub fn validate(&mut self, strict: bool) -> Result<Vec<String>, String> {
        let mut warnings = Vec::new();
        let aws_defaults = AwsConfig::default();
        let display_defaults = DisplayConfig::default();

        let page_size = self.aws.page_size;
        check_field(
            &mut self.aws.page_size,
            page_size == 0 || page_size > MAX_PAGE_SIZE,
            "aws.page_size",
            &format!("must be between 1 and {MAX_PAGE_SIZE}"),
            aws_defaults.page_size,
            strict,
            &mut warnings,
        )?;

        let interval = self.refresh.auto_interval;
        check_field(
            &mut self.refresh.auto_interval,
            interval != 0 && interval < MIN_AUTO_INTERVAL,
            "refresh.auto_interval",
            &format!("must be 0 (off) or at least {MIN_AUTO_INTERVAL} seconds"),
            0,
            strict,
            &mut warnings,
        )?;

        let name_len = self.display.job_name_max_length;
        check_field(
            &mut self.display.job_name_max_length,
            name_len < MIN_NAME_LENGTH,
            "display.job_name_max_length",
            &format!("must be at least {MIN_NAME_LENGTH}"),
            display_defaults.job_name_max_length,
            strict,
            &mut warnings,
        )?;

        if !matches!(self.display.theme.as_str(), "dark" | "light") {
            let msg = format!(
                "display.theme must be \"dark\" or \"light\", got \"{}\"",
                self.display.theme
            );
            if strict {
                return Err(msg);
            }
            warnings.push(format!("{msg} - using default (dark)"));
            self.display.theme = display_defaults.theme;
        }

        if self.queue.name.trim().is_empty() {
            let msg = "queue.name must not be empty".to_string();
            if strict {
                return Err(msg);
            }
            warnings.push(format!("{msg} - using default (default)"));
            self.queue.name = QueueConfig::default().name;
        }

        Ok(warnings)
    }

    /// Write the configuration to the user config file, creating its directory
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::user_config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write the configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
