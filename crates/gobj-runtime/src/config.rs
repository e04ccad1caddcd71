use std::error::Error;
use std::fmt;
use std::path::PathBuf;

pub const NOTIFY_ENV: &str = "GOBJ_NOTIFY_LEAK";
pub const LOG_FILE_ENV: &str = "GOBJ_DEBUG_FILE";
pub const ABRIDGED_ENV: &str = "GOBJ_ABRIDGED_LOG";
pub const CONTAINER_POLICY_ENV: &str = "GOBJ_CONTAINER_POLICY";
pub const FILTER_HIDDEN_ENV: &str = "GOBJ_FILTER_HIDDEN";
pub const LOG_PATH_ENV: &str = "GOBJ_LOG_PATH";

pub const DEFAULT_LOG_PATH: &str = "gobj.txt";

/// What disposing a container means for the resources attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerPolicy {
    /// The host disposes members with their container; stop tracking them.
    #[default]
    AutoRelease,
    /// Members survive but are no longer drawn; keep tracking them as hidden.
    MarkInvisible,
}

impl ContainerPolicy {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto-release" | "auto_release" | "release" => Ok(Self::AutoRelease),
            "mark-invisible" | "mark_invisible" | "hide" => Ok(Self::MarkInvisible),
            other => Err(ConfigError::InvalidValue {
                key: CONTAINER_POLICY_ENV,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: {value:?}"),
        }
    }
}

impl Error for ConfigError {}

/// Detector switches. Fixed once the detector is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Print one console line per frame listing the leaks drained in it.
    pub notify_on_console: bool,
    /// Append one record per leak to `log_path`.
    pub write_log_file: bool,
    /// Keep only the immediate call site instead of the full stack.
    pub abridged_trace: bool,
    pub container_policy: ContainerPolicy,
    /// Drop leaks of resources that were hidden or fully transparent.
    pub filter_invisible_or_transparent: bool,
    pub log_path: PathBuf,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            notify_on_console: true,
            write_log_file: true,
            abridged_trace: false,
            container_policy: ContainerPolicy::AutoRelease,
            filter_invisible_or_transparent: false,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl DetectorConfig {
    /// Defaults overlaid with `GOBJ_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(NOTIFY_ENV) {
            config.notify_on_console = parse_flag(&value);
        }
        if let Some(value) = lookup(LOG_FILE_ENV) {
            config.write_log_file = parse_flag(&value);
        }
        if let Some(value) = lookup(ABRIDGED_ENV) {
            config.abridged_trace = parse_flag(&value);
        }
        if let Some(value) = lookup(CONTAINER_POLICY_ENV) {
            config.container_policy = ContainerPolicy::parse(&value)?;
        }
        if let Some(value) = lookup(FILTER_HIDDEN_ENV) {
            config.filter_invisible_or_transparent = parse_flag(&value);
        }
        if let Some(value) = lookup(LOG_PATH_ENV)
            && !value.trim().is_empty()
        {
            config.log_path = PathBuf::from(value);
        }
        Ok(config)
    }

    /// Nothing would ever be emitted; hooks can skip tracking entirely.
    pub fn is_silent(&self) -> bool {
        !self.notify_on_console && !self.write_log_file
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    !(value.is_empty() || value == "0" || value == "false" || value == "off")
}
