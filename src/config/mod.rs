//! Rotation policy configuration.
//!
//! Explicit configuration struct loaded from YAML files or environment
//! variables; no hidden global lookups.

mod identity;

pub use identity::ResolvedIdentity;

use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "snapcycle.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "SNAPCYCLE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "SNAPCYCLE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "SNAPCYCLE_LOG";

/// Rotation policy configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Deployment environment name; the policy tag is derived from it.
    pub deploy_env: String,

    /// Live-environment mode. When true, volume and instance ids are
    /// resolved from the state directory and the AWS backends are used.
    pub aws: bool,

    /// Freshness threshold in days: a new snapshot is created once every
    /// existing snapshot is older than this.
    pub snapshot_days: i64,

    /// Retention threshold in days: unprotected snapshots older than this
    /// are purged. Expected to exceed `snapshot_days`.
    pub max_snapshot_days: i64,

    /// Device name whose launch template mapping protects a snapshot.
    pub device_name: String,

    /// Directory holding the instance's identity files.
    pub state_dir: PathBuf,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            deploy_env: "dev".to_string(),
            aws: false,
            snapshot_days: default_snapshot_days(),
            max_snapshot_days: default_max_snapshot_days(),
            device_name: default_device_name(),
            state_dir: default_state_dir(),
        }
    }
}

impl RotationConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `snapcycle.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `SNAPCYCLE_CONFIG` environment variable (if set)
    /// 4. Environment variables with `SNAPCYCLE` prefix
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: RotationConfig = config.try_deserialize()?;
        config.validate();
        Ok(config)
    }

    /// Policy tag classifying this policy's snapshots.
    pub fn tag(&self) -> String {
        format!("{}_volume_snapshot", self.deploy_env)
    }

    /// Warn about contradictory thresholds.
    ///
    /// A retention window inside the freshness window makes freshly created
    /// snapshots immediately purgeable; callers own the ordering, so this
    /// never fails.
    pub fn validate(&self) {
        if self.max_snapshot_days <= self.snapshot_days {
            warn!(
                snapshot_days = self.snapshot_days,
                max_snapshot_days = self.max_snapshot_days,
                "retention threshold does not exceed freshness threshold"
            );
        }
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}

fn default_snapshot_days() -> i64 {
    7
}

fn default_max_snapshot_days() -> i64 {
    30
}

fn default_device_name() -> String {
    "/dev/sdx".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("/mnt/ebs")
}
