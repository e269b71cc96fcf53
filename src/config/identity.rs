//! Local identity resolution.
//!
//! Live instances publish the attached volume id and their own instance id
//! as single-line files under the state directory. Non-live configurations
//! resolve to an empty identity and downstream steps that need the ids are
//! skipped.

use std::io;
use std::path::Path;

use super::RotationConfig;

/// File holding the attached volume id.
pub const VOLUME_ID_FILE: &str = "VOLUME_ID";
/// File holding the instance id.
pub const INSTANCE_ID_FILE: &str = "INSTANCE_ID";

/// Volume and instance ids resolved from local state.
#[derive(Debug, Clone, Default)]
pub struct ResolvedIdentity {
    pub volume_id: Option<String>,
    pub instance_id: Option<String>,
}

impl ResolvedIdentity {
    /// Empty identity for non-live runs.
    pub fn none() -> Self {
        Self::default()
    }

    /// Resolve ids from the configured state directory.
    ///
    /// In live mode a missing or unreadable identity file is an error; in
    /// non-live mode both ids resolve to `None` without touching the
    /// filesystem.
    pub fn resolve(config: &RotationConfig) -> io::Result<Self> {
        if !config.aws {
            return Ok(Self::none());
        }

        Ok(Self {
            volume_id: Some(read_id(&config.state_dir.join(VOLUME_ID_FILE))?),
            instance_id: Some(read_id(&config.state_dir.join(INSTANCE_ID_FILE))?),
        })
    }
}

fn read_id(path: &Path) -> io::Result<String> {
    Ok(std::fs::read_to_string(path)?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_non_live_is_empty() {
        let config = RotationConfig::for_test();
        let identity = ResolvedIdentity::resolve(&config).unwrap();
        assert!(identity.volume_id.is_none());
        assert!(identity.instance_id.is_none());
    }

    #[test]
    fn test_resolve_reads_trimmed_ids() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(VOLUME_ID_FILE), "vol-0abc123\n").unwrap();
        std::fs::write(dir.path().join(INSTANCE_ID_FILE), "i-0def456\n").unwrap();

        let config = RotationConfig {
            aws: true,
            state_dir: dir.path().to_path_buf(),
            ..RotationConfig::default()
        };

        let identity = ResolvedIdentity::resolve(&config).unwrap();
        assert_eq!(identity.volume_id.as_deref(), Some("vol-0abc123"));
        assert_eq!(identity.instance_id.as_deref(), Some("i-0def456"));
    }

    #[test]
    fn test_resolve_missing_file_errors_in_live_mode() {
        let dir = TempDir::new().unwrap();

        let config = RotationConfig {
            aws: true,
            state_dir: dir.path().to_path_buf(),
            ..RotationConfig::default()
        };

        assert!(ResolvedIdentity::resolve(&config).is_err());
    }
}
