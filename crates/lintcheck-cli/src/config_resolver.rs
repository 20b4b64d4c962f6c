//! Configuration file resolution with global fallback.
//!
//! Resolves the configuration file path using a deterministic priority order:
//!
//! 1. `--config` flag (explicit path)
//! 2. `lintcheck.toml` or `.lintcheck.toml` in the analyzed directory, then
//!    in the current directory
//! 3. `~/.lintcheck/config.toml` (global fallback)
//! 4. No config found → defaults

use anyhow::{Context, Result};
use lintcheck_core::Config;
use std::path::{Path, PathBuf};

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicitly specified via `--config` flag.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Loaded from the global config directory (`~/.lintcheck/`).
    Global(PathBuf),
    /// No config found; defaults will be used.
    Default,
}

impl ConfigSource {
    /// Returns the resolved path, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    /// Returns `true` if the config was loaded from the global directory.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }

    /// Loads the configuration this source points at.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Config::default());
        };
        if self.is_global() {
            tracing::info!("Using global config: {}", path.display());
        } else {
            tracing::debug!("Using config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["lintcheck.toml", ".lintcheck.toml"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Resolves the configuration file path.
///
/// `target` is the file or directory being analyzed. See module-level docs
/// for resolution order.
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    let mut project_dirs = vec![project_dir(target)];
    if let Ok(cwd) = std::env::current_dir() {
        project_dirs.push(cwd);
    }
    resolve_inner(&project_dirs, explicit, global_config_dir())
}

/// Directory that holds the project config for `target`.
fn project_dir(target: &Path) -> PathBuf {
    if target.is_file() {
        target
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    } else {
        target.to_path_buf()
    }
}

/// Testable core: accepts `global_dir` as parameter to avoid env var races.
fn resolve_inner(
    project_dirs: &[PathBuf],
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    for dir in project_dirs {
        for name in PROJECT_CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                tracing::debug!("Found project config: {}", candidate.display());
                return ConfigSource::Project(candidate);
            }
        }
    }

    if let Some(dir) = global_dir {
        let candidate = dir.join(GLOBAL_CONFIG_NAME);
        if candidate.is_file() {
            tracing::debug!("Found global config: {}", candidate.display());
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// Returns the global config directory path.
///
/// Resolution: `$LINTCHECK_CONFIG_DIR` > `~/.lintcheck/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("LINTCHECK_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".lintcheck"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_takes_priority_over_project() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "").unwrap();

        let project = tmp.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("lintcheck.toml"), "").unwrap();

        let result = resolve_inner(&[project], Some(&explicit), None);
        assert_eq!(result, ConfigSource::Explicit(explicit));
    }

    #[test]
    fn explicit_does_not_check_existence() {
        let result = resolve_inner(&[], Some(Path::new("/nonexistent.toml")), None);
        assert_eq!(
            result,
            ConfigSource::Explicit(PathBuf::from("/nonexistent.toml"))
        );
        assert!(result.load().is_err());
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".lintcheck.toml"), "").unwrap();
        let dirs = [tmp.path().to_path_buf()];
        assert_eq!(
            resolve_inner(&dirs, None, None),
            ConfigSource::Project(tmp.path().join(".lintcheck.toml"))
        );

        fs::write(tmp.path().join("lintcheck.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(&dirs, None, None),
            ConfigSource::Project(tmp.path().join("lintcheck.toml"))
        );
    }

    #[test]
    fn analyzed_dir_checked_before_later_dirs() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(second.path().join("lintcheck.toml"), "").unwrap();
        let dirs = [first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(
            resolve_inner(&dirs, None, None),
            ConfigSource::Project(second.path().join("lintcheck.toml"))
        );

        fs::write(first.path().join(".lintcheck.toml"), "").unwrap();
        assert_eq!(
            resolve_inner(&dirs, None, None),
            ConfigSource::Project(first.path().join(".lintcheck.toml"))
        );
    }

    #[test]
    fn file_target_uses_its_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("user_spec.rb");
        fs::write(&file, "").unwrap();
        assert_eq!(project_dir(&file), tmp.path());
        assert_eq!(project_dir(tmp.path()), tmp.path());
    }

    #[test]
    fn global_fallback_when_no_project_config() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "fail_on = \"warning\"\n").unwrap();

        let result = resolve_inner(
            &[project.path().to_path_buf()],
            None,
            Some(global.path().to_path_buf()),
        );
        assert_eq!(
            result,
            ConfigSource::Global(global.path().join("config.toml"))
        );
        assert!(result.is_global());
        assert_eq!(
            result.load().unwrap().fail_on(),
            lintcheck_core::Severity::Warning
        );
    }

    #[test]
    fn global_skipped_when_project_config_exists() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("lintcheck.toml"), "").unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "").unwrap();

        let result = resolve_inner(
            &[project.path().to_path_buf()],
            None,
            Some(global.path().to_path_buf()),
        );
        assert!(matches!(result, ConfigSource::Project(_)));
    }

    #[test]
    fn nothing_found_returns_default() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();

        let result = resolve_inner(
            &[project.path().to_path_buf()],
            None,
            Some(global.path().to_path_buf()),
        );
        assert_eq!(result, ConfigSource::Default);
        assert!(result.path().is_none());
        assert!(result.load().is_ok());
    }

    #[test]
    fn unparsable_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lintcheck.toml");
        fs::write(&path, "preset = [").unwrap();
        let err = ConfigSource::Project(path).load().unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load config"));
    }
}
