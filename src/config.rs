use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LintError, Result};
use crate::lint::{Tolerance, ValidationConfig};
use crate::probe;
use crate::template::MAX_31BIT;
use crate::utils::read_optional;

/// Name of the per-project configuration file
pub const PROJECT_CONFIG: &str = ".dctlint.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub lint: LintSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub probe: ProbeSettings,
}

impl Config {
    /// Load configuration from files and the environment.
    ///
    /// An explicit path (or `DCTL_CONFIG`) replaces the global and project
    /// files. Environment overrides are applied last.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("DCTL_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                LintError::Config(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(Path::new(PROJECT_CONFIG))? {
                config.merge_patch(project);
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            tracing::debug!("no config directory, skipping global config");
            return Ok(None);
        };
        Self::load_patch(&dir.join("dctlint/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        let Some(raw) = read_optional(path)
            .map_err(|err| LintError::Config(format!("read config {}: {err}", path.display())))?
        else {
            return Ok(None);
        };
        let patch = toml::from_str(&raw)
            .map_err(|err| LintError::Config(format!("parse config {}: {err}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.lint {
            self.lint.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
        if let Some(patch) = patch.probe {
            self.probe.merge(patch);
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = env_bool(&lookup, "DCTL_CLOUDFLARE") {
            self.lint.cloudflare = value;
        }
        if let Some(value) = env_bool(&lookup, "DCTL_CHECK_LOGOS") {
            self.lint.check_logos = value;
        }
        if let Some(value) = lookup("DCTL_TOLERATE") {
            self.lint.tolerate = value.parse()?;
        }

        if let Some(value) = env_u32(&lookup, "DCTL_INDENT")? {
            self.output.indent = value as usize;
        }
        if let Some(value) = env_u32(&lookup, "DCTL_TTL")? {
            self.output.ttl = value;
        }

        if let Some(value) = lookup("DCTL_PROBE_TIMEOUT") {
            self.probe.timeout = humantime_serde::re::humantime::parse_duration(&value)
                .map_err(|err| {
                    LintError::Config(format!("invalid DCTL_PROBE_TIMEOUT value {value}: {err}"))
                })?;
        }
        Ok(())
    }

    /// Reject values the linter cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.output.indent > 255 {
            return Err(LintError::Config(format!(
                "indent {} is out of range 0-255",
                self.output.indent
            )));
        }
        if i64::from(self.output.ttl) > MAX_31BIT {
            return Err(LintError::Config(format!(
                "ttl {} exceeds maximum {MAX_31BIT}",
                self.output.ttl
            )));
        }
        Ok(())
    }

    /// Rule switches for one run
    #[must_use]
    pub const fn validation_config(&self, write_back: bool) -> ValidationConfig {
        ValidationConfig {
            cloudflare: self.lint.cloudflare,
            check_logos: self.lint.check_logos,
            write_back,
            ttl_default: self.output.ttl,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintSettings {
    #[serde(default)]
    pub cloudflare: bool,
    #[serde(default)]
    pub check_logos: bool,
    #[serde(default)]
    pub tolerate: Tolerance,
}

impl LintSettings {
    fn merge(&mut self, patch: LintPatch) {
        if let Some(value) = patch.cloudflare {
            self.cloudflare = value;
        }
        if let Some(value) = patch.check_logos {
            self.check_logos = value;
        }
        if let Some(value) = patch.tolerate {
            self.tolerate = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub indent: usize,
    #[serde(default)]
    pub ttl: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { indent: 4, ttl: 0 }
    }
}

impl OutputSettings {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.indent {
            self.indent = value;
        }
        if let Some(value) = patch.ttl {
            self.ttl = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeSettings {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: probe::DEFAULT_TIMEOUT,
            user_agent: probe::default_user_agent(),
        }
    }
}

impl ProbeSettings {
    fn merge(&mut self, patch: ProbePatch) {
        if let Some(value) = patch.timeout {
            self.timeout = value;
        }
        if let Some(value) = patch.user_agent {
            self.user_agent = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    pub lint: Option<LintPatch>,
    pub output: Option<OutputPatch>,
    pub probe: Option<ProbePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LintPatch {
    pub cloudflare: Option<bool>,
    pub check_logos: Option<bool>,
    pub tolerate: Option<Tolerance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputPatch {
    pub indent: Option<usize>,
    pub ttl: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProbePatch {
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

fn env_bool(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    lookup(key).map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_u32(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u32>> {
    match lookup(key) {
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|err| LintError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.lint.cloudflare);
        assert_eq!(config.lint.tolerate, Tolerance::Info);
        assert_eq!(config.output.indent, 4);
        assert_eq!(config.probe.timeout, Duration::from_secs(10));
        assert!(config.probe.user_agent.starts_with("dc-template-linter/"));
    }

    #[test]
    fn test_patch_merges_only_set_keys() {
        let patch: ConfigPatch = toml::from_str(
            r#"
            [lint]
            cloudflare = true
            tolerate = "warn"

            [probe]
            timeout = "2s 500ms"
            "#,
        )
        .unwrap();

        let mut config = Config::default();
        config.merge_patch(patch);
        assert!(config.lint.cloudflare);
        assert!(!config.lint.check_logos);
        assert_eq!(config.lint.tolerate, Tolerance::Warn);
        assert_eq!(config.output.indent, 4);
        assert_eq!(config.probe.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[output]\nwidth = 2\n").unwrap();
        let err = Config::load_patch(&path).unwrap_err();
        assert!(matches!(err, LintError::Config(_)));
    }

    #[test]
    fn test_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/dctlint.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("DCTL_CLOUDFLARE", "yes"),
                ("DCTL_INDENT", "2"),
                ("DCTL_TTL", "3600"),
                ("DCTL_TOLERATE", "any"),
                ("DCTL_PROBE_TIMEOUT", "250ms"),
            ]))
            .unwrap();
        assert!(config.lint.cloudflare);
        assert_eq!(config.output.indent, 2);
        assert_eq!(config.output.ttl, 3600);
        assert_eq!(config.lint.tolerate, Tolerance::Any);
        assert_eq!(config.probe.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_env_invalid_values() {
        let mut config = Config::default();
        assert!(config.apply_overrides(env(&[("DCTL_INDENT", "wide")])).is_err());
        assert!(config.apply_overrides(env(&[("DCTL_TOLERATE", "lots")])).is_err());
        assert!(config.apply_overrides(env(&[("DCTL_PROBE_TIMEOUT", "soon")])).is_err());
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = Config::default();
        config.output.indent = 256;
        assert!(config.validate().is_err());

        config.output.indent = 255;
        config.output.ttl = 2_147_483_648;
        assert!(config.validate().is_err());

        config.output.ttl = 2_147_483_647;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_config() {
        let mut config = Config::default();
        config.lint.cloudflare = true;
        config.output.ttl = 600;
        let rules = config.validation_config(true);
        assert!(rules.cloudflare);
        assert_eq!(rules.backfill_ttl(), Some(600));
        assert_eq!(config.validation_config(false).backfill_ttl(), None);
    }
}
