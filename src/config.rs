//! Cluster settings handed to completion scripts.
//!
//! Values are layered: built-in defaults, then the lain config files (global
//! first, user last), then `LAIN_DOCKER_REGISTRY` / `LAIN_DOMAINS`, then
//! whatever the CLI passes explicitly.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::split_list;

pub const DEFAULT_DOMAIN: &str = "lain.local";

const GLOBAL_CONFIG_FILE: &str = "/etc/lain/lain.conf.json";
const USER_GLOBAL_CONFIG_NAME: &str = "global.conf.json";
const USER_CONFIG_NAME: &str = "lain.conf.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Private docker registry prefixed to default image names.
    pub registry: Option<String>,
    /// Cluster domains used for default web mountpoints.
    pub domains: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            registry: None,
            domains: vec![DEFAULT_DOMAIN.to_string()],
        }
    }
}

/// On-disk shape of a lain config file. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    private_docker_registry: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    domains: Option<Vec<String>>,
}

impl ClusterConfig {
    /// Defaults, config files and environment, in that order.
    pub fn from_environment() -> Self {
        let mut config = Self::default();
        for path in config_file_candidates() {
            config.merge_file(&path);
        }
        config.apply_env_overrides(
            env::var("LAIN_DOCKER_REGISTRY").ok().as_deref(),
            env::var("LAIN_DOMAINS").ok().as_deref(),
        );
        config
    }

    /// Merge a single config file. Missing or unreadable files are skipped.
    pub fn merge_file(&mut self, path: &Path) {
        if !path.is_file() {
            return;
        }
        match read_config_file(path) {
            Ok(file) => self.apply_file(file),
            Err(err) => log::debug!("ignoring config file {}: {err:#}", path.display()),
        }
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(registry) = file.private_docker_registry.filter(|r| !r.trim().is_empty()) {
            self.registry = Some(registry);
        }
        if let Some(domains) = file.domains.filter(|d| !d.is_empty()) {
            self.domains = domains;
        } else if let Some(domain) = file.domain.filter(|d| !d.trim().is_empty()) {
            self.domains = vec![domain];
        }
    }

    pub fn apply_env_overrides(&mut self, registry: Option<&str>, domains: Option<&str>) {
        if let Some(registry) = registry.map(str::trim).filter(|r| !r.is_empty()) {
            self.registry = Some(registry.to_string());
        }
        if let Some(raw) = domains {
            let parsed = split_list(raw);
            if !parsed.is_empty() {
                self.domains = parsed;
            }
        }
    }

    /// Explicit CLI values win over everything else.
    pub fn apply_cli_overrides(&mut self, registry: Option<String>, domains: Vec<String>) {
        if registry.is_some() {
            self.registry = registry;
        }
        if !domains.is_empty() {
            self.domains = domains;
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Config files in merge order: system-wide, user global, user.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(GLOBAL_CONFIG_FILE)];
    if let Some(dir) = user_config_dir() {
        candidates.push(dir.join(USER_GLOBAL_CONFIG_NAME));
        candidates.push(dir.join(USER_CONFIG_NAME));
    }
    candidates
}

fn user_config_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("LAINSCRIPT_CONFIG_DIR").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".lain"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_to_lain_local() {
        let config = ClusterConfig::default();
        assert_eq!(config.registry, None);
        assert_eq!(config.domains, vec!["lain.local"]);
    }

    #[test]
    fn later_files_override_earlier_ones() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.conf.json");
        let user = dir.path().join("lain.conf.json");
        fs::write(
            &global,
            r#"{"private_docker_registry": "registry.global", "domain": "global.example"}"#,
        )
        .unwrap();
        fs::write(&user, r#"{"domains": ["a.example", "b.example"], "sso_url": "x"}"#).unwrap();

        let mut config = ClusterConfig::default();
        config.merge_file(&global);
        config.merge_file(&user);

        assert_eq!(config.registry.as_deref(), Some("registry.global"));
        assert_eq!(config.domains, vec!["a.example", "b.example"]);
    }

    #[test]
    fn broken_or_missing_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("lain.conf.json");
        fs::write(&broken, "{ not json").unwrap();

        let mut config = ClusterConfig::default();
        config.merge_file(&broken);
        config.merge_file(&dir.path().join("absent.json"));
        assert_eq!(config, ClusterConfig::default());
    }

    #[test]
    fn env_then_cli_overrides() {
        let mut config = ClusterConfig::default();
        config.apply_env_overrides(Some("registry.env"), Some("one.example, two.example"));
        assert_eq!(config.registry.as_deref(), Some("registry.env"));
        assert_eq!(config.domains, vec!["one.example", "two.example"]);

        config.apply_env_overrides(Some("  "), Some(""));
        assert_eq!(config.registry.as_deref(), Some("registry.env"));
        assert_eq!(config.domains.len(), 2);

        config.apply_cli_overrides(Some("registry.cli".into()), vec!["cli.example".into()]);
        assert_eq!(config.registry.as_deref(), Some("registry.cli"));
        assert_eq!(config.domains, vec!["cli.example"]);

        config.apply_cli_overrides(None, Vec::new());
        assert_eq!(config.registry.as_deref(), Some("registry.cli"));
    }
}
