//! Shared library for the lainscript tools.
//!
//! The crate hosts a Lua interpreter that runs a completion script over a lain
//! app config and hands the script's result table back as JSON. Public
//! functions here form the contract the binaries depend on: repository
//! discovery, completion script resolution, and the one-shot
//! [`complete_json`] call.

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod config;
pub mod convert;
pub mod engine;
pub mod host_api;
pub mod render;
pub mod runtime;
pub mod validation;

pub use config::ClusterConfig;
pub use engine::{CompletionMap, ScriptEngine, complete_json};
pub use render::{OutputFormat, render, select};
pub use runtime::{ScriptSource, resolve_completion_script};
pub use validation::{LainSchema, validate_file};

/// File name the completion script is looked up under.
pub const COMPLETION_SCRIPT_NAME: &str = "jsonCompletion.lua";

/// Completion script compiled into the binaries, used when no file is found.
pub const BUNDLED_COMPLETION_SCRIPT: &str = include_str!("../scripts/jsonCompletion.lua");

const ROOT_SENTINEL: &str = "scripts/jsonCompletion.lua";
const MANIFEST: &str = "Cargo.toml";

/// The three values a completion script receives as globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionParams {
    /// Bound to `fileName`: the JSON document the script reads.
    pub file_name: String,
    /// Bound to `repo_name`.
    pub repo_name: String,
    /// Bound to `meta_version`.
    pub meta_version: String,
}

impl CompletionParams {
    pub fn new(
        file_name: impl Into<String>,
        repo_name: impl Into<String>,
        meta_version: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            repo_name: repo_name.into(),
            meta_version: meta_version.into(),
        }
    }
}

/// A checkout root carries both the manifest and `scripts/jsonCompletion.lua`.
fn is_repo_root(candidate: &Path) -> bool {
    candidate.join(ROOT_SENTINEL).is_file() && candidate.join(MANIFEST).is_file()
}

/// `LAINSCRIPT_ROOT` or the build hint, accepted only when it is a checkout root.
fn repo_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !hint_path.exists() || !is_repo_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

// target/{debug,release} binaries sit below the checkout they were built from.
fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_repo_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the checkout whose `scripts/jsonCompletion.lua` should be preferred
/// over the copy compiled into the binary.
///
/// Order: `LAINSCRIPT_ROOT`, the directories above the running executable, the
/// `LAINSCRIPT_ROOT_HINT` baked in by `build.rs`. An installed binary whose
/// build checkout is gone finds nothing here, and
/// [`resolve_completion_script`] then falls back to the bundled script.
pub fn find_repo_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var("LAINSCRIPT_ROOT") {
        if let Some(root) = repo_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("LAINSCRIPT_ROOT_HINT") {
        if let Some(root) = repo_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!("no lainscript checkout found (LAINSCRIPT_ROOT unset or invalid, no build hint)");
}

/// Split comma- or whitespace-delimited configuration lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
