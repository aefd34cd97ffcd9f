//! Completion script resolution shared across binaries.
//!
//! Centralizes where a completion script is looked up so every CLI follows the
//! same search order instead of re-implementing it.

use anyhow::{Context, Result, bail};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{BUNDLED_COMPLETION_SCRIPT, COMPLETION_SCRIPT_NAME, find_repo_root};

/// Where a completion script comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    File(PathBuf),
    Bundled,
}

impl ScriptSource {
    /// Chunk name reported by Lua in error messages and tracebacks.
    pub fn chunk_name(&self) -> String {
        match self {
            ScriptSource::File(path) => format!("@{}", path.display()),
            ScriptSource::Bundled => format!("@<bundled>/{COMPLETION_SCRIPT_NAME}"),
        }
    }

    pub fn read(&self) -> Result<String> {
        match self {
            ScriptSource::File(path) => {
                if !path.is_file() {
                    bail!("completion script not found: {}", path.display());
                }
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
            }
            ScriptSource::Bundled => Ok(BUNDLED_COMPLETION_SCRIPT.to_string()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ScriptSource::File(path) => path.display().to_string(),
            ScriptSource::Bundled => format!("bundled {COMPLETION_SCRIPT_NAME}"),
        }
    }
}

/// Script override taken from `LAINSCRIPT_SCRIPT`, if set and non-empty.
pub fn script_override_from_env() -> Option<PathBuf> {
    env::var_os("LAINSCRIPT_SCRIPT")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// File candidates in search order: working directory first, then the repo's
/// `scripts/` directory.
pub fn script_candidates(cwd: Option<&Path>, repo_root: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = cwd {
        candidates.push(dir.join(COMPLETION_SCRIPT_NAME));
    }
    if let Some(root) = repo_root {
        candidates.push(root.join("scripts").join(COMPLETION_SCRIPT_NAME));
    }
    candidates
}

/// Resolve the completion script.
///
/// An explicit path or `LAINSCRIPT_SCRIPT` must exist; otherwise the first
/// existing file candidate wins and the bundled copy is the last resort.
pub fn resolve_completion_script(explicit: Option<&Path>) -> Result<ScriptSource> {
    if let Some(path) = explicit {
        if !path.is_file() {
            bail!("completion script not found: {}", path.display());
        }
        return Ok(ScriptSource::File(path.to_path_buf()));
    }

    if let Some(path) = script_override_from_env() {
        if !path.is_file() {
            bail!(
                "LAINSCRIPT_SCRIPT points at a missing file: {}",
                path.display()
            );
        }
        return Ok(ScriptSource::File(path));
    }

    let cwd = env::current_dir().ok();
    let repo_root = find_repo_root().ok();
    for candidate in script_candidates(cwd.as_deref(), repo_root.as_deref()) {
        if candidate.is_file() {
            log::debug!("using completion script {}", candidate.display());
            return Ok(ScriptSource::File(candidate));
        }
    }

    log::debug!("no completion script on disk; falling back to the bundled copy");
    Ok(ScriptSource::Bundled)
}
