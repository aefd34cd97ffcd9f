//! Lua state lifecycle and the one-shot completion call.
//!
//! A `ScriptEngine` owns one Lua state for the duration of a single run. The
//! parameters become globals, the script runs once, and its last return value
//! is copied out as a string-keyed map. Dropping the engine closes the state.

use anyhow::{Context, Result, anyhow, bail};
use mlua::{Lua, MultiValue, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

use crate::convert::{json_to_lua, table_to_map};
use crate::{ClusterConfig, CompletionParams, ScriptSource, host_api};

/// Result table of a completion script.
pub type CompletionMap = BTreeMap<String, JsonValue>;

pub struct ScriptEngine {
    lua: Lua,
}

impl ScriptEngine {
    /// Fresh Lua 5.4 state with the safe standard libraries and the host API.
    pub fn new() -> Result<Self> {
        let lua = Lua::new();
        host_api::register(&lua)
            .map_err(lua_error)
            .context("registering host API")?;
        Ok(Self { lua })
    }

    pub fn lua(&self) -> &Lua {
        &self.lua
    }

    /// Bind `fileName`, `repo_name` and `meta_version`.
    pub fn register_params(&self, params: &CompletionParams) -> Result<()> {
        let globals = self.lua.globals();
        for (name, value) in [
            ("fileName", params.file_name.as_str()),
            ("repo_name", params.repo_name.as_str()),
            ("meta_version", params.meta_version.as_str()),
        ] {
            globals
                .set(name, value)
                .map_err(lua_error)
                .with_context(|| format!("setting global {name}"))?;
        }
        Ok(())
    }

    /// Bind `registry` (string or nil) and `domains` (array of strings).
    pub fn register_cluster(&self, cluster: &ClusterConfig) -> Result<()> {
        let globals = self.lua.globals();
        globals
            .set("registry", cluster.registry.as_deref())
            .map_err(lua_error)
            .context("setting global registry")?;
        let domains = json_to_lua(&self.lua, &JsonValue::from(cluster.domains.clone()))
            .map_err(lua_error)?;
        globals
            .set("domains", domains)
            .map_err(lua_error)
            .context("setting global domains")?;
        Ok(())
    }

    pub fn run(&self, source: &ScriptSource) -> Result<CompletionMap> {
        let text = source.read()?;
        self.run_chunk(&source.chunk_name(), &text)
            .with_context(|| format!("running {}", source.describe()))
    }

    /// Execute `text` and convert the last value it returns.
    pub fn run_chunk(&self, name: &str, text: &str) -> Result<CompletionMap> {
        let results: MultiValue = self
            .lua
            .load(text)
            .set_name(name)
            .eval()
            .map_err(lua_error)?;

        match results.into_iter().last().unwrap_or(Value::Nil) {
            Value::Table(table) => table_to_map(&self.lua, &table)
                .map_err(lua_error)
                .context("copying result table"),
            other => bail!("script returned {}, expected a table", other.type_name()),
        }
    }
}

/// Run one completion: fresh state, globals, script, result copy.
pub fn complete_json(
    params: &CompletionParams,
    cluster: &ClusterConfig,
    source: &ScriptSource,
) -> Result<CompletionMap> {
    log::debug!(
        "completing {} (repo {}, meta version {}) with {}",
        params.file_name,
        params.repo_name,
        params.meta_version,
        source.describe()
    );
    let engine = ScriptEngine::new()?;
    engine.register_params(params)?;
    engine.register_cluster(cluster)?;
    engine.run(source)
}

// mlua errors keep Lua tracebacks in their Display form.
fn lua_error(err: mlua::Error) -> anyhow::Error {
    anyhow!("{err}")
}
