//! JSON Schema validation of lain app configs.
//!
//! The bundled schema mirrors the lain.yaml contract (appname, build, procs
//! keyed `web`, `worker.x`, `proc.x`, `portal.x`, `service.x`, ...). Callers
//! may point at a different schema file; either way every violation is
//! collected rather than stopping at the first.

use anyhow::{Context, Result, anyhow};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::fs::{self, File};
use std::path::Path;

pub const BUNDLED_LAIN_SCHEMA: &str = include_str!("../schemas/lain_conf.schema.json");

pub struct LainSchema {
    compiled: JSONSchema,
}

impl LainSchema {
    pub fn bundled() -> Result<Self> {
        let schema: Value =
            serde_json::from_str(BUNDLED_LAIN_SCHEMA).context("parsing bundled lain schema")?;
        Self::compile(&schema, "bundled lain schema")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let schema: Value = serde_json::from_reader(
            File::open(path).with_context(|| format!("opening schema {}", path.display()))?,
        )
        .with_context(|| format!("parsing schema {}", path.display()))?;
        Self::compile(&schema, &path.display().to_string())
    }

    /// Explicit schema file when given, bundled schema otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::bundled(),
        }
    }

    fn compile(schema: &Value, label: &str) -> Result<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(schema)
            .map_err(|err| anyhow!("compiling {label}: {err}"))?;
        Ok(Self { compiled })
    }

    /// Every violation as `<instance pointer>: <message>`; empty when valid.
    pub fn validate(&self, instance: &Value) -> Vec<String> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let pointer = err.instance_path.to_string();
                    let pointer = if pointer.is_empty() { "/".to_string() } else { pointer };
                    format!("{pointer}: {err}")
                })
                .collect(),
        }
    }
}

/// Read a JSON file and validate it.
pub fn validate_file(schema: &LainSchema, path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&data).with_context(|| format!("invalid JSON in {}", path.display()))?;
    Ok(schema.validate(&value))
}
