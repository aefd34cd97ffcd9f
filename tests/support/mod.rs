#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn fixture(name: &str) -> PathBuf {
    repo_root().join("tests").join("fixtures").join(name)
}

pub fn helper_binary(name: &str) -> PathBuf {
    let path = match name {
        "json-completion" => env!("CARGO_BIN_EXE_json-completion"),
        "lain-validate" => env!("CARGO_BIN_EXE_lain-validate"),
        other => panic!("unknown helper binary {other}"),
    };
    PathBuf::from(path)
}

/// Command for a helper with the ambient lain config and overrides stripped,
/// so host settings cannot leak into assertions.
pub fn isolated_command(name: &str, cwd: &Path, config_dir: &Path) -> Command {
    let mut cmd = Command::new(helper_binary(name));
    cmd.current_dir(cwd)
        .env("LAINSCRIPT_CONFIG_DIR", config_dir)
        .env_remove("LAINSCRIPT_SCRIPT")
        .env_remove("LAIN_DOCKER_REGISTRY")
        .env_remove("LAIN_DOMAINS")
        .env_remove("RUST_LOG");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn run_command_expect_failure(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        bail!(
            "command {:?} unexpectedly succeeded\nstdout: {}",
            cmd,
            String::from_utf8_lossy(&output.stdout)
        );
    }
    Ok(output)
}
