//! Validate lain app configs (JSON form) against the lain schema.
//!
//! Prints `ok: FILE` for each valid file and one line per violation
//! otherwise. Exits 1 when any file fails.

use anyhow::{Result, anyhow, bail};
use lainscript::{LainSchema, validate_file};
use std::env;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let (schema_path, files) = parse_args()?;
    let schema = LainSchema::load(schema_path.as_deref())?;

    let mut all_valid = true;
    for file in files {
        let errors = validate_file(&schema, &file)?;
        if errors.is_empty() {
            println!("ok: {}", file.display());
            continue;
        }
        all_valid = false;
        for error in errors {
            println!("{}: {error}", file.display());
        }
    }
    Ok(all_valid)
}

fn parse_args() -> Result<(Option<PathBuf>, Vec<PathBuf>)> {
    let mut args = env::args_os().skip(1);
    let mut schema = None;
    let mut files = Vec::new();

    while let Some(arg_os) = args.next() {
        let arg = arg_os
            .into_string()
            .map_err(|_| anyhow!("argument is not valid UTF-8"))?;
        match arg.as_str() {
            "--schema" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --schema"))?;
                schema = Some(PathBuf::from(value));
            }
            "--help" | "-h" => {
                print!("{}", usage());
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("unknown flag: {flag}\n{}", usage()),
            path => files.push(PathBuf::from(path)),
        }
    }

    if files.is_empty() {
        bail!("no input files\n{}", usage());
    }
    Ok((schema, files))
}

fn usage() -> &'static str {
    "Usage: lain-validate [--schema PATH] FILE...\n\
Validates lain app configs (JSON) against the bundled lain schema or PATH.\n"
}
