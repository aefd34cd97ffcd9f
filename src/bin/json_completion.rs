//! One-shot completion CLI.
//!
//! Binds `--file`, `--repo` and `--meta-version` as the Lua globals
//! `fileName`, `repo_name` and `meta_version`, runs the completion script, and
//! prints the table it returns as JSON. With `--validate` the input is checked
//! against the lain config schema before the script runs. Errors are printed
//! to stdout as `Error: ...` and the process exits 1.

use anyhow::{Result, anyhow, bail};
use lainscript::{
    ClusterConfig, CompletionParams, LainSchema, OutputFormat, complete_json, render,
    resolve_completion_script, select, validate_file,
};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        println!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;

    if args.validate {
        let schema = LainSchema::load(args.schema.as_deref())?;
        let errors = validate_file(&schema, &args.file)?;
        if !errors.is_empty() {
            bail!(
                "{} failed lain schema validation:\n{}",
                args.file.display(),
                errors.join("\n")
            );
        }
        log::info!("{} passed schema validation", args.file.display());
    }

    let source = resolve_completion_script(args.script.as_deref())?;
    let mut cluster = ClusterConfig::from_environment();
    cluster.apply_cli_overrides(args.registry, args.domains);

    let params = CompletionParams::new(
        args.file.display().to_string(),
        args.repo_name,
        args.meta_version,
    );
    let result = complete_json(&params, &cluster, &source)?;
    let selected = select(&result, &args.pointer)?;
    println!("{}", render(&selected, args.format)?);
    Ok(())
}

struct CliArgs {
    file: PathBuf,
    repo_name: String,
    meta_version: String,
    script: Option<PathBuf>,
    validate: bool,
    schema: Option<PathBuf>,
    format: OutputFormat,
    pointer: String,
    registry: Option<String>,
    domains: Vec<String>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        Self::parse_from(env::args_os().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut args = args.into_iter();
        let mut file: Option<PathBuf> = None;
        let mut repo_name: Option<String> = None;
        let mut meta_version: Option<String> = None;
        let mut script: Option<PathBuf> = None;
        let mut validate = false;
        let mut schema: Option<PathBuf> = None;
        let mut format = OutputFormat::default();
        let mut pointer = String::new();
        let mut registry: Option<String> = None;
        let mut domains = Vec::new();

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow!("argument is not valid UTF-8"))?;
            match arg.as_str() {
                "--file" => file = Some(PathBuf::from(next_value(&mut args, "--file")?)),
                "--repo" => repo_name = Some(next_value(&mut args, "--repo")?),
                "--meta-version" => meta_version = Some(next_value(&mut args, "--meta-version")?),
                "--script" => script = Some(PathBuf::from(next_value(&mut args, "--script")?)),
                "--validate" => validate = true,
                "--schema" => schema = Some(PathBuf::from(next_value(&mut args, "--schema")?)),
                "--format" => format = next_value(&mut args, "--format")?.parse()?,
                "--pointer" => {
                    let raw = next_value(&mut args, "--pointer")?;
                    if !raw.is_empty() && !raw.starts_with('/') {
                        bail!("--pointer must be empty (root) or start with '/'");
                    }
                    pointer = raw;
                }
                "--registry" => registry = Some(next_value(&mut args, "--registry")?),
                "--domain" => domains.push(next_value(&mut args, "--domain")?),
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n{}", usage()),
            }
        }

        let file = file.ok_or_else(|| anyhow!("--file is required\n{}", usage()))?;
        let repo_name = repo_name.ok_or_else(|| anyhow!("--repo is required\n{}", usage()))?;
        let meta_version =
            meta_version.ok_or_else(|| anyhow!("--meta-version is required\n{}", usage()))?;
        if schema.is_some() && !validate {
            bail!("--schema only applies together with --validate");
        }

        Ok(CliArgs {
            file,
            repo_name,
            meta_version,
            script,
            validate,
            schema,
            format,
            pointer,
            registry,
            domains,
        })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: json-completion --file PATH --repo NAME --meta-version VERSION [--script PATH]\n\
\x20      [--validate [--schema PATH]] [--format pretty|compact|lines] [--pointer /json/pointer]\n\
\x20      [--registry HOST] [--domain DOMAIN]...\n\
Runs the Lua completion script (default: ./jsonCompletion.lua, then the repo's scripts/, then the bundled copy)\n\
with fileName, repo_name and meta_version bound as globals, and prints the table it returns.\n"
}
