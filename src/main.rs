//! taskdeps CLI entry point

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use taskdeps::{App, OutputFormat, Query, Settings, SettingsLayer};

/// List the source files a task depends on
#[derive(Debug, Parser)]
#[command(name = "taskdeps", version, about)]
struct Cli {
    /// Graph document (YAML)
    graph: PathBuf,

    /// Task plug to query, e.g. `n1.task`
    #[arg(short, long)]
    task: String,

    /// Frames to evaluate, e.g. `1-10`, `1-10x2`, `1,5,9`
    #[arg(short, long)]
    frames: Option<String>,

    /// Variable binding `name=value` (repeatable)
    #[arg(short = 'v', long = "var", value_parser = parse_key_val)]
    vars: Vec<(String, String)>,

    /// Print declared file names without substitution
    #[arg(long, conflicts_with = "check")]
    raw: bool,

    /// Also list upstream nodes
    #[arg(long)]
    nodes: bool,

    /// Report files missing on disk and exit with status 1 if any are
    #[arg(long)]
    check: bool,

    /// Fail on undefined variables
    #[arg(long)]
    strict: bool,

    /// Plug name that holds a file path (repeatable, replaces the configured set)
    #[arg(long = "file-plug")]
    file_plugs: Vec<String>,

    /// Ignore the global config file
    #[arg(long)]
    no_config: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("taskdeps v{}", env!("CARGO_PKG_VERSION"));

    let overrides = SettingsLayer {
        file_plug_names: (!cli.file_plugs.is_empty()).then(|| cli.file_plugs.clone()),
        strict_substitution: cli.strict.then_some(true),
        frames: None,
    };
    let global = if cli.no_config {
        None
    } else {
        Settings::global_path()
    };
    let app = App::load(&cli.graph, &overrides, global.as_deref())?;

    let query = Query {
        task: cli.task,
        frames: cli.frames,
        variables: cli.vars,
        raw: cli.raw,
        list_nodes: cli.nodes,
        check: cli.check,
    };
    let report = app.run(&query)?;
    print!("{}", report.render(cli.format)?);

    if report.has_missing() {
        std::process::exit(1);
    }
    Ok(())
}
