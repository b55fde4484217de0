use std::path::PathBuf;

use anyhow::{bail, Result};
use fixer_logging::{fixer_info, fixer_warn};
use log::LevelFilter;

use crate::platform::{app, config};

#[derive(Debug, Default, PartialEq, Eq)]
struct GlobalOptions {
    config: Option<PathBuf>,
    server: Option<String>,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum CliCommand {
    Fix {
        workflow: PathBuf,
        output: Option<PathBuf>,
    },
    Active,
    Help,
    Version,
}

pub async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (global, command) = parse_args(&args)?;

    match command {
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::Version => {
            println!("model-path-fixer {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliCommand::Fix { workflow, output } => {
            let config = prepare(&global);
            app::fix_workflow(&config, &workflow, output).await
        }
        CliCommand::Active => {
            let config = prepare(&global);
            app::list_active(&config).await
        }
    }
}

/// Loads the config, applies overrides and starts logging.
fn prepare(global: &GlobalOptions) -> config::FixerConfig {
    let (mut config, error) = config::load_config(global.config.as_deref());
    if let Some(server) = &global.server {
        config.server_url = server.clone();
    }
    let level = if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    fixer_logging::initialize(config.log_destination, level);
    if let Some(error) = error {
        fixer_warn!("{}; using defaults", error);
    }
    fixer_info!("Using server {}", config.server_url);
    config
}

fn parse_args(args: &[String]) -> Result<(GlobalOptions, CliCommand)> {
    let mut global = GlobalOptions::default();
    let mut tokens = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--config=") {
            global.config = Some(PathBuf::from(value));
            continue;
        }
        if let Some(value) = arg.strip_prefix("--server=") {
            global.server = Some(value.to_string());
            continue;
        }
        match arg.as_str() {
            "--config" | "-c" => match iter.next() {
                Some(value) => global.config = Some(PathBuf::from(value)),
                None => bail!("--config requires a path"),
            },
            "--server" | "-s" => match iter.next() {
                Some(value) => global.server = Some(value.clone()),
                None => bail!("--server requires a url"),
            },
            "--verbose" | "-v" => global.verbose = true,
            _ => tokens.push(arg.as_str()),
        }
    }

    let command = match tokens.as_slice() {
        [] | ["help" | "--help" | "-h", ..] => CliCommand::Help,
        ["version" | "--version" | "-V"] => CliCommand::Version,
        ["active"] => CliCommand::Active,
        ["fix", rest @ ..] => parse_fix(rest)?,
        [other, ..] => bail!("unknown command '{other}', try --help"),
    };
    Ok((global, command))
}

fn parse_fix(args: &[&str]) -> Result<CliCommand> {
    let mut workflow = None;
    let mut output = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(value) = arg.strip_prefix("--output=") {
            output = Some(PathBuf::from(value));
            continue;
        }
        match *arg {
            "--output" | "-o" => match iter.next() {
                Some(value) => output = Some(PathBuf::from(value)),
                None => bail!("--output requires a path"),
            },
            path if workflow.is_none() => workflow = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument '{extra}'"),
        }
    }
    match workflow {
        Some(workflow) => Ok(CliCommand::Fix { workflow, output }),
        None => bail!("fix requires a workflow file"),
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "\
model-path-fixer {version}
Repairs broken model paths in a workflow file using a running path fixer server.

Usage:
  model-path-fixer [options] fix <workflow.json> [--output <path>]
  model-path-fixer [options] active

Options:
  -c, --config <path>   settings file (default {config})
  -s, --server <url>    server base url, overrides the settings file
  -v, --verbose         debug logging

Workflow format:
  Nodes must list their inputs as named widgets:
    {{\"nodes\": [{{\"id\": 3, \"widgets\": [{{\"name\": \"ckpt_name\", \"value\": \"...\"}}]}}]}}
  Positional \"widgets_values\" arrays, as in an editor export, are not read;
  such nodes are kept unchanged and never fixed. Other fields are written back as-is.",
        version = env!("CARGO_PKG_VERSION"),
        config = config::DEFAULT_CONFIG_FILE,
    )
}
