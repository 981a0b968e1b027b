use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{self, Command};

use envparse::{EnvLoader, LoadReport, quote};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILE: &str = ".env";

const HELP: &str = "\
envparse - parse strict .env files

Usage:
  envparse run [OPTIONS] -- COMMAND [ARGS...]
  envparse run [OPTIONS] COMMAND [ARGS...]
  envparse check [FILE]
  envparse --help
  envparse --version

Commands:
  run       Load an env file and execute a command
  check     Validate an env file and print its normalized assignments
";

const RUN_HELP: &str = "\
envparse run - load an env file and execute a command

Usage:
  envparse run [OPTIONS] -- COMMAND [ARGS...]
  envparse run [OPTIONS] COMMAND [ARGS...]

Options:
  -f, --file <PATH>       Env file path. Defaults to .env.
  -i, --ignore-missing    Run the command even if the file does not exist.
  -o, --override          Override existing environment variables.
  -v, --verbose           Print loader diagnostics to stderr.
  -q, --quiet             Suppress loader diagnostics.
  -h, --help              Show this help text.
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum RunCommand {
    Help,
    Execute(RunOptions),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunOptions {
    file: PathBuf,
    required: bool,
    override_existing: bool,
    verbose: bool,
    quiet: bool,
    command: OsString,
    args: Vec<OsString>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_FILE),
            required: true,
            override_existing: false,
            verbose: false,
            quiet: false,
            command: OsString::new(),
            args: Vec::new(),
        }
    }
}

fn main() {
    process::exit(run(env::args_os()));
}

fn run(args: impl IntoIterator<Item = OsString>) -> i32 {
    let mut args = args.into_iter();
    let _bin = args.next();

    let Some(subcommand) = args.next() else {
        print_help();
        return 0;
    };

    let subcommand = subcommand.to_string_lossy();
    match subcommand.as_ref() {
        "-h" | "--help" | "help" => {
            print_help();
            0
        }
        "-V" | "--version" | "version" => {
            print_version();
            0
        }
        "run" => match parse_run_options(args.collect()) {
            Ok(RunCommand::Help) => {
                print_run_help();
                0
            }
            Ok(RunCommand::Execute(options)) => {
                init_tracing(options.verbose, options.quiet);
                match execute_run(options) {
                    Ok(code) => code,
                    Err(err) => {
                        eprintln!("envparse: {err}");
                        1
                    }
                }
            }
            Err(err) => {
                eprintln!("envparse: {err}");
                eprintln!("Try `envparse run --help`.");
                1
            }
        },
        "check" => {
            let file = match parse_check_args(args.collect()) {
                Ok(file) => file,
                Err(err) => {
                    eprintln!("envparse: {err}");
                    eprintln!("Try `envparse --help`.");
                    return 1;
                }
            };
            init_tracing(false, false);
            match execute_check(file) {
                Ok(()) => 0,
                Err(err) => {
                    eprintln!("envparse: {err}");
                    1
                }
            }
        }
        unknown => {
            eprintln!("envparse: unknown subcommand `{unknown}`");
            eprintln!("Try `envparse --help`.");
            1
        }
    }
}

/// Install a stderr subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let default_directive = match (verbose, quiet) {
        (_, true) => "off",
        (true, false) => "envparse=debug",
        (false, false) => "envparse=warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .try_init();
}

fn parse_run_options(args: Vec<OsString>) -> Result<RunCommand, String> {
    let mut options = RunOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        let token = args[index].to_string_lossy();
        match token.as_ref() {
            "--" => {
                index += 1;
                break;
            }
            "-h" | "--help" => return Ok(RunCommand::Help),
            "-f" | "--file" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    return Err("missing value for `-f/--file`".to_owned());
                };
                options.file = parse_file_value(&value.to_string_lossy())?;
                index += 1;
            }
            value if value.starts_with("--file=") => {
                options.file = parse_file_value(&value["--file=".len()..])?;
                index += 1;
            }
            "-i" | "--ignore-missing" => {
                options.required = false;
                index += 1;
            }
            "-o" | "--override" => {
                options.override_existing = true;
                index += 1;
            }
            "-v" | "--verbose" => {
                options.verbose = true;
                index += 1;
            }
            "-q" | "--quiet" => {
                options.quiet = true;
                index += 1;
            }
            unknown if unknown.starts_with('-') => {
                return Err(format!("unknown option `{unknown}`"));
            }
            _ => break,
        }
    }

    let remaining = &args[index..];
    let Some((command, command_args)) = remaining.split_first() else {
        return Err("missing command after `run`".to_owned());
    };

    options.command = command.clone();
    options.args = command_args.to_vec();
    Ok(RunCommand::Execute(options))
}

fn parse_check_args(args: Vec<OsString>) -> Result<PathBuf, String> {
    let mut args = args.into_iter();
    let file = args
        .next()
        .map_or_else(|| PathBuf::from(DEFAULT_FILE), PathBuf::from);
    if let Some(extra) = args.next() {
        return Err(format!(
            "unexpected argument `{}` after `check`",
            extra.to_string_lossy()
        ));
    }
    Ok(file)
}

fn parse_file_value(raw: &str) -> Result<PathBuf, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("`-f/--file` requires a path".to_owned());
    }
    Ok(PathBuf::from(trimmed))
}

fn execute_run(options: RunOptions) -> Result<i32, String> {
    let entries = EnvLoader::new()
        .path(&options.file)
        .required(options.required)
        .parse_only()
        .map_err(|err| format!("{}: {err}", options.file.display()))?;

    let mut command = Command::new(&options.command);
    command.args(&options.args);

    let mut report = LoadReport::default();
    for (key, value) in entries {
        if !options.override_existing && env::var_os(&key).is_some() {
            report.skipped_existing += 1;
            debug!(key = %key, "skipping existing key");
            continue;
        }
        command.env(key, value);
        report.loaded += 1;
    }
    debug!(
        path = %options.file.display(),
        loaded = report.loaded,
        skipped = report.skipped_existing,
        "prepared command environment"
    );

    execute_command(command, &options.command)
}

fn execute_check(file: PathBuf) -> Result<(), String> {
    let entries = EnvLoader::new()
        .path(&file)
        .parse_only()
        .map_err(|err| format!("{}: {err}", file.display()))?;

    let sorted: BTreeMap<_, _> = entries.into_iter().collect();
    for (key, value) in &sorted {
        println!("{key}={}", quote(value));
    }
    Ok(())
}

#[cfg(unix)]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let err = command.exec();
    Err(format!(
        "failed to execute `{}`: {err}",
        program.to_string_lossy()
    ))
}

#[cfg(not(unix))]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let status = command
        .status()
        .map_err(|err| format!("failed to execute `{}`: {err}", program.to_string_lossy()))?;
    Ok(status.code().unwrap_or(1))
}

fn print_help() {
    println!("{HELP}");
}

fn print_run_help() {
    println!("{RUN_HELP}");
}

fn print_version() {
    println!("envparse {}", env!("CARGO_PKG_VERSION"));
}
