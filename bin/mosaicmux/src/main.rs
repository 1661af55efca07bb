//! mosaicmux - run multiplexer commands through a command queue
//!
//! Sources command files on a client-less queue, then runs `-e` commands for
//! a simulated client and prints what that client would have received.

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use tracing::{debug, error, info, warn};

use mosaicmux::models::{Client, ClientFlags, ClientHandle};
use mosaicmux::{
    builtin_table, load_config, source_file, CauseSink, CmdQueue, CommandTable, Config,
    QueueStatus,
};

/// Command line options
#[derive(Debug, Default)]
struct AppArgs {
    /// Configuration file path
    config_path: Option<PathBuf>,
    /// Enable debug logging
    debug: bool,
    /// Run commands for a control-mode client
    control: bool,
    /// Command files to source before anything else
    files: Vec<PathBuf>,
    /// Command lines to run for the client, in order
    commands: Vec<String>,
}

impl AppArgs {
    /// Parse command line arguments
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut app_args = AppArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => match args.next() {
                    Some(path) => app_args.config_path = Some(PathBuf::from(path)),
                    None => bail!("Missing config file path"),
                },
                "--debug" | "-d" => {
                    app_args.debug = true;
                }
                "--control" | "-C" => {
                    app_args.control = true;
                }
                "--file" | "-f" => match args.next() {
                    Some(path) => app_args.files.push(PathBuf::from(path)),
                    None => bail!("Missing command file path"),
                },
                "--execute" | "-e" => match args.next() {
                    Some(command) => app_args.commands.push(command),
                    None => bail!("Missing command"),
                },
                "--help" | "-h" => {
                    print_help();
                    process::exit(0);
                }
                "--version" | "-V" => {
                    println!("mosaicmux v{}", mosaicmux::VERSION);
                    process::exit(0);
                }
                arg if arg.starts_with('-') => {
                    bail!("Unknown option: {}", arg);
                }
                _ => {
                    // Bare words are treated as one more command line
                    app_args.commands.push(arg);
                }
            }
        }

        Ok(app_args)
    }
}

/// Print help information
fn print_help() {
    println!("mosaicmux - run multiplexer commands through a command queue");
    println!();
    println!("USAGE:");
    println!("    mosaicmux [OPTIONS] [COMMAND ...]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <PATH>      Path to configuration file");
    println!("    -d, --debug              Enable debug logging");
    println!("    -C, --control            Run commands for a control-mode client");
    println!("    -f, --file <PATH>        Source a command file (repeatable)");
    println!("    -e, --execute <COMMAND>  Run a command line (repeatable)");
    println!("    -h, --help               Print this help message");
    println!("    -V, --version            Print version information");
    println!();
    println!("COMMANDS:");
    let table = builtin_table();
    for entry in table.entries() {
        match &entry.alias {
            Some(alias) => println!("    {} ({}) {}", entry.name, alias, entry.usage),
            None => println!("    {} {}", entry.name, entry.usage),
        }
    }
    println!();
    println!("ENVIRONMENT:");
    println!("    MOSAICMUX_CONFIG       Path to configuration file");
    println!("    MOSAICMUX_DEBUG        Enable debug logging (1 or true)");
    println!("    RUST_LOG               Set logging level (error, warn, info, debug, trace)");
}

fn init_logging(args: &AppArgs, config: &Config) {
    let debug_env = env::var("MOSAICMUX_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let log_level = if args.debug || debug_env {
        "debug".to_string()
    } else {
        config.logging.level.to_lowercase()
    };

    let env_filter = env::var("RUST_LOG").unwrap_or(log_level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);
    if config.logging.compact {
        builder.compact().init();
    } else {
        builder.init();
    }
}

/// Run a queue until nothing is left waiting
fn drain(cmdq: &CmdQueue, mut status: Option<QueueStatus>) {
    while status == Some(QueueStatus::Waiting) {
        debug!(cmdq = %cmdq.id(), "resuming waiting queue");
        status = Some(cmdq.continue_processing());
    }
}

/// Source every command file on a client-less queue
fn source_files(args: &AppArgs, table: &CommandTable, causes: &CauseSink) -> Result<()> {
    if args.files.is_empty() {
        return Ok(());
    }

    let cmdq = CmdQueue::new(None, causes.clone());
    for path in &args.files {
        let queued = source_file(path, table, &cmdq)
            .with_context(|| format!("Failed to source {}", path.display()))?;
        info!("Queued {} command lists from {}", queued, path.display());
    }
    let status = cmdq.continue_processing();
    drain(&cmdq, Some(status));
    cmdq.release();
    Ok(())
}

/// Run each command line for the client
fn run_commands(args: &AppArgs, table: &CommandTable, client: &ClientHandle, causes: &CauseSink) {
    let cmdq = CmdQueue::new(Some(client.clone()), causes.clone());
    let flags = if args.control {
        mosaicmux::models::CommandFlags::CONTROL
    } else {
        mosaicmux::models::CommandFlags::NONE
    };

    for line in &args.commands {
        match table.parse_with_flags(line, None, 0, flags) {
            Ok(list) => {
                let status = cmdq.run(&list, None);
                drain(&cmdq, status);
            }
            Err(e) => {
                warn!("Failed to parse '{}': {}", line, e);
                cmdq.error(&e.to_string());
            }
        }
    }

    if cmdq.release() != mosaicmux::ReleaseStatus::Destroyed {
        warn!(cmdq = %cmdq.id(), "client queue still referenced at exit");
    }
}

fn run(args: &AppArgs) -> Result<i32> {
    let config = load_config(args.config_path.as_deref())?;
    init_logging(args, &config);
    info!("Starting mosaicmux v{}", mosaicmux::VERSION);

    let table = builtin_table();
    let causes = CauseSink::new();
    source_files(args, &table, &causes)?;

    let mut flags = config.client.flags();
    if args.control {
        flags.insert(ClientFlags::CONTROL);
    }
    let client = Client::new(config.client.name.clone())
        .with_flags(flags)
        .into_handle();
    run_commands(args, &table, &client, &causes);

    let mut c = client.borrow_mut();
    let stdout = c.take_stdout();
    let stderr = c.take_stderr();
    io::stdout().write_all(stdout.as_bytes())?;
    let mut err_out = io::stderr();
    err_out.write_all(stderr.as_bytes())?;

    let causes = causes.take();
    for cause in &causes {
        writeln!(err_out, "{}", cause)?;
    }
    if let Some(message) = c.message() {
        writeln!(err_out, "{}", message)?;
    }
    if c.should_exit() {
        debug!(client = %c.name, "client asked to exit");
    }

    let mut code = c.retval;
    if code == 0 && !causes.is_empty() {
        code = 1;
    }
    Ok(code)
}

fn main() {
    let args = AppArgs::parse().unwrap_or_else(|e| {
        eprintln!("mosaicmux: {}", e);
        print_help();
        process::exit(1);
    });

    match run(&args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("mosaicmux: {:#}", e);
            process::exit(1);
        }
    }
}
