// File: src/main.rs
//
// Command-line entry point for P-Logo.
// Handles argument parsing and dispatches to the appropriate subcommand
// (run, check, or repl).

use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use plogo::config::Config;
use plogo::repl::Repl;
use plogo::vm::Machine;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(ClapParser)]
#[command(
    name = "plogo",
    about = "P-Logo: a tiny language for turtle graphics",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Run a script on a fresh machine and print the result
    Run {
        /// Path to the script
        file: PathBuf,

        /// TOML config with viewport size, start pose and log filter
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the final machine snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Lex and parse a script without running it
    Check {
        /// Path to the script
        file: PathBuf,
    },

    /// Launch the interactive REPL
    Repl {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, config, json } => {
            let Some(config) = load_config(config.as_deref()) else {
                return ExitCode::FAILURE;
            };
            init_tracing(&config.log.filter);
            run_file(&file, &config, json)
        }

        Commands::Check { file } => {
            init_tracing(&Config::default().log.filter);
            check_file(&file)
        }

        Commands::Repl { config } => {
            let Some(config) = load_config(config.as_deref()) else {
                return ExitCode::FAILURE;
            };
            init_tracing(&config.log.filter);

            let machine = new_machine(&config);
            match Repl::new(machine).and_then(|mut repl| repl.run()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the configured filter
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
        .with(filter)
        .init();
}

fn load_config(path: Option<&Path>) -> Option<Config> {
    match path {
        None => Some(Config::default()),
        Some(path) => match Config::load(path) {
            Ok(config) => Some(config),
            Err(err) => {
                eprintln!("{} {}", "Error:".bright_red(), err);
                None
            }
        },
    }
}

fn new_machine(config: &Config) -> Machine {
    Machine::with_origin(Box::new(config.viewport()), config.start_pose())
}

fn read_source(file: &Path) -> Option<String> {
    match fs::read_to_string(file) {
        Ok(source) => Some(source),
        Err(err) => {
            eprintln!("{} cannot read {}: {}", "Error:".bright_red(), file.display(), err);
            None
        }
    }
}

fn run_file(file: &Path, config: &Config, json: bool) -> ExitCode {
    let Some(source) = read_source(file) else {
        return ExitCode::FAILURE;
    };

    let mut machine = new_machine(config);
    let result = plogo::compile_and_run(&source, &mut machine);

    if json {
        match serde_json::to_string_pretty(&machine.snapshot()) {
            Ok(text) => println!("{}", text),
            Err(err) => eprintln!("{} {}", "Error:".bright_red(), err),
        }
    } else {
        for message in machine.messages() {
            println!("{}", message);
        }
        let pose = machine.pose();
        println!(
            "{} x = {:.2}, y = {:.2}, angle = {:.2}, {} segment(s)",
            "pose:".bright_cyan(),
            pose.x,
            pose.y,
            pose.angle,
            machine.history().len()
        );
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn check_file(file: &Path) -> ExitCode {
    let Some(source) = read_source(file) else {
        return ExitCode::FAILURE;
    };

    match plogo::parser::parse_source(&source) {
        Ok(program) => {
            println!(
                "{} {}: {} statement(s)",
                "ok".bright_green(),
                file.display(),
                program.statements.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
