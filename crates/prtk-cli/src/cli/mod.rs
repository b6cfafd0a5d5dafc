mod commands;
mod helpers;

use clap::Parser;
use prtk_core::domain::TableError;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            let table_error = error.as_table_error();
            eprintln!("{}", table_error.diagnostic_line());
            if let Some(summary_line) = table_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            table_error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_tracing(&cli.log_level);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "prtk-table",
    version,
    about = "Converts processed ENDF tables into transport-simulator channel tables"
)]
struct Cli {
    /// Log filter used when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Build the channel tables of every material group in a project
    Run(commands::RunArgs),
    /// List the channel file stems in processing order
    Channels,
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Run(args) => commands::run_tables_command(args),
        CliCommand::Channels => commands::run_channels_command(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(TableError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_table_error(&self) -> TableError {
        match self {
            Self::Usage(message) => {
                TableError::input_validation("INPUT.CLI_USAGE", message.clone())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => TableError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
