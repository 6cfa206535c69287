mod commands;

use adf04_core::Adf04Error;
use clap::Parser;

pub fn run_from_env() -> i32 {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();
    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_adf04_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            diagnostic.exit_code()
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch(cli.command),
        Err(error) => match error.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{error}");
                Ok(0)
            }
            _ => Err(CliError::Usage(error.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "adf04-rs", about = "ADF04 atomic data file toolkit")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Parse a file and write it back out unchanged
    Roundtrip(commands::RoundtripArgs),
    /// Renumber energy levels through a permutation file
    Reorder(commands::ReorderArgs),
    /// Merge a value column from an overlay file into a base file
    Merge(commands::MergeArgs),
    /// Compare document A-values against a reference dataset
    Compare(commands::CompareArgs),
    /// Substitute reference A-values into the document's A column
    Substitute(commands::SubstituteArgs),
    /// Number levels by their term composite
    TermGroups(commands::TermGroupsArgs),
}

fn dispatch(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Roundtrip(args) => commands::run_roundtrip(args),
        CliCommand::Reorder(args) => commands::run_reorder(args),
        CliCommand::Merge(args) => commands::run_merge(args),
        CliCommand::Compare(args) => commands::run_compare(args),
        CliCommand::Substitute(args) => commands::run_substitute(args),
        CliCommand::TermGroups(args) => commands::run_term_groups(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Core(#[from] Adf04Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_adf04_error(&self) -> Adf04Error {
        match self {
            Self::Usage(message) => Adf04Error::usage("USAGE.CLI", message.clone()),
            Self::Core(error) => error.clone(),
            Self::Internal(error) => Adf04Error::io("IO.CLI", format!("{error:#}")),
        }
    }
}
