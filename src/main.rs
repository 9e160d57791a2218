//! paprika2notion CLI entry point.

use clap::Parser;
use p2n::cli::commands;
use p2n::cli::{Cli, Commands};
use p2n::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    if let Err(e) = init_tracing(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::from(e.exit_code());
    }

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<(), Error> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter, Layer};

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let level = if std::env::var("RUST_LOG").is_ok() {
        None
    } else {
        Some(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug,reqwest=info,hyper=info",
            _ => "trace",
        })
    };
    let filter = || level.map_or_else(EnvFilter::from_default_env, EnvFilter::new);

    let stderr_layer = (!quiet).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .without_time()
            .with_filter(filter())
    });

    // The log file always records at least info level, even with --quiet.
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let file_filter = if level.is_some() && verbose == 0 {
                EnvFilter::new("info")
            } else {
                filter()
            };
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    Ok(())
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let config = cli.config.as_deref();
    match &cli.command {
        Commands::Import(args) => commands::import::execute(args, config, json),
        Commands::Preview { file } => commands::preview::execute(file, config, json),
        Commands::Verify { path } => commands::verify::execute(path, json),
        Commands::Version => commands::version::execute(json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
