use clap::Parser;
use tracing_subscriber::EnvFilter;

use lockify::cli::{commands, output, Cli, Commands, Runtime};
use lockify::errors::Result;

fn main() {
    // Diagnostics go to stderr so `get` and `export` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Version = cli.command {
        return commands::version::execute();
    }

    let rt = Runtime::from_cli(cli)?;

    match cli.command {
        Commands::Init => commands::init::execute(&rt),
        Commands::Add {
            ref key,
            ref value,
            secret,
        } => commands::add::execute(&rt, key.as_deref(), value.as_deref(), secret),
        Commands::Get { ref key } => commands::get::execute(&rt, key),
        Commands::Delete { ref key, force } => commands::delete::execute(&rt, key, force),
        Commands::List => commands::list::execute(&rt),
        Commands::Export {
            format,
            ref output,
        } => commands::export::execute(&rt, format, output.as_deref()),
        Commands::Import {
            ref file,
            format,
            overwrite,
        } => commands::import_cmd::execute(&rt, file.as_deref(), format, overwrite),
        Commands::RotateKey => commands::rotate::execute(&rt),
        Commands::Cache { ref action } => commands::cache::execute(&rt, action),
        Commands::Version => commands::version::execute(),
    }
}
