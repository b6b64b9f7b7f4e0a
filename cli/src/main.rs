mod commands;
mod display;
mod lookup;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use threatlens_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "threatlens")]
#[command(about = "Threat intelligence lookups against OSV, VirusTotal and AlienVault OTX", long_about = None)]
struct Cli {
    #[arg(short, long, global = true, help = "Path to a threatlens.yaml config file")]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Output in JSON format")]
    json: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    #[command(about = "Search OSV for known vulnerabilities in a package")]
    Osv(commands::Osv),

    #[command(about = "Analyse a file hash, URL, domain or IP with VirusTotal", visible_alias = "vt")]
    Virustotal(commands::VirusTotal),

    #[command(about = "Check an indicator's reputation on AlienVault OTX", visible_alias = "otx")]
    Alienvault(commands::AlienVault),

    #[command(about = "List supported sources and query types")]
    Sources(commands::Sources),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if let Commands::Sources(cmd) = &cli.command {
        cmd.run();
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref())?;
    let output = commands::Output { json: cli.json };

    let outcome = match cli.command {
        Commands::Osv(cmd) => cmd.run(&config, output).await,
        Commands::Virustotal(cmd) => cmd.run(&config, output).await,
        Commands::Alienvault(cmd) => cmd.run(&config, output).await,
        Commands::Sources(_) => Ok(()),
    };

    if let Err(e) = outcome {
        display::print_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
