use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use threatlens_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "threatlens-server")]
#[command(about = "Backend for the Threatlens dashboard", long_about = None)]
struct Args {
    #[arg(short, long, help = "Path to a threatlens.yaml config file")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Address to listen on, e.g. 127.0.0.1:5000")]
    listen: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    threatlens_server::start_server(config).await
}
