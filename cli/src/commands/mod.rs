use clap::{ArgGroup, Parser};
use threatlens_core::{
    Config, IndicatorKind, OsvMode, OsvQuery, Query, ScanKind,
};

use crate::{display, lookup};

#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

#[derive(Parser)]
#[command(group(ArgGroup::new("target").required(true).args(["package", "query"])))]
pub struct Osv {
    #[arg(short, long, help = "Package name, e.g. requests")]
    package: Option<String>,

    #[arg(short, long, default_value = "PyPI", help = "Package ecosystem, e.g. PyPI or npm")]
    ecosystem: String,

    #[arg(short, long, help = "Free-text query sent as-is")]
    query: Option<String>,

    #[arg(long, help = "Where to send the query: backend, proxy or direct")]
    mode: Option<OsvMode>,
}

impl Osv {
    pub async fn run(&self, config: &Config, output: Output) -> anyhow::Result<()> {
        let mut config = config.clone();
        if let Some(mode) = self.mode {
            config.osv.mode = mode;
        }

        let osv_query = match (&self.package, &self.query) {
            (Some(name), _) => OsvQuery::package(name.as_str(), self.ecosystem.as_str()),
            (None, Some(text)) => OsvQuery::Text(text.clone()),
            (None, None) => anyhow::bail!("Please enter a query."),
        };

        let session = lookup::run_query(&config, Query::Osv(osv_query)).await;
        display::show(&session, output)
    }
}

#[derive(Parser)]
pub struct VirusTotal {
    #[arg(help = "File hash, URL, domain or IP address")]
    query: String,

    #[arg(short = 't', long = "type", default_value = "file", help = "One of file, url, domain, ip")]
    kind: ScanKind,
}

impl VirusTotal {
    pub async fn run(&self, config: &Config, output: Output) -> anyhow::Result<()> {
        let query = Query::VirusTotal {
            query: self.query.clone(),
            kind: self.kind,
        };
        let session = lookup::run_query(config, query).await;
        display::show(&session, output)
    }
}

#[derive(Parser)]
pub struct AlienVault {
    #[arg(help = "IP address, domain, URL or file hash")]
    query: String,

    #[arg(short = 't', long = "type", default_value = "ip", help = "One of ip, domain, url, hash")]
    kind: IndicatorKind,
}

impl AlienVault {
    pub async fn run(&self, config: &Config, output: Output) -> anyhow::Result<()> {
        let query = Query::AlienVault {
            query: self.query.clone(),
            kind: self.kind,
        };
        let session = lookup::run_query(config, query).await;
        display::show(&session, output)
    }
}

#[derive(Parser)]
pub struct Sources;

impl Sources {
    pub fn run(&self) {
        println!("Supported sources:");
        println!("  - osv         --package NAME [--ecosystem ECO] | --query TEXT");
        println!("  - virustotal  QUERY --type <file|url|domain|ip>");
        for kind in ScanKind::ALL {
            println!("      {:<8} {}", kind.as_str(), kind.placeholder());
        }
        println!("  - alienvault  QUERY --type <ip|domain|url|hash>");
        for kind in IndicatorKind::ALL {
            println!("      {:<8} {}", kind.as_str(), kind.placeholder());
        }
    }
}
