use anyhow::{Context, Result};
use clap::Parser;
use rrss::content::SanitizerKind;
use rrss::{Config, Harvester};
use std::io::Write;
use std::path::PathBuf;

/// Default config file location (~/.config/rrss/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("rrss")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "rrss",
    about = "Fetch a feed and enrich each entry with its full article text"
)]
struct Args {
    /// Feed URL (RSS, Atom or JSON Feed)
    url: String,

    /// Config file (defaults to ~/.config/rrss/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum concurrent article fetches (0 = unbounded)
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-article fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Sanitizer applied to entry bodies and articles
    #[arg(long, value_enum)]
    sanitizer: Option<SanitizerKind>,

    /// Refuse links to localhost and private networks
    #[arg(long)]
    block_private_hosts: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(n) = self.concurrency {
            config.max_concurrency = n;
        }
        if let Some(secs) = self.timeout {
            config.fetch_timeout_secs = Some(secs);
        }
        if let Some(kind) = self.sanitizer {
            config.sanitizer = kind;
        }
        if self.block_private_hosts {
            config.block_private_hosts = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    args.apply(&mut config);
    tracing::debug!(config = ?config, "Effective configuration");

    let harvester = Harvester::new(config).context("Failed to create harvester")?;
    let records = harvester
        .harvest(&args.url)
        .await
        .with_context(|| format!("Failed to harvest feed {}", args.url))?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&records)
    } else {
        serde_json::to_string(&records)
    }
    .context("Failed to serialize records")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("Failed to write output")?;
    Ok(())
}
