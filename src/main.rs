use std::path::PathBuf;

use clap::Parser;
use pathprobe::client::AsyncClient;
use pathprobe::config::{AuditConfig, ConfigOverrides, OutputStyle};
use pathprobe::session::AuditSession;
use pathprobe::sinks::{LineSink, ResultSink, TableSink};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "pathprobe")]
#[command(about = "Sequential HTTP path discovery that backs off at the first rate limit")]
#[command(version)]
struct Cli {
    /// Path to a toml config file
    #[arg(short, long, env = "PATHPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// Base url every path is joined onto
    #[arg(short, long, env = "PATHPROBE_TARGET")]
    target: Option<String>,

    /// Candidate path; repeat the flag or separate with commas
    #[arg(short, long = "path", value_delimiter = ',')]
    paths: Vec<String>,

    /// Pause between two consecutive requests, in milliseconds
    #[arg(long, env = "PATHPROBE_DELAY_MS")]
    delay_ms: Option<u64>,

    /// Per-request timeout, in milliseconds
    #[arg(long, env = "PATHPROBE_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// User-Agent sent with every request
    #[arg(short, long)]
    user_agent: Option<String>,

    /// Extra header as "Name: value"; may be repeated
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// How results are rendered
    #[arg(short, long, value_enum)]
    output: Option<OutputStyle>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            target: self.target.clone(),
            paths: self.paths.clone(),
            delay_ms: self.delay_ms,
            timeout_ms: self.timeout_ms,
            user_agent: self.user_agent.clone(),
            headers: self.headers.clone(),
            output: self.output,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // logs go to stderr so they never interleave with results on stdout
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => AuditConfig::from_file(path)?,
        None => AuditConfig::default(),
    };
    config.apply(cli.overrides())?;
    config.validate()?;

    debug!(?config, "resolved configuration");

    let mut session = AuditSession::new(AsyncClient::new()?, &config)?;

    let mut sink: Box<dyn ResultSink> = match config.output {
        OutputStyle::Plain => Box::new(LineSink::stdout()),
        OutputStyle::Table => Box::new(TableSink::stdout()),
    };

    session.run(&mut sink).await;

    Ok(())
}
