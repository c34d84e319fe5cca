use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use metobs_gateway_core::{find_config_file, load_config, ConfigSource, DEFAULT_GATEWAY_PORT};
use std::env;
use time::{format_description::well_known::Iso8601, OffsetDateTime};

const DEFAULT_UPSTREAM_URL: &str = "https://opendata-download-metobs.smhi.se";

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "Metobs Gateway - merged station observations over the SMHI open data API"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $METOBS_GATEWAY_CONFIG, ./gateway.toml,
    /// $XDG_CONFIG_HOME/metobs-gateway/gateway.toml, /etc/metobs-gateway/gateway.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "METOBS_GATEWAY_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short, long, env = "METOBS_GATEWAY_HOST")]
    #[serde(alias = "host")]
    pub domain: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "METOBS_GATEWAY_PORT")]
    pub port: Option<String>,

    /// Base URL of the metobs open data API
    #[arg(short, long, env = "METOBS_GATEWAY_UPSTREAM_URL")]
    pub upstream_url: Option<String>,

    /// Comma-separated list of accepted X-API-Key values
    #[arg(short, long, env = "METOBS_GATEWAY_API_KEYS", value_delimiter = ',')]
    pub api_keys: Option<Vec<String>>,
}

impl Cli {
    /// Get the effective configuration value with defaults
    pub fn host(&self) -> String {
        self.domain
            .clone()
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_GATEWAY_PORT.to_string())
    }

    pub fn upstream_url(&self) -> String {
        self.upstream_url
            .clone()
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string())
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.api_keys.clone().unwrap_or_default()
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Cli {
    let cli_args = Cli::parse();

    // Determine config file path
    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("METOBS_GATEWAY_CONFIG", "gateway.toml")
    };

    if let Some(path) = source.path() {
        log::info!("Loading config from: {}", path.display());
    }

    let file_config: Cli = load_config(&source).unwrap_or_default();

    // CLI args override file config (env vars are handled by clap)
    Cli {
        config: cli_args.config,
        level: cli_args.level.or(file_config.level),
        domain: cli_args.domain.or(file_config.domain),
        port: cli_args.port.or(file_config.port),
        upstream_url: cli_args.upstream_url.or(file_config.upstream_url),
        api_keys: cli_args.api_keys.or(file_config.api_keys),
    }
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}: {}",
                OffsetDateTime::now_utc()
                    .format(&Iso8601::DEFAULT)
                    .unwrap_or_default(),
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
