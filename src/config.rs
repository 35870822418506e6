//! Configuration loading: defaults, optional YAML file, environment, CLI.

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Base URL used to build shareable session links
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Webhook endpoint notified on each submission (unset disables delivery)
    #[arg(long, env = "AGENT_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Directory of static assets to serve
    #[arg(long, env = "PUBLIC_DIR")]
    pub public_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    pub sessions: SessionsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Base URL for shareable links; falls back to `http://localhost:{port}`.
    #[serde(default)]
    pub base_url: Option<String>,
    pub public_dir: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WebhookConfig {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionsConfig {
    /// Session time-to-live in seconds; expired sessions are purged.
    pub ttl_secs: u64,
    /// How often the background sweep runs, in seconds.
    pub sweep_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let mut builder = Config::builder();

        // Defaults
        builder = builder
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.public_dir", "public")?
            .set_default("sessions.ttl_secs", 60 * 60)?
            .set_default("sessions.sweep_interval_secs", 5 * 60)?;

        // Optional config file (explicit path, or ./config.yaml if present)
        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }

        // Environment variables prefixed with RELAY_, e.g. RELAY_SERVER__PORT=8000
        builder = builder.add_source(
            Environment::with_prefix("RELAY")
                .separator("__")
                .try_parsing(true),
        );

        // CLI flags (and their legacy env aliases: PORT, BASE_URL,
        // AGENT_WEBHOOK_URL, PUBLIC_DIR) win over everything else.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(base_url) = cli.base_url {
            builder = builder.set_override("server.base_url", base_url)?;
        }
        if let Some(url) = cli.webhook_url {
            builder = builder.set_override("webhook.url", url)?;
        }
        if let Some(dir) = cli.public_dir {
            builder = builder.set_override("server.public_dir", dir)?;
        }

        let cfg = builder.build()?;
        cfg.try_deserialize()
    }

    /// Base URL used when building shareable session links.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.server
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.server.port))
    }
}
