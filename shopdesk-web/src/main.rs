//! Shopdesk admin gateway
//!
//! Serves the admin section of the commerce catalog behind the session guard
//! and per-page permission gates.

use anyhow::Context;
use clap::Parser;
use shopdesk_core::{init_logging, AdminConfig, LogFormat};
use shopdesk_web::server::ShopdeskServerBuilder;
use std::path::PathBuf;
use tracing::info;

/// Shopdesk admin gateway
#[derive(Parser)]
#[command(name = "shopdesk-web")]
#[command(about = "Admin gateway for the Shopdesk commerce catalog")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Commerce backend base URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (json, pretty, compact)
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Args {
    /// Config file, then `SHOPDESK_*` variables, then flags
    fn resolve_config(&self) -> anyhow::Result<AdminConfig> {
        let mut config = self.file_config()?;
        config.apply_env()?;
        self.apply_flags(config)
    }

    fn file_config(&self) -> anyhow::Result<AdminConfig> {
        match &self.config {
            Some(path) => AdminConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display())),
            None => Ok(AdminConfig::default()),
        }
    }

    /// Apply command line overrides and validate the result
    fn apply_flags(&self, mut config: AdminConfig) -> anyhow::Result<AdminConfig> {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.dev {
            config.server.dev_mode = true;
        }
        if let Some(url) = &self.backend_url {
            config.backend.base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = args.resolve_config()?;

    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        address = %config.address(),
        backend = %config.backend.base_url,
        "Configuration loaded"
    );

    let server = ShopdeskServerBuilder::new()
        .config(config)
        .build()
        .context("building server")?;

    server.start().await?;

    info!("Server shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["shopdesk-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.dev);

        let args = Args::parse_from([
            "shopdesk-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
            "--log-format",
            "json",
        ]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(3000));
        assert!(args.dev);
        assert_eq!(args.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[backend]\nbase_url = \"http://files:1\""
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = Args::parse_from([
            "shopdesk-web",
            "--config",
            path.as_str(),
            "--backend-url",
            "http://flags:2",
        ]);
        let config = args.apply_flags(args.file_config().unwrap()).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.backend.base_url, "http://flags:2");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let args = Args::parse_from(["shopdesk-web", "--backend-url", "not a url"]);
        assert!(args.apply_flags(AdminConfig::default()).is_err());
    }
}
