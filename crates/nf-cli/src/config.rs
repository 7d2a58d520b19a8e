//! Host configuration: defaults, then an optional TOML file, then
//! environment variables. CLI flags are applied last by the caller.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nf_core::EngineConfig;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
    pub bind_addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// Contents of `nf.toml`:
///
/// ```toml
/// [server]
/// port = 5001
/// bind_addr = "127.0.0.1"
///
/// [engine]
/// assign_missing_timestamps = true
///
/// [engine.thresholds]
/// attention = 65.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub engine: EngineConfig,
}

impl AppConfig {
    /// Resolve the config file from an explicit path or `NF_CONFIG`, load
    /// it if present, then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("NF_CONFIG").ok().map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config
            .engine
            .validate()
            .context("invalid [engine] configuration")?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
        }
        if let Ok(addr) = std::env::var("NF_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let bind = self.server.bind_addr.trim();
        let ip: IpAddr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind}"))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
