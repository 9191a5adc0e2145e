use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Mail-server settings consumed by the notification stub. Read from
    /// `certdesk.toml` in the data directory when present.
    pub mail: Option<MailConfig>,
}

/// Mail-server settings from the `[mail]` table of `certdesk.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub from_address: String,
}

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    mail: Option<MailConfig>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("certdesk.db")
    }

    #[must_use]
    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir.join("certdesk.toml")
    }

    /// Loads optional settings from `certdesk.toml` in the data directory.
    /// A missing file is not an error; a malformed one is.
    pub fn load_config_file(&mut self) -> Result<()> {
        let path = self.config_file_path();
        if !path.exists() {
            return Ok(());
        }

        let raw = std::fs::read_to_string(&path)?;
        let parsed: ConfigFile = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        self.mail = parsed.mail;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            mail: None,
        }
    }
}
