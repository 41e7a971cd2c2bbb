use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Symmetric signing secret for access and refresh tokens. When unset,
    /// an ephemeral secret is generated at startup and issued tokens do not
    /// survive a restart.
    pub secret_key: Option<String>,
    pub algorithm: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_minutes: i64,
    pub default_page_size: i64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("docvault.db")
    }

    /// Loads a TOML config file. Missing keys fall back to the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            secret_key: None,
            algorithm: "HS256".to_string(),
            access_token_ttl_minutes: 30,
            refresh_token_ttl_minutes: 60 * 24 * 14,
            default_page_size: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.algorithm, "HS256");
        assert_eq!(config.default_page_size, 50);
        assert!(config.secret_key.is_none());
    }

    #[test]
    fn test_from_file_merges_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docvault.toml");
        std::fs::write(&path, "port = 9090\nsecret_key = \"s3cret\"\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.secret_key.as_deref(), Some("s3cret"));
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_from_file_rejects_unknown_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("docvault.toml");
        std::fs::write(&path, "prot = 9090\n").unwrap();

        assert!(matches!(
            ServerConfig::from_file(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }
}
