use crate::proxy::DEFAULT_PROXY_ENV;
use crate::request::DEFAULT_MAX_REQUEST_BYTES;
use crate::transceiver::DEFAULT_RECV_BUFFER_BYTES;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Longest URL token accepted from input, in bytes.
pub const DEFAULT_MAX_URL_BYTES: usize = 1023;

/// Global configuration loaded from `~/.config/getfile/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetfileConfig {
    /// URL input longer than this is cut.
    pub max_url_bytes: usize,
    /// Requests longer than this are rejected before anything is sent.
    pub max_request_bytes: usize,
    /// Size of the buffer each socket read fills.
    pub recv_buffer_bytes: usize,
    /// Environment variable consulted for the proxy URL.
    pub proxy_env_var: String,
}

impl Default for GetfileConfig {
    fn default() -> Self {
        Self {
            max_url_bytes: DEFAULT_MAX_URL_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            recv_buffer_bytes: DEFAULT_RECV_BUFFER_BYTES,
            proxy_env_var: DEFAULT_PROXY_ENV.to_string(),
        }
    }
}

impl GetfileConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_url_bytes == 0 {
            bail!("max_url_bytes must be greater than 0");
        }
        if self.max_request_bytes == 0 {
            bail!("max_request_bytes must be greater than 0");
        }
        if self.recv_buffer_bytes == 0 {
            bail!("recv_buffer_bytes must be greater than 0");
        }
        if self.proxy_env_var.trim().is_empty() {
            bail!("proxy_env_var must not be empty");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("getfile")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from the default location, creating a default file if none exists.
pub fn load_or_init() -> Result<GetfileConfig> {
    load_or_init_at(&config_path()?)
}

/// Like [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<GetfileConfig> {
    if !path.exists() {
        let default_cfg = GetfileConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(path)
}

/// Load and validate an existing config file.
pub fn load_from(path: &Path) -> Result<GetfileConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: GetfileConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_values() {
        let cfg = GetfileConfig::default();
        assert_eq!(cfg.max_url_bytes, 1023);
        assert_eq!(cfg.max_request_bytes, 4096);
        assert_eq!(cfg.recv_buffer_bytes, 4096);
        assert_eq!(cfg.proxy_env_var, "http_proxy");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = GetfileConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: GetfileConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: GetfileConfig = toml::from_str("max_request_bytes = 8192").unwrap();
        assert_eq!(cfg.max_request_bytes, 8192);
        assert_eq!(cfg.recv_buffer_bytes, 4096);
        assert_eq!(cfg.proxy_env_var, "http_proxy");
    }

    #[test]
    fn zero_limits_are_rejected() {
        let cfg = GetfileConfig {
            recv_buffer_bytes: 0,
            ..GetfileConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = GetfileConfig {
            max_request_bytes: 0,
            ..GetfileConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_or_init_writes_defaults_then_reads_them() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let first = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(first, GetfileConfig::default());

        fs::write(&path, "proxy_env_var = \"HTTP_PROXY\"\nrecv_buffer_bytes = 512\n").unwrap();
        let second = load_or_init_at(&path).unwrap();
        assert_eq!(second.proxy_env_var, "HTTP_PROXY");
        assert_eq!(second.recv_buffer_bytes, 512);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_url_bytes = \"lots\"").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("config.toml"));
    }
}
