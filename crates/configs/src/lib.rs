use std::path::{Path, PathBuf};

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// Prefix for absolute upload URLs, e.g. `https://api.example.com`. Empty means relative.
    #[serde(default)]
    pub public_url_base: String,
    /// Route appends through a single writer instead of racing read-modify-write cycles.
    #[serde(default)]
    pub serialize_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            uploads_dir: default_uploads_dir(),
            public_url_base: String::new(),
            serialize_writes: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_json_body_bytes")]
    pub json_body_bytes: usize,
    #[serde(default = "default_upload_bytes")]
    pub upload_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { json_body_bytes: default_json_body_bytes(), upload_bytes: default_upload_bytes() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 5000 }
fn default_data_file() -> PathBuf { PathBuf::from("database.json") }
fn default_uploads_dir() -> PathBuf { PathBuf::from("uploads") }
fn default_json_body_bytes() -> usize { 10 * 1024 * 1024 }
fn default_upload_bytes() -> usize { 50 * 1024 * 1024 }

/// Load `$CONFIG_PATH` (default `config.toml`) when the file exists; otherwise built-in defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_from_file(&path)
    } else {
        Ok(AppConfig::default())
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Full startup load: TOML file if present, then process environment, then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Override fields from environment-style variables resolved through `lookup`.
    /// Unparseable numeric/boolean values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") { self.server.host = host; }
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(p) = lookup("DATA_FILE").filter(|v| !v.trim().is_empty()) {
            self.storage.data_file = PathBuf::from(p);
        }
        if let Some(p) = lookup("UPLOADS_DIR").filter(|v| !v.trim().is_empty()) {
            self.storage.uploads_dir = PathBuf::from(p);
        }
        if let Some(base) = lookup("PUBLIC_URL_BASE") { self.storage.public_url_base = base; }
        if let Some(flag) = lookup("SERIALIZE_WRITES").and_then(|v| parse_bool(&v)) {
            self.storage.serialize_writes = flag;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize()?;
        self.limits.validate()?;
        Ok(())
    }

    /// `host:port` string suitable for `SocketAddr` parsing.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port 必须在 1..=65535 范围内"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(anyhow!("storage.data_file 不能为空"));
        }
        if self.uploads_dir.as_os_str().is_empty() {
            return Err(anyhow!("storage.uploads_dir 不能为空"));
        }
        // 原样作为前缀拼接，允许相对路径（如 `/api`）与协议相对地址
        self.public_url_base = self.public_url_base.trim().trim_end_matches('/').to_string();
        Ok(())
    }
}

impl LimitsConfig {
    fn validate(&self) -> Result<()> {
        if self.json_body_bytes == 0 || self.upload_bytes == 0 {
            return Err(anyhow!("limits 配置必须为正整数字节"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.data_file, PathBuf::from("database.json"));
        assert_eq!(cfg.storage.uploads_dir, PathBuf::from("uploads"));
        assert!(cfg.storage.public_url_base.is_empty());
        assert!(!cfg.storage.serialize_writes);
        assert_eq!(cfg.limits.json_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn env_overrides_take_effect() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[
            ("PORT", "8088"),
            ("DATA_FILE", "/tmp/db.json"),
            ("UPLOADS_DIR", "/tmp/up"),
            ("PUBLIC_URL_BASE", "https://api.example.com/"),
            ("SERIALIZE_WRITES", "true"),
        ]));
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.port, 8088);
        assert_eq!(cfg.storage.data_file, PathBuf::from("/tmp/db.json"));
        assert_eq!(cfg.storage.uploads_dir, PathBuf::from("/tmp/up"));
        assert_eq!(cfg.storage.public_url_base, "https://api.example.com");
        assert!(cfg.storage.serialize_writes);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8088");
        Ok(())
    }

    #[test]
    fn garbage_port_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[("PORT", "not-a-port")]));
        assert_eq!(cfg.server.port, 5000);
    }

    #[test]
    fn public_base_accepts_relative_prefixes() -> Result<()> {
        for (raw, expected) in [
            ("/api/", "/api"),
            ("//cdn.example.com", "//cdn.example.com"),
            ("http://localhost:5000//", "http://localhost:5000"),
            ("  ", ""),
        ] {
            let mut cfg = AppConfig::default();
            cfg.storage.public_url_base = raw.into();
            cfg.normalize_and_validate()?;
            assert_eq!(cfg.storage.public_url_base, expected, "base {raw:?}");
        }
        Ok(())
    }

    #[test]
    fn load_default_falls_back_when_file_absent() -> Result<()> {
        let missing = std::env::temp_dir().join(format!("svk_cfg_missing_{}.toml", uuid::Uuid::new_v4()));
        std::env::set_var("CONFIG_PATH", &missing);
        let cfg = load_default();
        std::env::remove_var("CONFIG_PATH");
        let cfg = cfg?;
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.storage.data_file, PathBuf::from("database.json"));
        Ok(())
    }

    #[test]
    fn parses_partial_toml() -> Result<()> {
        let path = std::env::temp_dir().join(format!("svk_cfg_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "[server]\nport = 7000\n\n[storage]\nuploads_dir = \"files\"\nserialize_writes = true\n",
        )?;
        let cfg = load_from_file(path.to_str().ok_or_else(|| anyhow!("non-utf8 temp path"))?)?;
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.uploads_dir, PathBuf::from("files"));
        assert_eq!(cfg.storage.data_file, PathBuf::from("database.json"));
        assert!(cfg.storage.serialize_writes);
        let _ = std::fs::remove_file(&path);
        Ok(())
    }
}
