use crate::error::{Result, ThreatlensError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "threatlens.yaml";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_OSV_URL: &str = "https://api.osv.dev";
pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";

pub const VIRUSTOTAL_KEY_VAR: &str = "VIRUSTOTAL_API_KEY";
pub const ALIENVAULT_KEY_VAR: &str = "ALIENVAULT_API_KEY";

/// Where OSV queries go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OsvMode {
    /// `POST <backend>/api/osv`
    #[default]
    Backend,
    /// `POST <backend>/v1/query`, relayed by the backend's proxy rule.
    Proxy,
    /// `POST <osv.url>/v1/query`
    Direct,
}

impl std::str::FromStr for OsvMode {
    type Err = ThreatlensError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "backend" => Ok(OsvMode::Backend),
            "proxy" => Ok(OsvMode::Proxy),
            "direct" => Ok(OsvMode::Direct),
            other => Err(ThreatlensError::InvalidKind {
                kind: other.to_string(),
                expected: "OSV mode",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsvConfig {
    pub mode: OsvMode,
    pub url: String,
}

impl Default for OsvConfig {
    fn default() -> Self {
        Self {
            mode: OsvMode::Backend,
            url: DEFAULT_OSV_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    /// Upstream the `/v1/query` proxy rule forwards to.
    pub proxy_target: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            proxy_target: DEFAULT_OSV_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApiKeys {
    pub virustotal: Option<String>,
    pub alienvault: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub osv: OsvConfig,
    pub server: ServerConfig,
    pub keys: ApiKeys,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            osv: OsvConfig::default(),
            server: ServerConfig::default(),
            keys: ApiKeys::default(),
        }
    }
}

impl Config {
    /// Reads `path`, or `threatlens.yaml` in the working directory when no
    /// path is given, then applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_overrides(|var| std::env::var(var).ok())?;
        config.validate(path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE)))?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ThreatlensError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content, path)
    }

    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).map_err(|e| {
            let (line, column) = e
                .location()
                .map(|loc| (loc.line(), loc.column()))
                .unwrap_or((0, 0));
            ThreatlensError::YamlSyntaxError {
                file: path.to_path_buf(),
                line,
                column,
                message: e.to_string(),
            }
        })
    }

    /// Environment variables win over file values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("THREATLENS_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(mode) = lookup("THREATLENS_OSV_MODE") {
            self.osv.mode = mode.parse()?;
        }
        if let Some(url) = lookup("THREATLENS_OSV_URL") {
            self.osv.url = url;
        }
        if let Some(listen) = lookup("THREATLENS_LISTEN") {
            self.server.listen = listen;
        }
        if let Some(key) = lookup(VIRUSTOTAL_KEY_VAR).filter(|k| !k.is_empty()) {
            self.keys.virustotal = Some(key);
        }
        if let Some(key) = lookup(ALIENVAULT_KEY_VAR).filter(|k| !k.is_empty()) {
            self.keys.alienvault = Some(key);
        }
        Ok(())
    }

    pub fn validate(&self, file: &Path) -> Result<()> {
        let mut errors = Vec::new();

        for (field, url) in [
            ("backend_url", &self.backend_url),
            ("osv.url", &self.osv.url),
            ("server.proxy_target", &self.server.proxy_target),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("{} must be an http(s) URL, got '{}'", field, url));
            }
        }

        if self.server.listen.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.listen must be an address like {}, got '{}'",
                DEFAULT_LISTEN, self.server.listen
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ThreatlensError::InvalidConfig {
                file: file.to_path_buf(),
                errors,
            })
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server.listen.parse().map_err(|_| ThreatlensError::Config {
            message: format!("invalid listen address '{}'", self.server.listen),
        })
    }
}
