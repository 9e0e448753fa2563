//! Environment layering and backend origin resolution.
//!
//! Files are read from the project directory in this order, later files
//! overriding earlier ones:
//! ```text
//! .env → .env.local → .env.<mode> → .env.<mode>.local → process environment
//! ```
//! The process environment always wins. Nothing here writes back into the
//! process environment.

use std::collections::HashMap;
use std::path::Path;

use url::Url;

use crate::config::loader::ConfigError;
use crate::config::schema::ProxySettings;

/// Mode used when none is given on the command line.
pub const DEFAULT_MODE: &str = "development";

/// Layered view of `.env` files plus the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvLayer {
    vars: HashMap<String, String>,
}

impl EnvLayer {
    /// Load env files for `mode` from `dir`, then overlay the process environment.
    pub fn load(dir: &Path, mode: &str) -> Result<Self, ConfigError> {
        let mut layer = Self::from_files(dir, mode)?;
        layer.vars.extend(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        );
        Ok(layer)
    }

    /// Load env files only. Missing files are skipped.
    pub fn from_files(dir: &Path, mode: &str) -> Result<Self, ConfigError> {
        let mut vars = HashMap::new();

        for name in env_file_names(mode) {
            let path = dir.join(&name);
            if !path.is_file() {
                continue;
            }

            let iter = dotenvy::from_path_iter(&path).map_err(|source| ConfigError::Env {
                path: path.clone(),
                source,
            })?;
            for item in iter {
                let (key, value) = item.map_err(|source| ConfigError::Env {
                    path: path.clone(),
                    source,
                })?;
                vars.insert(key, value);
            }

            tracing::debug!(path = %path.display(), "Loaded env file");
        }

        Ok(Self { vars })
    }

    /// Build a layer from explicit pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Look up a variable. Empty values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

fn env_file_names(mode: &str) -> [String; 4] {
    [
        ".env".to_string(),
        ".env.local".to_string(),
        format!(".env.{mode}"),
        format!(".env.{mode}.local"),
    ]
}

/// Resolve the backend origin: env override first, then the configured default.
pub fn resolve_backend_origin(proxy: &ProxySettings, env: &EnvLayer) -> Result<Url, ConfigError> {
    let raw = env
        .get(&proxy.env_var)
        .unwrap_or(proxy.api_base_url.as_str());
    parse_origin(raw)
}

/// Parse and check an `http`/`https` origin.
pub fn parse_origin(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidOrigin {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidOrigin {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidOrigin {
            value: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}
