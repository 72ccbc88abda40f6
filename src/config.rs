use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://apis.ccbp.in/jobs";
pub const TOKEN_ENV: &str = "JOBVIEW_TOKEN";
pub const BASE_URL_ENV: &str = "JOBVIEW_BASE_URL";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the endpoint and bearer token from flags, environment and the
    /// token file, in that order.
    pub fn resolve(
        base_url: Option<&str>,
        token: Option<&str>,
        token_file: Option<&Path>,
    ) -> Result<Self> {
        Self::resolve_from(
            base_url,
            token,
            token_file,
            env::var(BASE_URL_ENV).ok().as_deref(),
            env::var(TOKEN_ENV).ok().as_deref(),
        )
    }

    /// Same as `resolve`, with the environment values passed in.
    pub fn resolve_from(
        base_url: Option<&str>,
        token: Option<&str>,
        token_file: Option<&Path>,
        env_base_url: Option<&str>,
        env_token: Option<&str>,
    ) -> Result<Self> {
        let base_url = base_url.or(env_base_url).unwrap_or(DEFAULT_BASE_URL);

        let token = match token.or(env_token) {
            Some(token) => token.to_string(),
            None => {
                let path = match token_file {
                    Some(path) => path.to_path_buf(),
                    None => default_token_path(),
                };
                read_token_file(&path)?
            }
        };

        if token.trim().is_empty() {
            return Err(anyhow!("Bearer token is empty"));
        }

        Ok(Self::new(base_url, &token))
    }
}

pub fn read_token_file(path: &Path) -> Result<String> {
    let token = fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read token file: {}. Pass --token or set {}",
            path.display(),
            TOKEN_ENV
        )
    })?;
    Ok(token.trim().to_string())
}

fn default_token_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobview") {
        proj_dirs.config_dir().join("jwt_token")
    } else {
        PathBuf::from("jwt_token")
    }
}

/// Expands a leading `~/` the way shells do.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}
