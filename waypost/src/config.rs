//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment
//! variable overrides. The file path defaults to `config.yaml` and can be set
//! via `-f` flag or the `WAYPOST_CONFIG` environment variable.
//!
//! Sources are merged in order (later overrides earlier):
//!
//! 1. Built-in defaults
//! 2. YAML config file (if present)
//! 3. Environment variables: `GITHUB_TOKEN`, `REPO_OWNER`, `REPO_NAME`,
//!    `REPO_BRANCH`, `FILE_PATH`, `ALLOW_ORIGIN`, `HOST`, `PORT`,
//!    `GITHUB_API_BASE`
//!
//! The GitHub settings required for committing (`GITHUB_TOKEN`, `REPO_OWNER`,
//! `REPO_NAME`) are intentionally not enforced at startup: the save endpoint
//! reports them as a 500 at request time, so a misconfigured instance still
//! serves preflight and error responses.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Environment variables recognized as configuration overrides.
const ENV_KEYS: &[&str] = &[
    "github_token",
    "repo_owner",
    "repo_name",
    "repo_branch",
    "file_path",
    "allow_origin",
    "host",
    "port",
    "github_api_base",
];

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "WAYPOST_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Bearer token used for the GitHub contents API (required to commit)
    pub github_token: Option<String>,
    /// Owner of the repository the markers file is committed to (required to commit)
    pub repo_owner: Option<String>,
    /// Name of the repository the markers file is committed to (required to commit)
    pub repo_name: Option<String>,
    /// Branch the markers file is committed to
    pub repo_branch: String,
    /// Path of the markers file inside the repository
    pub file_path: String,
    /// Value for the `Access-Control-Allow-Origin` response header
    pub allow_origin: String,
    /// Base URL of the GitHub REST API (overridable for testing)
    pub github_api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            github_token: None,
            repo_owner: None,
            repo_name: None,
            repo_branch: "main".to_string(),
            file_path: "markers.json".to_string(),
            allow_origin: "*".to_string(),
            github_api_base: "https://api.github.com".to_string(),
        }
    }
}

/// The settings the save endpoint needs to talk to GitHub, with the required
/// ones resolved.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Self::figment(args).extract()
    }

    fn figment(args: &Args) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(&args.config))
            .merge(Env::raw().only(ENV_KEYS))
    }

    /// Address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resolve the settings required for committing to GitHub.
    ///
    /// Returns [`Error::MissingConfig`] naming every absent required
    /// environment variable, so a single response surfaces all of them.
    pub fn require_store(&self) -> Result<StoreSettings, Error> {
        let mut missing = Vec::new();
        if self.github_token.is_none() {
            missing.push("GITHUB_TOKEN");
        }
        if self.repo_owner.is_none() {
            missing.push("REPO_OWNER");
        }
        if self.repo_name.is_none() {
            missing.push("REPO_NAME");
        }
        if !missing.is_empty() {
            return Err(Error::MissingConfig { vars: missing });
        }

        Ok(StoreSettings {
            token: self.github_token.clone().unwrap_or_default(),
            owner: self.repo_owner.clone().unwrap_or_default(),
            repo: self.repo_name.clone().unwrap_or_default(),
            branch: self.repo_branch.clone(),
            path: self.file_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_from_env(jail: &figment::Jail) -> Config {
        let _ = jail;
        let args = Args {
            config: "does-not-exist.yaml".to_string(),
            validate: false,
        };
        Config::load(&args).expect("config should load")
    }

    #[test]
    fn defaults_apply_without_any_environment() {
        figment::Jail::expect_with(|jail| {
            let config = load_from_env(jail);
            assert_eq!(config.repo_branch, "main");
            assert_eq!(config.file_path, "markers.json");
            assert_eq!(config.allow_origin, "*");
            assert_eq!(config.github_api_base, "https://api.github.com");
            assert!(config.github_token.is_none());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GITHUB_TOKEN", "tok-123");
            jail.set_env("REPO_OWNER", "octo");
            jail.set_env("REPO_NAME", "maps");
            jail.set_env("REPO_BRANCH", "gh-pages");
            jail.set_env("FILE_PATH", "data/markers.json");
            jail.set_env("ALLOW_ORIGIN", "https://maps.example.com");

            let config = load_from_env(jail);
            assert_eq!(config.github_token.as_deref(), Some("tok-123"));
            assert_eq!(config.repo_owner.as_deref(), Some("octo"));
            assert_eq!(config.repo_name.as_deref(), Some("maps"));
            assert_eq!(config.repo_branch, "gh-pages");
            assert_eq!(config.file_path, "data/markers.json");
            assert_eq!(config.allow_origin, "https://maps.example.com");
            Ok(())
        });
    }

    #[test]
    fn require_store_names_every_missing_var() {
        let config = Config::default();
        let err = config.require_store().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("GITHUB_TOKEN"));
        assert!(message.contains("REPO_OWNER"));
        assert!(message.contains("REPO_NAME"));
    }

    #[test]
    fn require_store_resolves_when_complete() {
        let config = Config {
            github_token: Some("tok".to_string()),
            repo_owner: Some("octo".to_string()),
            repo_name: Some("maps".to_string()),
            ..Config::default()
        };
        let store = config.require_store().expect("all required settings set");
        assert_eq!(store.branch, "main");
        assert_eq!(store.path, "markers.json");
    }
}
