//! Run configuration for sfexport

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::{ConfigError, Result};

/// Default Salesforce API version for both SOAP login and REST calls
pub const DEFAULT_API_VERSION: &str = "59.0";

/// Which Salesforce environment to log in to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Domain {
    /// `login.salesforce.com`
    Production,
    /// `test.salesforce.com`
    Sandbox,
    /// `{name}.salesforce.com`, e.g. `acme.my` for a My Domain org
    Custom(String),
}

impl Domain {
    /// Parse a domain selector (`login`, `test`, or a custom subdomain)
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "login" => Domain::Production,
            "test" => Domain::Sandbox,
            other => Domain::Custom(other.trim_end_matches(".salesforce.com").to_string()),
        }
    }

    /// Login host URL for this domain
    pub fn login_url(&self) -> String {
        format!("https://{}.salesforce.com", self)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Production => f.write_str("login"),
            Domain::Sandbox => f.write_str("test"),
            Domain::Custom(name) => f.write_str(name),
        }
    }
}

/// Immutable configuration for one export run.
///
/// Built once from the parsed command line (which already merged environment
/// variables and `.env` values) and passed by reference into the exporter.
#[derive(Debug, Clone)]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    pub security_token: String,
    pub domain: Domain,

    /// Overrides the domain-derived login host (development and testing)
    pub login_url: Option<String>,

    pub api_version: String,
    pub download_dir: PathBuf,

    /// Shown in console messages only; the query does not filter on it
    pub file_type: String,

    pub timeout: Duration,
    pub dry_run: bool,
}

impl Config {
    /// Build the configuration from parsed CLI arguments
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            username: non_blank(cli.username.as_deref()),
            password: cli.password.clone().filter(|p| !p.is_empty()),
            security_token: cli.security_token.clone(),
            domain: Domain::parse(&cli.domain),
            login_url: non_blank(cli.login_url.as_deref()).map(|url| url.trim().to_string()),
            api_version: cli.api_version.clone(),
            download_dir: cli.download_dir.clone(),
            file_type: cli.file_type.clone(),
            timeout: Duration::from_secs(cli.timeout),
            dry_run: cli.dry_run,
        }
    }

    /// Check that both login credentials are present.
    ///
    /// Returns the username and password so callers don't unwrap them again.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let username = self
            .username
            .as_deref()
            .ok_or(ConfigError::MissingUsername)?;
        let password = self
            .password
            .as_deref()
            .ok_or(ConfigError::MissingPassword)?;
        Ok((username, password))
    }

    /// Host to send the SOAP login request to
    pub fn login_host(&self) -> String {
        match &self.login_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.domain.login_url(),
        }
    }
}

/// Blank values count as unset; anything else is kept exactly as given
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Self {
            username: Some("u".to_string()),
            password: Some("p".to_string()),
            security_token: String::new(),
            domain: Domain::Production,
            login_url: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            download_dir: PathBuf::from("salesforce_downloads"),
            file_type: "PDF".to_string(),
            timeout: Duration::from_secs(300),
            dry_run: false,
        }
    }
}
