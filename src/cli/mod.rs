//! CLI definition and the export command driver

use std::path::PathBuf;

use clap::Parser;

use crate::config::DEFAULT_API_VERSION;

pub mod export;

/// sfexport - download Salesforce file attachments to a local directory
///
/// Every option can also be set through its environment variable or a `.env`
/// file in the working directory.
#[derive(Parser, Debug)]
#[command(name = "sfexport")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Salesforce username
    #[arg(long, env = "SF_USERNAME")]
    pub username: Option<String>,

    /// Salesforce password
    #[arg(long, env = "SF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Security token appended to the password at login
    #[arg(long, env = "SF_SECURITY_TOKEN", default_value = "", hide_env_values = true)]
    pub security_token: String,

    /// Login domain: `login` (production), `test` (sandbox) or a custom subdomain
    #[arg(long, env = "SF_DOMAIN", default_value = "login")]
    pub domain: String,

    /// Directory the files are written to (created if missing)
    #[arg(long, env = "SF_DOWNLOAD_DIR", default_value = "salesforce_downloads")]
    pub download_dir: PathBuf,

    /// File type label shown in progress messages
    #[arg(long, env = "SF_FILE_TYPE", default_value = "PDF")]
    pub file_type: String,

    /// Salesforce API version
    #[arg(long, env = "SF_API_VERSION", default_value = DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Longest wait for the server to send more data, in seconds
    #[arg(
        long,
        env = "SF_TIMEOUT",
        default_value_t = 300,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Full login host, bypassing --domain (development/testing)
    #[arg(long, env = "SF_LOGIN_URL", hide = true)]
    pub login_url: Option<String>,

    /// List matching files without downloading them
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long, env = "SFEXPORT_DEBUG", hide_env = true)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = Cli::try_parse_from(["sfexport", "--timeout", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::parse_from([
            "sfexport",
            "--username",
            "ops@example.com",
            "--dry-run",
            "--api-version",
            "60.0",
        ]);
        assert_eq!(cli.username.as_deref(), Some("ops@example.com"));
        assert!(cli.dry_run);
        assert_eq!(cli.api_version, "60.0");
    }
}
