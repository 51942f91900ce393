//! sfexport - download Salesforce file attachments to local disk

use clap::Parser;
use colored::Colorize;

mod cli;
mod client;
mod config;
mod download;
mod error;
mod output;

use cli::Cli;
use config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is normal; the environment may already be set
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = Config::from_cli(&cli);
    if let Err(err) = cli::export::run(&config).await {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
