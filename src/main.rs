use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use std::io::Write;

use mftpd::config::Config;
use mftpd::constants::DEFAULT_CONFIG_PATH;
use mftpd::core_auth::PasswdStore;
use mftpd::core_cli::Cli;
use mftpd::server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Load configuration; an explicit --config must exist, the default
    // path falls back to built-in defaults.
    let config = if args.config.is_empty() {
        if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() {
            Config::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            log::info!(
                "No configuration file at {}, using built-in defaults",
                DEFAULT_CONFIG_PATH
            );
            Config::default()
        }
    } else {
        Config::load_from_file(&args.config)?
    };

    let passwd = PasswdStore::load(&config.server.passwd_file)?;

    // Run the MFTP server
    let server = Server::new(config, passwd)?;
    server.run().await
}
