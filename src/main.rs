mod cleanup;
mod config;
mod core;
mod cron_utils;
mod cycle;
mod daemon;
mod notify;
mod queue;
mod reminder;
mod rollover;
mod scheduler;
mod state;
mod traits;
mod types;

#[cfg(test)]
mod testing;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = PathBuf::from("config.toml");

    // Handle CLI arguments
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--version" | "-V" => {
                println!("goaltrackd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("goaltrackd {}", env!("CARGO_PKG_VERSION"));
                println!("{}\n", env!("CARGO_PKG_DESCRIPTION"));
                println!("Usage: goaltrackd [COMMAND]\n");
                println!("Commands:");
                println!("  install-service    Install as a system service (launchd/systemd)");
                println!("\nOptions:");
                println!("  -h, --help       Print help");
                println!("  -V, --version    Print version");
                println!("\nConfiguration is read from config.toml in the working directory;");
                println!("defaults apply when the file is absent.");
                return Ok(());
            }
            "install-service" => {
                return daemon::install_service();
            }
            other => {
                eprintln!("Unknown argument '{}'. See goaltrackd --help.", other);
                std::process::exit(2);
            }
        }
    }

    // Missing config is fine: every section has defaults.
    let config = if config_path.exists() {
        config::AppConfig::load(&config_path)?
    } else {
        config::AppConfig::default()
    };

    // Run async
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(core::run(config))
}
