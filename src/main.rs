use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing::{error, info};

use modulist::auth::bootstrap_admin;
use modulist::web::{AppState, WebServer};
use modulist::{Config, CredentialHasher, Database, ModulistError, Result};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration; only a missing file falls back to defaults
    let config = match Config::load_or_default(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    if let Err(e) = modulist::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        modulist::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{}", e);
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let init = std::env::args().skip(1).any(|arg| arg == "--init");

    match run(config, init).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, init: bool) -> Result<()> {
    let db = Database::open(&config.database.path).await?;

    if init {
        return create_first_admin(&db, &config).await;
    }

    info!("MODULIST - module review tool");
    let state = AppState::from_config(db, &config.auth)?;
    WebServer::new(&config.server, state)?.run().await
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let line = lines
        .next()
        .ok_or_else(|| ModulistError::Validation(format!("{label} is required")))??;
    Ok(line.trim().to_string())
}

async fn create_first_admin(db: &Database, config: &Config) -> Result<()> {
    let hasher = CredentialHasher::from_config(&config.auth)
        .map_err(|e| ModulistError::Config(e.to_string()))?;

    let (first_name, last_name, mail, password) = {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        (
            prompt(&mut lines, "First name")?,
            prompt(&mut lines, "Last name")?,
            prompt(&mut lines, "Mail")?,
            prompt(&mut lines, "Password")?,
        )
    };

    let admin = bootstrap_admin(db, &hasher, &first_name, &last_name, &mail, &password)
        .await
        .map_err(|e| ModulistError::Validation(e.to_string()))?;

    println!("Administrator {} created.", admin.mail);
    Ok(())
}
