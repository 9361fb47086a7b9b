// Entrypoint for the CLI application.
// - Parses flags, loads config and sets up logging.
// - Collects credentials, logs in, then hands over to the UI loop.

use anyhow::{Context, Result};
use clap::Parser;
use contacts_sync_cli::api::ContactsClient;
use contacts_sync_cli::config::Config;
use contacts_sync_cli::error::ApiError;
use contacts_sync_cli::ui::{main_menu, ContactsApp};
use dialoguer::{Input, Password};
use secrecy::SecretString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contacts-sync", about = "List and edit contacts on a remote contacts service")]
struct Cli {
    /// Account e-mail; prompted for when missing.
    #[arg(long)]
    user: Option<String>,

    /// Account password; prompted for (hidden) when missing.
    #[arg(long)]
    pw: Option<String>,

    /// Config file (default: <config_dir>/contacts-sync/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fetch every page without asking.
    #[arg(long)]
    yes: bool,

    /// List all contacts once and exit instead of showing the menu.
    #[arg(long)]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;
    init_logging(&config)?;

    let user = match cli.user.filter(|u| !u.trim().is_empty()) {
        Some(user) => user,
        None => prompt_user()?,
    };
    let password = match cli.pw.filter(|p| !p.is_empty()) {
        Some(pw) => SecretString::new(pw),
        None => prompt_password()?,
    };

    let client = ContactsClient::new(&config.service).context("Failed to build HTTP client")?;
    let session = match client.login(&user, password) {
        Ok(session) => session,
        Err(ApiError::BadAuthentication) => {
            println!("Invalid user credentials given.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Login failed"),
    };
    tracing::info!(user = session.email(), base_url = client.base_url(), "logged in");

    let app = ContactsApp::new(
        client,
        session,
        config.service.max_results,
        cli.yes || config.walk.auto_continue,
    );
    if cli.list {
        app.list_all_contacts(false)?;
        return Ok(());
    }
    main_menu(&app)
}

/// Logs go to the configured file, or stderr. `RUST_LOG` overrides the
/// configured filter.
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("Invalid log filter")?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match &config.log.file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            builder.with_writer(std::sync::Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn prompt_user() -> Result<String> {
    loop {
        println!("NOTE: Please run this only if you know what you are doing!!!");
        let user: String = Input::new()
            .with_prompt("Please enter your username")
            .allow_empty(true)
            .interact_text()?;
        let user = user.trim();
        if !user.is_empty() {
            return Ok(user.to_string());
        }
    }
}

fn prompt_password() -> Result<SecretString> {
    loop {
        let pw = Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()?;
        if !pw.is_empty() {
            return Ok(SecretString::new(pw));
        }
        println!("Password cannot be blank.");
    }
}
