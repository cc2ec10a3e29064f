pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod services;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, UserCommands};
pub use config::Config;
use db::Store;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Serve) => run_server(config).await,

        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists, leaving it alone.");
            }
            Ok(())
        }

        Some(Commands::User { command }) => match command {
            UserCommands::Add { email, role } => cmd_user_add(&config, &email, &role).await,
            UserCommands::Passwd { email } => cmd_user_passwd(&config, &email).await,
            UserCommands::List => cmd_user_list(&config).await,
        },
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("Vitrin v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let state = api::create_app_state_from_config(config).await?;
    let app = api::router(state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 Web API running at http://0.0.0.0:{}", port);
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Server running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Server stopped");

    Ok(())
}

async fn cmd_user_add(config: &Config, email: &str, role: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_email(email).await?.is_some() {
        println!("A user with email {email} already exists.");
        return Ok(());
    }

    let password = prompt_password()?;
    let user = store
        .create_user(email, &password, role, &config.security)
        .await?;

    println!("✓ Created user #{} {} ({})", user.id, user.email, user.role);

    Ok(())
}

async fn cmd_user_passwd(config: &Config, email: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    if store.get_user_by_email(email).await?.is_none() {
        println!("No user with email {email}.");
        return Ok(());
    }

    let password = prompt_password()?;
    store
        .update_user_password(email, &password, &config.security)
        .await?;

    println!("✓ Password updated for {email}");

    Ok(())
}

async fn cmd_user_list(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let users = store.list_users().await?;

    if users.is_empty() {
        println!("No users.");
        return Ok(());
    }

    println!("{:<5} {:<35} {:<10} {}", "ID", "EMAIL", "ROLE", "CREATED");
    for user in users {
        println!(
            "{:<5} {:<35} {:<10} {}",
            user.id, user.email, user.role, user.created_at
        );
    }

    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    use std::io::Write;

    print!("Password (min 6 chars): ");
    std::io::stdout().flush()?;

    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']).to_string();

    if password.len() < 6 {
        anyhow::bail!("Password must be at least 6 characters");
    }

    Ok(password)
}
