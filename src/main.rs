//! Sousbook - session and auth core for the Sousbook recipe client.
//!
//! The binary is a small driver around the auth core: it signs in or up
//! against the identity provider, restores a persisted session on `status`,
//! and tears the session down on `logout`. The recipe screens live in the
//! web client; everything here is the session lifecycle they depend on.

mod auth;
mod config;

use std::io;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use auth::{AuthService, IdentityClient, NavRequest, SessionFile};
use config::Config;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn usage() {
    eprintln!("Usage: sousbook <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  login [email]     Sign in and start a session");
    eprintln!("  signup <email>    Create an account and start a session");
    eprintln!("  status            Restore and show the current session");
    eprintln!("  logout            End the session");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("sousbook starting");

    let mut config = Config::load()?;
    let (nav_tx, mut nav_rx) = mpsc::unbounded_channel();
    let service = AuthService::new(
        // logout/status never reach the network, so an absent key is only
        // an error for login/signup (checked below before prompting).
        IdentityClient::new(config.api_key().unwrap_or_default())?,
        SessionFile::new(config.data_dir()?),
        nav_tx,
    );

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("login") | Some("signup") => {
            let command = args[1].clone();
            config.require_api_key()?;

            let email = match args.get(2).cloned().or_else(|| config.last_email.clone()) {
                Some(email) => email,
                None => {
                    usage();
                    anyhow::bail!("{} requires an email address", command);
                }
            };
            let password = rpassword::prompt_password("Password: ")?;

            let result = if command == "login" {
                service.login(&email, &password).await
            } else {
                service.signup(&email, &password).await
            };

            match result {
                Ok(user) => {
                    println!(
                        "Signed in as {} (session valid for {} minutes)",
                        user.email,
                        user.minutes_until_expiry()
                    );
                    config.last_email = Some(email);
                    config.save()?;
                }
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        Some("status") => {
            let mut sessions = service.store().subscribe();
            service.auto_login();

            // An expired restored session logs itself out on a zero-delay
            // timer; wait for that transition to land before reporting.
            while service
                .store()
                .current()
                .is_some_and(|u| u.token().is_none())
            {
                sessions.changed().await?;
            }

            match service.store().current() {
                Some(user) => {
                    println!(
                        "Signed in as {} ({} minutes until expiry)",
                        user.email,
                        user.minutes_until_expiry()
                    );
                }
                None => println!("Not signed in."),
            }
        }
        Some("logout") => {
            service.logout();
            if nav_rx.try_recv() == Ok(NavRequest::AuthEntry) {
                println!("Signed out.");
            }
        }
        _ => usage(),
    }

    info!("sousbook shutting down");
    Ok(())
}
