//! Operate a local session store: sign up, sign in, inspect and sign out.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use session_core::config::{SessionStoreSettings, StoreBackend, build_session_store};
use session_core::domain::ports::SessionLookup;
use session_core::domain::{GateState, NewUser, SessionGate, SubmitOutcome, UserRecord};

/// `session-cli` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "session-cli",
    about = "Manage the local session store (configure with SESSION_STORE_* variables)",
    version
)]
struct CliArgs {
    /// Persistence medium; overrides SESSION_STORE_BACKEND.
    #[arg(long, global = true, value_enum)]
    backend: Option<StoreBackend>,
    /// Session document location; overrides SESSION_STORE_PATH.
    #[arg(long = "store-path", global = true)]
    store_path: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a new account. Does not sign it in.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Optional profile display name.
        #[arg(long = "name")]
        display_name: Option<String>,
    },
    /// Sign in through the session gate.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show who is currently signed in.
    Whoami,
    /// Clear the current session.
    Logout,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = SessionStoreSettings::load_from_iter([OsString::from("session-cli")])
        .map_err(|error| eyre!("load session store settings: {error}"))?
        .with_overrides(args.backend, args.store_path);
    let store = build_session_store(&settings);

    match args.command {
        Command::Signup {
            email,
            password,
            display_name,
        } => {
            let new_user = NewUser::try_from_parts(&email, &password, display_name.as_deref())
                .wrap_err("invalid sign-up details")?;
            let record = store
                .register_user(new_user)
                .await
                .wrap_err("sign-up failed")?;
            print_user("registered", &record);
        }
        Command::Login { email, password } => {
            let gate = SessionGate::new(store);
            if let GateState::Authenticated(user) = gate.mount().await {
                print_user("already signed in", &user);
                return Ok(());
            }
            match gate.submit(&email, &password).await {
                SubmitOutcome::Authenticated(user) => print_user("signed in", &user),
                SubmitOutcome::Rejected(notice) => return Err(eyre!(notice.message())),
                SubmitOutcome::Ignored => return Err(eyre!("sign-in is not available")),
            }
        }
        Command::Whoami => match store.current_user().await {
            SessionLookup::Found(user) => print_user("signed in", &user),
            SessionLookup::NoSession => println!("status=signed-out"),
            SessionLookup::Fault(fault) => {
                return Err(fault).wrap_err("session store unreadable");
            }
        },
        Command::Logout => {
            store.logout().await.wrap_err("sign-out failed")?;
            println!("status=signed-out");
        }
    }

    Ok(())
}

fn print_user(status: &str, user: &UserRecord) {
    println!("status={status}");
    println!("user_id={}", user.id());
    println!("email={}", user.email());
    if let Some(display_name) = user.display_name() {
        println!("display_name={}", display_name.as_ref());
    }
    println!("created_at={}", user.created_at().to_rfc3339());
}
