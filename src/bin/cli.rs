use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Select};
use dotenvy::dotenv;

use curricula::cli::{list_profiles, set_role};
use curricula::logging::init_cli_tracing;
use curricula::store::{PgStore, Store};
use curricula_auth::Role;
use curricula_db::init_db_pool;

#[derive(Parser)]
#[command(name = "curricula-cli")]
#[command(about = "Curricula CLI - Administrative tools for Curricula", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assign a role to an existing user profile
    SetRole {
        /// Email address of the profile (prompted if omitted)
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// viewer, editor, owner or administrator (prompted if omitted)
        #[arg(short = 'r', long)]
        role: Option<Role>,
    },
    /// List all user profiles, newest first
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_cli_tracing();

    let cli = Cli::parse();
    let pool = init_db_pool().await?;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    match cli.command {
        Commands::SetRole { email, role } => handle_set_role(store.as_ref(), email, role).await,
        Commands::ListUsers => handle_list_users(store.as_ref()).await,
    }
}

async fn handle_set_role(
    store: &dyn Store,
    email: Option<String>,
    role: Option<Role>,
) -> anyhow::Result<()> {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };

    let role = match role {
        Some(role) => role,
        None => {
            let labels: Vec<String> = Role::ALL
                .iter()
                .map(|role| format!("{} - {}", role, role.description()))
                .collect();
            let index = Select::new()
                .with_prompt("Role")
                .items(&labels)
                .default(0)
                .interact()
                .context("Failed to read role")?;
            Role::ALL[index]
        }
    };

    let profile = set_role(store, &email, role)
        .await
        .map_err(|e| anyhow!(e.message()))?;

    println!("\n✅ Role updated");
    println!("   Email: {}", profile.email);
    println!("   Role: {}", role);
    Ok(())
}

async fn handle_list_users(store: &dyn Store) -> anyhow::Result<()> {
    let profiles = list_profiles(store)
        .await
        .map_err(|e| anyhow!(e.message()))?;

    if profiles.is_empty() {
        println!("No profiles yet.");
        return Ok(());
    }

    for profile in profiles {
        println!(
            "{:<36}  {:<32}  {:<13}  {}",
            profile.id,
            profile.email,
            profile.role.as_deref().unwrap_or("-"),
            profile.district.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}
