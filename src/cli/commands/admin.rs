use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::api::UserResponse;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseManager, PgStore, Store};
use crate::services::AccountService;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create the administrator from ADMIN_EMAIL, ADMIN_PHONE, ADMIN_NAME, ADMIN_PASSWORD")]
    Create {
        #[arg(long, help = "Remove any existing user with the same email first")]
        force: bool,
    },

    #[command(about = "Grant the admin role to an existing user")]
    Promote {
        #[arg(help = "Email of the user to promote")]
        email: String,
    },
}

async fn connect() -> anyhow::Result<Arc<dyn Store>> {
    let config = config::config();
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Arc::new(PgStore::new(pool)))
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let accounts = AccountService::new(connect().await?);

    match cmd {
        AdminCommands::Create { force } => {
            let seed = &config::config().admin;
            if seed.password.is_empty() {
                anyhow::bail!("ADMIN_PASSWORD must be set");
            }
            let admin = accounts.create_admin(seed, force).await?;
            output_success(
                output_format,
                &format!("Admin user created: {}", admin.email),
                Some(json!({ "user": UserResponse::from(&admin) })),
            )
        }
        AdminCommands::Promote { email } => {
            let user = accounts.promote(&email).await?;
            output_success(
                output_format,
                &format!("{} is now an admin", user.email),
                Some(json!({ "user": UserResponse::from(&user) })),
            )
        }
    }
}
