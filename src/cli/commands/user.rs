use anyhow::bail;
use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::config;
use crate::database::repository::insert_user;
use crate::database::DatabaseManager;

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a user who can sign in to the dashboard")]
    Add {
        #[arg(help = "Display name")]
        name: String,
        #[arg(help = "Email address used to sign in")]
        email: String,
        #[arg(long, env = "INVOICES_USER_PASSWORD", help = "Password (at least 6 characters)")]
        password: String,
        #[arg(long, default_value_t = bcrypt::DEFAULT_COST, help = "bcrypt cost factor")]
        cost: u32,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Add {
            name,
            email,
            password,
            cost,
        } => {
            if password.chars().count() < MIN_PASSWORD_CHARS {
                bail!("password must be at least {} characters", MIN_PASSWORD_CHARS);
            }

            let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;

            let pool = DatabaseManager::connect(&config().database).await?;
            let id = insert_user(&pool, &name, &email, &hash).await?;
            pool.close().await;

            output_success(
                &output_format,
                &format!("Created user {} <{}>", name, email),
                Some(json!({ "id": id, "name": name, "email": email })),
            )
        }
    }
}
