use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::output::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a bearer token signed with JWT_SECRET")]
    Issue {
        #[arg(help = "User name recorded in the token subject")]
        user: String,
        #[arg(long, help = "User id (random when omitted)")]
        user_id: Option<Uuid>,
        #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },
}

pub fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user, user_id, hours } => {
            let hours = hours.unwrap_or(config.security.jwt_expiry_hours);
            let claims = Claims::new(user, user_id.unwrap_or_else(Uuid::new_v4), hours)?;
            let token = generate_jwt(&claims, &config.security.jwt_secret)?;

            output_success(
                output_format,
                &format!("Issued token for {}", claims.sub),
                json!({
                    "token": token,
                    "user_id": claims.user_id,
                    "expires_at": claims.exp,
                }),
            )
        }
    }
}
