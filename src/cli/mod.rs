pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tenancy")]
#[command(about = "Tenancy CLI - run and administer the multi-tenant hierarchy API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Apply the database schema to DATABASE_URL")]
    Migrate,

    #[command(about = "Bearer token management")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config().clone();

    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args, config).await,
        Commands::Migrate => commands::migrate::handle(&config, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, &config, output_format),
    }
}
