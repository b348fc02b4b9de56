pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::scope::Role;
use crate::tree::Category;

#[derive(Parser)]
#[command(name = "padm")]
#[command(about = "padm - command-line client for the Portal Admin API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output raw JSON instead of text")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Node tree operations")]
    Nodes {
        #[command(subcommand)]
        cmd: NodeCommands,
    },

    #[command(about = "Captive portal config operations")]
    Portal {
        #[command(subcommand)]
        cmd: PortalCommands,
    },

    #[command(about = "Client configuration")]
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },

    #[command(about = "Mint a development JWT (requires JWT_SECRET)")]
    Token {
        #[arg(long, value_enum, default_value = "superadmin")]
        role: TokenRole,
        #[arg(long, help = "Home node for ADMIN tokens")]
        home_node_id: Option<Uuid>,
        #[arg(long, default_value = "padm")]
        subject: String,
    },
}

#[derive(Subcommand)]
pub enum NodeCommands {
    #[command(about = "List all nodes visible to the token")]
    List,

    #[command(about = "Create a node")]
    Create {
        #[arg(long)]
        parent_id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long, help = "KUNDE, STANDORT or BEREICH")]
        category: String,
    },

    #[command(about = "Delete a leaf node")]
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum PortalCommands {
    #[command(about = "Show all configs on a node's ancestor chain")]
    Show {
        #[arg(long)]
        node_id: Uuid,
    },

    #[command(about = "Show the effective config for a node")]
    Effective {
        #[arg(long)]
        node_id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show the effective client config")]
    Show,

    #[command(about = "Persist server URL and/or token to the config file")]
    Set {
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        token: Option<String>,
    },
}

#[derive(Clone, clap::ValueEnum)]
pub enum TokenRole {
    Superadmin,
    Admin,
    User,
}

impl From<TokenRole> for Role {
    fn from(role: TokenRole) -> Self {
        match role {
            TokenRole::Superadmin => Role::Superadmin,
            TokenRole::Admin => Role::Admin,
            TokenRole::User => Role::User,
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let json = cli.json;

    match cli.command {
        Commands::Nodes { cmd } => match cmd {
            NodeCommands::List => commands::nodes_list(json).await,
            NodeCommands::Create {
                parent_id,
                name,
                category,
            } => {
                let category: Category = category
                    .to_uppercase()
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!(e))?;
                commands::nodes_create(json, parent_id, name, category).await
            }
            NodeCommands::Delete { id } => commands::nodes_delete(json, id).await,
        },
        Commands::Portal { cmd } => match cmd {
            PortalCommands::Show { node_id } => commands::portal_show(json, node_id).await,
            PortalCommands::Effective { node_id } => {
                commands::portal_effective(json, node_id).await
            }
        },
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => commands::config_show(json),
            ConfigCommands::Set { server, token } => commands::config_set(server, token),
        },
        Commands::Token {
            role,
            home_node_id,
            subject,
        } => commands::mint_token(role.into(), home_node_id, subject),
    }
}
