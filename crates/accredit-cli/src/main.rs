//! Accredit CLI: command-line client for the credential ledger.
//!
//! Subcommands: admin, institution, issue, credential, access, company,
//! events, status, merkle.

mod client;
mod commands;

use clap::{Parser, Subcommand};

use accredit_core::Address;
use client::NodeClient;

/// Accredit credential authorization ledger client.
#[derive(Parser, Debug)]
#[command(name = "accredit", version, about, long_about = None)]
struct Cli {
    /// API endpoint of the node.
    #[arg(short, long, global = true, default_value = "http://127.0.0.1:9101")]
    endpoint: String,

    /// Identity the request is made as.
    #[arg(long, global = true)]
    caller: Option<Address>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage admins.
    Admin(commands::roles::AdminArgs),
    /// Manage verified institutions.
    Institution(commands::roles::InstitutionArgs),
    /// Issue a credential.
    Issue(commands::credential::IssueArgs),
    /// Read credentials.
    Credential(commands::credential::CredentialArgs),
    /// Publish access roots and run the request/grant exchange.
    Access(commands::access::AccessArgs),
    /// Attest companies and read their reputation.
    Company(commands::company::CompanyArgs),
    /// Poll the ledger event log.
    Events(commands::events::EventsArgs),
    /// Query the status of a running node.
    Status,
    /// Offline Merkle access tree tooling.
    Merkle(commands::merkle::MerkleArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = NodeClient::new(&cli.endpoint, cli.caller);

    match &cli.command {
        Commands::Admin(args) => commands::roles::run_admin(&client, args).await,
        Commands::Institution(args) => commands::roles::run_institution(&client, args).await,
        Commands::Issue(args) => commands::credential::run_issue(&client, args).await,
        Commands::Credential(args) => commands::credential::run_credential(&client, args).await,
        Commands::Access(args) => commands::access::run(&client, args).await,
        Commands::Company(args) => commands::company::run(&client, args).await,
        Commands::Events(args) => commands::events::run(&client, args).await,
        Commands::Status => commands::status::run(&client).await,
        Commands::Merkle(args) => commands::merkle::run(args),
    }
}
