//! `accredit issue` and `accredit credential`.

use clap::{Args, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use accredit_core::Address;

use crate::client::NodeClient;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum IssuerRole {
    /// Accept either a verified institution or a verified company.
    Any,
    Institution,
    Company,
}

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Identity that will own the credential.
    #[arg(short, long)]
    pub owner: Address,

    /// Pointer to the off-ledger credential content.
    #[arg(short, long)]
    pub pointer: String,

    /// Issuance path to use.
    #[arg(long, value_enum, default_value_t = IssuerRole::Any)]
    pub role: IssuerRole,
}

#[derive(Args, Debug)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub action: CredentialAction,
}

#[derive(Subcommand, Debug)]
pub enum CredentialAction {
    /// Show a credential you own, including its pointer.
    Get {
        /// Credential id.
        id: u64,
    },
}

#[derive(Serialize)]
struct IssueRequest {
    owner: Address,
    pointer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    issuer_kind: Option<&'static str>,
}

#[derive(Deserialize)]
struct IssuedResponse {
    credential_id: u64,
    owner: String,
    issuer: String,
    issuer_kind: String,
}

#[derive(Deserialize)]
struct CredentialResponse {
    credential_id: u64,
    owner: String,
    issuer: String,
    issuer_kind: String,
    pointer: String,
    issued_at: String,
    access_root: String,
}

fn issuer_kind(role: IssuerRole) -> Option<&'static str> {
    match role {
        IssuerRole::Any => None,
        IssuerRole::Institution => Some("Institution"),
        IssuerRole::Company => Some("Company"),
    }
}

pub async fn run_issue(client: &NodeClient, args: &IssueArgs) -> anyhow::Result<()> {
    client.caller()?;
    if args.pointer.trim().is_empty() {
        anyhow::bail!("pointer must not be empty");
    }

    let body = IssueRequest {
        owner: args.owner,
        pointer: args.pointer.clone(),
        issuer_kind: issuer_kind(args.role),
    };
    let data: IssuedResponse = client.post("credentials", Some(&body)).await?;
    println!("Credential issued!");
    println!("  ID:       {}", data.credential_id);
    println!("  Owner:    {}", data.owner);
    println!("  Issuer:   {} ({})", data.issuer, data.issuer_kind);
    Ok(())
}

pub async fn run_credential(client: &NodeClient, args: &CredentialArgs) -> anyhow::Result<()> {
    match &args.action {
        CredentialAction::Get { id } => {
            client.caller()?;
            let data: CredentialResponse = client.get(&format!("credentials/{}", id)).await?;
            println!("Credential {}", data.credential_id);
            println!("  Owner:        {}", data.owner);
            println!("  Issuer:       {} ({})", data.issuer, data.issuer_kind);
            println!("  Pointer:      {}", data.pointer);
            println!("  Issued at:    {}", data.issued_at);
            println!("  Access root:  {}", data.access_root);
            Ok(())
        }
    }
}
