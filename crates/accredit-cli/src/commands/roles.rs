//! `accredit admin` and `accredit institution`.

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use accredit_core::Address;

use crate::client::NodeClient;

#[derive(Args, Debug)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Register a new admin (caller must be an admin).
    Add {
        /// Identity to register.
        address: Address,
    },
}

#[derive(Args, Debug)]
pub struct InstitutionArgs {
    #[command(subcommand)]
    pub action: InstitutionAction,
}

#[derive(Subcommand, Debug)]
pub enum InstitutionAction {
    /// List a verified institution (caller must be an admin or verified institution).
    Add {
        /// Identity to list.
        address: Address,
    },
    /// Show whether an identity is a verified institution.
    Status {
        address: Address,
    },
}

#[derive(Serialize)]
struct AddressRequest {
    address: Address,
}

#[derive(Deserialize)]
struct RoleResponse {
    address: String,
    role: String,
    status: String,
}

#[derive(Deserialize)]
struct InstitutionStatusResponse {
    address: String,
    verified: bool,
    listed_by: Option<String>,
    listed_at: Option<String>,
}

async fn add_role(client: &NodeClient, path: &str, address: Address) -> anyhow::Result<()> {
    client.caller()?;
    let data: RoleResponse = client
        .post(path, Some(&AddressRequest { address }))
        .await?;
    println!("{} {}: {}", data.role, data.status, data.address);
    Ok(())
}

pub async fn run_admin(client: &NodeClient, args: &AdminArgs) -> anyhow::Result<()> {
    match &args.action {
        AdminAction::Add { address } => add_role(client, "admins", *address).await,
    }
}

pub async fn run_institution(client: &NodeClient, args: &InstitutionArgs) -> anyhow::Result<()> {
    match &args.action {
        InstitutionAction::Add { address } => add_role(client, "institutions", *address).await,
        InstitutionAction::Status { address } => {
            let data: InstitutionStatusResponse =
                client.get(&format!("institutions/{}", address)).await?;
            println!("Institution {}", data.address);
            println!("  Verified:   {}", data.verified);
            if let Some(by) = data.listed_by {
                println!("  Listed by:  {}", by);
            }
            if let Some(at) = data.listed_at {
                println!("  Listed at:  {}", at);
            }
            Ok(())
        }
    }
}
