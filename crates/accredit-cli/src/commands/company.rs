//! `accredit company`: attestations and reputation.

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use accredit_core::Address;

use crate::client::NodeClient;

#[derive(Args, Debug)]
pub struct CompanyArgs {
    #[command(subcommand)]
    pub action: CompanyAction,
}

#[derive(Subcommand, Debug)]
pub enum CompanyAction {
    /// Attest a company as the calling verified institution.
    Add {
        address: Address,
    },
    /// Show a company's verification status and reputation score.
    Stats {
        address: Address,
    },
}

#[derive(Serialize)]
struct AddressRequest {
    address: Address,
}

#[derive(Deserialize)]
struct CompanyResponse {
    address: Address,
    verified: bool,
    attestations: u64,
    score: u64,
}

fn print_company(data: &CompanyResponse) {
    println!("Company {}", data.address);
    println!("  Verified:      {}", data.verified);
    println!("  Attestations:  {}", data.attestations);
    println!("  Score:         {}", data.score);
}

pub async fn run(client: &NodeClient, args: &CompanyArgs) -> anyhow::Result<()> {
    match &args.action {
        CompanyAction::Add { address } => {
            client.caller()?;
            let data: CompanyResponse = client
                .post("companies", Some(&AddressRequest { address: *address }))
                .await?;
            print_company(&data);
        }
        CompanyAction::Stats { address } => {
            let data: CompanyResponse = client.get(&format!("companies/{}", address)).await?;
            print_company(&data);
        }
    }
    Ok(())
}
