//! `accredit access`: publish access roots and run the request/grant exchange.

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use accredit_core::{Address, Digest};
use accredit_crypto::{verify_membership, AccessTree, InclusionProof};

use crate::client::NodeClient;

#[derive(Args, Debug)]
pub struct AccessArgs {
    #[command(subcommand)]
    pub action: AccessAction,
}

#[derive(Subcommand, Debug)]
pub enum AccessAction {
    /// Show the access root currently published for a credential.
    Root {
        id: u64,
    },
    /// Publish the root of a new reader set (owner only).
    Update {
        id: u64,
        /// Authorized reader; repeat for each member.
        #[arg(long = "member", required = true)]
        members: Vec<Address>,
    },
    /// Request read access as the caller.
    Request {
        id: u64,
    },
    /// Answer a verifier's request with a membership proof (owner only).
    Grant {
        id: u64,
        /// Verifier being answered.
        verifier: Address,
        /// Full reader set the published root was built from.
        #[arg(long = "member", required = true)]
        members: Vec<Address>,
    },
}

#[derive(Serialize)]
struct UpdateAccessRequest {
    access_root: Digest,
}

#[derive(Serialize)]
struct GrantAccessRequest {
    verifier: Address,
    proof_is_valid: bool,
    proof: InclusionProof,
}

#[derive(Deserialize)]
struct AccessRootResponse {
    credential_id: u64,
    access_root: Digest,
}

#[derive(Deserialize)]
struct AccessRequestResponse {
    credential_id: u64,
    verifier: Address,
    access_root: Digest,
}

#[derive(Deserialize)]
struct GrantResponse {
    credential_id: u64,
    verifier: Address,
    status: String,
}

/// Build the grant body locally. The proof is checked against the root the
/// ledger currently holds so `proof_is_valid` reflects what it will see.
fn build_grant(
    members: &[Address],
    verifier: Address,
    published: &Digest,
) -> anyhow::Result<GrantAccessRequest> {
    let tree = AccessTree::from_members(members)?;
    if tree.root() != *published {
        anyhow::bail!(
            "reader set does not match the published root {} (local root {})",
            published,
            tree.root()
        );
    }
    let proof = tree.prove(&verifier)?;
    let proof_is_valid = verify_membership(&verifier, &proof, published);
    Ok(GrantAccessRequest {
        verifier,
        proof_is_valid,
        proof,
    })
}

pub async fn run(client: &NodeClient, args: &AccessArgs) -> anyhow::Result<()> {
    match &args.action {
        AccessAction::Root { id } => {
            let data: AccessRootResponse =
                client.get(&format!("credentials/{}/access", id)).await?;
            println!("Credential {} access root: {}", data.credential_id, data.access_root);
        }
        AccessAction::Update { id, members } => {
            client.caller()?;
            let tree = AccessTree::from_members(members)?;
            let body = UpdateAccessRequest {
                access_root: tree.root(),
            };
            let data: AccessRootResponse = client
                .put(&format!("credentials/{}/access", id), &body)
                .await?;
            println!("Access list updated for credential {}", data.credential_id);
            println!("  Readers:  {}", tree.len());
            println!("  Root:     {}", data.access_root);
        }
        AccessAction::Request { id } => {
            client.caller()?;
            let data: AccessRequestResponse = client
                .post::<(), _>(&format!("credentials/{}/requests", id), None)
                .await?;
            println!("Access requested for credential {}", data.credential_id);
            println!("  Verifier:  {}", data.verifier);
            println!("  Root:      {}", data.access_root);
        }
        AccessAction::Grant {
            id,
            verifier,
            members,
        } => {
            client.caller()?;
            let current: AccessRootResponse =
                client.get(&format!("credentials/{}/access", id)).await?;
            let body = build_grant(members, *verifier, &current.access_root)?;
            let data: GrantResponse = client
                .post(&format!("credentials/{}/grants", id), Some(&body))
                .await?;
            println!(
                "Access {} for {} on credential {}",
                data.status, data.verifier, data.credential_id
            );
        }
    }
    Ok(())
}
