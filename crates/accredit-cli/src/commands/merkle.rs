//! `accredit merkle`: offline access tree tooling. No node required.

use clap::{Args, Subcommand};

use accredit_core::{Address, Digest};
use accredit_crypto::{verify_membership, AccessTree, InclusionProof};

#[derive(Args, Debug)]
pub struct MerkleArgs {
    #[command(subcommand)]
    pub action: MerkleAction,
}

#[derive(Subcommand, Debug)]
pub enum MerkleAction {
    /// Compute the access root of a reader set.
    Root {
        #[arg(long = "member", required = true)]
        members: Vec<Address>,
    },
    /// Print an inclusion proof for one member as JSON.
    Prove {
        #[arg(long = "member", required = true)]
        members: Vec<Address>,
        target: Address,
    },
    /// Check an inclusion proof against a root.
    Verify {
        #[arg(long)]
        root: Digest,
        member: Address,
        /// Proof JSON as printed by `merkle prove`.
        #[arg(long)]
        proof: String,
    },
}

fn prove(members: &[Address], target: &Address) -> anyhow::Result<String> {
    let tree = AccessTree::from_members(members)?;
    let proof = tree.prove(target)?;
    Ok(serde_json::to_string_pretty(&proof)?)
}

fn verify(root: &Digest, member: &Address, proof_json: &str) -> anyhow::Result<bool> {
    let proof: InclusionProof = serde_json::from_str(proof_json)?;
    proof.validate()?;
    Ok(verify_membership(member, &proof, root))
}

pub fn run(args: &MerkleArgs) -> anyhow::Result<()> {
    match &args.action {
        MerkleAction::Root { members } => {
            let tree = AccessTree::from_members(members)?;
            println!("{}", tree.root());
        }
        MerkleAction::Prove { members, target } => {
            println!("{}", prove(members, target)?);
        }
        MerkleAction::Verify {
            root,
            member,
            proof,
        } => {
            if verify(root, member, proof)? {
                println!("valid: {} is a member", member);
            } else {
                anyhow::bail!("invalid: {} is not proven against {}", member, root);
            }
        }
    }
    Ok(())
}
