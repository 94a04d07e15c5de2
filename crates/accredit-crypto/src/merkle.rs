//! Merkle access trees over identity sets.
//!
//! An owner keeps the full set of authorized readers off-ledger, builds an
//! [`AccessTree`] from it and publishes only [`AccessTree::root`]. A reader's
//! membership is later shown with an [`InclusionProof`], which anyone holding
//! the root can check without learning the other members.

use serde::{Deserialize, Serialize};

use accredit_core::{Address, Digest};

use crate::error::CryptoError;
use crate::hashing::{hash_pair, leaf_hash};

/// Longest proof path accepted. A tree this deep would hold 2^64 leaves.
pub const MAX_PROOF_DEPTH: usize = 64;

/// Which side of the running hash a sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One level of an inclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// Sibling digest at this level.
    pub sibling: Digest,
    /// Position of the sibling relative to the node being proven.
    pub side: Side,
}

/// Proof that a leaf is part of the tree committed to by a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    /// The leaf being proven.
    pub leaf: Digest,
    /// Sibling path from the leaf up to the root.
    pub path: Vec<ProofStep>,
}

impl InclusionProof {
    /// Reject proofs whose shape can't come from a real tree.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.path.len() > MAX_PROOF_DEPTH {
            return Err(CryptoError::InvalidProof(format!(
                "path has {} steps, maximum is {}",
                self.path.len(),
                MAX_PROOF_DEPTH
            )));
        }
        Ok(())
    }

    /// Recompute the root implied by this proof.
    pub fn compute_root(&self) -> Digest {
        self.path.iter().fold(self.leaf, |acc, step| match step.side {
            Side::Left => hash_pair(&step.sibling, &acc),
            Side::Right => hash_pair(&acc, &step.sibling),
        })
    }

    /// Check the proof against a root. The zero root never verifies.
    pub fn verify(&self, root: &Digest) -> bool {
        !root.is_zero() && self.validate().is_ok() && self.compute_root() == *root
    }
}

/// Check that `member` is in the tree behind `root`.
///
/// The proof's leaf must be the member's own leaf hash, so a valid proof for
/// some other identity never passes for `member`.
pub fn verify_membership(member: &Address, proof: &InclusionProof, root: &Digest) -> bool {
    proof.leaf == leaf_hash(member) && proof.verify(root)
}

/// A Merkle tree over a set of identities.
#[derive(Debug, Clone)]
pub struct AccessTree {
    /// Members in leaf order (duplicates removed).
    members: Vec<Address>,
    /// All tree levels, leaves first, root level last.
    levels: Vec<Vec<Digest>>,
}

impl AccessTree {
    /// Build a tree from a member set. Duplicate members are collapsed,
    /// keeping the first occurrence.
    pub fn from_members(members: &[Address]) -> Result<Self, CryptoError> {
        let mut unique: Vec<Address> = Vec::with_capacity(members.len());
        for member in members {
            if !unique.contains(member) {
                unique.push(*member);
            }
        }
        if unique.is_empty() {
            return Err(CryptoError::EmptyTree);
        }

        let leaves: Vec<Digest> = unique.iter().map(leaf_hash).collect();
        let mut levels = vec![leaves];
        while levels[levels.len() - 1].len() > 1 {
            let next: Vec<Digest> = levels[levels.len() - 1]
                .chunks(2)
                .map(|chunk| {
                    let right = chunk.get(1).unwrap_or(&chunk[0]);
                    hash_pair(&chunk[0], right)
                })
                .collect();
            levels.push(next);
        }

        tracing::debug!(
            members = unique.len(),
            depth = levels.len() - 1,
            "access tree built"
        );

        Ok(Self {
            members: unique,
            levels,
        })
    }

    /// The root to publish on the ledger.
    pub fn root(&self) -> Digest {
        self.levels[self.levels.len() - 1][0]
    }

    /// Members in leaf order.
    pub fn members(&self) -> &[Address] {
        &self.members
    }

    /// Leaf digests in order.
    pub fn leaves(&self) -> &[Digest] {
        &self.levels[0]
    }

    /// Whether `member` is in the tree.
    pub fn contains(&self, member: &Address) -> bool {
        self.members.contains(member)
    }

    /// Number of distinct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; an access tree has at least one member.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Build an inclusion proof for `member`.
    pub fn prove(&self, member: &Address) -> Result<InclusionProof, CryptoError> {
        let leaf_index = self
            .members
            .iter()
            .position(|m| m == member)
            .ok_or_else(|| CryptoError::MemberNotFound(member.to_hex()))?;

        let mut index = leaf_index;

        let mut path = Vec::with_capacity(self.levels.len() - 1);
        for level in &self.levels[..self.levels.len() - 1] {
            let step = if index % 2 == 0 {
                // Odd element pairs with itself
                let sibling = level.get(index + 1).copied().unwrap_or(level[index]);
                ProofStep {
                    sibling,
                    side: Side::Right,
                }
            } else {
                ProofStep {
                    sibling: level[index - 1],
                    side: Side::Left,
                }
            };
            path.push(step);
            index /= 2;
        }

        Ok(InclusionProof {
            leaf: self.levels[0][leaf_index],
            path,
        })
    }
}
