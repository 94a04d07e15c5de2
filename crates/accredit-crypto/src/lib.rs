//! Accredit Crypto: hashing and Merkle membership proofs for credential
//! access lists.

pub mod error;
pub mod hashing;
pub mod merkle;

pub use error::CryptoError;
pub use hashing::{hash, hash_pair, leaf_hash, merkle_root};
pub use merkle::{verify_membership, AccessTree, InclusionProof, ProofStep, Side, MAX_PROOF_DEPTH};
