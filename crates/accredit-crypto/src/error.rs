/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("cannot build an access tree from an empty member set")]
    EmptyTree,

    #[error("member not in access tree: {0}")]
    MemberNotFound(String),

    #[error("malformed inclusion proof: {0}")]
    InvalidProof(String),
}
