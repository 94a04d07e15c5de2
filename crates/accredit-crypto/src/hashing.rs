use accredit_core::{Address, Digest};

/// Hash arbitrary data using BLAKE3.
pub fn hash(data: &[u8]) -> Digest {
    Digest(*blake3::hash(data).as_bytes())
}

/// Hash two child nodes into their parent: H(left || right).
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Digest(*hasher.finalize().as_bytes())
}

/// Leaf value for an identity in an access tree: H(address bytes).
pub fn leaf_hash(address: &Address) -> Digest {
    hash(address.as_bytes())
}

/// Compute the Merkle root of a list of leaves.
/// Returns the zero digest for empty input and the leaf itself for a single leaf.
/// An odd trailing node is paired with itself.
pub fn merkle_root(leaves: &[Digest]) -> Digest {
    if leaves.is_empty() {
        return Digest::ZERO;
    }

    let mut current_level: Vec<Digest> = leaves.to_vec();
    while current_level.len() > 1 {
        current_level = current_level
            .chunks(2)
            .map(|chunk| {
                let right = chunk.get(1).unwrap_or(&chunk[0]);
                hash_pair(&chunk[0], right)
            })
            .collect();
    }

    current_level[0]
}
