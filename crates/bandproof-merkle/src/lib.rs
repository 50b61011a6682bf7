//! Merkle plumbing for BandChain light-client proofs
//!
//! Everything here is deterministic byte work over sha256: rebuilding a
//! CometBFT header hash from its parts, replaying ICS23 existence proofs,
//! compacting IAVL paths and combining store roots into the app hash.
//!
//! ```text
//!  result value ──iavl path──▶ oracle store root ──multistore path──▶ app hash
//!                                                                     │
//!                                   header parts + app hash ──────────▶ block hash
//! ```
//!
//! Signatures and ABI encoding live in `bandproof-core`.

pub mod encoding;
pub mod error;
pub mod hash;
pub mod header;
pub mod iavl;
pub mod ics23;
pub mod multistore;
pub mod replay;

pub use error::{MerkleError, Result};
pub use hash::{hash_from_byte_slices, inner_hash, leaf_hash, sha256, Hash};
pub use header::{BlockHeaderParts, BlockId, BlockTime, Header, PartSetHeader, Version};
pub use iavl::IavlMerklePath;
pub use ics23::{CommitmentProof, ExistenceProof};
pub use multistore::{
    LayoutActivation, LayoutSchedule, LayoutVersion, MultiStoreProof, Side, StoreLayout,
    ORACLE_STORE,
};
pub use replay::{replay, MerkleStep};
