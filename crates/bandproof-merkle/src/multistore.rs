//! multistore (application hash) combination
//!
//! The app hash is a simple merkle tree over every module store, leaves in
//! alphabetical order of store name. Which stores exist depends on the
//! chain version, so layouts are explicit and versioned; old layouts stay
//! around for verifying old blocks.
//!
//! ```text
//! laozi, 17 stores, oracle at index 11:
//!
//!                                 [app hash]
//!                    ____________/          \
//!          _________[0..16]_________        [upgrade]
//!         /                         \
//!   [acc..feegrant]          _____[8..16]_____
//!                           /                 \
//!                      [8..12]          [params..transfer]
//!                     /       \
//!               [gov, ibc]   [mint, oracle]
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::encoding::put_length_prefixed;
use crate::error::{MerkleError, Result};
use crate::hash::{ensure_root, inner_hash, leaf_hash, sha256, split_point, to_hash, Hash, INNER_PREFIX};
use crate::ics23::{ExistenceProof, HashOp};
use crate::replay::{replay, MerkleStep};

pub const ORACLE_STORE: &str = "oracle";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LayoutVersion {
    Laozi,
    V2,
}

impl LayoutVersion {
    pub fn layout(self) -> &'static StoreLayout {
        match self {
            LayoutVersion::Laozi => &LAOZI,
            LayoutVersion::V2 => &V2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LayoutVersion::Laozi => "laozi",
            LayoutVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutVersion {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "laozi" | "v1" => Ok(LayoutVersion::Laozi),
            "v2" => Ok(LayoutVersion::V2),
            other => Err(MerkleError::malformed(format!("unknown store layout: {}", other))),
        }
    }
}

/// Ordered store names making up the application hash.
#[derive(Debug, PartialEq, Eq)]
pub struct StoreLayout {
    pub version: LayoutVersion,
    pub stores: &'static [&'static str],
}

pub static LAOZI: StoreLayout = StoreLayout {
    version: LayoutVersion::Laozi,
    stores: &[
        "acc", "authz", "bank", "capability", "crisis", "distribution", "evidence", "feegrant",
        "gov", "ibc", "mint", "oracle", "params", "slashing", "staking", "transfer", "upgrade",
    ],
};

pub static V2: StoreLayout = StoreLayout {
    version: LayoutVersion::V2,
    stores: &[
        "acc", "authz", "bandtss", "bank", "capability", "consensus", "crisis", "distribution",
        "evidence", "feeds", "feegrant", "globalfee", "gov", "group", "ibc", "icahost", "mint",
        "oracle", "params", "rollingseed", "slashing", "staking", "transfer", "tss", "upgrade",
    ],
};

/// Which side of the running hash a sibling sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// the single step this sibling contributes to a simple-tree path
    pub fn step(self, sibling: &Hash) -> MerkleStep {
        match self {
            Side::Left => {
                let mut prefix = Vec::with_capacity(33);
                prefix.push(INNER_PREFIX);
                prefix.extend_from_slice(sibling);
                MerkleStep::new(prefix, Vec::new())
            }
            Side::Right => MerkleStep::new(vec![INNER_PREFIX], sibling.to_vec()),
        }
    }

    /// Inverse of [`Side::step`], None if the step is not simple-tree shaped.
    pub fn parse(step: &MerkleStep) -> Option<(Side, Hash)> {
        match (step.prefix.as_slice(), step.suffix.len()) {
            ([INNER_PREFIX], 32) => step.suffix.as_slice().try_into().ok().map(|h| (Side::Right, h)),
            ([INNER_PREFIX, rest @ ..], 0) if rest.len() == 32 => {
                rest.try_into().ok().map(|h| (Side::Left, h))
            }
            _ => None,
        }
    }
}

/// Multistore leaf: `leaf_hash(len(name) name 0x20 sha256(root))`.
pub fn store_leaf_hash(name: &str, root: &Hash) -> Hash {
    let mut kv = Vec::with_capacity(name.len() + 34);
    put_length_prefixed(&mut kv, name.as_bytes());
    put_length_prefixed(&mut kv, &sha256(root));
    leaf_hash(&kv)
}

fn root_of_leaves(leaves: &[Hash]) -> Hash {
    match leaves.len() {
        0 => sha256(&[]),
        1 => leaves[0],
        n => {
            let k = split_point(n);
            inner_hash(&root_of_leaves(&leaves[..k]), &root_of_leaves(&leaves[k..]))
        }
    }
}

fn sides_into(n: usize, index: usize, out: &mut Vec<Side>) {
    if n <= 1 {
        return;
    }
    let k = split_point(n);
    if index < k {
        sides_into(k, index, out);
        out.push(Side::Right);
    } else {
        sides_into(n - k, index - k, out);
        out.push(Side::Left);
    }
}

fn path_into(leaves: &[Hash], index: usize, out: &mut Vec<MerkleStep>) {
    if leaves.len() <= 1 {
        return;
    }
    let k = split_point(leaves.len());
    if index < k {
        path_into(&leaves[..k], index, out);
        out.push(Side::Right.step(&root_of_leaves(&leaves[k..])));
    } else {
        path_into(&leaves[k..], index - k, out);
        out.push(Side::Left.step(&root_of_leaves(&leaves[..k])));
    }
}

impl StoreLayout {
    pub fn index_of(&self, store: &str) -> Result<usize> {
        self.stores.iter().position(|s| *s == store).ok_or_else(|| {
            MerkleError::malformed(format!(
                "store {} is not part of the {} layout",
                store, self.version
            ))
        })
    }

    /// Leaf-to-root sides of the siblings on `store`'s path.
    pub fn sibling_sides(&self, store: &str) -> Result<Vec<Side>> {
        let index = self.index_of(store)?;
        let mut sides = Vec::new();
        sides_into(self.stores.len(), index, &mut sides);
        Ok(sides)
    }

    fn leaves(&self, roots: &[Hash]) -> Result<Vec<Hash>> {
        if roots.len() != self.stores.len() {
            return Err(MerkleError::malformed(format!(
                "{} layout has {} stores, got {} roots",
                self.version,
                self.stores.len(),
                roots.len()
            )));
        }
        Ok(self
            .stores
            .iter()
            .zip(roots)
            .map(|(name, root)| store_leaf_hash(name, root))
            .collect())
    }

    /// App hash over a full set of store roots given in layout order.
    pub fn root(&self, roots: &[Hash]) -> Result<Hash> {
        Ok(root_of_leaves(&self.leaves(roots)?))
    }

    /// Oracle multistore proof built from a full set of store roots.
    pub fn prove(&self, roots: &[Hash]) -> Result<MultiStoreProof> {
        let leaves = self.leaves(roots)?;
        let index = self.index_of(ORACLE_STORE)?;
        let mut merkle_path = Vec::new();
        path_into(&leaves, index, &mut merkle_path);
        Ok(MultiStoreProof {
            oracle_iavl_state_hash: roots[index],
            merkle_path,
        })
    }
}

/// Oracle store root plus the sibling path up to the app hash.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiStoreProof {
    #[cfg_attr(feature = "serde", serde(with = "hex::serde"))]
    pub oracle_iavl_state_hash: Hash,
    pub merkle_path: Vec<MerkleStep>,
}

impl MultiStoreProof {
    /// Validate a raw multistore existence proof against `layout`.
    ///
    /// The key must be the oracle store, the leaf must be the simple-tree
    /// leaf, and each step must carry exactly one sibling on the side the
    /// layout puts it. A path that does not fit is rejected rather than
    /// reinterpreted.
    pub fn from_existence_proof(ep: &ExistenceProof, layout: &StoreLayout) -> Result<Self> {
        if ep.key != ORACLE_STORE.as_bytes() {
            return Err(MerkleError::malformed(format!(
                "multistore proof is for store {:?}, expected {}",
                String::from_utf8_lossy(&ep.key),
                ORACLE_STORE
            )));
        }
        let leaf = ep.leaf_op()?;
        if leaf.prefix != [0x00] || leaf.prehash_value != HashOp::Sha256 as i32 {
            return Err(MerkleError::malformed("multistore leaf is not a simple-tree leaf"));
        }
        let oracle_iavl_state_hash = to_hash(&ep.value, "oracle store root")?;

        let steps = ep.steps()?;
        let sides = layout.sibling_sides(ORACLE_STORE)?;
        if steps.len() != sides.len() {
            return Err(MerkleError::malformed(format!(
                "multistore path has {} steps, {} layout needs {}",
                steps.len(),
                layout.version,
                sides.len()
            )));
        }
        for (i, (step, expected)) in steps.iter().zip(&sides).enumerate() {
            match Side::parse(step) {
                Some((side, _)) if side == *expected => {}
                _ => {
                    return Err(MerkleError::malformed(format!(
                        "multistore step {} must carry a sibling on the {:?}",
                        i, expected
                    )))
                }
            }
        }

        let proof = Self {
            oracle_iavl_state_hash,
            merkle_path: steps,
        };
        // the compact form must agree with the raw proof it came from
        ensure_root("multistore proof", &ep.calculate_root()?, &proof.app_hash())?;
        debug!(layout = %layout.version, steps = proof.merkle_path.len(), "compacted multistore proof");
        Ok(proof)
    }

    pub fn app_hash(&self) -> Hash {
        let leaf = store_leaf_hash(ORACLE_STORE, &self.oracle_iavl_state_hash);
        replay(leaf, &self.merkle_path)
    }

    pub fn verify(&self, expected_app_hash: &Hash) -> Result<()> {
        ensure_root("app hash", expected_app_hash, &self.app_hash())
    }

    /// Siblings as (side, hash), leaf to root.
    pub fn siblings(&self) -> Result<Vec<(Side, Hash)>> {
        self.merkle_path
            .iter()
            .enumerate()
            .map(|(i, step)| {
                Side::parse(step).ok_or_else(|| {
                    MerkleError::malformed(format!("multistore step {} is not simple-tree shaped", i))
                })
            })
            .collect()
    }
}

/// One entry of a [`LayoutSchedule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutActivation {
    pub from_height: u64,
    pub layout: LayoutVersion,
}

/// Which layout is in force at which height.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LayoutSchedule(Vec<LayoutActivation>);

impl LayoutSchedule {
    pub fn new(mut entries: Vec<LayoutActivation>) -> Self {
        entries.sort_by_key(|e| e.from_height);
        Self(entries)
    }

    pub fn single(layout: LayoutVersion) -> Self {
        Self(vec![LayoutActivation {
            from_height: 0,
            layout,
        }])
    }

    pub fn layout_at(&self, height: u64) -> Result<&'static StoreLayout> {
        // entries may come unsorted from config
        self.0
            .iter()
            .filter(|e| e.from_height <= height)
            .max_by_key(|e| e.from_height)
            .map(|e| e.layout.layout())
            .ok_or_else(|| MerkleError::malformed(format!("no store layout active at height {}", height)))
    }
}

impl Default for LayoutSchedule {
    fn default() -> Self {
        Self::single(LayoutVersion::Laozi)
    }
}
