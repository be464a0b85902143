// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::fmt;

use ahash::HashMap;
use cid::Cid;
use fvm_ipld_encoding::DAG_CBOR;
use fvm_shared4::clock::ChainEpoch;
use itertools::Itertools;
use multihash_codetable::{Code, MultihashDigest};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use super::Error;

/// An opaque reference to one consistent snapshot of chain state: the ordered,
/// non-empty set of block CIDs at a single height. State-dependent lookups
/// (e.g. an actor's code) are only valid when scoped to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TipsetKey(Vec<Cid>);

impl TipsetKey {
    pub fn new(cids: Vec<Cid>) -> Result<Self, Error> {
        if cids.is_empty() {
            return Err(Error::NoBlocks);
        }
        Ok(Self(cids))
    }

    pub fn cids(&self) -> &[Cid] {
        &self.0
    }

    /// The canonical CID of the tipset itself: Blake2b-256 over the DAG-CBOR
    /// encoding of the block CIDs, matching the lotus derivation.
    pub fn cid(&self) -> anyhow::Result<Cid> {
        let bytes = fvm_ipld_encoding::to_vec(&self.0)?;
        Ok(Cid::new_v1(DAG_CBOR, Code::Blake2b256.digest(&bytes)))
    }
}

impl fmt::Display for TipsetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}

/// Per-block header summary carried alongside a tipset. Only the fields the
/// parser consumes are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlockSummary {
    #[serde(default)]
    pub miner: String,
    #[serde(with = "crate::lotus_json::stringify")]
    pub parent_base_fee: BigInt,
}

/// A tipset as supplied by the external loader: the raw header data for one
/// chain height, plus the per-block message index used to attribute a message
/// to the block that contained it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExtendedTipset {
    pub height: ChainEpoch,
    #[serde(with = "crate::lotus_json::lotus_cid_vec")]
    pub cids: Vec<Cid>,
    pub blocks: Vec<BlockSummary>,
    /// Block CID (string form) to the message CIDs it contains. Optional;
    /// messages not present in the index are attributed to the first block.
    #[serde(default)]
    pub block_messages: HashMap<String, Vec<String>>,
}

impl ExtendedTipset {
    pub fn key(&self) -> Result<TipsetKey, Error> {
        TipsetKey::new(self.cids.clone())
    }

    pub fn first_block_cid(&self) -> Result<&Cid, Error> {
        self.cids.first().ok_or(Error::NoBlocks)
    }

    /// `ParentBaseFee` recorded by the first block of the tipset.
    pub fn parent_base_fee(&self) -> Result<&BigInt, Error> {
        self.blocks
            .first()
            .map(|block| &block.parent_base_fee)
            .ok_or(Error::NoBlocks)
    }

    /// The block a message belongs to, falling back to the first block when
    /// the index does not know the message.
    pub fn block_cid_for_message(&self, message: &Cid) -> Result<Cid, Error> {
        let needle = message.to_string();
        for (block, messages) in &self.block_messages {
            if messages.contains(&needle) {
                return block
                    .parse()
                    .map_err(|e| Error::InvalidTipset(format!("bad block CID {block}: {e}")));
            }
        }
        self.first_block_cid().copied()
    }
}
