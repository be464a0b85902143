// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Shared test instrumentation: a programmable in-process node with call
//! counters, and deterministic fixture builders.

use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::HashMap;
use anyhow::anyhow;
use async_trait::async_trait;
use cid::Cid;
use fvm_ipld_encoding::DAG_CBOR;
use fvm_shared4::address::Address;
use fvm_shared4::clock::ChainEpoch;
use multihash_codetable::{Code, MultihashDigest};
use num_bigint::BigInt;
use parking_lot::RwLock;

use crate::blocks::{BlockSummary, ExtendedTipset, TipsetKey};
use crate::rpc::{ActorState, FullNode};

#[derive(Clone)]
struct StubActor {
    short: Address,
    robust: Option<Address>,
    code: Cid,
}

/// A [`FullNode`] whose chain state is whatever the test registered, with a
/// counter over every query so tests can assert resolution cost.
#[derive(Default)]
pub struct StubNode {
    calls: AtomicUsize,
    actors: RwLock<HashMap<String, StubActor>>,
}

impl StubNode {
    /// Makes an actor known under both of its address forms.
    pub fn register(&self, short: Address, robust: Option<Address>, code: Cid) {
        let actor = StubActor {
            short,
            robust,
            code,
        };
        let mut actors = self.actors.write();
        actors.insert(short.to_string(), actor.clone());
        if let Some(robust) = robust {
            actors.insert(robust.to_string(), actor);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn find(&self, address: &Address) -> anyhow::Result<StubActor> {
        self.actors
            .read()
            .get(&address.to_string())
            .cloned()
            .ok_or_else(|| anyhow!("actor {address} does not exist"))
    }
}

#[async_trait]
impl FullNode for StubNode {
    async fn state_get_actor(
        &self,
        address: &Address,
        _key: &TipsetKey,
    ) -> anyhow::Result<ActorState> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let actor = self.find(address)?;
        Ok(ActorState {
            code: actor.code,
            balance: None,
        })
    }

    async fn state_account_key(&self, address: &Address) -> anyhow::Result<Address> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.find(address)?
            .robust
            .ok_or_else(|| anyhow!("actor {address} has no key address"))
    }

    async fn state_lookup_id(&self, address: &Address) -> anyhow::Result<Address> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.find(address)?.short)
    }
}

/// Deterministic CID from a seed.
pub fn test_cid(seed: &[u8]) -> Cid {
    Cid::new_v1(DAG_CBOR, Code::Blake2b256.digest(seed))
}

pub fn test_tipset_key(seed: &[u8]) -> TipsetKey {
    TipsetKey::new(vec![test_cid(seed)]).unwrap()
}

/// A tipset with one deterministic block CID per seed and a parent base fee
/// of 100 on every block.
pub fn test_tipset(height: ChainEpoch, block_seeds: &[&[u8]]) -> ExtendedTipset {
    ExtendedTipset {
        height,
        cids: block_seeds.iter().map(|seed| test_cid(seed)).collect(),
        blocks: block_seeds
            .iter()
            .enumerate()
            .map(|(i, _)| BlockSummary {
                miner: format!("f0{}", 1000 + i),
                parent_base_fee: BigInt::from(100),
            })
            .collect(),
        block_messages: HashMap::default(),
    }
}
