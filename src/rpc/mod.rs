// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Contract of the node the parser is pointed at. Transport, auth and
//! timeouts live with the implementor; failures surface here as ordinary
//! errors and are treated as resolution failures by the cache.

use std::sync::Arc;

use async_trait::async_trait;
use cid::Cid;
use fvm_shared4::address::Address;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::blocks::TipsetKey;
use crate::db::DbConfig;

/// On-chain actor state as reported by `StateGetActor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActorState {
    #[serde(with = "crate::lotus_json::lotus_cid")]
    pub code: Cid,
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub balance: Option<BigInt>,
}

/// The subset of the full-node API the resolver depends on, using the lotus
/// method names. This is the authoritative source of truth; it does not
/// cache.
#[async_trait]
pub trait FullNode: Send + Sync {
    /// Actor state (including its code CID) at the given chain-state
    /// reference.
    async fn state_get_actor(&self, address: &Address, key: &TipsetKey)
    -> anyhow::Result<ActorState>;

    /// Robust form of an actor identity.
    async fn state_account_key(&self, address: &Address) -> anyhow::Result<Address>;

    /// Short (ID) form of an actor identity.
    async fn state_lookup_id(&self, address: &Address) -> anyhow::Result<Address>;
}

/// Everything the actors cache is constructed from: the node handle and the
/// optional persistent-store configuration.
#[derive(Clone)]
pub struct DataSource {
    pub node: Arc<dyn FullNode>,
    pub db: Option<DbConfig>,
}
