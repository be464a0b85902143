// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Tiered actor address resolution: an offline store of accumulated address
//! facts in front of the node itself, with write-back of every on-chain
//! discovery. One instance is shared for the lifetime of the process.

mod on_chain;

use anyhow::anyhow;
use fvm_shared4::address::Address;
use tracing::{debug, info, warn};

use self::on_chain::OnChainResolver;
use crate::blocks::TipsetKey;
use crate::db::{AddressStore, MemoryStore, ParityDbStore};
use crate::rpc::DataSource;
use crate::types::AddressInfo;
use cid::Cid;

/// Short IDs of the protocol-reserved system actors. They have no associated
/// robust address; their robust form is the identity itself.
pub const SYSTEM_ACTOR_IDS: &[u64] = &[0, 1, 2, 3, 4, 5, 6, 7, 99];

pub fn is_system_actor(address: &Address) -> bool {
    address.id().is_ok_and(|id| SYSTEM_ACTOR_IDS.contains(&id))
}

pub struct ActorsCache {
    offline: Box<dyn AddressStore>,
    on_chain: OnChainResolver,
}

/// Builds the process-wide cache from a data source. The persistent store is
/// preferred; failure to initialize it is non-fatal and degrades to the
/// in-memory store.
pub fn setup_actors_cache(data_source: DataSource) -> anyhow::Result<ActorsCache> {
    let on_chain = OnChainResolver::new(data_source.node.clone());
    let offline: Box<dyn AddressStore> = match &data_source.db {
        Some(config) => match ParityDbStore::open(&config.path, &config.parity_db) {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("unable to initialize kv store cache, using in-memory cache: {e}");
                Box::new(MemoryStore::default())
            }
        },
        None => Box::new(MemoryStore::default()),
    };
    info!(
        "actors cache initialized, offline store implementation: {}",
        offline.implementation_name()
    );
    Ok(ActorsCache { offline, on_chain })
}

impl ActorsCache {
    /// The actor's code CID at the given chain-state reference.
    pub async fn get_actor_code(
        &self,
        address: &Address,
        key: &TipsetKey,
    ) -> anyhow::Result<Cid> {
        let cached = self.lookup(address)?;
        if let Some(code) = cached.actor_cid {
            return Ok(code);
        }
        debug!(%address, "actor code not cached, trying the node");
        let discovered = self
            .on_chain
            .resolve_missing(address, Some(key), cached)
            .await;
        self.write_back(&discovered)?;
        discovered
            .actor_cid
            .ok_or_else(|| anyhow!("actor code for {address} unavailable at tipset [{key}]"))
    }

    /// The robust form of an identity. System actors short-circuit to
    /// themselves without touching either tier.
    pub async fn get_robust_address(&self, address: &Address) -> anyhow::Result<Address> {
        if is_system_actor(address) {
            return Ok(*address);
        }
        let cached = self.lookup(address)?;
        if let Some(robust) = cached.robust {
            return Ok(robust);
        }
        debug!(%address, "robust address not cached, trying the node");
        let discovered = self.on_chain.resolve_missing(address, None, cached).await;
        self.write_back(&discovered)?;
        discovered
            .robust
            .ok_or_else(|| anyhow!("robust address for {address} unavailable"))
    }

    /// The short (ID) form of an identity.
    pub async fn get_short_address(&self, address: &Address) -> anyhow::Result<Address> {
        let cached = self.lookup(address)?;
        if let Some(short) = cached.short {
            return Ok(short);
        }
        debug!(%address, "short address not cached, trying the node");
        let discovered = self.on_chain.resolve_missing(address, None, cached).await;
        self.write_back(&discovered)?;
        discovered
            .short
            .ok_or_else(|| anyhow!("short address for {address} unavailable"))
    }

    pub fn offline_store_name(&self) -> &'static str {
        self.offline.implementation_name()
    }

    fn lookup(&self, address: &Address) -> anyhow::Result<AddressInfo> {
        Ok(self
            .offline
            .get_address_info(&address.to_string())?
            .unwrap_or_default())
    }

    fn write_back(&self, discovered: &AddressInfo) -> anyhow::Result<()> {
        // A record with no address form cannot be keyed; there is nothing
        // worth remembering in that case anyway.
        if discovered.short.is_none() && discovered.robust.is_none() {
            return Ok(());
        }
        self.offline.store_address_info(discovered.clone())
    }
}
