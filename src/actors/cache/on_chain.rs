// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use fvm_shared4::address::Address;
use tracing::debug;

use super::is_system_actor;
use crate::blocks::TipsetKey;
use crate::rpc::FullNode;
use crate::types::AddressInfo;

/// The authoritative tier: every lookup is a node query scoped to live chain
/// state. Holds no state of its own beyond the node handle.
pub(super) struct OnChainResolver {
    node: Arc<dyn FullNode>,
}

impl OnChainResolver {
    pub(super) fn new(node: Arc<dyn FullNode>) -> Self {
        Self { node }
    }

    /// One authoritative round for a cold identity: fetches every facet the
    /// record is still missing, so the write-back has a complementary facet
    /// to key the merge without re-entering the cache's resolve path. At most
    /// one node query per facet, never recursion.
    pub(super) async fn resolve_missing(
        &self,
        address: &Address,
        key: Option<&TipsetKey>,
        mut known: AddressInfo,
    ) -> AddressInfo {
        if known.short.is_none() {
            match self.node.state_lookup_id(address).await {
                Ok(short) => known.short = Some(short),
                Err(e) => debug!(%address, "short form unavailable on chain: {e}"),
            }
        }
        if known.robust.is_none() {
            if is_system_actor(address) {
                // Self-identifying; the node would report no key address.
                known.robust = known.short.or(Some(*address));
            } else {
                match self.node.state_account_key(address).await {
                    Ok(robust) => known.robust = Some(robust),
                    Err(e) => debug!(%address, "robust form unavailable on chain: {e}"),
                }
            }
        }
        if let Some(key) = key
            && known.actor_cid.is_none()
        {
            match self.node.state_get_actor(address, key).await {
                Ok(state) => known.actor_cid = Some(state.code),
                Err(e) => debug!(%address, %key, "actor state unavailable on chain: {e}"),
            }
        }
        known
    }
}
