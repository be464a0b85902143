// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::HashMap;
use parking_lot::RwLock;

use super::{AddressStore, store_keys};
use crate::types::AddressInfo;

/// Volatile offline store. The degrade path when the persistent store fails
/// to initialize, and the default for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    addresses: RwLock<HashMap<String, AddressInfo>>,
}

impl AddressStore for MemoryStore {
    fn get_address_info(&self, key: &str) -> anyhow::Result<Option<AddressInfo>> {
        Ok(self.addresses.read().get(key).cloned())
    }

    fn store_address_info(&self, info: AddressInfo) -> anyhow::Result<()> {
        let keys = store_keys(&info);
        if keys.is_empty() {
            anyhow::bail!("address info carries neither short nor robust form");
        }
        // The write lock spans the read-modify-write so concurrent partial
        // writes for the same identity cannot erase each other's facets.
        let mut addresses = self.addresses.write();
        let mut merged = AddressInfo::default();
        for key in &keys {
            if let Some(existing) = addresses.get(key) {
                merged.merge(existing.clone());
            }
        }
        merged.merge(info);
        for key in store_keys(&merged) {
            addresses.insert(key, merged.clone());
        }
        Ok(())
    }

    fn implementation_name(&self) -> &'static str {
        "in-memory"
    }
}
