// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod memory;
pub mod parity_db;
pub mod parity_db_config;

pub use memory::MemoryStore;
pub use parity_db::ParityDbStore;
pub use parity_db_config::ParityDbConfig;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::AddressInfo;

/// Interface used to store and retrieve accumulated address facts.
///
/// A missing record is a normal `Ok(None)`, not an error; it is the signal
/// that triggers the on-chain fallback. Implementations must serialize
/// merge-writes so that concurrent partial writes for the same identity
/// never erase a previously stored facet.
pub trait AddressStore: Send + Sync {
    /// Point read, keyed by whichever representation the caller holds
    /// (short or robust string form).
    fn get_address_info(&self, key: &str) -> anyhow::Result<Option<AddressInfo>>;

    /// Merge-write: folds `info` into any existing record for the same
    /// identity rather than replacing it. The record must be retrievable
    /// under every identity form it carries.
    fn store_address_info(&self, info: AddressInfo) -> anyhow::Result<()>;

    /// Identity tag for observability.
    fn implementation_name(&self) -> &'static str;
}

/// Lookup keys a record can be found under. Empty for a record carrying
/// neither address form; such records cannot be stored.
pub(crate) fn store_keys(info: &AddressInfo) -> Vec<String> {
    [info.short, info.robust]
        .into_iter()
        .flatten()
        .map(|address| address.to_string())
        .collect()
}

/// Configuration of the persistent offline store. Absence means the
/// in-memory store is used from the start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub path: PathBuf,
    pub parity_db: ParityDbConfig,
}
