// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use anyhow::anyhow;
use parity_db::{CompressionType, Db, Options};
use parking_lot::Mutex;
use strum::{Display, EnumIter, FromRepr, IntoEnumIterator};

use super::{AddressStore, store_keys};
use crate::types::AddressInfo;

/// Column assignments for the address store's `ParityDb` instance.
#[derive(Copy, Clone, Debug, Display, PartialEq, FromRepr, EnumIter)]
#[repr(u8)]
enum DbColumn {
    /// Address facts keyed by short or robust string form, JSON-encoded.
    Addresses,
}

impl DbColumn {
    fn create_column_options(compression: CompressionType) -> Vec<parity_db::ColumnOptions> {
        DbColumn::iter()
            .map(|col| match col {
                DbColumn::Addresses => parity_db::ColumnOptions {
                    // Entries are merged in place, so they must stay
                    // overwritable and retrievable by key.
                    preimage: false,
                    btree_index: true,
                    compression,
                    ..Default::default()
                },
            })
            .collect()
    }
}

/// Persistent offline store backed by `ParityDb`.
pub struct ParityDbStore {
    db: Db,
    /// Serializes the read-modify-write merge; plain column writes are
    /// already atomic.
    merge_lock: Mutex<()>,
}

impl ParityDbStore {
    fn to_options(path: PathBuf, config: &super::ParityDbConfig) -> Options {
        Options {
            path,
            sync_wal: true,
            sync_data: true,
            stats: config.enable_statistics,
            salt: None,
            columns: DbColumn::create_column_options(CompressionType::Lz4),
            compression_threshold: [(0, 128)].into_iter().collect(),
        }
    }

    pub fn open(
        path: impl Into<PathBuf>,
        config: &super::ParityDbConfig,
    ) -> anyhow::Result<Self> {
        let opts = Self::to_options(path.into(), config);
        Ok(Self {
            db: Db::open_or_create(&opts)?,
            merge_lock: Mutex::new(()),
        })
    }

    fn read(&self, key: &str) -> anyhow::Result<Option<AddressInfo>> {
        let column = DbColumn::Addresses;
        let bytes = self
            .db
            .get(column as u8, key.as_bytes())
            .map_err(|e| anyhow!("error from column {column}: {e}"))?;
        bytes
            .map(|bytes| serde_json::from_slice(&bytes).map_err(Into::into))
            .transpose()
    }
}

impl AddressStore for ParityDbStore {
    fn get_address_info(&self, key: &str) -> anyhow::Result<Option<AddressInfo>> {
        self.read(key)
    }

    fn store_address_info(&self, info: AddressInfo) -> anyhow::Result<()> {
        let keys = store_keys(&info);
        if keys.is_empty() {
            anyhow::bail!("address info carries neither short nor robust form");
        }
        let _guard = self.merge_lock.lock();
        let mut merged = AddressInfo::default();
        for key in &keys {
            if let Some(existing) = self.read(key)? {
                merged.merge(existing);
            }
        }
        merged.merge(info);
        let value = serde_json::to_vec(&merged)?;
        let column = DbColumn::Addresses;
        self.db
            .commit(
                store_keys(&merged)
                    .into_iter()
                    .map(|key| (column as u8, key.into_bytes(), Some(value.clone()))),
            )
            .map_err(|e| anyhow!("error from column {column}: {e}"))
    }

    fn implementation_name(&self) -> &'static str {
        "parity-db"
    }
}
