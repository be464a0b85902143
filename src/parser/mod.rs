// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The trace-to-transaction pipeline: protocol-version decoder dispatch, the
//! transaction assembler, base-fee extraction and genesis synthesis. A parse
//! call is a single pass, `decode → resolve → (consolidate)`; nothing is
//! retried internally and no state outlives the call except the shared
//! actors cache.

mod error;
mod traces;
pub mod v1;
pub mod v2;

pub use error::ParserError;

use std::sync::Arc;

use ahash::HashSet;
use fvm_shared4::address::{Address, Protocol};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actors::cache::{ActorsCache, is_system_actor};
use crate::blocks::{ExtendedTipset, TipsetKey};
use crate::types::{
    AddressInfo, AddressInfoMap, BlockMetadata, EthLog, GenesisBalances, Transaction,
};

/// The closed set of protocol decoders. Each declares the node versions it
/// understands; support windows may overlap during a migration, in which
/// case the newest decoder wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderVersion {
    V1,
    V2,
}

impl DecoderVersion {
    /// Newest first.
    pub const ALL: &'static [DecoderVersion] = &[DecoderVersion::V2, DecoderVersion::V1];

    pub fn name(self) -> &'static str {
        match self {
            DecoderVersion::V1 => v1::DECODER_NAME,
            DecoderVersion::V2 => v2::DECODER_NAME,
        }
    }

    pub fn supported_versions(self) -> &'static [&'static str] {
        match self {
            DecoderVersion::V1 => v1::NODE_VERSIONS_SUPPORTED,
            DecoderVersion::V2 => v2::NODE_VERSIONS_SUPPORTED,
        }
    }

    pub fn for_node_version(version: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|decoder| decoder.supported_versions().contains(&version))
    }

    pub(crate) fn decode(
        self,
        payload: &[u8],
        tipset: &ExtendedTipset,
    ) -> Result<DecodedTraces, ParserError> {
        match self {
            DecoderVersion::V1 => v1::decode(payload, tipset),
            DecoderVersion::V2 => v2::decode(payload, tipset),
        }
    }
}

/// What a decoder emits: draft transactions in emission order, plus the raw
/// fee entries `get_base_fee` scans.
#[derive(Debug, Default)]
pub(crate) struct DecodedTraces {
    pub transactions: Vec<Transaction>,
    pub fee_entries: Vec<FeeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeeEntry {
    pub level: u16,
    pub base_fee: BigInt,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub consolidate_addresses_to_robust: ConsolidateAddressesToRobust,
}

/// Post-resolution rewrite of short-form references to their robust form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidateAddressesToRobust {
    pub enable: bool,
    /// Leave unresolved addresses as-is instead of failing the batch.
    pub best_effort: bool,
}

pub struct Parser {
    cache: Arc<ActorsCache>,
    config: ParserConfig,
}

impl Parser {
    pub fn new(cache: Arc<ActorsCache>, config: ParserConfig) -> Self {
        Self { cache, config }
    }

    /// Decodes a trace payload into normalized transactions and the registry
    /// of every actor they reference. Transaction order is the decoder's
    /// emission order.
    pub async fn parse_transactions(
        &self,
        traces: &[u8],
        tipset: &ExtendedTipset,
        eth_logs: &[EthLog],
        metadata: &BlockMetadata,
    ) -> Result<(Vec<Transaction>, AddressInfoMap), ParserError> {
        let version = &metadata.node_info.node_major_minor_version;
        let decoder = DecoderVersion::for_node_version(version)
            .ok_or_else(|| ParserError::UnsupportedVersion(version.clone()))?;
        debug!(%version, decoder = decoder.name(), "decoder selected");

        let key = tipset.key()?;
        let mut decoded = decoder.decode(traces, tipset)?;
        debug!(
            transactions = decoded.transactions.len(),
            "traces decoded, resolving actor references"
        );

        attach_eth_logs(&mut decoded.transactions, eth_logs);
        let registry = self.resolve_addresses(&decoded.transactions, &key).await;
        if self.config.consolidate_addresses_to_robust.enable {
            self.consolidate(&mut decoded.transactions).await?;
        }
        Ok((decoded.transactions, registry))
    }

    /// The base fee for the tipset the traces were computed on: the first
    /// level-zero fee entry, falling back to the first block's recorded
    /// parent base fee when no usable entry exists.
    pub fn get_base_fee(
        &self,
        traces: &[u8],
        metadata: &BlockMetadata,
        tipset: &ExtendedTipset,
    ) -> Result<BigInt, ParserError> {
        let version = &metadata.node_info.node_major_minor_version;
        let decoded = match DecoderVersion::for_node_version(version) {
            Some(decoder) => decoder.decode(traces, tipset).ok(),
            None => DecoderVersion::ALL
                .iter()
                .find_map(|decoder| decoder.decode(traces, tipset).ok()),
        };
        if let Some(decoded) = decoded {
            // Historical traces can repeat the level-zero entry; the first
            // occurrence wins, entries are never summed.
            if let Some(entry) = decoded.fee_entries.iter().find(|entry| entry.level == 0) {
                return Ok(entry.base_fee.clone());
            }
        }
        debug!("no usable level-zero fee entry, falling back to the parent base fee");
        Ok(tipset.parent_base_fee()?.clone())
    }

    /// Synthesizes one transaction per genesis balance allocation. All of
    /// them share the genesis tipset's own block and tipset identifiers, and
    /// recipients are resolved like any other actor reference.
    pub async fn parse_genesis(
        &self,
        balances: &GenesisBalances,
        genesis_tipset: &ExtendedTipset,
    ) -> Result<(Vec<Transaction>, AddressInfoMap), ParserError> {
        let key = genesis_tipset.key()?;
        let tipset_cid = key
            .cid()
            .map_err(|e| ParserError::InvalidTipset(e.to_string()))?;
        let block_cid = *genesis_tipset.first_block_cid()?;

        let mut transactions = Vec::with_capacity(balances.balances.len());
        for allocation in &balances.balances {
            transactions.push(Transaction {
                height: genesis_tipset.height,
                tipset_cid,
                block_cid,
                level: 0,
                tx_cid: block_cid,
                tx_from: Address::new_id(0).to_string(),
                tx_to: allocation.address.clone(),
                method: "Genesis".into(),
                amount: allocation.balance.clone(),
                params: String::new(),
                ret: String::new(),
                gas_used: 0,
                status: "Ok".into(),
                eth_logs: Vec::new(),
            });
        }

        let registry = self.resolve_addresses(&transactions, &key).await;
        if self.config.consolidate_addresses_to_robust.enable {
            self.consolidate(&mut transactions).await?;
        }
        Ok((transactions, registry))
    }

    /// Resolves every distinct actor reference through the cache and builds
    /// the per-call registry. A facet no tier can produce is left unset; an
    /// identity whose short form stays unknown cannot be keyed and is
    /// skipped.
    async fn resolve_addresses(&self, txs: &[Transaction], key: &TipsetKey) -> AddressInfoMap {
        let mut registry = AddressInfoMap::new();
        let mut seen = HashSet::default();
        for raw in txs
            .iter()
            .flat_map(|tx| [tx.tx_from.as_str(), tx.tx_to.as_str()])
        {
            if raw.is_empty() || !seen.insert(raw.to_string()) {
                continue;
            }
            let Ok(address) = raw.parse::<Address>() else {
                debug!(%raw, "not a parseable actor reference, skipping");
                continue;
            };
            let mut info = AddressInfo::default();
            match self.cache.get_short_address(&address).await {
                Ok(short) => info.short = Some(short),
                Err(e) => debug!(%address, "short form left unset: {e}"),
            }
            match self.cache.get_robust_address(&address).await {
                Ok(robust) => info.robust = Some(robust),
                Err(e) => debug!(%address, "robust form left unset: {e}"),
            }
            match self.cache.get_actor_code(&address, key).await {
                Ok(code) => info.actor_cid = Some(code),
                Err(e) => debug!(%address, "actor code left unset: {e}"),
            }
            registry.insert(info);
        }
        registry
    }

    /// Rewrites short-form references to their robust form. In best-effort
    /// mode an unresolved address stays as-is; otherwise it aborts the whole
    /// batch.
    async fn consolidate(&self, txs: &mut [Transaction]) -> Result<(), ParserError> {
        let best_effort = self.config.consolidate_addresses_to_robust.best_effort;
        for tx in txs.iter_mut() {
            for field in [&mut tx.tx_from, &mut tx.tx_to] {
                let Ok(address) = field.parse::<Address>() else {
                    continue;
                };
                if address.protocol() != Protocol::ID || is_system_actor(&address) {
                    continue;
                }
                match self.cache.get_robust_address(&address).await {
                    Ok(robust) => *field = robust.to_string(),
                    Err(e) if best_effort => {
                        debug!(%address, "leaving short form in place: {e}");
                    }
                    Err(e) => {
                        return Err(ParserError::Consolidation {
                            address: field.clone(),
                            source: e,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Event logs belong to the contract invocation that emitted them, matched
/// by message CID.
fn attach_eth_logs(txs: &mut [Transaction], logs: &[EthLog]) {
    if logs.is_empty() {
        return;
    }
    for tx in txs
        .iter_mut()
        .filter(|tx| tx.method == "InvokeContract" && tx.level == 0)
    {
        tx.eth_logs = logs
            .iter()
            .filter(|log| log.transaction_cid == tx.tx_cid)
            .cloned()
            .collect();
    }
}
