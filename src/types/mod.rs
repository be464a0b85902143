// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Normalized output records produced by the parser, plus the raw input
//! shapes shared across protocol revisions.

mod address_info;

pub use address_info::{AddressInfo, AddressInfoMap};

use cid::Cid;
use fvm_shared4::clock::ChainEpoch;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// A single normalized transaction. Two records produced from the same trace
/// payload by different protocol decoders must compare equal field-by-field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub height: ChainEpoch,
    #[serde(with = "crate::lotus_json::stringify")]
    pub tipset_cid: Cid,
    #[serde(with = "crate::lotus_json::stringify")]
    pub block_cid: Cid,
    /// Call depth. Top-level messages are level zero, their sub-calls level
    /// one, and so on.
    pub level: u16,
    #[serde(with = "crate::lotus_json::stringify")]
    pub tx_cid: Cid,
    pub tx_from: String,
    pub tx_to: String,
    pub method: String,
    #[serde(with = "crate::lotus_json::stringify")]
    pub amount: BigInt,
    pub params: String,
    pub ret: String,
    pub gas_used: i64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eth_logs: Vec<EthLog>,
}

/// An EVM-compatible event log, as reported by the node for a message that
/// invoked a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthLog {
    pub address: String,
    pub data: String,
    pub topics: Vec<String>,
    #[serde(with = "crate::lotus_json::stringify")]
    pub transaction_cid: Cid,
}

/// Version information reported by the node that produced a trace payload.
/// Decoder selection keys off [`NodeInfo::node_major_minor_version`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeInfo {
    pub node_full_version: String,
    pub node_major_minor_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockMetadata {
    #[serde(flatten)]
    pub node_info: NodeInfo,
}

/// Initial balance allocations recorded at genesis, in allocation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisBalances {
    pub balances: Vec<GenesisAllocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAllocation {
    pub address: String,
    #[serde(with = "crate::lotus_json::stringify")]
    pub balance: BigInt,
}
