// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Raw trace shapes shared by the protocol decoders. Fields the revisions
//! disagree on are optional here; each decoder decides what it requires.

use std::io::Read;

use cid::Cid;
use num_bigint::BigInt;
use serde::Deserialize;

use crate::rpc::ActorState;

/// Output of the node's compute-state call: the traces of every message
/// applied on top of a tipset.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ComputeStateOutput {
    #[serde(default, with = "crate::lotus_json::lotus_cid_opt")]
    pub root: Option<Cid>,
    pub trace: Vec<InvocResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InvocResult {
    #[serde(with = "crate::lotus_json::lotus_cid")]
    pub msg_cid: Cid,
    pub msg: TraceMessage,
    pub msg_rct: TraceReceipt,
    #[serde(default)]
    pub gas_cost: Option<GasCost>,
    #[serde(default)]
    pub execution_trace: Option<ExecutionTrace>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TraceMessage {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub method: u64,
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub value: Option<BigInt>,
    #[serde(default)]
    pub params: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct TraceReceipt {
    #[serde(default)]
    pub exit_code: i64,
    #[serde(default)]
    pub r#return: Option<String>,
    #[serde(default)]
    pub gas_used: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct GasCost {
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub gas_used: Option<BigInt>,
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub base_fee_burn: Option<BigInt>,
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub over_estimation_burn: Option<BigInt>,
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub miner_penalty: Option<BigInt>,
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub miner_tip: Option<BigInt>,
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub refund: Option<BigInt>,
    #[serde(default, with = "crate::lotus_json::stringify_opt")]
    pub total_cost: Option<BigInt>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ExecutionTrace {
    #[serde(default)]
    pub msg: Option<TraceMessage>,
    #[serde(default)]
    pub msg_rct: Option<TraceReceipt>,
    /// Only present in post-FVM trace shapes.
    #[serde(default)]
    pub invoked_actor: Option<InvokedActor>,
    #[serde(default)]
    pub subcalls: Vec<ExecutionTrace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct InvokedActor {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub state: Option<ActorState>,
}

/// Human-readable name for a message's method number. Unrecognized numbers
/// keep the number visible.
pub(crate) fn method_name(method: u64) -> String {
    match method {
        0 => "Send".into(),
        1 => "Constructor".into(),
        // FRC-42 dispatch hash of `InvokeContract`.
        3844450837 => "InvokeContract".into(),
        other => format!("Method{other}"),
    }
}

pub(crate) fn exit_status(exit_code: i64) -> String {
    if exit_code == 0 {
        "Ok".into()
    } else {
        format!("Err({exit_code})")
    }
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Payloads may arrive gzip-compressed; inflate transparently so callers can
/// pass either form.
pub(crate) fn maybe_inflate(payload: &[u8]) -> anyhow::Result<Vec<u8>> {
    if payload.starts_with(&GZIP_MAGIC) {
        let mut decoder = flate2::read::GzDecoder::new(payload);
        let mut inflated = Vec::new();
        decoder.read_to_end(&mut inflated)?;
        Ok(inflated)
    } else {
        Ok(payload.to_vec())
    }
}
