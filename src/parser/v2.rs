// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Decoder for traces emitted by FVM-era node revisions. Tolerates the newer
//! shape: gas costs may be elided, sub-call senders may only be reported via
//! the invoked actor, and aborted messages carry a node-side error string.

use anyhow::anyhow;
use cid::Cid;
use num_traits::Zero;

use super::traces::{
    ComputeStateOutput, ExecutionTrace, InvocResult, TraceMessage, TraceReceipt, exit_status,
    maybe_inflate, method_name,
};
use super::{DecodedTraces, FeeEntry, ParserError};
use crate::blocks::ExtendedTipset;
use crate::types::Transaction;

pub const NODE_VERSIONS_SUPPORTED: &[&str] = &["v1.23", "v1.24", "v1.25", "v1.26"];

pub(crate) const DECODER_NAME: &str = "v2";

fn decode_err(e: impl Into<anyhow::Error>) -> ParserError {
    ParserError::Decode {
        decoder: DECODER_NAME,
        source: e.into(),
    }
}

pub(crate) fn decode(
    payload: &[u8],
    tipset: &ExtendedTipset,
) -> Result<DecodedTraces, ParserError> {
    let payload = maybe_inflate(payload).map_err(decode_err)?;
    let output: ComputeStateOutput = serde_json::from_slice(&payload).map_err(decode_err)?;
    let tipset_cid = tipset
        .key()?
        .cid()
        .map_err(|e| ParserError::InvalidTipset(e.to_string()))?;

    let mut decoded = DecodedTraces::default();
    for invoc in &output.trace {
        let block_cid = tipset.block_cid_for_message(&invoc.msg_cid)?;
        let mut tx = transaction(
            &invoc.msg,
            &invoc.msg_rct,
            invoc.msg_cid,
            0,
            tipset,
            tipset_cid,
            block_cid,
        )?;
        // The FVM reports aborts out of band; surface them over the bare
        // exit code.
        if let Some(error) = &invoc.error {
            tx.status = format!("Err({error})");
        }
        decoded.transactions.push(tx);

        if let Some(gas) = &invoc.gas_cost
            && let (Some(burn), Some(used)) = (&gas.base_fee_burn, &gas.gas_used)
            && !used.is_zero()
        {
            decoded.fee_entries.push(FeeEntry {
                level: 0,
                base_fee: burn / used,
            });
        }

        if let Some(exec) = &invoc.execution_trace {
            walk_subcalls(
                &exec.subcalls,
                1,
                invoc,
                tipset,
                tipset_cid,
                block_cid,
                &mut decoded.transactions,
            )?;
        }
    }
    Ok(decoded)
}

fn walk_subcalls(
    subcalls: &[ExecutionTrace],
    level: u16,
    parent: &InvocResult,
    tipset: &ExtendedTipset,
    tipset_cid: Cid,
    block_cid: Cid,
    out: &mut Vec<Transaction>,
) -> Result<(), ParserError> {
    for sub in subcalls {
        let msg = sub
            .msg
            .as_ref()
            .ok_or_else(|| decode_err(anyhow!("sub-call of {} lacks Msg", parent.msg_cid)))?;
        let rct = sub
            .msg_rct
            .as_ref()
            .ok_or_else(|| decode_err(anyhow!("sub-call of {} lacks MsgRct", parent.msg_cid)))?;
        let mut tx = transaction(msg, rct, parent.msg_cid, level, tipset, tipset_cid, block_cid)?;
        if tx.tx_from.is_empty()
            && let Some(actor) = &sub.invoked_actor
        {
            tx.tx_from = format!("f0{}", actor.id);
        }
        out.push(tx);
        walk_subcalls(
            &sub.subcalls,
            level + 1,
            parent,
            tipset,
            tipset_cid,
            block_cid,
            out,
        )?;
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn transaction(
    msg: &TraceMessage,
    rct: &TraceReceipt,
    tx_cid: Cid,
    level: u16,
    tipset: &ExtendedTipset,
    tipset_cid: Cid,
    block_cid: Cid,
) -> Result<Transaction, ParserError> {
    let tx_to = msg
        .to
        .clone()
        .ok_or_else(|| decode_err(anyhow!("message {tx_cid} lacks To")))?;
    Ok(Transaction {
        height: tipset.height,
        tipset_cid,
        block_cid,
        level,
        tx_cid,
        // May legitimately be absent in sub-calls; filled from the invoked
        // actor by the caller.
        tx_from: msg.from.clone().unwrap_or_default(),
        tx_to,
        method: method_name(msg.method),
        amount: msg.value.clone().unwrap_or_default(),
        params: msg.params.clone().unwrap_or_default(),
        ret: rct.r#return.clone().unwrap_or_default(),
        gas_used: rct.gas_used,
        status: exit_status(rct.exit_code),
        eth_logs: Vec::new(),
    })
}
