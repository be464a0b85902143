// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Trace-to-transaction translation for Filecoin nodes.
//!
//! The crate turns raw execution traces, tipset metadata and EVM-compatible
//! event logs into a canonical, node-version-independent set of
//! [`Transaction`](types::Transaction) records plus a deduplicated registry
//! of every actor referenced. Protocol revisions are handled by a closed set
//! of decoders behind one dispatch point; actor identities are resolved
//! through a shared, tiered [`ActorsCache`](actors::cache::ActorsCache) with
//! write-back of on-chain discoveries.

pub mod actors;
pub mod blocks;
pub mod db;
pub mod lotus_json;
pub mod parser;
pub mod rpc;
#[cfg(test)]
pub mod test_utils;
pub mod types;

pub use actors::cache::{ActorsCache, setup_actors_cache};
pub use parser::{DecoderVersion, Parser, ParserConfig, ParserError};
pub use rpc::DataSource;
