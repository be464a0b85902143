// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Parser errors
#[derive(Debug, Error)]
pub enum ParserError {
    /// No decoder declares support for the reported node version. Raised
    /// before any decoding work begins.
    #[error("no decoder supports node version {0:?}")]
    UnsupportedVersion(String),
    /// The raw payload did not match the selected decoder's expectations.
    /// Fatal to the parse call; no partial output is returned.
    #[error("failed to decode traces with decoder {decoder}: {source}")]
    Decode {
        decoder: &'static str,
        #[source]
        source: anyhow::Error,
    },
    /// Strict-mode consolidation hit an address no tier could resolve to a
    /// robust form. Best-effort mode downgrades this to leaving the address
    /// as-is.
    #[error("unable to consolidate address {address} to its robust form: {source}")]
    Consolidation {
        address: String,
        #[source]
        source: anyhow::Error,
    },
    /// Tipset input was empty or inconsistent.
    #[error("invalid tipset: {0}")]
    InvalidTipset(String),
}

impl From<crate::blocks::Error> for ParserError {
    fn from(value: crate::blocks::Error) -> Self {
        ParserError::InvalidTipset(value.to_string())
    }
}
