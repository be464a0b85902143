// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use ahash::HashMap;
use cid::Cid;
use fvm_shared4::address::Address;
use serde::{Deserialize, Serialize};

/// Accumulated identity facts about a single actor.
///
/// All three facets are optional; records are built up incrementally as the
/// cache discovers facts. Once known, the short form is the storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressInfo {
    /// Canonical numeric-ID form, e.g. `f01234`. Unique per actor and stable
    /// forever.
    #[serde(with = "crate::lotus_json::stringify_opt")]
    pub short: Option<Address>,
    /// Self-describing form, e.g. `f2...`. Protocol-level system actors have
    /// none.
    #[serde(with = "crate::lotus_json::stringify_opt")]
    pub robust: Option<Address>,
    /// CID of the actor's code. Fixed per state reference, but may change
    /// across actor upgrades.
    #[serde(with = "crate::lotus_json::lotus_cid_opt")]
    pub actor_cid: Option<Cid>,
}

impl AddressInfo {
    /// Additive merge: a facet present in `other` replaces ours, a facet
    /// absent in `other` never erases one we already hold.
    pub fn merge(&mut self, other: AddressInfo) {
        let AddressInfo {
            short,
            robust,
            actor_cid,
        } = other;
        if short.is_some() {
            self.short = short;
        }
        if robust.is_some() {
            self.robust = robust;
        }
        if actor_cid.is_some() {
            self.actor_cid = actor_cid;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.short.is_none() && self.robust.is_none() && self.actor_cid.is_none()
    }
}

/// Deduplicated registry of every actor touched while producing a batch of
/// transactions, keyed by short form. Created fresh per parse call and owned
/// exclusively by the caller afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressInfoMap(HashMap<String, AddressInfo>);

impl AddressInfoMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, short: &str) -> Option<&AddressInfo> {
        self.0.get(short)
    }

    pub fn contains_key(&self, short: &str) -> bool {
        self.0.contains_key(short)
    }

    /// Inserts a record keyed by its short form, merging into any existing
    /// entry. Records without a short form cannot be keyed and are dropped.
    pub fn insert(&mut self, info: AddressInfo) {
        let Some(short) = info.short else {
            tracing::debug!("skipping registry entry without a short form");
            return;
        };
        self.0
            .entry(short.to_string())
            .or_default()
            .merge(AddressInfo {
                short: Some(short),
                ..info
            });
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AddressInfo)> {
        self.0.iter()
    }
}
