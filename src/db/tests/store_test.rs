// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::subtests;
use crate::db::{AddressStore, MemoryStore, ParityDbConfig, ParityDbStore};

fn temp_parity_db() -> (tempfile::TempDir, ParityDbStore) {
    let dir = tempfile::tempdir().unwrap();
    let db = ParityDbStore::open(dir.path(), &ParityDbConfig::default()).unwrap();
    (dir, db)
}

#[test]
fn mem_contract() {
    let db = MemoryStore::default();
    subtests::miss_is_not_an_error(&db);
    subtests::roundtrip(&db);
    subtests::readable_under_every_known_form(&db);
    subtests::partial_writes_merge(&db);
    subtests::unkeyable_record_is_rejected(&db);
}

#[test]
fn parity_contract() {
    let (_dir, db) = temp_parity_db();
    subtests::miss_is_not_an_error(&db);
    subtests::roundtrip(&db);
    subtests::readable_under_every_known_form(&db);
    subtests::partial_writes_merge(&db);
    subtests::unkeyable_record_is_rejected(&db);
}

#[test]
fn implementation_names_differ() {
    let (_dir, parity) = temp_parity_db();
    assert_ne!(
        MemoryStore::default().implementation_name(),
        parity.implementation_name()
    );
}

#[test]
fn concurrent_partial_writes_preserve_all_facets() {
    use cid::Cid;
    use fvm_shared4::address::Address;
    use std::sync::Arc;

    use crate::types::AddressInfo;

    let db = Arc::new(MemoryStore::default());
    let short = Address::new_id(2000);
    let robust = Address::new_actor(b"concurrent");

    let writers: Vec<_> = (0..8)
        .map(|i| {
            let db = db.clone();
            std::thread::spawn(move || {
                let info = if i % 2 == 0 {
                    AddressInfo {
                        short: Some(short),
                        robust: Some(robust),
                        actor_cid: None,
                    }
                } else {
                    AddressInfo {
                        short: Some(short),
                        actor_cid: Some(Cid::default()),
                        ..Default::default()
                    }
                };
                db.store_address_info(info).unwrap();
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    let merged = db.get_address_info("f02000").unwrap().unwrap();
    assert_eq!(merged.short, Some(short));
    assert_eq!(merged.robust, Some(robust));
    assert!(merged.actor_cid.is_some());
}
