// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_shared4::address::Address;

use crate::db::AddressStore;
use crate::types::AddressInfo;

pub fn miss_is_not_an_error<DB>(db: &DB)
where
    DB: AddressStore,
{
    assert_eq!(db.get_address_info("f0404").unwrap(), None);
}

pub fn roundtrip<DB>(db: &DB)
where
    DB: AddressStore,
{
    let info = AddressInfo {
        short: Some(Address::new_id(1001)),
        robust: Some(Address::new_actor(b"roundtrip")),
        actor_cid: Some(Cid::default()),
    };
    db.store_address_info(info.clone()).unwrap();
    assert_eq!(db.get_address_info("f01001").unwrap(), Some(info));
}

pub fn readable_under_every_known_form<DB>(db: &DB)
where
    DB: AddressStore,
{
    let robust = Address::new_actor(b"either-form");
    let info = AddressInfo {
        short: Some(Address::new_id(1002)),
        robust: Some(robust),
        actor_cid: None,
    };
    db.store_address_info(info.clone()).unwrap();
    assert_eq!(db.get_address_info("f01002").unwrap(), Some(info.clone()));
    assert_eq!(
        db.get_address_info(&robust.to_string()).unwrap(),
        Some(info)
    );
}

pub fn partial_writes_merge<DB>(db: &DB)
where
    DB: AddressStore,
{
    let short = Address::new_id(1003);
    db.store_address_info(AddressInfo {
        short: Some(short),
        robust: Some(Address::new_actor(b"merge")),
        actor_cid: None,
    })
    .unwrap();
    db.store_address_info(AddressInfo {
        short: Some(short),
        actor_cid: Some(Cid::default()),
        ..Default::default()
    })
    .unwrap();

    let merged = db.get_address_info("f01003").unwrap().unwrap();
    assert!(merged.robust.is_some(), "merge must not erase the robust form");
    assert!(merged.actor_cid.is_some());
}

pub fn unkeyable_record_is_rejected<DB>(db: &DB)
where
    DB: AddressStore,
{
    let result = db.store_address_info(AddressInfo {
        actor_cid: Some(Cid::default()),
        ..Default::default()
    });
    assert!(result.is_err());
}
