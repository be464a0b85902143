// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Serde helpers for the JSON forms lotus uses on the wire: big integers and
//! addresses as plain strings, CIDs as `{"/": "bafy..."}` links.

use std::fmt::Display;
use std::str::FromStr;

use cid::Cid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Usage: `#[serde(with = "stringify")]`
pub mod stringify {
    use super::*;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Usage: `#[serde(default, with = "stringify_opt")]`
pub mod stringify_opt {
    use super::*;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(it) => serializer.collect_str(it),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(it) => it.parse().map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CidLink {
    #[serde(rename = "/")]
    link: String,
}

impl TryFrom<CidLink> for Cid {
    type Error = cid::Error;

    fn try_from(value: CidLink) -> Result<Self, Self::Error> {
        Cid::from_str(&value.link)
    }
}

impl From<&Cid> for CidLink {
    fn from(value: &Cid) -> Self {
        CidLink {
            link: value.to_string(),
        }
    }
}

/// Usage: `#[serde(with = "lotus_cid")]`
pub mod lotus_cid {
    use super::*;

    pub fn serialize<S>(value: &Cid, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        CidLink::from(value).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Cid, D::Error>
    where
        D: Deserializer<'de>,
    {
        Cid::try_from(CidLink::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

/// Usage: `#[serde(default, with = "lotus_cid_opt")]`
pub mod lotus_cid_opt {
    use super::*;

    pub fn serialize<S>(value: &Option<Cid>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.as_ref().map(CidLink::from).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Cid>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<CidLink>::deserialize(deserializer)? {
            Some(it) => Cid::try_from(it).map(Some).map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Usage: `#[serde(with = "lotus_cid_vec")]`
pub mod lotus_cid_vec {
    use super::*;

    pub fn serialize<S>(value: &[Cid], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(value.iter().map(CidLink::from))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Cid>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<CidLink>::deserialize(deserializer)?
            .into_iter()
            .map(|link| Cid::try_from(link).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use serde_json::json;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wrapper {
        #[serde(with = "stringify")]
        amount: BigInt,
        #[serde(with = "lotus_cid")]
        cid: Cid,
    }

    #[test]
    fn lotus_forms_round_trip() {
        let value = json!({
            "amount": "100",
            "cid": {"/": "baeaaaaa"},
        });
        let parsed: Wrapper = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(parsed.amount, BigInt::from(100));
        assert_eq!(serde_json::to_value(&parsed).unwrap(), value);
    }

    #[test]
    fn malformed_cid_link_is_an_error() {
        let err = serde_json::from_value::<Wrapper>(json!({
            "amount": "1",
            "cid": {"/": "not a cid"},
        }));
        assert!(err.is_err());
    }
}
