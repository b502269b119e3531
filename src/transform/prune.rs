// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    cow_yaml::{Map, Yaml},
    keys::BOOKKEEPING_KEYS,
};

pub(super) fn prune(node: &Yaml) -> Yaml {
    match node {
        Yaml::Hash(map) => {
            let mut entries = Map::new();
            for (key, value) in map.iter() {
                if !BOOKKEEPING_KEYS.contains(&key.as_str()) {
                    entries.insert(key.clone(), prune(value));
                }
            }
            Yaml::hash(entries)
        }
        Yaml::Array(values) => Yaml::array(values.iter().map(prune).collect()),
        _ => node.clone(),
    }
}
