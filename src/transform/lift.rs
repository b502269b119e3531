// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::rc::Rc;

use hashlink::LinkedHashMap;
use tracing::debug;

use crate::{
    cow_yaml::{Map, Yaml},
    error::{Result, TransformError},
};

/// Values collected per lifted key, in traversal order.
type LiftStore = LinkedHashMap<String, Vec<Yaml>>;

/// Moves every occurrence of a lifted key to the root.
///
/// A map's children are searched before the map's own lifted entries are
/// collected, so an occurrence nested inside `Resources` is collected before
/// the `Resources` that encloses it. All collected maps for a key are merged
/// shallowly, later ones overwriting earlier ones key by key. An overwritten
/// key keeps the position of its first occurrence.
pub(super) fn lift(root: &Yaml, lift_keys: &[String]) -> Result<Yaml> {
    let mut store = LiftStore::new();
    let lifted = lift_child(root, lift_keys, &mut store);
    if store.is_empty() {
        return Ok(lifted);
    }

    let mut root_map = match lifted {
        Yaml::Hash(root_map) => Rc::unwrap_or_clone(root_map),
        other => {
            return Err(TransformError::InvalidDeclaration {
                key: store.keys().next().cloned().unwrap_or_default(),
                message: format!("cannot lift sections into a document root of type {}", other.type_name()),
            })
        }
    };
    for (key, values) in store {
        debug!(key = key.as_str(), occurrences = values.len(), "merging lifted section");
        root_map.insert(key, merge_shallow(values));
    }
    Ok(Yaml::hash(root_map))
}

fn lift_child(node: &Yaml, lift_keys: &[String], store: &mut LiftStore) -> Yaml {
    match node {
        Yaml::Hash(map) => Yaml::hash(lift_map(map, lift_keys, store)),
        // Only maps directly inside a list are searched.
        Yaml::Array(values) => {
            let mut seq = Vec::with_capacity(values.len());
            for value in values.iter() {
                let value = match value {
                    Yaml::Hash(map) => Yaml::hash(lift_map(map, lift_keys, store)),
                    other => other.clone(),
                };
                seq.push(value);
            }
            Yaml::array(seq)
        }
        _ => node.clone(),
    }
}

fn lift_map(map: &Map, lift_keys: &[String], store: &mut LiftStore) -> Map {
    let mut entries = Map::new();
    for (key, value) in map.iter() {
        let value = lift_child(value, lift_keys, store);
        if !lift_keys.iter().any(|lift_key| lift_key == key) {
            entries.insert(key.clone(), value);
        } else if let Some(values) = store.get_mut(key) {
            values.push(value);
        } else {
            store.insert(key.clone(), vec![value]);
        }
    }
    entries
}

// Values that are not maps (e.g. an empty `Outputs:`) add nothing.
fn merge_shallow(values: Vec<Yaml>) -> Yaml {
    let mut merged = Map::new();
    for value in values {
        if let Yaml::Hash(map) = value {
            for (key, value) in Rc::unwrap_or_clone(map) {
                merged.replace(key, value);
            }
        }
    }
    Yaml::hash(merged)
}
