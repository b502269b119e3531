// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Provides copy-on-write variant of a YAML object.

mod json;
mod loader;


use std::rc::Rc;

use hashlink::LinkedHashMap;

pub use json::{from_json_value, to_json_string, to_json_value};
pub use loader::parse_yaml_str;
pub(crate) use loader::to_saphyr;

pub type Map = LinkedHashMap<String, Yaml>;

#[derive(Clone, PartialEq, Debug, Eq)]
pub enum Yaml {
    // Numbers that don't fit in an i64 (e.g. floating point).
    Real(Rc<String>),
    Integer(i64),
    String(Rc<String>),
    Boolean(bool),
    Array(Rc<Vec<Yaml>>),
    Hash(Rc<Map>),
    Null,
}

impl Yaml {
    pub fn string(value: impl Into<String>) -> Yaml {
        Yaml::String(Rc::new(value.into()))
    }

    pub fn array(values: Vec<Yaml>) -> Yaml {
        Yaml::Array(Rc::new(values))
    }

    pub fn hash(map: Map) -> Yaml {
        Yaml::Hash(Rc::new(map))
    }

    pub fn as_hash(&self) -> Option<&Map> {
        match self {
            Yaml::Hash(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Yaml::String(value) => Some(value),
            _ => None,
        }
    }

    /// Text form used when a value is spliced into rendered template output or
    /// coerced into an option string. Collections render as compact JSON.
    pub fn to_text(&self) -> String {
        match self {
            Yaml::Real(value) => value.as_ref().clone(),
            Yaml::Integer(value) => value.to_string(),
            Yaml::String(value) => value.as_ref().clone(),
            Yaml::Boolean(value) => value.to_string(),
            Yaml::Null => String::new(),
            Yaml::Array(_) | Yaml::Hash(_) => to_json_string(self),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Yaml::Real(_) => "number",
            Yaml::Integer(_) => "integer",
            Yaml::String(_) => "string",
            Yaml::Boolean(_) => "bool",
            Yaml::Array(_) => "list",
            Yaml::Hash(_) => "map",
            Yaml::Null => "null",
        }
    }
}

/// Builds a single-entry map, the shape of most intrinsic function calls.
pub fn single_entry(key: &str, value: Yaml) -> Yaml {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Yaml::hash(map)
}
