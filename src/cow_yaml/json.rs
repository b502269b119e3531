// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// JSON conversions used for output, `raw()` fragments and checksums.

use std::rc::Rc;

use serde_json::{Number, Value};

use super::{Map, Yaml};

pub fn to_json_value(node: &Yaml) -> Value {
    match node {
        Yaml::Real(value) => real_to_json(value),
        Yaml::Integer(value) => Value::Number(Number::from(*value)),
        Yaml::String(value) => Value::String(value.as_ref().clone()),
        Yaml::Boolean(value) => Value::Bool(*value),
        Yaml::Null => Value::Null,
        Yaml::Array(values) => Value::Array(values.iter().map(to_json_value).collect()),
        Yaml::Hash(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), to_json_value(value)))
                .collect(),
        ),
    }
}

/// Compact JSON text. Object keys keep their tree order, which makes the output
/// stable for checksumming.
pub fn to_json_string(node: &Yaml) -> String {
    to_json_value(node).to_string()
}

pub fn from_json_value(value: Value) -> Yaml {
    match value {
        Value::Null => Yaml::Null,
        Value::Bool(value) => Yaml::Boolean(value),
        Value::Number(number) => match number.as_i64() {
            Some(value) => Yaml::Integer(value),
            None => Yaml::Real(Rc::new(number.to_string())),
        },
        Value::String(value) => Yaml::String(Rc::new(value)),
        Value::Array(values) => Yaml::Array(Rc::new(values.into_iter().map(from_json_value).collect())),
        Value::Object(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key, from_json_value(value));
            }
            Yaml::Hash(Rc::new(map))
        }
    }
}

// YAML spellings such as `.inf` or `.nan` have no JSON number form.
fn real_to_json(text: &str) -> Value {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}
