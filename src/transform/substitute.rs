// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use crate::{
    config::Options,
    cow_yaml::{Map, Yaml},
    error::{Result, TransformError},
    keys::OPTION_REF_KEY,
};

/// Replaces every map holding `CfnPPRef` with the named option's value.
pub(super) fn substitute(node: &Yaml, options: &Options) -> Result<Yaml> {
    match node {
        Yaml::Hash(map) => {
            if let Some(name) = map.get(OPTION_REF_KEY) {
                return option_value(name, options);
            }

            let mut entries = Map::new();
            for (key, value) in map.iter() {
                entries.insert(key.clone(), substitute(value, options)?);
            }
            Ok(Yaml::hash(entries))
        }
        Yaml::Array(values) => {
            let mut seq = Vec::with_capacity(values.len());
            for value in values.iter() {
                seq.push(substitute(value, options)?);
            }
            Ok(Yaml::array(seq))
        }
        _ => Ok(node.clone()),
    }
}

fn option_value(name: &Yaml, options: &Options) -> Result<Yaml> {
    let name = match name {
        Yaml::Hash(_) | Yaml::Array(_) => {
            return Err(TransformError::InvalidDeclaration {
                key: OPTION_REF_KEY.to_string(),
                message: format!("option name must be a scalar, found {}", name.type_name()),
            })
        }
        scalar => scalar.to_text(),
    };

    match options.get(&name) {
        Some(value) => Ok(Yaml::string(value.clone().unwrap_or_default())),
        None => Err(TransformError::MissingOptionValue { name }),
    }
}
