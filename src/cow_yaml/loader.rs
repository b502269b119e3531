// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::rc::Rc;

use anyhow::{anyhow, Error};

use super::{Map, Yaml};

pub fn parse_yaml_str(input: &str) -> Result<Vec<Yaml>, Error> {
    let docs = saphyr::YamlLoader::load_from_str(input).map_err(|err| anyhow!("{}", err))?;

    let mut out = Vec::with_capacity(docs.len());
    for doc in &docs {
        out.push(convert_node(doc)?);
    }
    Ok(out)
}

fn convert_node(node: &saphyr::Yaml) -> Result<Yaml, Error> {
    match node {
        saphyr::Yaml::Real(value) => Ok(Yaml::Real(Rc::new(value.clone()))),
        saphyr::Yaml::Integer(value) => Ok(Yaml::Integer(*value)),
        saphyr::Yaml::String(value) => Ok(Yaml::String(Rc::new(value.clone()))),
        saphyr::Yaml::Boolean(value) => Ok(Yaml::Boolean(*value)),
        saphyr::Yaml::Null => Ok(Yaml::Null),
        saphyr::Yaml::Array(values) => {
            let mut seq = Vec::with_capacity(values.len());
            for value in values {
                seq.push(convert_node(value)?);
            }
            Ok(Yaml::Array(Rc::new(seq)))
        }
        saphyr::Yaml::Hash(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(convert_key(key)?, convert_node(value)?);
            }
            Ok(Yaml::Hash(Rc::new(map)))
        }
        // The loader resolves anchors, so a surviving alias means a dangling reference.
        _ => Err(anyhow!("unsupported yaml value (unresolved alias or invalid scalar)")),
    }
}

// Template keys are always strings. Plain scalar keys such as `80:` or `true:`
// keep their source spelling.
fn convert_key(key: &saphyr::Yaml) -> Result<String, Error> {
    match key {
        saphyr::Yaml::String(value) | saphyr::Yaml::Real(value) => Ok(value.clone()),
        saphyr::Yaml::Integer(value) => Ok(value.to_string()),
        saphyr::Yaml::Boolean(value) => Ok(value.to_string()),
        saphyr::Yaml::Null => Ok("null".to_string()),
        saphyr::Yaml::Array(_) | saphyr::Yaml::Hash(_) => Err(anyhow!("yaml complex mapping keys are not supported")),
        _ => Err(anyhow!("unsupported yaml mapping key")),
    }
}

/// Converts back into the emitter's representation.
pub(crate) fn to_saphyr(node: &Yaml) -> saphyr::Yaml {
    match node {
        Yaml::Real(value) => saphyr::Yaml::Real(value.as_ref().clone()),
        Yaml::Integer(value) => saphyr::Yaml::Integer(*value),
        Yaml::String(value) => saphyr::Yaml::String(value.as_ref().clone()),
        Yaml::Boolean(value) => saphyr::Yaml::Boolean(*value),
        Yaml::Null => saphyr::Yaml::Null,
        Yaml::Array(values) => saphyr::Yaml::Array(values.iter().map(to_saphyr).collect()),
        Yaml::Hash(entries) => saphyr::Yaml::Hash(
            entries
                .iter()
                .map(|(key, value)| (saphyr::Yaml::String(key.clone()), to_saphyr(value)))
                .collect(),
        ),
    }
}
