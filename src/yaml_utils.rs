// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{fs, path::Path};

use anyhow::Error;
use saphyr::YamlEmitter;

use crate::cow_yaml::{to_json_value, to_saphyr, Yaml};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

pub fn yaml_emit_to_string(doc: &Yaml) -> Result<String, Error> {
    let mut out_str = String::new();
    {
        let mut emitter = YamlEmitter::new(&mut out_str);
        emitter.dump(&to_saphyr(doc))?;
    }
    out_str.push('\n');
    Ok(out_str)
}

pub fn json_emit_to_string(doc: &Yaml) -> Result<String, Error> {
    let mut out_str = serde_json::to_string_pretty(&to_json_value(doc))?;
    out_str.push('\n');
    Ok(out_str)
}

pub fn emit_to_string(doc: &Yaml, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => json_emit_to_string(doc),
        OutputFormat::Yaml => yaml_emit_to_string(doc),
    }
}

pub fn emit_to_file(doc: &Yaml, format: OutputFormat, filename: &Path) -> Result<(), Error> {
    let out = emit_to_string(doc, format)?;
    fs::write(filename, out)?;
    Ok(())
}
