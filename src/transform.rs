// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod expand;
mod lift;
mod prune;
mod substitute;


use std::{fs, path::Path};

use tracing::debug;

use crate::{
    config::TransformConfig,
    cow_yaml::{parse_yaml_str, Yaml},
    error::{Result, TransformError},
    template_result::TemplateResult,
};

use expand::Expander;

/// A document after all passes have run.
///
/// Construction runs, in order: template and nested stack expansion, lifting
/// of top-level sections, option substitution and pruning of declaration keys.
/// Each pass reads the complete output of the one before it, and the first
/// error aborts the whole construction.
#[derive(Debug)]
pub struct Transform {
    name: String,
    data: Yaml,
    substacks: Vec<TemplateResult>,
}

impl Transform {
    pub fn new(tree: &Yaml, config: &TransformConfig) -> Result<Transform> {
        Self::build(tree, config, &config.name, 0)
    }

    fn build(tree: &Yaml, config: &TransformConfig, name: &str, depth: usize) -> Result<Transform> {
        debug!(stack = name, depth, "expanding templates and nested stacks");
        let mut expander = Expander::new(config, depth);
        let expanded = expander.expand(tree)?;
        let substacks = expander.into_substacks();

        debug!(stack = name, substacks = substacks.len(), "lifting top-level sections");
        let lifted = lift::lift(&expanded, &config.lift_keys)?;

        debug!(stack = name, "substituting option references");
        let substituted = substitute::substitute(&lifted, &config.options)?;

        let data = prune::prune(&substituted);

        Ok(Transform {
            name: name.to_string(),
            data,
            substacks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &Yaml {
        &self.data
    }

    pub fn substacks(&self) -> &[TemplateResult] {
        &self.substacks
    }

    pub fn into_template_result(self) -> TemplateResult {
        TemplateResult::new(&self.name, self.data, self.substacks)
    }
}

/// Transforms YAML (or JSON) text. Relative template paths resolve against the
/// directory of `config.file_base`.
pub fn load_yaml(text: &str, config: &TransformConfig) -> Result<TemplateResult> {
    let tree = parse_document(text)?;
    let transform = Transform::new(&tree, config)?;
    Ok(transform.into_template_result())
}

/// Transforms the document at `path`, which also becomes the file base.
pub fn load_file(path: impl AsRef<Path>, config: &TransformConfig) -> Result<TemplateResult> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| TransformError::MissingTemplateSource {
        path: path.to_path_buf(),
        source,
    })?;
    let config = config.clone().with_file_base(path);
    load_yaml(&text, &config)
}

pub fn parse_document(text: &str) -> Result<Yaml> {
    let docs = parse_yaml_str(text).map_err(|err| TransformError::DocumentParse {
        message: err.to_string(),
    })?;
    match <[Yaml; 1]>::try_from(docs) {
        Ok([doc]) => Ok(doc),
        Err(docs) if docs.is_empty() => Ok(Yaml::Null),
        Err(docs) => Err(TransformError::DocumentParse {
            message: format!("expected a single document, found {}", docs.len()),
        }),
    }
}
