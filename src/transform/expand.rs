// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::{
    config::TransformConfig,
    cow_yaml::{Map, Yaml},
    error::{Result, TransformError},
    keys::{RESOURCES_KEY, STACK_KEY, TEMPLATE_KEY},
    renderer::Renderer,
    template_result::TemplateResult,
    template_spec::TemplateSpec,
};

use super::Transform;

const NESTED_STACK_TYPE: &str = "AWS::CloudFormation::Stack";
const NESTED_STACK_TIMEOUT_MINUTES: i64 = 60;

// Bounds templates whose output declares further templates.
const MAX_TEMPLATE_DEPTH: usize = 32;

/// First pass: renders `CfnPPTemplate` declarations and builds `CfnPPStack`
/// declarations, collecting the nested results in document order.
pub(super) struct Expander<'a> {
    config: &'a TransformConfig,
    depth: usize,
    template_depth: usize,
    substacks: Vec<TemplateResult>,
}

impl<'a> Expander<'a> {
    pub fn new(config: &'a TransformConfig, depth: usize) -> Expander<'a> {
        Expander {
            config,
            depth,
            template_depth: 0,
            substacks: Vec::new(),
        }
    }

    pub fn into_substacks(self) -> Vec<TemplateResult> {
        self.substacks
    }

    pub fn expand(&mut self, node: &Yaml) -> Result<Yaml> {
        match node {
            Yaml::Hash(map) => {
                if let Some(decl) = map.get(TEMPLATE_KEY) {
                    self.expand_template(map, decl)
                } else if map.contains_key(STACK_KEY) {
                    self.expand_stack(map)
                } else {
                    Ok(Yaml::hash(self.expand_entries(map)?))
                }
            }
            Yaml::Array(values) => {
                let mut seq = Vec::with_capacity(values.len());
                for value in values.iter() {
                    seq.push(self.expand(value)?);
                }
                Ok(Yaml::array(seq))
            }
            Yaml::Real(_) | Yaml::Integer(_) | Yaml::String(_) | Yaml::Boolean(_) | Yaml::Null => Ok(node.clone()),
        }
    }

    fn expand_entries(&mut self, map: &Map) -> Result<Map> {
        let mut entries = Map::new();
        for (key, value) in map.iter() {
            entries.insert(key.clone(), self.expand(value)?);
        }
        Ok(entries)
    }

    // A rendered map is merged into the declaring map, which keeps the
    // declaration until pruning. Entries the rendered map overwrites keep their
    // position and are not expanded. Anything else replaces the declaring map.
    fn expand_template(&mut self, map: &Map, decl: &Yaml) -> Result<Yaml> {
        if self.template_depth >= MAX_TEMPLATE_DEPTH {
            return Err(TransformError::TemplateRender {
                message: format!("template expansion nested deeper than {} levels", MAX_TEMPLATE_DEPTH),
            });
        }

        let config = self.config;
        let spec = TemplateSpec::normalize(decl, config.base_dir())?;
        trace!(filter = ?spec.filter, depth = self.template_depth, "rendering template");

        let rendered = Renderer::render_spec(&spec, &config.options, config.base_dir())?;
        self.template_depth += 1;
        let rendered = self.expand(&rendered);
        self.template_depth -= 1;

        let rendered = match rendered? {
            Yaml::Hash(rendered) => rendered,
            other => return Ok(other),
        };

        let mut entries = Map::new();
        for (key, value) in map.iter() {
            let value = if key == TEMPLATE_KEY || rendered.contains_key(key) {
                value.clone()
            } else {
                self.expand(value)?
            };
            entries.insert(key.clone(), value);
        }
        for (key, value) in Rc::unwrap_or_clone(rendered) {
            entries.replace(key, value);
        }
        Ok(Yaml::hash(entries))
    }

    fn expand_stack(&mut self, map: &Map) -> Result<Yaml> {
        let mut entries = Map::new();
        for (key, value) in map.iter() {
            let value = if key == STACK_KEY {
                self.expand_stack_decl(value)?
            } else {
                self.expand(value)?
            };
            entries.insert(key.clone(), value);
        }
        Ok(Yaml::hash(entries))
    }

    // Builds an inline stack and swaps its `inline` tree for a stack resource
    // under the declaration's own `Resources`, which lifting later moves to the
    // root. Declarations without `inline` are left for a later stage.
    fn expand_stack_decl(&mut self, decl: &Yaml) -> Result<Yaml> {
        let Some(decl_map) = decl.as_hash() else {
            return Ok(decl.clone());
        };
        let Some(inline) = decl_map.get("inline") else {
            return Ok(decl.clone());
        };
        let name = match decl_map.get("name") {
            Some(Yaml::String(name)) => name.as_ref().clone(),
            _ => {
                return Err(TransformError::InvalidDeclaration {
                    key: STACK_KEY.to_string(),
                    message: "an inline stack needs a string 'name'".to_string(),
                })
            }
        };

        let result = self.build_substack(&name, inline)?;

        let mut entries = Map::new();
        for (key, value) in decl_map.iter() {
            match key.as_str() {
                "inline" => {}
                "name" => {
                    entries.insert(key.clone(), value.clone());
                }
                _ => {
                    entries.insert(key.clone(), self.expand(value)?);
                }
            }
        }

        let mut resources = match entries.remove(RESOURCES_KEY) {
            Some(Yaml::Hash(resources)) => Rc::unwrap_or_clone(resources),
            Some(Yaml::Null) | None => Map::new(),
            Some(other) => {
                return Err(TransformError::InvalidDeclaration {
                    key: STACK_KEY.to_string(),
                    message: format!("'{}' must be a map, found {}", RESOURCES_KEY, other.type_name()),
                })
            }
        };
        let template_url = result.template_url(&self.config.stack_url_base);
        resources.replace(name, stack_resource(template_url));
        entries.insert(RESOURCES_KEY.to_string(), Yaml::hash(resources));

        self.substacks.push(result);
        Ok(Yaml::hash(entries))
    }

    fn build_substack(&self, name: &str, inline: &Yaml) -> Result<TemplateResult> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(TransformError::NestingTooDeep {
                name: name.to_string(),
                max_depth: self.config.max_depth,
            });
        }

        debug!(stack = name, depth, "building nested stack");
        Transform::build(inline, self.config, name, depth)
            .map(Transform::into_template_result)
            .map_err(|err| TransformError::NestedTransformError {
                name: name.to_string(),
                source: Box::new(err),
            })
    }
}

fn stack_resource(template_url: String) -> Yaml {
    let mut properties = Map::new();
    properties.insert("TemplateURL".to_string(), Yaml::string(template_url));
    properties.insert(
        "TimeoutInMinutes".to_string(),
        Yaml::Integer(NESTED_STACK_TIMEOUT_MINUTES),
    );

    let mut resource = Map::new();
    resource.insert("Type".to_string(), Yaml::string(NESTED_STACK_TYPE));
    resource.insert("Properties".to_string(), Yaml::hash(properties));
    Yaml::hash(resource)
}
