// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

#[cfg(test)]
mod tests;

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    cow_yaml::{Map, Yaml},
    error::{Result, TransformError},
    keys::TEMPLATE_KEY,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Rendered text becomes a `Join` of literal strings and `raw()` fragments.
    RawJoin,
    /// Rendered text is parsed as a YAML document.
    StructuredYaml,
}

impl Filter {
    pub fn from_name(name: &str) -> Option<Filter> {
        match name {
            "raw-join" | "replacer" => Some(Filter::RawJoin),
            "structured-yaml" | "erb-yaml" => Some(Filter::StructuredYaml),
            _ => None,
        }
    }

    /// Text whose first non-blank line is a `---` document marker is YAML.
    pub fn detect(text: &str) -> Filter {
        let first_line = text.lines().find(|line| !line.trim().is_empty());
        match first_line {
            Some(line) if line.starts_with("---") => Filter::StructuredYaml,
            _ => Filter::RawJoin,
        }
    }
}

/// Canonical form of a `CfnPPTemplate` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateSpec {
    pub filter: Filter,
    pub text: String,
    pub variables: Map,
}

impl TemplateSpec {
    /// Accepts either a string (inline text, or a file name relative to
    /// `base_dir`) or a mapping with `path`/`text`, `variables` and `filter`.
    pub fn normalize(decl: &Yaml, base_dir: &Path) -> Result<TemplateSpec> {
        match decl {
            Yaml::String(value) => {
                let candidate = base_dir.join(value.as_str());
                let text = if candidate.is_file() {
                    read_source(candidate)?
                } else {
                    value.as_ref().clone()
                };
                Ok(TemplateSpec {
                    filter: Filter::detect(&text),
                    text,
                    variables: Map::new(),
                })
            }
            Yaml::Hash(map) => Self::normalize_map(map, base_dir),
            other => Err(invalid(format!(
                "expected a string or a map, found {}",
                other.type_name()
            ))),
        }
    }

    fn normalize_map(map: &Map, base_dir: &Path) -> Result<TemplateSpec> {
        let text = match map.get("path") {
            Some(Yaml::String(path)) => read_source(base_dir.join(path.as_str()))?,
            Some(other) => return Err(invalid(format!("'path' must be a string, found {}", other.type_name()))),
            None => match map.get("text").or_else(|| map.get("txt")) {
                Some(Yaml::String(text)) => text.as_ref().clone(),
                Some(other) => return Err(invalid(format!("'text' must be a string, found {}", other.type_name()))),
                None => {
                    return Err(TransformError::InvalidDeclaration {
                        key: TEMPLATE_KEY.to_string(),
                        message: "no template source: expected 'path' or 'text'".to_string(),
                    })
                }
            },
        };

        let variables = match map.get("variables").or_else(|| map.get("vars")) {
            Some(Yaml::Hash(variables)) => variables.as_ref().clone(),
            Some(Yaml::Null) | None => Map::new(),
            Some(other) => {
                return Err(invalid(format!(
                    "'variables' must be a map, found {}",
                    other.type_name()
                )))
            }
        };

        let filter = match map.get("filter") {
            Some(Yaml::String(name)) => {
                Filter::from_name(name).ok_or_else(|| invalid(format!("unknown filter '{}'", name)))?
            }
            Some(other) => return Err(invalid(format!("'filter' must be a string, found {}", other.type_name()))),
            None => Filter::detect(&text),
        };

        Ok(TemplateSpec {
            filter,
            text,
            variables,
        })
    }
}

fn read_source(path: PathBuf) -> Result<String> {
    fs::read_to_string(&path).map_err(|source| TransformError::MissingTemplateSource { path, source })
}

fn invalid(message: String) -> TransformError {
    TransformError::InvalidDeclaration {
        key: TEMPLATE_KEY.to_string(),
        message,
    }
}
