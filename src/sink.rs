// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{fs, path::PathBuf};

use anyhow::{Context, Error};
use tracing::info;

use crate::{
    config::Options,
    cow_yaml::{Map, Yaml},
    template_result::TemplateResult,
    yaml_utils::{emit_to_file, yaml_emit_to_string, OutputFormat},
};

const TEMPLATE_FILE_NAME: &str = "template.json";
const PARAMETERS_FILE_NAME: &str = "parameters.yml";

/// What a sink reports back for one stored result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredArtifact {
    pub name: String,
    pub location: PathBuf,
    /// Names under the document's `Parameters` section.
    pub parameters: Vec<String>,
}

/// Persists transformed documents at a location addressable by their name.
pub trait ArtifactSink {
    fn store(&mut self, result: &TemplateResult) -> Result<StoredArtifact, Error>;
}

/// Stores `result` and every substack beneath it. Children are stored before
/// their parent, so a parent's `TemplateURL`s resolve once it is stored.
pub fn store_all(sink: &mut dyn ArtifactSink, result: &TemplateResult) -> Result<Vec<StoredArtifact>, Error> {
    let mut stored = Vec::new();
    store_tree(sink, result, &mut stored)?;
    Ok(stored)
}

fn store_tree(
    sink: &mut dyn ArtifactSink,
    result: &TemplateResult,
    stored: &mut Vec<StoredArtifact>,
) -> Result<(), Error> {
    for substack in result.substacks() {
        store_tree(sink, substack, stored)?;
    }
    stored.push(sink.store(result)?);
    Ok(())
}

/// Writes `<root>/<name>/template.json`, plus `parameters.yml` holding the
/// options that match the document's declared parameters.
pub struct DirectorySink {
    root: PathBuf,
    options: Options,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, options: Options) -> DirectorySink {
        DirectorySink {
            root: root.into(),
            options,
        }
    }

    fn parameter_values(&self, parameters: &[String]) -> Map {
        let mut values = Map::new();
        for name in parameters {
            if let Some(value) = self.options.get(name) {
                let value = match value {
                    Some(value) => Yaml::string(value.as_str()),
                    None => Yaml::Null,
                };
                values.insert(name.clone(), value);
            }
        }
        values
    }
}

impl ArtifactSink for DirectorySink {
    fn store(&mut self, result: &TemplateResult) -> Result<StoredArtifact, Error> {
        let dir = self.root.join(result.name());
        fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

        let location = dir.join(TEMPLATE_FILE_NAME);
        emit_to_file(result.data(), OutputFormat::Json, &location)
            .with_context(|| format!("failed to write {}", location.display()))?;

        let parameters = declared_parameters(result.data());
        let values = self.parameter_values(&parameters);
        if !values.is_empty() {
            let path = dir.join(PARAMETERS_FILE_NAME);
            let text = yaml_emit_to_string(&Yaml::hash(values))?;
            fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        }

        info!(name = result.name(), location = %location.display(), "stored template");
        Ok(StoredArtifact {
            name: result.name().to_string(),
            location,
            parameters,
        })
    }
}

fn declared_parameters(data: &Yaml) -> Vec<String> {
    data.as_hash()
        .and_then(|root| root.get("Parameters"))
        .and_then(Yaml::as_hash)
        .map(|parameters| parameters.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TransformConfig, cow_yaml::parse_yaml_str, transform::load_yaml};

    #[derive(Default)]
    struct RecordingSink {
        names: Vec<String>,
    }

    impl ArtifactSink for RecordingSink {
        fn store(&mut self, result: &TemplateResult) -> Result<StoredArtifact, Error> {
            self.names.push(result.stack_name().to_string());
            Ok(StoredArtifact {
                name: result.name().to_string(),
                location: PathBuf::from(result.name()),
                parameters: Vec::new(),
            })
        }
    }

    const NESTED: &str = "CfnPPStack:
  name: a
  inline:
    CfnPPStack:
      name: b
      inline:
        Resources: {}
Resources:
  Other:
    CfnPPStack:
      name: c
      inline:
        Resources: {}
";

    #[test]
    fn children_are_stored_first() {
        let result = load_yaml(NESTED, &TransformConfig::new()).unwrap();
        let mut sink = RecordingSink::default();
        let stored = store_all(&mut sink, &result).unwrap();
        assert_eq!(sink.names, vec!["b", "a", "c", "main"]);
        assert_eq!(stored.last().map(|artifact| artifact.name.as_str()), Some(result.name()));
    }

    #[test]
    fn directory_layout() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Parameters:\n  Env: {Type: String}\n  Size: {Type: Number}\nCfnPPStack:\n  name: child\n  inline:\n    Resources: {}\n";
        let options = Options::from_iter([("Env".to_string(), Some("prod".to_string()))]);
        let result = load_yaml(text, &TransformConfig::new().with_options(options.clone())).unwrap();

        let mut sink = DirectorySink::new(dir.path(), options);
        let stored = store_all(&mut sink, &result).unwrap();
        assert_eq!(stored.len(), 2);

        let child = &result.substacks()[0];
        let child_template = dir.path().join(child.name()).join("template.json");
        assert_eq!(stored[0].location, child_template);
        assert!(!dir.path().join(child.name()).join("parameters.yml").exists());

        let root_dir = dir.path().join(result.name());
        let written = fs::read_to_string(root_dir.join("template.json")).unwrap();
        let reloaded = parse_yaml_str(&written).unwrap().remove(0);
        assert_eq!(&reloaded, result.data());
        assert_eq!(stored[1].parameters, vec!["Env", "Size"]);

        let parameters = fs::read_to_string(root_dir.join("parameters.yml")).unwrap();
        let parameters = parse_yaml_str(&parameters).unwrap().remove(0);
        let mut expected = Map::new();
        expected.insert("Env".to_string(), Yaml::string("prod"));
        assert_eq!(parameters, Yaml::hash(expected));
    }
}
