// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::str::FromStr;

use crate::{
    config::Options,
    cow_yaml::{parse_yaml_str, Yaml},
    error::{Result, TransformError},
};

/// A `--opt NAME[=VALUE]` command line argument. A bare `NAME` declares the
/// option without a value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionArg {
    pub name: String,
    pub value: Option<String>,
}

impl FromStr for OptionArg {
    type Err = String;

    fn from_str(arg: &str) -> std::result::Result<Self, Self::Err> {
        let (name, value) = match arg.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (arg, None),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("option '{}' has an empty name", arg));
        }
        Ok(OptionArg {
            name: name.to_string(),
            value,
        })
    }
}

/// Reads options from a YAML map of name to scalar. `null` declares an option
/// without a value.
pub fn options_from_yaml(text: &str) -> Result<Options> {
    let docs = parse_yaml_str(text).map_err(|err| TransformError::DocumentParse {
        message: format!("options: {}", err),
    })?;

    let mut options = Options::new();
    let Some(doc) = docs.into_iter().next() else {
        return Ok(options);
    };
    let map = match doc {
        Yaml::Hash(map) => map,
        Yaml::Null => return Ok(options),
        other => {
            return Err(TransformError::DocumentParse {
                message: format!("options must be a map, found {}", other.type_name()),
            })
        }
    };

    for (name, value) in map.iter() {
        let value = match value {
            Yaml::Null => None,
            Yaml::Hash(_) | Yaml::Array(_) => {
                return Err(TransformError::DocumentParse {
                    message: format!("option '{}' must be a scalar, found {}", name, value.type_name()),
                })
            }
            scalar => Some(scalar.to_text()),
        };
        options.insert(name.clone(), value);
    }
    Ok(options)
}

/// Applies command line options over file options, in argument order.
pub fn apply_option_args(options: &mut Options, args: impl IntoIterator<Item = OptionArg>) {
    for arg in args {
        options.replace(arg.name, arg.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_and_value() {
        let arg: OptionArg = "Env=prod=1".parse().unwrap();
        assert_eq!(arg.name, "Env");
        assert_eq!(arg.value.as_deref(), Some("prod=1"));
    }

    #[test]
    fn parse_bare_name() {
        let arg: OptionArg = "Debug".parse().unwrap();
        assert_eq!(arg.value, None);
    }

    #[test]
    fn parse_empty_value() {
        let arg: OptionArg = "Debug=".parse().unwrap();
        assert_eq!(arg.value.as_deref(), Some(""));
    }

    #[test]
    fn reject_empty_name() {
        assert!("=x".parse::<OptionArg>().is_err());
    }

    #[test]
    fn options_file() {
        let options = options_from_yaml("Env: prod\nPort: 8080\nBlank: ~\n").unwrap();
        let entries: Vec<(&str, Option<&str>)> = options
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
            .collect();
        assert_eq!(
            entries,
            vec![("Env", Some("prod")), ("Port", Some("8080")), ("Blank", None)]
        );
    }

    #[test]
    fn empty_options_file() {
        assert!(options_from_yaml("").unwrap().is_empty());
    }

    #[test]
    fn nested_option_value_is_rejected() {
        assert!(options_from_yaml("Env: {a: 1}\n").is_err());
    }

    #[test]
    fn args_override_file() {
        let mut options = options_from_yaml("Env: dev\nRegion: us-east-1\n").unwrap();
        apply_option_args(&mut options, vec!["Env=prod".parse().unwrap()]);
        assert_eq!(options.get("Env"), Some(&Some("prod".to_string())));
        assert_eq!(options.get("Region"), Some(&Some("us-east-1".to_string())));
        let names: Vec<&str> = options.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Env", "Region"]);
    }
}
