// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::fs;

use super::*;
use crate::cow_yaml::parse_yaml_str;

fn decl(input: &str) -> Yaml {
    parse_yaml_str(input).unwrap().remove(0)
}

#[test]
fn detect_filter() {
    assert_eq!(Filter::detect("---\nFoo: bar\n"), Filter::StructuredYaml);
    assert_eq!(Filter::detect("\n   \n--- # doc\n"), Filter::StructuredYaml);
    assert_eq!(Filter::detect("#!/bin/bash\n---\n"), Filter::RawJoin);
    assert_eq!(Filter::detect(""), Filter::RawJoin);
}

#[test]
fn filter_names_and_aliases() {
    assert_eq!(Filter::from_name("raw-join"), Some(Filter::RawJoin));
    assert_eq!(Filter::from_name("replacer"), Some(Filter::RawJoin));
    assert_eq!(Filter::from_name("structured-yaml"), Some(Filter::StructuredYaml));
    assert_eq!(Filter::from_name("erb-yaml"), Some(Filter::StructuredYaml));
    assert_eq!(Filter::from_name("mustache"), None);
}

#[test]
fn inline_string() {
    let dir = tempfile::tempdir().unwrap();
    let spec = TemplateSpec::normalize(&Yaml::string("echo <%= ref(\"A\") %>"), dir.path()).unwrap();
    assert_eq!(spec.filter, Filter::RawJoin);
    assert_eq!(spec.text, "echo <%= ref(\"A\") %>");
    assert!(spec.variables.is_empty());
}

#[test]
fn string_naming_a_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("part.yml"), "---\nBucket:\n  Type: AWS::S3::Bucket\n").unwrap();

    let spec = TemplateSpec::normalize(&Yaml::string("part.yml"), dir.path()).unwrap();
    assert_eq!(spec.filter, Filter::StructuredYaml);
    assert!(spec.text.contains("AWS::S3::Bucket"));
}

#[test]
fn map_with_path_and_variables() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("userdata.sh"), "#!/bin/sh\necho <%= greeting %>\n").unwrap();

    let spec = TemplateSpec::normalize(
        &decl("path: userdata.sh\nvariables:\n  greeting: hello\n"),
        dir.path(),
    )
    .unwrap();
    assert_eq!(spec.filter, Filter::RawJoin);
    assert_eq!(spec.text, "#!/bin/sh\necho <%= greeting %>\n");
    assert_eq!(spec.variables.get("greeting"), Some(&Yaml::string("hello")));
}

#[test]
fn map_with_legacy_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let spec = TemplateSpec::normalize(&decl("txt: \"a: 1\"\nvars: {x: 2}\nfilter: erb-yaml\n"), dir.path()).unwrap();
    assert_eq!(spec.filter, Filter::StructuredYaml);
    assert_eq!(spec.text, "a: 1");
    assert_eq!(spec.variables.get("x"), Some(&Yaml::Integer(2)));
}

#[test]
fn explicit_filter_overrides_detection() {
    let dir = tempfile::tempdir().unwrap();
    let spec = TemplateSpec::normalize(&decl("text: \"---\\nx\"\nfilter: raw-join\n"), dir.path()).unwrap();
    assert_eq!(spec.filter, Filter::RawJoin);
}

#[test]
fn missing_path_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = TemplateSpec::normalize(&decl("path: nope.sh\n"), dir.path()).unwrap_err();
    match err {
        TransformError::MissingTemplateSource { path, .. } => assert!(path.ends_with("nope.sh")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_filter_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = TemplateSpec::normalize(&decl("text: x\nfilter: jinja\n"), dir.path()).unwrap_err();
    assert!(matches!(err, TransformError::InvalidDeclaration { .. }));
}

#[test]
fn map_without_source_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = TemplateSpec::normalize(&decl("variables: {}\n"), dir.path()).unwrap_err();
    assert!(matches!(err, TransformError::InvalidDeclaration { .. }));
}

#[test]
fn scalar_declaration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = TemplateSpec::normalize(&Yaml::Integer(3), dir.path()).unwrap_err();
    assert!(matches!(err, TransformError::InvalidDeclaration { .. }));
}
