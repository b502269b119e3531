// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while building a [`Transform`](crate::transform::Transform).
///
/// Every pass aborts on the first error; a nested document's failure reaches
/// the caller wrapped in [`TransformError::NestedTransformError`].
#[derive(Debug, Error)]
pub enum TransformError {
    /// A template file named by a declaration could not be read.
    #[error("cannot read template source '{}': {source}", path.display())]
    MissingTemplateSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rendered template output is not what its filter expects.
    #[error("cannot parse rendered template output ({message}): {fragment:?}")]
    TemplateParseError { fragment: String, message: String },

    /// An option reference names an option the caller did not supply.
    #[error("missing value for option '{name}'")]
    MissingOptionValue { name: String },

    #[error("nested stack '{name}' failed: {source}")]
    NestedTransformError {
        name: String,
        #[source]
        source: Box<TransformError>,
    },

    #[error("template syntax error: {message}")]
    TemplateSyntax { message: String },

    #[error("template render error: {message}")]
    TemplateRender { message: String },

    /// A declaration key holds a value of the wrong shape.
    #[error("invalid '{key}' declaration: {message}")]
    InvalidDeclaration { key: String, message: String },

    #[error("cannot parse document: {message}")]
    DocumentParse { message: String },

    #[error("stack '{name}' exceeds the maximum nesting depth of {max_depth}")]
    NestingTooDeep { name: String, max_depth: usize },
}

pub type Result<T> = std::result::Result<T, TransformError>;

impl TransformError {
    /// Unwraps nested-stack wrappers down to the error that started it.
    pub fn root_cause(&self) -> &TransformError {
        match self {
            TransformError::NestedTransformError { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Names of the nested stacks the error passed through, outermost first.
    pub fn stack_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let TransformError::NestedTransformError { name, source } = current {
            path.push(name.as_str());
            current = source.as_ref();
        }
        path
    }
}
