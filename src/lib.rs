// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

//! Expands embedded templates and inline nested stacks in CloudFormation-style
//! documents, then lifts the top-level sections to the root.

pub mod ast;
pub mod config;
pub mod cow_yaml;
pub mod error;
pub mod keys;
pub mod option_arg;
pub mod parser;
pub mod renderer;
pub mod sink;
pub mod template_result;
pub mod template_spec;
pub mod transform;
pub mod yaml_utils;

pub use config::{Options, TransformConfig};
pub use error::TransformError;
pub use template_result::TemplateResult;
pub use transform::{load_file, load_yaml, Transform};
