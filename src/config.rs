// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::path::{Path, PathBuf};

use hashlink::LinkedHashMap;

use crate::keys::DEFAULT_LIFT_KEYS;

/// Caller-supplied option values. `None` marks an option that is declared but
/// has no value; it substitutes as the empty string.
pub type Options = LinkedHashMap<String, Option<String>>;

pub const DEFAULT_NAME: &str = "main";
pub const DEFAULT_STACK_URL_BASE: &str = "http://example.com";
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Settings shared by a transform and every nested stack it builds.
#[derive(Clone, Debug)]
pub struct TransformConfig {
    /// Base of the root result's name.
    pub name: String,
    /// Path of the document being transformed. Template and partial paths
    /// resolve against its directory.
    pub file_base: PathBuf,
    pub options: Options,
    /// Prefix of the `TemplateURL` given to nested stack resources.
    pub stack_url_base: String,
    pub lift_keys: Vec<String>,
    /// Deepest allowed chain of nested stacks.
    pub max_depth: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            name: DEFAULT_NAME.to_string(),
            file_base: PathBuf::from("."),
            options: Options::new(),
            stack_url_base: DEFAULT_STACK_URL_BASE.to_string(),
            lift_keys: DEFAULT_LIFT_KEYS.iter().map(|key| key.to_string()).collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl TransformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_file_base(mut self, file_base: impl Into<PathBuf>) -> Self {
        self.file_base = file_base.into();
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn with_stack_url_base(mut self, stack_url_base: impl Into<String>) -> Self {
        self.stack_url_base = stack_url_base.into();
        self
    }

    pub fn with_lift_keys<I, S>(mut self, lift_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lift_keys = lift_keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Directory that relative template paths resolve against.
    pub fn base_dir(&self) -> &Path {
        match self.file_base.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}
