// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use sha2::{Digest, Sha256};

use crate::cow_yaml::{to_json_string, Yaml};

/// A fully transformed document together with its nested stacks.
///
/// The name is derived from the content (`<stack name>-<sha256 of data>`), so a
/// nested stack's location can be computed before anything is uploaded.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateResult {
    stack_name: String,
    name: String,
    checksum: String,
    data: Yaml,
    substacks: Vec<TemplateResult>,
}

impl TemplateResult {
    pub fn new(stack_name: &str, data: Yaml, substacks: Vec<TemplateResult>) -> TemplateResult {
        let checksum = compute_checksum(&data);
        TemplateResult {
            stack_name: stack_name.to_string(),
            name: format!("{}-{}", stack_name, checksum),
            checksum,
            data,
            substacks,
        }
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn data(&self) -> &Yaml {
        &self.data
    }

    /// Direct children only; each child carries its own substacks.
    pub fn substacks(&self) -> &[TemplateResult] {
        &self.substacks
    }

    /// Where the artifact sink is expected to publish this result.
    pub fn template_url(&self, stack_url_base: &str) -> String {
        format!("{}/{}/template.json", stack_url_base.trim_end_matches('/'), self.name)
    }
}

/// Lowercase hex SHA-256 of the compact JSON form of `data`.
pub fn compute_checksum(data: &Yaml) -> String {
    let mut hasher = Sha256::new();
    hasher.update(to_json_string(data).as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cow_yaml::single_entry;

    #[test]
    fn name_embeds_checksum() {
        let result = TemplateResult::new("nest1", single_entry("a", Yaml::Integer(1)), vec![]);
        assert_eq!(result.checksum().len(), 64);
        assert_eq!(result.name(), format!("nest1-{}", result.checksum()));
    }

    #[test]
    fn checksum_is_stable() {
        let data = single_entry("Resources", single_entry("Q", Yaml::string("x")));
        assert_eq!(compute_checksum(&data), compute_checksum(&data.clone()));
    }

    #[test]
    fn checksum_tracks_content() {
        let a = single_entry("a", Yaml::Integer(1));
        let b = single_entry("a", Yaml::Integer(2));
        assert_ne!(compute_checksum(&a), compute_checksum(&b));
    }

    #[test]
    fn known_digest() {
        // sha256("null")
        assert_eq!(
            compute_checksum(&Yaml::Null),
            "74234e98afe7498fb5daf1f36ac2d78acc339464f950703b8c019892f982b90b"
        );
    }

    #[test]
    fn template_url_uses_name() {
        let result = TemplateResult::new("nest1", Yaml::Null, vec![]);
        assert_eq!(
            result.template_url("https://bucket.s3.amazonaws.com/stacks/"),
            format!("https://bucket.s3.amazonaws.com/stacks/{}/template.json", result.name())
        );
    }
}
