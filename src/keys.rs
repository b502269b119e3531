// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

// Declaration keys understood inside a document.

/// Marks a mapping whose content is produced by rendering a template.
pub const TEMPLATE_KEY: &str = "CfnPPTemplate";

/// Marks a nested stack declaration.
pub const STACK_KEY: &str = "CfnPPStack";

/// `{CfnPPRef: name}` is replaced by the value of option `name`.
pub const OPTION_REF_KEY: &str = "CfnPPRef";

/// Keys removed from the final document. The `Manta*` and `CfnPPSection` names
/// are accepted for old templates but have no behavior of their own.
pub const BOOKKEEPING_KEYS: [&str; 6] = [
    TEMPLATE_KEY,
    "MantaTemplateInclude",
    "MantaTemplate",
    "MantaInclude",
    "CfnPPSection",
    STACK_KEY,
];

/// Top-level template sections gathered from any depth into the root.
pub const DEFAULT_LIFT_KEYS: [&str; 5] = ["Parameters", "Mappings", "Resources", "Outputs", "Conditions"];

/// Section that receives the resources generated for nested stacks.
pub const RESOURCES_KEY: &str = "Resources";

pub const REF_KEY: &str = "Ref";
pub const GET_ATT_KEY: &str = "GetAtt";
pub const JOIN_KEY: &str = "Join";
