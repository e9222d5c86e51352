use serde::{Deserialize, Serialize};
use survey_classfile::access;

use crate::mappings::{Mapping, MappingSet};
use crate::source::SourceClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierRequirement {
    Public,
    Private,
    Static,
    Final,
    Synthetic,
}

impl ModifierRequirement {
    pub const ALL: [ModifierRequirement; 5] = [
        ModifierRequirement::Public,
        ModifierRequirement::Private,
        ModifierRequirement::Static,
        ModifierRequirement::Final,
        ModifierRequirement::Synthetic,
    ];

    pub fn test(self, access_flags: u16) -> bool {
        let bit = match self {
            ModifierRequirement::Public => access::ACC_PUBLIC,
            ModifierRequirement::Private => access::ACC_PRIVATE,
            ModifierRequirement::Static => access::ACC_STATIC,
            ModifierRequirement::Final => access::ACC_FINAL,
            ModifierRequirement::Synthetic => access::ACC_SYNTHETIC,
        };
        access_flags & bit != 0
    }
}

/// Which modifiers a field must (`true`) or must not (`false`) carry. Unset
/// modifiers are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModifierRequirements {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(rename = "static", skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthetic: Option<bool>,
}

impl ModifierRequirements {
    pub fn get(&self, requirement: ModifierRequirement) -> Option<bool> {
        match requirement {
            ModifierRequirement::Public => self.public,
            ModifierRequirement::Private => self.private,
            ModifierRequirement::Static => self.is_static,
            ModifierRequirement::Final => self.is_final,
            ModifierRequirement::Synthetic => self.synthetic,
        }
    }

    pub fn require(mut self, requirement: ModifierRequirement, expected: bool) -> Self {
        let slot = match requirement {
            ModifierRequirement::Public => &mut self.public,
            ModifierRequirement::Private => &mut self.private,
            ModifierRequirement::Static => &mut self.is_static,
            ModifierRequirement::Final => &mut self.is_final,
            ModifierRequirement::Synthetic => &mut self.synthetic,
        };
        *slot = Some(expected);
        self
    }

    pub fn matches(&self, access_flags: u16) -> bool {
        ModifierRequirement::ALL.into_iter().all(|req| match self.get(req) {
            Some(expected) => req.test(access_flags) == expected,
            None => true,
        })
    }
}

/// Names every field with an exact descriptor and matching modifiers.
///
/// A typical use is the `serialVersionUID` constant:
///
/// ```toml
/// [[field_rules]]
/// descriptor = "J"
/// name = "serialVersionUID"
/// requirements = { static = true, final = true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldNameRule {
    pub descriptor: String,
    pub name: String,
    #[serde(default)]
    pub requirements: ModifierRequirements,
}

impl FieldNameRule {
    pub fn new(descriptor: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
            name: name.into(),
            requirements: ModifierRequirements::default(),
        }
    }

    pub fn require(mut self, requirement: ModifierRequirement, expected: bool) -> Self {
        self.requirements = self.requirements.require(requirement, expected);
        self
    }

    pub fn matches(&self, descriptor: &str, access_flags: u16) -> bool {
        self.descriptor == descriptor && self.requirements.matches(access_flags)
    }
}

/// Applies `rules` to every field of every class. Rules are explicit
/// directives: a match overwrites whatever name the field had. When several
/// rules match, the last one wins.
///
/// Returns the number of fields named.
pub fn apply_field_rules<'c>(
    classes: impl IntoIterator<Item = &'c SourceClass>,
    rules: &[FieldNameRule],
    mappings: &mut MappingSet,
) -> usize {
    if rules.is_empty() {
        return 0;
    }
    let mut named = 0;
    for class in classes {
        for field in &class.fields {
            let Some(rule) = rules
                .iter()
                .rev()
                .find(|rule| rule.matches(&field.descriptor, field.access_flags))
            else {
                continue;
            };
            mappings
                .get_or_create_class_mapping(class.name())
                .get_or_create_field_mapping(&field.name, Some(field.descriptor.as_str()))
                .set_deobfuscated_name(rule.name.clone());
            tracing::trace!(
                target: "survey.intermediary",
                class = class.name(),
                field = %field.name,
                name = %rule.name,
                "field rule matched"
            );
            named += 1;
        }
    }
    named
}
