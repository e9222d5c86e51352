use std::collections::BTreeMap;

use crate::hierarchy::MethodSignature;

/// Operations shared by every node of a [`MappingSet`].
pub trait Mapping {
    fn obfuscated_name(&self) -> &str;

    fn deobfuscated_name(&self) -> Option<&str>;

    /// Unconditionally replaces the name. Only explicit directives should
    /// call this on a node that already has one.
    fn set_deobfuscated_name(&mut self, name: String);

    fn has_deobfuscated_name(&self) -> bool {
        self.deobfuscated_name().is_some()
    }
}

macro_rules! impl_mapping {
    ($ty:ty) => {
        impl Mapping for $ty {
            fn obfuscated_name(&self) -> &str {
                &self.obfuscated
            }

            fn deobfuscated_name(&self) -> Option<&str> {
                self.deobfuscated.as_deref()
            }

            fn set_deobfuscated_name(&mut self, name: String) {
                self.deobfuscated = Some(name);
            }
        }
    };
}

/// In-memory obfuscated → deobfuscated associations, keyed by obfuscated
/// internal class name. Ordered maps keep iteration (and debug output)
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSet {
    classes: BTreeMap<String, ClassMapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class_mapping(&self, obfuscated: &str) -> Option<&ClassMapping> {
        self.classes.get(obfuscated)
    }

    pub fn get_or_create_class_mapping(&mut self, obfuscated: &str) -> &mut ClassMapping {
        self.classes
            .entry(obfuscated.to_string())
            .or_insert_with(|| ClassMapping::new(obfuscated))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassMapping> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
    obfuscated: String,
    deobfuscated: Option<String>,
    fields: BTreeMap<String, FieldMapping>,
    methods: BTreeMap<MethodSignature, MethodMapping>,
}

impl_mapping!(ClassMapping);

impl ClassMapping {
    fn new(obfuscated: &str) -> Self {
        Self {
            obfuscated: obfuscated.to_string(),
            deobfuscated: None,
            fields: BTreeMap::new(),
            methods: BTreeMap::new(),
        }
    }

    /// Fields are keyed by name alone, matching JVM field identity as the
    /// hierarchy sees it.
    pub fn field_mapping(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.get(name)
    }

    pub fn get_or_create_field_mapping(
        &mut self,
        name: &str,
        descriptor: Option<&str>,
    ) -> &mut FieldMapping {
        let mapping = self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| FieldMapping {
                obfuscated: name.to_string(),
                descriptor: None,
                deobfuscated: None,
            });
        if mapping.descriptor.is_none() {
            mapping.descriptor = descriptor.map(str::to_string);
        }
        mapping
    }

    pub fn method_mapping(&self, signature: &MethodSignature) -> Option<&MethodMapping> {
        self.methods.get(signature)
    }

    pub fn get_or_create_method_mapping(&mut self, name: &str, descriptor: &str) -> &mut MethodMapping {
        let signature = MethodSignature::new(name, descriptor);
        self.methods
            .entry(signature)
            .or_insert_with(|| MethodMapping {
                obfuscated: name.to_string(),
                descriptor: descriptor.to_string(),
                deobfuscated: None,
            })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.fields.values()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodMapping> {
        self.methods.values()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    obfuscated: String,
    descriptor: Option<String>,
    deobfuscated: Option<String>,
}

impl_mapping!(FieldMapping);

impl FieldMapping {
    pub fn descriptor(&self) -> Option<&str> {
        self.descriptor.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMapping {
    obfuscated: String,
    descriptor: String,
    deobfuscated: Option<String>,
}

impl_mapping!(MethodMapping);

impl MethodMapping {
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn signature(&self) -> MethodSignature {
        MethodSignature::new(self.obfuscated.clone(), self.descriptor.clone())
    }
}
