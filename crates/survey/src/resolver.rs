use std::collections::HashSet;

use survey_classfile::{parse_signature, ClassTypeSignature};

use crate::hierarchy::{ClassGraphProvider, MethodSignature};
use crate::mappings::{Mapping, MappingSet};
use crate::signature_fix::{correct_signature, visit_class_types};

/// Looks up the name a field or method reference should be renamed to,
/// honouring JVM inheritance.
///
/// Fields are not virtual and are only searched up the superclass chain.
/// Methods are searched depth-first over the superclass and then each
/// interface in declaration order. Resolution never invents a name: `None`
/// means the caller should keep the obfuscated one.
#[derive(Clone, Copy)]
pub struct MemberNameResolver<'a> {
    mappings: &'a MappingSet,
    provider: &'a dyn ClassGraphProvider,
}

impl<'a> MemberNameResolver<'a> {
    pub fn new(mappings: &'a MappingSet, provider: &'a dyn ClassGraphProvider) -> Self {
        Self { mappings, provider }
    }

    pub fn resolve_field(&self, owner: &str, name: &str) -> Option<&'a str> {
        let mut visited = HashSet::new();
        let mut current = owner.to_string();
        loop {
            if !visited.insert(current.clone()) {
                return None;
            }
            if let Some(found) = self
                .mappings
                .class_mapping(&current)
                .and_then(|class| class.field_mapping(name))
                .and_then(|field| field.deobfuscated_name())
            {
                return Some(found);
            }
            let info = self.provider.provide(&current)?;
            current = self.known_parent(info.super_name.as_deref()?)?.to_string();
        }
    }

    pub fn resolve_method(&self, owner: &str, name: &str, descriptor: &str) -> Option<&'a str> {
        let signature = MethodSignature::new(name, descriptor);
        let mut visited = HashSet::new();
        let mut pending = vec![owner.to_string()];
        while let Some(current) = pending.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            if let Some(found) = self
                .mappings
                .class_mapping(&current)
                .and_then(|class| class.method_mapping(&signature))
                .and_then(|method| method.deobfuscated_name())
            {
                return Some(found);
            }
            let Some(info) = self.provider.provide(&current) else {
                continue;
            };
            // Reversed so the superclass is popped first.
            let parents: Vec<_> = info
                .parents()
                .filter_map(|parent| self.known_parent(parent))
                .map(str::to_string)
                .collect();
            pending.extend(parents.into_iter().rev());
        }
        None
    }

    /// An ancestor the provider has never heard of ends that branch of the
    /// walk, even if stray mappings exist for its name.
    fn known_parent<'n>(&self, parent: &'n str) -> Option<&'n str> {
        self.provider.provide(parent).map(|_| parent)
    }

    pub fn map_field_name<'n>(&self, owner: &str, name: &'n str) -> &'n str
    where
        'a: 'n,
    {
        self.resolve_field(owner, name).unwrap_or(name)
    }

    pub fn map_method_name<'n>(&self, owner: &str, name: &'n str, descriptor: &str) -> &'n str
    where
        'a: 'n,
    {
        self.resolve_method(owner, name, descriptor).unwrap_or(name)
    }

    /// Full deobfuscated internal name of a class, or `None` when neither the
    /// class nor any enclosing class is mapped.
    ///
    /// Inner class mappings hold only the inner segment (`Outer$Inner` maps
    /// to `Inner`'s new simple name); the enclosing class supplies the rest.
    pub fn resolve_class(&self, name: &str) -> Option<String> {
        let mapped = self.map_class_name(name);
        (mapped != name).then_some(mapped)
    }

    pub fn map_class_name(&self, name: &str) -> String {
        let own = self
            .mappings
            .class_mapping(name)
            .and_then(|class| class.deobfuscated_name());
        match name.rsplit_once('$') {
            Some((outer, inner)) if !outer.is_empty() && !inner.is_empty() => {
                format!("{}${}", self.map_class_name(outer), own.unwrap_or(inner))
            }
            _ => own.unwrap_or(name).to_string(),
        }
    }

    pub fn correct_signature(&self, raw: &str) -> String {
        correct_signature(raw)
    }

    /// Corrects `raw` and then renames every class it mentions.
    ///
    /// Malformed signatures are returned unchanged.
    pub fn remap_signature(&self, raw: &str) -> String {
        let corrected = correct_signature(raw);
        let Ok(mut signature) = parse_signature(&corrected) else {
            return corrected;
        };
        visit_class_types(&mut signature, &mut |ty: &mut ClassTypeSignature| {
            self.remap_class_type(ty)
        });
        signature.to_string()
    }

    fn remap_class_type(&self, ty: &mut ClassTypeSignature) {
        let mut qualified = ty.name.clone();
        ty.name = self.map_class_name(&ty.name);
        for inner in &mut ty.inner {
            qualified = format!("{qualified}${}", inner.name);
            let mapped = self.map_class_name(&qualified);
            if let Some((_, simple)) = mapped.rsplit_once('$') {
                inner.name = simple.to_string();
            }
        }
    }
}

impl std::fmt::Debug for MemberNameResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberNameResolver")
            .field("classes", &self.mappings.len())
            .finish_non_exhaustive()
    }
}
