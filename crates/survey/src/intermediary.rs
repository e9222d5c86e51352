use std::cmp::Ordering;
use std::collections::HashSet;

use survey_classfile::parse_field_descriptor;

use crate::config::{ClassNamingConfig, IntermediaryConfig};
use crate::enum_constants::{recover_enum_constants, ENUM_SUPER};
use crate::field_rules::apply_field_rules;
use crate::hierarchy::{
    CachingProvider, CascadingProvider, ClassGraphProvider, ClassInfo, MethodSignature,
    SourceSetProvider,
};
use crate::mappings::{Mapping, MappingSet};
use crate::platform::PlatformClassIndex;
use crate::source::{SourceClass, SourceField, SourceMethod};

const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";
const SYNTHETIC_VALUES: &str = "$VALUES";

/// Counters and tallies from one synthesis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Synthesis {
    /// Member id the next run should start from.
    pub next_member: u32,
    /// Last class id handed out.
    pub next_class: u32,
    pub rule_fields: usize,
    pub recovered_constants: usize,
    pub named_classes: usize,
    pub named_fields: usize,
    pub named_methods: usize,
    pub propagated_methods: usize,
}

/// Names every eligible unnamed member of `classes`, resolving ancestry
/// through the classes themselves and then the built-in platform index.
pub fn synthesize(
    classes: &[SourceClass],
    config: &IntermediaryConfig,
    mappings: &mut MappingSet,
) -> Synthesis {
    let sources: SourceSetProvider = classes.iter().map(|class| class.info.clone()).collect();
    let provider = CachingProvider::new(
        CascadingProvider::new()
            .install(sources)
            .install(PlatformClassIndex::new()),
    );
    synthesize_with(classes, &provider, config, mappings)
}

/// [`synthesize`] against a caller-supplied class graph.
pub fn synthesize_with(
    classes: &[SourceClass],
    provider: &dyn ClassGraphProvider,
    config: &IntermediaryConfig,
    mappings: &mut MappingSet,
) -> Synthesis {
    IntermediarySynthesizer::new(provider, config).run(classes, mappings)
}

/// Two-pass intermediary naming.
///
/// Pass 1 walks classes in case-insensitive name order and gives every
/// member that is declared (not inherited) by its class a
/// `<prefix><id>_<obf>` name from one shared counter. Pass 2 copies the
/// ancestor's name onto each inherited member so overrides stay consistent.
/// Names that already exist are never touched, which makes reruns
/// idempotent.
pub struct IntermediarySynthesizer<'a> {
    provider: &'a dyn ClassGraphProvider,
    config: &'a IntermediaryConfig,
    next_member: u32,
    next_class: u32,
}

impl<'a> IntermediarySynthesizer<'a> {
    pub fn new(provider: &'a dyn ClassGraphProvider, config: &'a IntermediaryConfig) -> Self {
        Self {
            provider,
            config,
            next_member: config.next_member,
            next_class: config.next_class,
        }
    }

    pub fn run(mut self, classes: &[SourceClass], mappings: &mut MappingSet) -> Synthesis {
        let config = self.config;
        let mut outcome = Synthesis::default();

        let mut ordered: Vec<&SourceClass> = classes
            .iter()
            .filter(|class| !config.is_excluded(class.name()))
            .collect();
        ordered.sort_by(|a, b| compare_ignore_case(a.name(), b.name()));

        outcome.rule_fields =
            apply_field_rules(ordered.iter().copied(), &config.field_rules, mappings);

        if config.recover_enum_constants {
            for class in &ordered {
                outcome.recovered_constants += recover_enum_constants(class, mappings);
            }
        }

        if let Some(naming) = &config.classes {
            for class in &ordered {
                if self.name_class(class, naming, mappings) {
                    outcome.named_classes += 1;
                }
            }
        }

        for class in &ordered {
            self.define(class, mappings, &mut outcome);
        }
        tracing::debug!(
            target: "survey.intermediary",
            classes = ordered.len(),
            fields = outcome.named_fields,
            methods = outcome.named_methods,
            next_member = self.next_member,
            "definition pass complete"
        );

        if config.map_methods {
            for class in &ordered {
                outcome.propagated_methods += self.propagate(class, mappings);
            }
        }
        tracing::debug!(
            target: "survey.intermediary",
            propagated = outcome.propagated_methods,
            "propagation pass complete"
        );

        outcome.next_member = self.next_member;
        outcome.next_class = self.next_class;
        outcome
    }

    fn name_class(
        &mut self,
        class: &SourceClass,
        naming: &ClassNamingConfig,
        mappings: &mut MappingSet,
    ) -> bool {
        let mapping = mappings.get_or_create_class_mapping(class.name());
        if mapping.has_deobfuscated_name() {
            return false;
        }

        self.next_class += 1;
        let id = self.next_class;
        let simple = class.name().rsplit('/').next().unwrap_or(class.name());
        let name = match simple.rsplit_once('$') {
            Some((outer, inner)) if !outer.is_empty() && !inner.is_empty() => {
                naming.format_name(id, inner)
            }
            _ => format!("{}{}", package_prefix(&naming.package), naming.format_name(id, simple)),
        };
        tracing::trace!(target: "survey.intermediary", class = class.name(), %name, "class");
        assign(mapping, name);
        true
    }

    fn define(&mut self, class: &SourceClass, mappings: &mut MappingSet, outcome: &mut Synthesis) {
        if self.config.map_fields {
            let mut fields: Vec<&SourceField> = class.fields.iter().collect();
            fields.sort_by(|a, b| {
                compare_ignore_case(&a.name, &b.name).then_with(|| a.descriptor.cmp(&b.descriptor))
            });
            for field in fields {
                if self.define_field(class, field, mappings) {
                    outcome.named_fields += 1;
                }
            }
        }

        if self.config.map_methods {
            let mut methods: Vec<&SourceMethod> = class.methods.iter().collect();
            methods.sort_by(|a, b| {
                compare_ignore_case(&a.name, &b.name).then_with(|| a.descriptor.cmp(&b.descriptor))
            });
            for method in methods {
                let signature = method.signature_key();
                // Overrides are named from their ancestor in the second pass.
                if self.is_inherited(&class.info, &signature) {
                    continue;
                }
                if self.define_method(class, method, mappings) {
                    outcome.named_methods += 1;
                }
            }
        }
    }

    fn define_field(&mut self, class: &SourceClass, field: &SourceField, mappings: &mut MappingSet) -> bool {
        let name = field.name.as_str();
        if mappings
            .class_mapping(class.name())
            .and_then(|c| c.field_mapping(name))
            .is_some_and(|f| f.has_deobfuscated_name())
        {
            return false;
        }
        if name.starts_with(self.config.field_prefix.as_str())
            || name.starts_with("this$")
            || name.starts_with("val$")
            || name.eq_ignore_ascii_case(SYNTHETIC_VALUES)
        {
            return false;
        }

        let new_name = if self.config.map_synthetic_values && is_enum_values_array(class, field) {
            SYNTHETIC_VALUES.to_string()
        } else {
            let id = self.take_member_id();
            format!("{}{id}_{name}", self.config.field_prefix)
        };

        tracing::trace!(
            target: "survey.intermediary",
            class = class.name(),
            field = name,
            name = %new_name,
            "field"
        );
        let mapping = mappings
            .get_or_create_class_mapping(class.name())
            .get_or_create_field_mapping(name, Some(field.descriptor.as_str()));
        assign(mapping, new_name);
        true
    }

    fn define_method(
        &mut self,
        class: &SourceClass,
        method: &SourceMethod,
        mappings: &mut MappingSet,
    ) -> bool {
        let signature = method.signature_key();
        if mappings
            .class_mapping(class.name())
            .and_then(|c| c.method_mapping(&signature))
            .is_some_and(|m| m.has_deobfuscated_name())
        {
            return false;
        }
        if is_excluded_method(class, method) || method.name.starts_with(self.config.method_prefix.as_str()) {
            return false;
        }

        let id = self.take_member_id();
        let new_name = format!("{}{id}_{}", self.config.method_prefix, method.name);
        tracing::trace!(
            target: "survey.intermediary",
            class = class.name(),
            method = %method.name,
            descriptor = %method.descriptor,
            name = %new_name,
            "method"
        );
        let mapping = mappings
            .get_or_create_class_mapping(class.name())
            .get_or_create_method_mapping(&method.name, &method.descriptor);
        assign(mapping, new_name);
        true
    }

    fn propagate(&self, class: &SourceClass, mappings: &mut MappingSet) -> usize {
        let mut propagated = 0;
        for method in &class.methods {
            let signature = method.signature_key();
            if !self.is_inherited(&class.info, &signature) {
                continue;
            }
            if mappings
                .class_mapping(class.name())
                .and_then(|c| c.method_mapping(&signature))
                .is_some_and(|m| m.has_deobfuscated_name())
            {
                continue;
            }

            let inherited_name = self.find_ancestor(&class.info, &mut |ancestor: &ClassInfo| {
                mappings
                    .class_mapping(&ancestor.name)
                    .and_then(|c| c.method_mapping(&signature))
                    .and_then(|m| m.deobfuscated_name())
                    .map(str::to_string)
            });
            let Some(inherited_name) = inherited_name else {
                continue;
            };

            tracing::trace!(
                target: "survey.intermediary",
                class = class.name(),
                method = %method.name,
                descriptor = %method.descriptor,
                name = %inherited_name,
                "inherited"
            );
            let mapping = mappings
                .get_or_create_class_mapping(class.name())
                .get_or_create_method_mapping(&method.name, &method.descriptor);
            assign(mapping, inherited_name);
            propagated += 1;
        }
        propagated
    }

    /// Raw signature membership in any ancestor, not JVM override rules:
    /// a private or static method with a matching signature counts too.
    fn is_inherited(&self, info: &ClassInfo, signature: &MethodSignature) -> bool {
        self.find_ancestor(info, &mut |ancestor: &ClassInfo| {
            ancestor.has_method(signature).then_some(())
        })
        .is_some()
    }

    /// Depth-first over `[super] ++ interfaces`; returns the first value `f`
    /// produces. Each class is visited at most once.
    fn find_ancestor<T>(
        &self,
        info: &ClassInfo,
        f: &mut dyn FnMut(&ClassInfo) -> Option<T>,
    ) -> Option<T> {
        let mut visited = HashSet::from([info.name.clone()]);
        let mut pending = Vec::new();
        push_parents(&mut pending, info);
        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }
            let Some(parent_info) = self.provider.provide(&name) else {
                continue;
            };
            if let Some(found) = f(&*parent_info) {
                return Some(found);
            }
            push_parents(&mut pending, &parent_info);
        }
        None
    }

    fn take_member_id(&mut self) -> u32 {
        let id = self.next_member;
        self.next_member += 1;
        id
    }
}

/// Pushes in reverse so the superclass is popped first.
fn push_parents(pending: &mut Vec<String>, info: &ClassInfo) {
    let first = pending.len();
    pending.extend(info.parents().map(str::to_string));
    pending[first..].reverse();
}

fn assign(mapping: &mut impl Mapping, name: String) {
    debug_assert!(
        !mapping.has_deobfuscated_name(),
        "synthesizer would overwrite {:?} of {}",
        mapping.deobfuscated_name(),
        mapping.obfuscated_name()
    );
    mapping.set_deobfuscated_name(name);
}

fn is_enum_values_array(class: &SourceClass, field: &SourceField) -> bool {
    class.super_name() == Some(ENUM_SUPER)
        && field.is_synthetic()
        && parse_field_descriptor(&field.descriptor).is_ok_and(|ty| ty.is_array_of_class(class.name()))
}

/// Constructors, initializers, compiler-generated bridges, natives and the
/// JVM entry point keep their names, as do the methods javac generates for
/// every enum.
fn is_excluded_method(class: &SourceClass, method: &SourceMethod) -> bool {
    let name = method.name.as_str();
    if name.eq_ignore_ascii_case("<init>")
        || name.eq_ignore_ascii_case("<clinit>")
        || name.starts_with("lambda$")
        || name.starts_with("access$")
        || method.is_native()
        || (name == "main" && method.descriptor == MAIN_DESCRIPTOR)
    {
        return true;
    }
    if class.super_name() == Some(ENUM_SUPER) {
        let self_name = class.name();
        let value_of = format!("(Ljava/lang/String;)L{self_name};");
        let values = format!("()[L{self_name};");
        return (name == "valueOf" && method.descriptor == value_of)
            || (name == "values" && method.descriptor == values);
    }
    false
}

fn package_prefix(package: &str) -> String {
    let package = package.replace('.', "/");
    let package = package.trim_end_matches('/');
    if package.is_empty() {
        String::new()
    } else {
        format!("{package}/")
    }
}

/// Case-insensitive ordering with an exact-name tie-break so the order is
/// total and does not depend on input order.
pub(crate) fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}
