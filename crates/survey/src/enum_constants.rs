use survey_classfile::{FieldOp, Insn, LdcConstant};

use crate::mappings::{Mapping, MappingSet};
use crate::source::SourceClass;

pub(crate) const ENUM_SUPER: &str = "java/lang/Enum";

/// Recovers enum constant names from a static initializer.
///
/// javac builds each constant as `NEW Self; DUP; LDC "NAME"; ...; PUTSTATIC
/// Self.x : LSelf;`, so the string handed to the constructor is the source
/// name of the field the result is stored into. Fields that already have a
/// name keep it.
///
/// Returns the number of constants named. Classes that do not directly extend
/// `java/lang/Enum`, have no initializer, or whose initializer cannot be
/// decoded are skipped.
pub fn recover_enum_constants(class: &SourceClass, mappings: &mut MappingSet) -> usize {
    if class.super_name() != Some(ENUM_SUPER) {
        return 0;
    }
    let Some(static_init) = &class.static_init else {
        return 0;
    };
    let insns = match static_init.instructions() {
        Ok(insns) => insns,
        Err(err) => {
            tracing::warn!(
                target: "survey.enum",
                class = class.name(),
                error = %err,
                "skipping enum with undecodable static initializer"
            );
            return 0;
        }
    };

    let self_descriptor = format!("L{};", class.name());
    let mut armed = false;
    let mut candidate: Option<&str> = None;
    let mut recovered = 0;

    for insn in insns.iter() {
        match insn {
            Insn::New(ty) if ty == class.name() => armed = true,
            Insn::Ldc(LdcConstant::String(value)) if armed => {
                candidate = Some(value.as_str());
                armed = false;
            }
            Insn::Field {
                op: FieldOp::PutStatic,
                owner,
                name,
                descriptor,
            } if owner == class.name() && *descriptor == self_descriptor => {
                let Some(constant) = candidate.take() else {
                    continue;
                };
                let field = mappings
                    .get_or_create_class_mapping(class.name())
                    .get_or_create_field_mapping(name, Some(descriptor.as_str()));
                if field.has_deobfuscated_name() {
                    continue;
                }
                tracing::trace!(
                    target: "survey.enum",
                    class = class.name(),
                    field = %name,
                    constant,
                    "recovered enum constant"
                );
                field.set_deobfuscated_name(constant.to_string());
                recovered += 1;
            }
            _ => {}
        }
    }
    recovered
}
