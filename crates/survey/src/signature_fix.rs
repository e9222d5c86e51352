//! Repair for a ProGuard defect in generic signatures.
//!
//! ProGuard sometimes writes the fully qualified obfuscated name of an inner
//! class where the signature grammar wants only the inner segment:
//!
//! ```text
//! bad:  (TK;)Lzt<TK;TT;TR;>.zt$a;
//! good: (TK;)Lzt<TK;TT;TR;>.a;
//! ```

use survey_classfile::{
    parse_signature, ClassSignature, ClassTypeSignature, FieldTypeSignature, MethodSignature,
    Signature, TypeArgument, TypeParameter, TypeSignature,
};

/// Strips a redundant `<enclosing>$` prefix from every inner class segment.
///
/// Idempotent. Input that does not parse as a class, method or field
/// signature is returned unchanged.
pub fn correct_signature(raw: &str) -> String {
    let Ok(mut signature) = parse_signature(raw) else {
        return raw.to_string();
    };

    let mut changed = false;
    visit_class_types(&mut signature, &mut |ty: &mut ClassTypeSignature| {
        changed |= correct_class_type(ty)
    });
    if changed {
        signature.to_string()
    } else {
        raw.to_string()
    }
}

fn correct_class_type(ty: &mut ClassTypeSignature) -> bool {
    let mut changed = false;
    let mut enclosing = ty.name.clone();
    for inner in &mut ty.inner {
        if let Some(stripped) = inner
            .name
            .strip_prefix(enclosing.as_str())
            .and_then(|rest| rest.strip_prefix('$'))
            .filter(|rest| !rest.is_empty())
        {
            inner.name = stripped.to_string();
            changed = true;
        }
        enclosing = format!("{enclosing}${}", inner.name);
    }
    changed
}

/// Calls `f` on every class type in `signature`, type arguments included.
pub(crate) fn visit_class_types(
    signature: &mut Signature,
    f: &mut dyn FnMut(&mut ClassTypeSignature),
) {
    match signature {
        Signature::Class(class) => visit_class_signature(class, f),
        Signature::Method(method) => visit_method_signature(method, f),
        Signature::Field(field) => visit_field_type(field, f),
    }
}

fn visit_class_signature(sig: &mut ClassSignature, f: &mut dyn FnMut(&mut ClassTypeSignature)) {
    visit_type_parameters(&mut sig.type_parameters, f);
    visit_class_type(&mut sig.super_class, f);
    for iface in &mut sig.interfaces {
        visit_class_type(iface, f);
    }
}

fn visit_method_signature(sig: &mut MethodSignature, f: &mut dyn FnMut(&mut ClassTypeSignature)) {
    visit_type_parameters(&mut sig.type_parameters, f);
    for param in &mut sig.parameters {
        visit_type(param, f);
    }
    if let Some(ret) = &mut sig.return_type {
        visit_type(ret, f);
    }
    for thrown in &mut sig.throws {
        visit_field_type(thrown, f);
    }
}

fn visit_type_parameters(params: &mut [TypeParameter], f: &mut dyn FnMut(&mut ClassTypeSignature)) {
    for param in params {
        if let Some(bound) = &mut param.class_bound {
            visit_field_type(bound, f);
        }
        for bound in &mut param.interface_bounds {
            visit_field_type(bound, f);
        }
    }
}

fn visit_type(ty: &mut TypeSignature, f: &mut dyn FnMut(&mut ClassTypeSignature)) {
    if let TypeSignature::Field(field) = ty {
        visit_field_type(field, f);
    }
}

fn visit_field_type(ty: &mut FieldTypeSignature, f: &mut dyn FnMut(&mut ClassTypeSignature)) {
    match ty {
        FieldTypeSignature::Class(class) => visit_class_type(class, f),
        FieldTypeSignature::Array(component) => visit_type(component, f),
        FieldTypeSignature::TypeVariable(_) => {}
    }
}

fn visit_class_type(ty: &mut ClassTypeSignature, f: &mut dyn FnMut(&mut ClassTypeSignature)) {
    for arg in &mut ty.type_arguments {
        visit_type_argument(arg, f);
    }
    for inner in &mut ty.inner {
        for arg in &mut inner.type_arguments {
            visit_type_argument(arg, f);
        }
    }
    f(ty);
}

fn visit_type_argument(arg: &mut TypeArgument, f: &mut dyn FnMut(&mut ClassTypeSignature)) {
    match arg {
        TypeArgument::Any => {}
        TypeArgument::Extends(bound) | TypeArgument::Super(bound) | TypeArgument::Exact(bound) => {
            visit_field_type(bound, f)
        }
    }
}
