//! Minimal JVM classfile reader for the survey renaming engine.
//!
//! Parses class headers, member tables, `Signature` and `Code` attributes, JVM
//! descriptors and generic signatures, and decodes bytecode into an
//! instruction stream.

#![forbid(unsafe_code)]

mod classfile;
mod constant_pool;
mod descriptor;
mod error;
mod insn;
mod reader;
mod signature;

pub use crate::classfile::{access, ClassFile, ClassMember};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::insn::{opcodes, Code, FieldOp, Insn, LdcConstant};
pub use crate::signature::{
    parse_class_signature, parse_field_signature, parse_method_signature, parse_signature,
    ClassSignature, ClassTypeSignature, FieldTypeSignature, InnerClassTypeSignature,
    MethodSignature, Signature, TypeArgument, TypeParameter, TypeSignature,
};
