//! Inheritance-aware renaming engine for obfuscated JVM class sets.
//!
//! The crate answers three questions for a pipeline that rewrites class files:
//! what a class's shape is ([`ClassGraphProvider`]), what a referenced field or
//! method should be called ([`MemberNameResolver`]), and what to call members
//! nobody has named yet ([`synthesize`]). Generic signatures damaged by
//! ProGuard-style obfuscators are repaired by [`correct_signature`].
//!
//! Everything operates on in-memory metadata. Reading archives, parsing mapping
//! files and driving a bytecode rewriter are the caller's business.

#![forbid(unsafe_code)]

mod config;
mod enum_constants;
mod error;
mod field_rules;
mod hierarchy;
mod intermediary;
mod mappings;
mod platform;
mod resolver;
mod signature_fix;
mod source;

pub use crate::config::{ClassNamingConfig, IntermediaryConfig};
pub use crate::enum_constants::recover_enum_constants;
pub use crate::error::{ConfigError, Result, SurveyError};
pub use crate::field_rules::{apply_field_rules, FieldNameRule, ModifierRequirement, ModifierRequirements};
pub use crate::hierarchy::{
    CachingProvider, CascadingProvider, ClassGraphProvider, ClassInfo, FieldSignature,
    MethodSignature, SourceSetProvider,
};
pub use crate::intermediary::{synthesize, synthesize_with, IntermediarySynthesizer, Synthesis};
pub use crate::mappings::{ClassMapping, FieldMapping, Mapping, MappingSet, MethodMapping};
pub use crate::platform::PlatformClassIndex;
pub use crate::resolver::MemberNameResolver;
pub use crate::signature_fix::correct_signature;
pub use crate::source::{Bytecode, SourceClass, SourceField, SourceMethod};
