use std::borrow::Cow;
use std::sync::Arc;

use survey_classfile::{access, ClassFile, Code, Insn};

use crate::error::Result;
use crate::hierarchy::{ClassInfo, FieldSignature, MethodSignature};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceField {
    pub name: String,
    pub descriptor: String,
    pub access_flags: u16,
}

impl SourceField {
    pub fn is_synthetic(&self) -> bool {
        self.access_flags & access::ACC_SYNTHETIC != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMethod {
    pub name: String,
    pub descriptor: String,
    pub access_flags: u16,
}

impl SourceMethod {
    pub fn is_native(&self) -> bool {
        self.access_flags & access::ACC_NATIVE != 0
    }

    pub fn signature_key(&self) -> MethodSignature {
        MethodSignature::new(self.name.clone(), self.descriptor.clone())
    }
}

/// Static initializer body. Raw bytes are decoded on demand so a corrupt
/// initializer only affects the step that looks at it.
#[derive(Debug, Clone)]
pub enum Bytecode {
    Decoded(Vec<Insn>),
    Raw(Code),
}

impl Bytecode {
    pub fn instructions(&self) -> survey_classfile::Result<Cow<'_, [Insn]>> {
        match self {
            Bytecode::Decoded(insns) => Ok(Cow::Borrowed(insns)),
            Bytecode::Raw(code) => code.instructions().map(Cow::Owned),
        }
    }
}

/// A class from the input set, with the member details the synthesizer needs
/// on top of its [`ClassInfo`].
#[derive(Debug, Clone)]
pub struct SourceClass {
    pub info: Arc<ClassInfo>,
    pub fields: Vec<SourceField>,
    pub methods: Vec<SourceMethod>,
    pub static_init: Option<Bytecode>,
}

impl SourceClass {
    pub fn new(name: impl Into<String>, super_name: Option<&str>) -> Self {
        Self {
            info: Arc::new(ClassInfo::new(name, super_name)),
            fields: Vec::new(),
            methods: Vec::new(),
            static_init: None,
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let class = ClassFile::parse(bytes)?;
        Ok(Self::from_class_file(&class))
    }

    pub fn from_class_file(class: &ClassFile) -> Self {
        Self {
            info: Arc::new(ClassInfo::from_class_file(class)),
            fields: class
                .fields
                .iter()
                .map(|f| SourceField {
                    name: f.name.clone(),
                    descriptor: f.descriptor.clone(),
                    access_flags: f.access_flags,
                })
                .collect(),
            methods: class
                .methods
                .iter()
                .map(|m| SourceMethod {
                    name: m.name.clone(),
                    descriptor: m.descriptor.clone(),
                    access_flags: m.access_flags,
                })
                .collect(),
            static_init: class
                .method("<clinit>", "()V")
                .and_then(|m| m.code.clone())
                .map(Bytecode::Raw),
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn super_name(&self) -> Option<&str> {
        self.info.super_name.as_deref()
    }

    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.info).add_interface(name);
        self
    }

    pub fn with_field(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        Arc::make_mut(&mut self.info)
            .fields
            .insert(FieldSignature::new(name, Some(descriptor)));
        self.fields.push(SourceField {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access_flags,
        });
        self
    }

    pub fn with_method(mut self, access_flags: u16, name: &str, descriptor: &str) -> Self {
        Arc::make_mut(&mut self.info)
            .methods
            .insert(MethodSignature::new(name, descriptor));
        self.methods.push(SourceMethod {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access_flags,
        });
        self
    }

    pub fn with_static_init(mut self, insns: Vec<Insn>) -> Self {
        if !self.info.methods.contains(&MethodSignature::new("<clinit>", "()V")) {
            self = self.with_method(access::ACC_STATIC, "<clinit>", "()V");
        }
        self.static_init = Some(Bytecode::Decoded(insns));
        self
    }
}
