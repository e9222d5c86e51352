//! Generic signature (JVMS §4.7.9.1) parsing and rendering.
//!
//! Rendering a parsed signature with `Display` reproduces the input exactly for
//! well-formed signatures, which lets callers rewrite individual tokens and
//! write the result back.

use std::fmt;

use crate::descriptor::BaseType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: ClassTypeSignature,
    pub interfaces: Vec<ClassTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<TypeSignature>,
    /// `None` for `void`.
    pub return_type: Option<TypeSignature>,
    pub throws: Vec<FieldTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub name: String,
    /// Empty class bounds (`T::Ljava/lang/Runnable;`) are kept as `None`.
    pub class_bound: Option<FieldTypeSignature>,
    pub interface_bounds: Vec<FieldTypeSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSignature {
    Base(BaseType),
    Field(FieldTypeSignature),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTypeSignature {
    Class(ClassTypeSignature),
    TypeVariable(String),
    Array(Box<TypeSignature>),
}

/// `Lpkg/Outer<..>.Inner<..>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeSignature {
    /// Internal name of the outermost class, e.g. `java/util/Map`.
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
    pub inner: Vec<InnerClassTypeSignature>,
}

/// One `.Name<..>` suffix of a [`ClassTypeSignature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassTypeSignature {
    pub name: String,
    pub type_arguments: Vec<TypeArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeArgument {
    /// `*`
    Any,
    /// `+Bound`
    Extends(FieldTypeSignature),
    /// `-Bound`
    Super(FieldTypeSignature),
    Exact(FieldTypeSignature),
}

/// A signature whose kind is not known up front (as handed out by a
/// bytecode visitor, which only sees the raw attribute string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Class(ClassSignature),
    Method(MethodSignature),
    Field(FieldTypeSignature),
}

pub fn parse_class_signature(sig: &str) -> Result<ClassSignature> {
    let mut p = Parser::new(sig);
    let out = p.class_signature()?;
    p.finish(out)
}

pub fn parse_method_signature(sig: &str) -> Result<MethodSignature> {
    let mut p = Parser::new(sig);
    let out = p.method_signature()?;
    p.finish(out)
}

pub fn parse_field_signature(sig: &str) -> Result<FieldTypeSignature> {
    let mut p = Parser::new(sig);
    let out = p.field_type_signature()?;
    p.finish(out)
}

/// Parses a signature of any kind.
///
/// A lone class type (`Lfoo<TT;>;`) is reported as [`Signature::Field`]; a
/// class signature with only a superclass renders identically, so the choice
/// does not matter for rewriting.
pub fn parse_signature(sig: &str) -> Result<Signature> {
    let mut p = Parser::new(sig);
    let type_parameters = if p.peek() == Some('<') {
        p.type_parameters()?
    } else {
        Vec::new()
    };

    if p.peek() == Some('(') {
        let out = p.method_signature_after_type_parameters(type_parameters)?;
        return p.finish(out).map(Signature::Method);
    }

    if type_parameters.is_empty() {
        let first = p.field_type_signature()?;
        if p.at_end() {
            return Ok(Signature::Field(first));
        }
        let FieldTypeSignature::Class(super_class) = first else {
            return Err(p.error());
        };
        let out = p.class_signature_rest(Vec::new(), super_class)?;
        return p.finish(out).map(Signature::Class);
    }

    let super_class = p.class_type_signature()?;
    let out = p.class_signature_rest(type_parameters, super_class)?;
    p.finish(out).map(Signature::Class)
}

/// Array dimensions a single type may carry (JVMS §4.4.1).
const MAX_ARRAY_DIMENSIONS: usize = 255;

/// Nesting of type arguments and bounds before a signature is rejected.
const MAX_NESTING: usize = 128;

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self) -> Error {
        Error::InvalidSignature(self.input.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos == self.input.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.bump() == Some(expected) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn finish<T>(&self, value: T) -> Result<T> {
        if self.at_end() {
            Ok(value)
        } else {
            Err(self.error())
        }
    }

    /// Reads a non-empty run of characters up to (not including) any of `stops`.
    fn identifier(&mut self, stops: &[char]) -> Result<&'a str> {
        let rest = &self.input[self.pos..];
        let len = rest.find(|c: char| stops.contains(&c)).unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error());
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn class_signature(&mut self) -> Result<ClassSignature> {
        let type_parameters = if self.peek() == Some('<') {
            self.type_parameters()?
        } else {
            Vec::new()
        };
        let super_class = self.class_type_signature()?;
        self.class_signature_rest(type_parameters, super_class)
    }

    fn class_signature_rest(
        &mut self,
        type_parameters: Vec<TypeParameter>,
        super_class: ClassTypeSignature,
    ) -> Result<ClassSignature> {
        let mut interfaces = Vec::new();
        while !self.at_end() {
            interfaces.push(self.class_type_signature()?);
        }
        Ok(ClassSignature {
            type_parameters,
            super_class,
            interfaces,
        })
    }

    fn method_signature(&mut self) -> Result<MethodSignature> {
        let type_parameters = if self.peek() == Some('<') {
            self.type_parameters()?
        } else {
            Vec::new()
        };
        self.method_signature_after_type_parameters(type_parameters)
    }

    fn method_signature_after_type_parameters(
        &mut self,
        type_parameters: Vec<TypeParameter>,
    ) -> Result<MethodSignature> {
        self.expect('(')?;
        let mut parameters = Vec::new();
        while self.peek() != Some(')') {
            if self.at_end() {
                return Err(self.error());
            }
            parameters.push(self.type_signature()?);
        }
        self.expect(')')?;

        let return_type = if self.peek() == Some('V') {
            self.bump();
            None
        } else {
            Some(self.type_signature()?)
        };

        let mut throws = Vec::new();
        while self.peek() == Some('^') {
            self.bump();
            match self.field_type_signature()? {
                ty @ (FieldTypeSignature::Class(_) | FieldTypeSignature::TypeVariable(_)) => {
                    throws.push(ty)
                }
                FieldTypeSignature::Array(_) => return Err(self.error()),
            }
        }

        Ok(MethodSignature {
            type_parameters,
            parameters,
            return_type,
            throws,
        })
    }

    fn type_parameters(&mut self) -> Result<Vec<TypeParameter>> {
        self.expect('<')?;
        let mut out = Vec::new();
        while self.peek() != Some('>') {
            let name = self.identifier(&[':', '>'])?.to_string();
            self.expect(':')?;
            let class_bound = match self.peek() {
                Some(':') | Some('>') => None,
                _ => Some(self.field_type_signature()?),
            };
            let mut interface_bounds = Vec::new();
            while self.peek() == Some(':') {
                self.bump();
                interface_bounds.push(self.field_type_signature()?);
            }
            out.push(TypeParameter {
                name,
                class_bound,
                interface_bounds,
            });
        }
        self.expect('>')?;
        if out.is_empty() {
            return Err(self.error());
        }
        Ok(out)
    }

    fn type_signature(&mut self) -> Result<TypeSignature> {
        let base = self
            .peek()
            .filter(char::is_ascii)
            .and_then(|c| BaseType::from_char(c as u8));
        match base {
            Some(base) => {
                self.bump();
                Ok(TypeSignature::Base(base))
            }
            None => Ok(TypeSignature::Field(self.field_type_signature()?)),
        }
    }

    fn field_type_signature(&mut self) -> Result<FieldTypeSignature> {
        if self.depth == MAX_NESTING {
            return Err(self.error());
        }
        self.depth += 1;
        let out = self.field_type_signature_at_depth();
        self.depth -= 1;
        out
    }

    fn field_type_signature_at_depth(&mut self) -> Result<FieldTypeSignature> {
        match self.peek() {
            Some('L') => Ok(FieldTypeSignature::Class(self.class_type_signature()?)),
            Some('T') => {
                self.bump();
                let name = self.identifier(&[';'])?.to_string();
                self.expect(';')?;
                Ok(FieldTypeSignature::TypeVariable(name))
            }
            Some('[') => {
                let dimensions = self.input[self.pos..]
                    .bytes()
                    .take_while(|&b| b == b'[')
                    .count();
                if dimensions > MAX_ARRAY_DIMENSIONS {
                    return Err(self.error());
                }
                self.pos += dimensions;
                let mut ty = FieldTypeSignature::Array(Box::new(self.type_signature()?));
                for _ in 1..dimensions {
                    ty = FieldTypeSignature::Array(Box::new(TypeSignature::Field(ty)));
                }
                Ok(ty)
            }
            _ => Err(self.error()),
        }
    }

    fn class_type_signature(&mut self) -> Result<ClassTypeSignature> {
        self.expect('L')?;
        let name = self.identifier(&['<', '.', ';'])?.to_string();
        let type_arguments = self.type_arguments()?;

        let mut inner = Vec::new();
        while self.peek() == Some('.') {
            self.bump();
            let name = self.identifier(&['<', '.', ';'])?.to_string();
            let type_arguments = self.type_arguments()?;
            inner.push(InnerClassTypeSignature {
                name,
                type_arguments,
            });
        }
        self.expect(';')?;

        Ok(ClassTypeSignature {
            name,
            type_arguments,
            inner,
        })
    }

    fn type_arguments(&mut self) -> Result<Vec<TypeArgument>> {
        if self.peek() != Some('<') {
            return Ok(Vec::new());
        }
        self.bump();
        let mut out = Vec::new();
        while self.peek() != Some('>') {
            let arg = match self.peek() {
                Some('*') => {
                    self.bump();
                    TypeArgument::Any
                }
                Some('+') => {
                    self.bump();
                    TypeArgument::Extends(self.field_type_signature()?)
                }
                Some('-') => {
                    self.bump();
                    TypeArgument::Super(self.field_type_signature()?)
                }
                _ => TypeArgument::Exact(self.field_type_signature()?),
            };
            out.push(arg);
        }
        self.bump();
        if out.is_empty() {
            return Err(self.error());
        }
        Ok(out)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Class(sig) => write!(f, "{}", sig),
            Signature::Method(sig) => write!(f, "{}", sig),
            Signature::Field(sig) => write!(f, "{}", sig),
        }
    }
}

fn write_type_parameters(f: &mut fmt::Formatter<'_>, params: &[TypeParameter]) -> fmt::Result {
    if params.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for param in params {
        write!(f, "{}:", param.name)?;
        if let Some(bound) = &param.class_bound {
            write!(f, "{}", bound)?;
        }
        for bound in &param.interface_bounds {
            write!(f, ":{bound}")?;
        }
    }
    f.write_str(">")
}

fn write_type_arguments(f: &mut fmt::Formatter<'_>, args: &[TypeArgument]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for arg in args {
        match arg {
            TypeArgument::Any => f.write_str("*")?,
            TypeArgument::Extends(ty) => write!(f, "+{ty}")?,
            TypeArgument::Super(ty) => write!(f, "-{ty}")?,
            TypeArgument::Exact(ty) => write!(f, "{}", ty)?,
        }
    }
    f.write_str(">")
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        write!(f, "{}", self.super_class)?;
        for interface in &self.interfaces {
            write!(f, "{}", interface)?;
        }
        Ok(())
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_parameters(f, &self.type_parameters)?;
        f.write_str("(")?;
        for param in &self.parameters {
            write!(f, "{}", param)?;
        }
        f.write_str(")")?;
        match &self.return_type {
            Some(ty) => write!(f, "{}", ty)?,
            None => f.write_str("V")?,
        }
        for ty in &self.throws {
            write!(f, "^{ty}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSignature::Base(base) => write!(f, "{}", base.descriptor_char()),
            TypeSignature::Field(ty) => write!(f, "{}", ty),
        }
    }
}

impl fmt::Display for FieldTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldTypeSignature::Class(ty) => write!(f, "{}", ty),
            FieldTypeSignature::TypeVariable(name) => write!(f, "T{name};"),
            FieldTypeSignature::Array(component) => write!(f, "[{component}"),
        }
    }
}

impl fmt::Display for ClassTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.name)?;
        write_type_arguments(f, &self.type_arguments)?;
        for inner in &self.inner {
            write!(f, ".{}", inner.name)?;
            write_type_arguments(f, &inner.type_arguments)?;
        }
        f.write_str(";")
    }
}
