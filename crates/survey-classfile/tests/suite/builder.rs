//! Assembles minimal classfiles for tests.

#[derive(Clone, PartialEq, Eq)]
enum Constant {
    Utf8(String),
    Class(u16),
    String(u16),
    Integer(i32),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    NameAndType(u16, u16),
}

pub struct ClassBuilder {
    pool: Vec<Constant>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    signature: Option<u16>,
}

impl ClassBuilder {
    pub fn new(name: &str, super_name: Option<&str>) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            access_flags: 0x0021,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            signature: None,
        };
        builder.this_class = builder.class(name);
        if let Some(super_name) = super_name {
            builder.super_class = builder.class(super_name);
        }
        builder
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        let idx = self.class(name);
        self.interfaces.push(idx);
        self
    }

    pub fn signature(mut self, signature: &str) -> Self {
        self.utf8("Signature");
        self.signature = Some(self.utf8(signature));
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        let member = self.member(access, name, descriptor, None, None);
        self.fields.push(member);
        self
    }

    pub fn generic_field(mut self, access: u16, name: &str, descriptor: &str, sig: &str) -> Self {
        let member = self.member(access, name, descriptor, Some(sig), None);
        self.fields.push(member);
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str, code: Option<Vec<u8>>) -> Self {
        let member = self.member(access, name, descriptor, None, code);
        self.methods.push(member);
        self
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        self.intern(Constant::Utf8(value.to_string()))
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.intern(Constant::Class(name))
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let value = self.utf8(value);
        self.intern(Constant::String(value))
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.intern(Constant::Integer(value))
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let owner = self.class(owner);
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let nat = self.intern(Constant::NameAndType(name, descriptor));
        self.intern(Constant::FieldRef(owner, nat))
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let owner = self.class(owner);
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let nat = self.intern(Constant::NameAndType(name, descriptor));
        self.intern(Constant::MethodRef(owner, nat))
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&(self.pool.len() as u16 + 1).to_be_bytes());
        for constant in &self.pool {
            match constant {
                Constant::Utf8(value) => {
                    out.push(1);
                    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
                    out.extend_from_slice(value.as_bytes());
                }
                Constant::Integer(value) => {
                    out.push(3);
                    out.extend_from_slice(&value.to_be_bytes());
                }
                Constant::Class(name) => {
                    out.push(7);
                    out.extend_from_slice(&name.to_be_bytes());
                }
                Constant::String(value) => {
                    out.push(8);
                    out.extend_from_slice(&value.to_be_bytes());
                }
                Constant::FieldRef(owner, nat) => {
                    out.push(9);
                    out.extend_from_slice(&owner.to_be_bytes());
                    out.extend_from_slice(&nat.to_be_bytes());
                }
                Constant::MethodRef(owner, nat) => {
                    out.push(10);
                    out.extend_from_slice(&owner.to_be_bytes());
                    out.extend_from_slice(&nat.to_be_bytes());
                }
                Constant::NameAndType(name, descriptor) => {
                    out.push(12);
                    out.extend_from_slice(&name.to_be_bytes());
                    out.extend_from_slice(&descriptor.to_be_bytes());
                }
            }
        }
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for iface in &self.interfaces {
            out.extend_from_slice(&iface.to_be_bytes());
        }
        for table in [&self.fields, &self.methods] {
            out.extend_from_slice(&(table.len() as u16).to_be_bytes());
            for member in table {
                out.extend_from_slice(member);
            }
        }
        match self.signature {
            Some(sig) => {
                out.extend_from_slice(&1u16.to_be_bytes());
                out.extend_from_slice(&self.pool_index_of_utf8("Signature").to_be_bytes());
                out.extend_from_slice(&2u32.to_be_bytes());
                out.extend_from_slice(&sig.to_be_bytes());
            }
            None => out.extend_from_slice(&0u16.to_be_bytes()),
        }
        out
    }

    fn member(
        &mut self,
        access: u16,
        name: &str,
        descriptor: &str,
        signature: Option<&str>,
        code: Option<Vec<u8>>,
    ) -> Vec<u8> {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let mut out = Vec::new();
        out.extend_from_slice(&access.to_be_bytes());
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&descriptor.to_be_bytes());

        let mut attributes: Vec<Vec<u8>> = Vec::new();
        if let Some(signature) = signature {
            let attr_name = self.utf8("Signature");
            let sig = self.utf8(signature);
            let mut attr = attr_name.to_be_bytes().to_vec();
            attr.extend_from_slice(&2u32.to_be_bytes());
            attr.extend_from_slice(&sig.to_be_bytes());
            attributes.push(attr);
        }
        if let Some(code) = code {
            let attr_name = self.utf8("Code");
            let mut body = Vec::new();
            body.extend_from_slice(&4u16.to_be_bytes());
            body.extend_from_slice(&1u16.to_be_bytes());
            body.extend_from_slice(&(code.len() as u32).to_be_bytes());
            body.extend_from_slice(&code);
            // Empty exception table, no nested attributes.
            body.extend_from_slice(&0u16.to_be_bytes());
            body.extend_from_slice(&0u16.to_be_bytes());

            let mut attr = attr_name.to_be_bytes().to_vec();
            attr.extend_from_slice(&(body.len() as u32).to_be_bytes());
            attr.extend_from_slice(&body);
            attributes.push(attr);
        }

        out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for attr in attributes {
            out.extend_from_slice(&attr);
        }
        out
    }

    fn pool_index_of_utf8(&self, value: &str) -> u16 {
        let wanted = Constant::Utf8(value.to_string());
        self.pool
            .iter()
            .position(|c| *c == wanted)
            .map(|i| i as u16 + 1)
            .expect("utf8 constant interned before build")
    }

    fn intern(&mut self, constant: Constant) -> u16 {
        if let Some(pos) = self.pool.iter().position(|c| *c == constant) {
            return pos as u16 + 1;
        }
        self.pool.push(constant);
        self.pool.len() as u16
    }
}
