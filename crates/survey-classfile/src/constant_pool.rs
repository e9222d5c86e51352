use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone)]
enum Entry {
    /// Index 0 and the second slot of `Long`/`Double` constants.
    Unusable,
    Utf8(String),
    Integer,
    Float,
    Long,
    Double,
    Class { name_index: u16 },
    String { string_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Unusable => "unusable",
            Entry::Utf8(_) => "Utf8",
            Entry::Integer => "Integer",
            Entry::Float => "Float",
            Entry::Long => "Long",
            Entry::Double => "Double",
            Entry::Class { .. } => "Class",
            Entry::String { .. } => "String",
            Entry::FieldRef { .. } => "Fieldref",
            Entry::MethodRef { .. } => "Methodref",
            Entry::InterfaceMethodRef { .. } => "InterfaceMethodref",
            Entry::NameAndType { .. } => "NameAndType",
            Entry::MethodHandle => "MethodHandle",
            Entry::MethodType => "MethodType",
            Entry::Dynamic => "Dynamic",
            Entry::InvokeDynamic => "InvokeDynamic",
            Entry::Module => "Module",
            Entry::Package => "Package",
        }
    }
}

/// A loaded constant pool.
#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<Entry>,
}

/// A resolved `Fieldref`/`Methodref`/`InterfaceMethodref` constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MemberRef<'a> {
    pub owner: String,
    pub name: &'a str,
    pub descriptor: &'a str,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Entry::Unusable);

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let len = reader.read_u2()? as usize;
                    Entry::Utf8(decode_modified_utf8(reader.read_bytes(len)?)?)
                }
                3 => {
                    reader.read_u4()?;
                    Entry::Integer
                }
                4 => {
                    reader.read_u4()?;
                    Entry::Float
                }
                5 | 6 => {
                    reader.read_u4()?;
                    reader.read_u4()?;
                    entries.push(if tag == 5 { Entry::Long } else { Entry::Double });
                    // 8-byte constants take up two slots.
                    Entry::Unusable
                }
                7 => Entry::Class {
                    name_index: reader.read_u2()?,
                },
                8 => Entry::String {
                    string_index: reader.read_u2()?,
                },
                9..=11 => {
                    let class_index = reader.read_u2()?;
                    let name_and_type_index = reader.read_u2()?;
                    match tag {
                        9 => Entry::FieldRef {
                            class_index,
                            name_and_type_index,
                        },
                        10 => Entry::MethodRef {
                            class_index,
                            name_and_type_index,
                        },
                        _ => Entry::InterfaceMethodRef {
                            class_index,
                            name_and_type_index,
                        },
                    }
                }
                12 => Entry::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                15 => {
                    reader.read_u1()?;
                    reader.read_u2()?;
                    Entry::MethodHandle
                }
                16 => {
                    reader.read_u2()?;
                    Entry::MethodType
                }
                17 | 18 => {
                    reader.read_u2()?;
                    reader.read_u2()?;
                    if tag == 17 {
                        Entry::Dynamic
                    } else {
                        Entry::InvokeDynamic
                    }
                }
                19 => {
                    reader.read_u2()?;
                    Entry::Module
                }
                20 => {
                    reader.read_u2()?;
                    Entry::Package
                }
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };
            entries.push(entry);
        }

        // A trailing `Long`/`Double` may have pushed one slot too many.
        entries.truncate(count.max(1));
        Ok(Self { entries })
    }

    fn entry(&self, index: u16) -> Result<&Entry> {
        match self.entries.get(index as usize) {
            Some(Entry::Unusable) | None => Err(Error::InvalidConstantPoolIndex(index)),
            Some(entry) => Ok(entry),
        }
    }

    fn mismatch(&self, index: u16, expected: &'static str) -> Error {
        let found = self
            .entries
            .get(index as usize)
            .map(Entry::kind)
            .unwrap_or("missing");
        Error::ConstantPoolTypeMismatch {
            index,
            expected,
            found,
        }
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Entry::Utf8(value) => Ok(value),
            _ => Err(self.mismatch(index, "Utf8")),
        }
    }

    pub(crate) fn get_class_name(&self, index: u16) -> Result<String> {
        match self.entry(index)? {
            Entry::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            _ => Err(self.mismatch(index, "Class")),
        }
    }

    /// Returns the string value when `index` is a `String` constant, `None` for
    /// any other loadable constant.
    pub(crate) fn get_string(&self, index: u16) -> Result<Option<&str>> {
        match self.entry(index)? {
            Entry::String { string_index } => Ok(Some(self.get_utf8(*string_index)?)),
            _ => Ok(None),
        }
    }

    pub(crate) fn get_member_ref(&self, index: u16) -> Result<MemberRef<'_>> {
        let (class_index, name_and_type_index) = match self.entry(index)? {
            Entry::FieldRef {
                class_index,
                name_and_type_index,
            }
            | Entry::MethodRef {
                class_index,
                name_and_type_index,
            }
            | Entry::InterfaceMethodRef {
                class_index,
                name_and_type_index,
            } => (*class_index, *name_and_type_index),
            _ => return Err(self.mismatch(index, "Fieldref")),
        };

        let (name_index, descriptor_index) = match self.entry(name_and_type_index)? {
            Entry::NameAndType {
                name_index,
                descriptor_index,
            } => (*name_index, *descriptor_index),
            _ => return Err(self.mismatch(name_and_type_index, "NameAndType")),
        };

        Ok(MemberRef {
            owner: self.get_class_name(class_index)?,
            name: self.get_utf8(name_index)?,
            descriptor: self.get_utf8(descriptor_index)?,
        })
    }
}

/// Decodes the JVM's "modified UTF-8" (CESU-8 style surrogates, `0xC0 0x80` for NUL).
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        if b0 & 0x80 == 0 {
            if b0 == 0 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push(b0 as u16);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = *bytes.get(i + 1).ok_or(Error::InvalidModifiedUtf8)?;
            if b1 & 0xC0 != 0x80 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push((((b0 & 0x1F) as u16) << 6) | (b1 & 0x3F) as u16);
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = *bytes.get(i + 1).ok_or(Error::InvalidModifiedUtf8)?;
            let b2 = *bytes.get(i + 2).ok_or(Error::InvalidModifiedUtf8)?;
            if b1 & 0xC0 != 0x80 || b2 & 0xC0 != 0x80 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push(
                (((b0 & 0x0F) as u16) << 12) | (((b1 & 0x3F) as u16) << 6) | (b2 & 0x3F) as u16,
            );
            i += 3;
        } else {
            return Err(Error::InvalidModifiedUtf8);
        }
    }

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|_| Error::InvalidModifiedUtf8)
}
