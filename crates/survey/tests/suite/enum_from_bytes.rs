use pretty_assertions::assert_eq;
use survey::{
    recover_enum_constants, synthesize, Bytecode, IntermediaryConfig, Mapping, MappingSet,
    SourceClass,
};
use survey_classfile::{access, opcodes};

use super::class_bytes::ClassBuilder;

/// An obfuscated `enum Color { RED, GREEN }`: class `e`, constants in fields
/// `a` and `b`, the values array in `c`.
fn obfuscated_color() -> Vec<u8> {
    let mut builder = ClassBuilder::new("e", Some("java/lang/Enum"));
    let class = builder.class("e");
    let red = builder.string("RED");
    let green = builder.string("GREEN");
    let ctor = builder.method_ref("e", "<init>", "(Ljava/lang/String;I)V");
    let a = builder.field_ref("e", "a", "Le;");
    let b = builder.field_ref("e", "b", "Le;");
    let c = builder.field_ref("e", "c", "[Le;");

    let [c_hi, c_lo] = class.to_be_bytes();
    let [k_hi, k_lo] = ctor.to_be_bytes();
    let [a_hi, a_lo] = a.to_be_bytes();
    let [b_hi, b_lo] = b.to_be_bytes();
    let [v_hi, v_lo] = c.to_be_bytes();
    let code = vec![
        opcodes::NEW, c_hi, c_lo,
        0x59,
        opcodes::LDC, red as u8,
        0x03,
        0xb7, k_hi, k_lo,
        opcodes::PUTSTATIC, a_hi, a_lo,
        opcodes::NEW, c_hi, c_lo,
        0x59,
        opcodes::LDC, green as u8,
        0x04,
        0xb7, k_hi, k_lo,
        opcodes::PUTSTATIC, b_hi, b_lo,
        0x05, // iconst_2
        0xbd, c_hi, c_lo, // anewarray
        opcodes::PUTSTATIC, v_hi, v_lo,
        0xb1,
    ];

    let constant = access::ACC_PUBLIC | access::ACC_STATIC | access::ACC_FINAL | access::ACC_ENUM;
    let values = access::ACC_PRIVATE | access::ACC_STATIC | access::ACC_FINAL | access::ACC_SYNTHETIC;
    builder
        .access(access::ACC_PUBLIC | access::ACC_FINAL | access::ACC_ENUM)
        .field(constant, "a", "Le;")
        .field(constant, "b", "Le;")
        .field(values, "c", "[Le;")
        .method(access::ACC_PUBLIC | access::ACC_STATIC, "values", "()[Le;", None)
        .method(access::ACC_STATIC, "<clinit>", "()V", Some(code))
        .build()
}

#[test]
fn parsed_class_keeps_raw_initializer() {
    let class = SourceClass::parse(&obfuscated_color()).unwrap();
    assert_eq!(class.name(), "e");
    assert_eq!(class.super_name(), Some("java/lang/Enum"));
    assert_eq!(class.fields.len(), 3);
    assert!(class.fields[2].is_synthetic());
    assert!(matches!(class.static_init, Some(Bytecode::Raw(_))));
}

#[test]
fn recovers_constants_from_class_bytes() {
    let class = SourceClass::parse(&obfuscated_color()).unwrap();
    let mut mappings = MappingSet::new();
    assert_eq!(recover_enum_constants(&class, &mut mappings), 2);

    let mapping = mappings.class_mapping("e").unwrap();
    assert_eq!(mapping.field_mapping("a").unwrap().deobfuscated_name(), Some("RED"));
    assert_eq!(mapping.field_mapping("b").unwrap().deobfuscated_name(), Some("GREEN"));
    // The array store has no preceding constant and is left for synthesis.
    assert!(mapping.field_mapping("c").is_none());
}

#[test]
fn synthesis_over_parsed_enum() {
    let class = SourceClass::parse(&obfuscated_color()).unwrap();
    let mut mappings = MappingSet::new();
    let outcome = synthesize(&[class], &IntermediaryConfig::default(), &mut mappings);

    let mapping = mappings.class_mapping("e").unwrap();
    assert_eq!(mapping.field_mapping("a").unwrap().deobfuscated_name(), Some("RED"));
    assert_eq!(mapping.field_mapping("c").unwrap().deobfuscated_name(), Some("$VALUES"));
    assert_eq!(outcome.recovered_constants, 2);
    assert_eq!(outcome.next_member, 0);
}

#[test]
fn garbage_is_a_class_file_error() {
    let err = SourceClass::parse(&[0xCA, 0xFE, 0xBA, 0xBE, 0x00]).unwrap_err();
    assert!(matches!(err, survey::SurveyError::ClassFile(_)), "{err}");
}
