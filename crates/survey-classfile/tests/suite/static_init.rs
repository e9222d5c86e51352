use pretty_assertions::assert_eq;
use survey_classfile::{access, opcodes, ClassFile, FieldOp, Insn, LdcConstant};

use super::builder::ClassBuilder;

/// `enum Color { RED, GREEN }` as javac lays out the constant construction in
/// `<clinit>`.
fn color_enum() -> Vec<u8> {
    let mut builder = ClassBuilder::new("Color", Some("java/lang/Enum"));
    let class = builder.class("Color");
    let red = builder.string("RED");
    let green = builder.string("GREEN");
    let ctor = builder.method_ref("Color", "<init>", "(Ljava/lang/String;I)V");
    let red_field = builder.field_ref("Color", "RED", "LColor;");
    let green_field = builder.field_ref("Color", "GREEN", "LColor;");

    let [c_hi, c_lo] = class.to_be_bytes();
    let [k_hi, k_lo] = ctor.to_be_bytes();
    let [r_hi, r_lo] = red_field.to_be_bytes();
    let [g_hi, g_lo] = green_field.to_be_bytes();
    let code = vec![
        opcodes::NEW, c_hi, c_lo,
        0x59, // dup
        opcodes::LDC, red as u8,
        0x03, // iconst_0
        0xb7, k_hi, k_lo,
        opcodes::PUTSTATIC, r_hi, r_lo,
        opcodes::NEW, c_hi, c_lo,
        0x59,
        opcodes::LDC_W, 0, green as u8,
        0x04, // iconst_1
        0xb7, k_hi, k_lo,
        opcodes::PUTSTATIC, g_hi, g_lo,
        0xb1, // return
    ];

    let flags = access::ACC_PUBLIC | access::ACC_STATIC | access::ACC_FINAL | access::ACC_ENUM;
    builder
        .access(access::ACC_PUBLIC | access::ACC_FINAL | access::ACC_ENUM)
        .field(flags, "RED", "LColor;")
        .field(flags, "GREEN", "LColor;")
        .method(access::ACC_STATIC, "<clinit>", "()V", Some(code))
        .build()
}

#[test]
fn decodes_enum_static_initializer() {
    let class = ClassFile::parse(&color_enum()).unwrap();
    let clinit = class.method("<clinit>", "()V").unwrap();
    let insns = clinit.code.as_ref().unwrap().instructions().unwrap();

    assert_eq!(
        insns,
        vec![
            Insn::New("Color".to_string()),
            Insn::Other(0x59),
            Insn::ldc_string("RED"),
            Insn::Other(0x03),
            Insn::Other(0xb7),
            Insn::put_static("Color", "RED", "LColor;"),
            Insn::New("Color".to_string()),
            Insn::Other(0x59),
            Insn::ldc_string("GREEN"),
            Insn::Other(0x04),
            Insn::Other(0xb7),
            Insn::put_static("Color", "GREEN", "LColor;"),
            Insn::Other(0xb1),
        ]
    );
}

#[test]
fn non_string_constants_are_opaque() {
    let mut builder = ClassBuilder::new("Holder", Some("java/lang/Object"));
    let number = builder.integer(1234567);
    let field = builder.field_ref("Holder", "n", "I");
    let [f_hi, f_lo] = field.to_be_bytes();
    let code = vec![opcodes::LDC, number as u8, opcodes::GETSTATIC, f_hi, f_lo, 0xb1];
    let bytes = builder
        .field(access::ACC_STATIC, "n", "I")
        .method(access::ACC_STATIC, "<clinit>", "()V", Some(code))
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    let insns = class.methods[0].code.as_ref().unwrap().instructions().unwrap();
    assert_eq!(insns[0], Insn::Ldc(LdcConstant::Other));
    assert!(matches!(
        &insns[1],
        Insn::Field { op: FieldOp::GetStatic, name, .. } if name == "n"
    ));
}
