use pretty_assertions::assert_eq;
use survey::{
    correct_signature, ClassInfo, Mapping, MappingSet, MemberNameResolver, SourceSetProvider,
};

fn name_field(mappings: &mut MappingSet, class: &str, field: &str, to: &str) {
    mappings
        .get_or_create_class_mapping(class)
        .get_or_create_field_mapping(field, None)
        .set_deobfuscated_name(to.to_string());
}

fn name_method(mappings: &mut MappingSet, class: &str, method: &str, desc: &str, to: &str) {
    mappings
        .get_or_create_class_mapping(class)
        .get_or_create_method_mapping(method, desc)
        .set_deobfuscated_name(to.to_string());
}

/// `a extends b extends c`, with `c.f` named `foo`.
fn chain() -> (SourceSetProvider, MappingSet) {
    let provider: SourceSetProvider = [
        ClassInfo::new("a", Some("b")),
        ClassInfo::new("b", Some("c")),
        ClassInfo::new("c", Some("java/lang/Object")).with_field("f", Some("I")),
    ]
    .into_iter()
    .collect();
    let mut mappings = MappingSet::new();
    name_field(&mut mappings, "c", "f", "foo");
    (provider, mappings)
}

#[test]
fn field_resolves_through_superclass_chain() {
    let (provider, mappings) = chain();
    let resolver = MemberNameResolver::new(&mappings, &provider);

    assert_eq!(resolver.resolve_field("a", "f"), Some("foo"));
    assert_eq!(resolver.resolve_field("b", "f"), Some("foo"));
    assert_eq!(resolver.map_field_name("a", "f"), "foo");
    assert_eq!(resolver.resolve_field("a", "g"), None);
    assert_eq!(resolver.map_field_name("a", "g"), "g");
}

#[test]
fn unknown_ancestor_ends_the_walk() {
    let (mut provider, mappings) = chain();
    provider.remove("c");
    let resolver = MemberNameResolver::new(&mappings, &provider);

    // The mapping for `c` still exists, but nothing says `b` extends a known `c`.
    assert_eq!(resolver.resolve_field("a", "f"), None);
    assert_eq!(resolver.resolve_field("c", "f"), Some("foo"));
}

#[test]
fn fields_ignore_interfaces() {
    let provider: SourceSetProvider = [
        ClassInfo::new("a", Some("java/lang/Object")).with_interface("i"),
        ClassInfo::new("i", Some("java/lang/Object")).with_field("K", Some("I")),
    ]
    .into_iter()
    .collect();
    let mut mappings = MappingSet::new();
    name_field(&mut mappings, "i", "K", "CONSTANT");
    let resolver = MemberNameResolver::new(&mappings, &provider);

    assert_eq!(resolver.resolve_field("a", "K"), None);
    assert_eq!(resolver.resolve_field("i", "K"), Some("CONSTANT"));
}

#[test]
fn methods_resolve_through_interfaces() {
    let provider: SourceSetProvider = [
        ClassInfo::new("a", Some("b")).with_interface("i"),
        ClassInfo::new("b", Some("java/lang/Object")),
        ClassInfo::new("i", None).with_interface("j"),
        ClassInfo::new("j", None).with_method("m", "(I)V"),
    ]
    .into_iter()
    .collect();
    let mut mappings = MappingSet::new();
    name_method(&mut mappings, "j", "m", "(I)V", "accept");
    let resolver = MemberNameResolver::new(&mappings, &provider);

    assert_eq!(resolver.resolve_method("a", "m", "(I)V"), Some("accept"));
    assert_eq!(resolver.resolve_method("a", "m", "(J)V"), None);
    assert_eq!(resolver.map_method_name("a", "m", "(J)V"), "m");
}

#[test]
fn superclass_is_searched_before_interfaces() {
    let provider: SourceSetProvider = [
        ClassInfo::new("a", Some("b")).with_interface("i"),
        ClassInfo::new("b", Some("java/lang/Object")),
        ClassInfo::new("i", None),
    ]
    .into_iter()
    .collect();
    let mut mappings = MappingSet::new();
    name_method(&mut mappings, "b", "m", "()V", "fromSuper");
    name_method(&mut mappings, "i", "m", "()V", "fromInterface");
    let resolver = MemberNameResolver::new(&mappings, &provider);

    assert_eq!(resolver.resolve_method("a", "m", "()V"), Some("fromSuper"));
}

#[test]
fn superclass_ancestry_is_exhausted_before_interfaces() {
    let provider: SourceSetProvider = [
        ClassInfo::new("a", Some("b")).with_interface("i"),
        ClassInfo::new("b", Some("c")),
        ClassInfo::new("c", None).with_interface("j"),
        ClassInfo::new("i", None),
        ClassInfo::new("j", None),
    ]
    .into_iter()
    .collect();
    let mut mappings = MappingSet::new();
    name_method(&mut mappings, "i", "m", "()V", "fromNearInterface");
    name_method(&mut mappings, "j", "m", "()V", "fromDeepInterface");
    let resolver = MemberNameResolver::new(&mappings, &provider);

    assert_eq!(resolver.resolve_method("a", "m", "()V"), Some("fromDeepInterface"));
}

#[test]
fn long_interface_chains_resolve() {
    const DEPTH: usize = 100_000;
    let provider: SourceSetProvider = (0..DEPTH)
        .map(|i| {
            let info = ClassInfo::new(format!("i{i}"), None);
            if i + 1 < DEPTH {
                info.with_interface(format!("i{}", i + 1))
            } else {
                info
            }
        })
        .collect();
    let mut mappings = MappingSet::new();
    name_method(&mut mappings, &format!("i{}", DEPTH - 1), "m", "()V", "root");
    let resolver = MemberNameResolver::new(&mappings, &provider);

    assert_eq!(resolver.resolve_method("i0", "m", "()V"), Some("root"));
    assert_eq!(resolver.resolve_method("i0", "n", "()V"), None);
}

#[test]
fn cyclic_hierarchies_terminate() {
    let provider: SourceSetProvider = [
        ClassInfo::new("a", Some("b")).with_interface("a"),
        ClassInfo::new("b", Some("a")),
    ]
    .into_iter()
    .collect();
    let mappings = MappingSet::new();
    let resolver = MemberNameResolver::new(&mappings, &provider);

    assert_eq!(resolver.resolve_field("a", "f"), None);
    assert_eq!(resolver.resolve_method("a", "m", "()V"), None);
    assert_eq!(resolver.resolve_method("b", "m", "()V"), None);
}

#[test]
fn signature_correction_is_idempotent() {
    let raw = "(Lzt<TK;>.zt$a<TV;>;)V";
    let corrected = correct_signature(raw);
    assert_eq!(corrected, "(Lzt<TK;>.a<TV;>;)V");
    assert_eq!(correct_signature(&corrected), corrected);

    let clean = "<T:Ljava/lang/Object;>(TT;)Ljava/util/List<TT;>;";
    assert_eq!(correct_signature(clean), clean);
    assert_eq!(correct_signature("(Lbroken"), "(Lbroken");
}
