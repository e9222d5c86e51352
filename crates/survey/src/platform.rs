use std::collections::HashMap;
use std::sync::Arc;

use crate::hierarchy::{ClassGraphProvider, ClassInfo};

struct Stub {
    name: &'static str,
    super_name: Option<&'static str>,
    interfaces: &'static [&'static str],
    methods: &'static [(&'static str, &'static str)],
}

const OBJECT: Option<&str> = Some("java/lang/Object");

const OBJECT_METHODS: &[(&str, &str)] = &[
    ("<init>", "()V"),
    ("equals", "(Ljava/lang/Object;)Z"),
    ("hashCode", "()I"),
    ("toString", "()Ljava/lang/String;"),
    ("getClass", "()Ljava/lang/Class;"),
    ("clone", "()Ljava/lang/Object;"),
    ("finalize", "()V"),
    ("notify", "()V"),
    ("notifyAll", "()V"),
    ("wait", "()V"),
    ("wait", "(J)V"),
    ("wait", "(JI)V"),
];

const THROWABLE_METHODS: &[(&str, &str)] = &[
    ("<init>", "()V"),
    ("<init>", "(Ljava/lang/String;)V"),
    ("<init>", "(Ljava/lang/String;Ljava/lang/Throwable;)V"),
    ("<init>", "(Ljava/lang/Throwable;)V"),
    ("getMessage", "()Ljava/lang/String;"),
    ("getLocalizedMessage", "()Ljava/lang/String;"),
    ("getCause", "()Ljava/lang/Throwable;"),
    ("printStackTrace", "()V"),
    ("toString", "()Ljava/lang/String;"),
];

const EXCEPTION_CTORS: &[(&str, &str)] = &[
    ("<init>", "()V"),
    ("<init>", "(Ljava/lang/String;)V"),
    ("<init>", "(Ljava/lang/String;Ljava/lang/Throwable;)V"),
    ("<init>", "(Ljava/lang/Throwable;)V"),
];

const BUILTINS: &[Stub] = &[
    // java.lang
    Stub {
        name: "java/lang/Object",
        super_name: None,
        interfaces: &[],
        methods: OBJECT_METHODS,
    },
    Stub {
        name: "java/lang/Enum",
        super_name: OBJECT,
        interfaces: &["java/lang/Comparable", "java/io/Serializable"],
        methods: &[
            ("<init>", "(Ljava/lang/String;I)V"),
            ("name", "()Ljava/lang/String;"),
            ("ordinal", "()I"),
            ("toString", "()Ljava/lang/String;"),
            ("equals", "(Ljava/lang/Object;)Z"),
            ("hashCode", "()I"),
            ("clone", "()Ljava/lang/Object;"),
            ("compareTo", "(Ljava/lang/Enum;)I"),
            ("compareTo", "(Ljava/lang/Object;)I"),
            ("getDeclaringClass", "()Ljava/lang/Class;"),
            ("valueOf", "(Ljava/lang/Class;Ljava/lang/String;)Ljava/lang/Enum;"),
            ("finalize", "()V"),
        ],
    },
    Stub {
        name: "java/lang/Record",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[
            ("<init>", "()V"),
            ("equals", "(Ljava/lang/Object;)Z"),
            ("hashCode", "()I"),
            ("toString", "()Ljava/lang/String;"),
        ],
    },
    Stub {
        name: "java/lang/Comparable",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[("compareTo", "(Ljava/lang/Object;)I")],
    },
    Stub {
        name: "java/lang/Runnable",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[("run", "()V")],
    },
    Stub {
        name: "java/lang/Iterable",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[
            ("iterator", "()Ljava/util/Iterator;"),
            ("forEach", "(Ljava/util/function/Consumer;)V"),
            ("spliterator", "()Ljava/util/Spliterator;"),
        ],
    },
    Stub {
        name: "java/lang/AutoCloseable",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[("close", "()V")],
    },
    Stub {
        name: "java/lang/CharSequence",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[
            ("length", "()I"),
            ("charAt", "(I)C"),
            ("subSequence", "(II)Ljava/lang/CharSequence;"),
            ("toString", "()Ljava/lang/String;"),
        ],
    },
    Stub {
        name: "java/lang/Cloneable",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[],
    },
    Stub {
        name: "java/lang/Thread",
        super_name: OBJECT,
        interfaces: &["java/lang/Runnable"],
        methods: &[
            ("<init>", "()V"),
            ("<init>", "(Ljava/lang/Runnable;)V"),
            ("<init>", "(Ljava/lang/String;)V"),
            ("<init>", "(Ljava/lang/Runnable;Ljava/lang/String;)V"),
            ("run", "()V"),
            ("start", "()V"),
            ("interrupt", "()V"),
            ("isAlive", "()Z"),
            ("join", "()V"),
            ("getName", "()Ljava/lang/String;"),
            ("setName", "(Ljava/lang/String;)V"),
            ("setDaemon", "(Z)V"),
        ],
    },
    Stub {
        name: "java/lang/Throwable",
        super_name: OBJECT,
        interfaces: &["java/io/Serializable"],
        methods: THROWABLE_METHODS,
    },
    Stub {
        name: "java/lang/Exception",
        super_name: Some("java/lang/Throwable"),
        interfaces: &[],
        methods: EXCEPTION_CTORS,
    },
    Stub {
        name: "java/lang/RuntimeException",
        super_name: Some("java/lang/Exception"),
        interfaces: &[],
        methods: EXCEPTION_CTORS,
    },
    Stub {
        name: "java/lang/IllegalArgumentException",
        super_name: Some("java/lang/RuntimeException"),
        interfaces: &[],
        methods: EXCEPTION_CTORS,
    },
    Stub {
        name: "java/lang/IllegalStateException",
        super_name: Some("java/lang/RuntimeException"),
        interfaces: &[],
        methods: EXCEPTION_CTORS,
    },
    Stub {
        name: "java/lang/Error",
        super_name: Some("java/lang/Throwable"),
        interfaces: &[],
        methods: EXCEPTION_CTORS,
    },
    // java.io
    Stub {
        name: "java/io/Serializable",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[],
    },
    Stub {
        name: "java/io/Closeable",
        super_name: OBJECT,
        interfaces: &["java/lang/AutoCloseable"],
        methods: &[("close", "()V")],
    },
    Stub {
        name: "java/io/IOException",
        super_name: Some("java/lang/Exception"),
        interfaces: &[],
        methods: EXCEPTION_CTORS,
    },
    // java.util
    Stub {
        name: "java/util/Iterator",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[
            ("hasNext", "()Z"),
            ("next", "()Ljava/lang/Object;"),
            ("remove", "()V"),
        ],
    },
    Stub {
        name: "java/util/Collection",
        super_name: OBJECT,
        interfaces: &["java/lang/Iterable"],
        methods: &[
            ("size", "()I"),
            ("isEmpty", "()Z"),
            ("contains", "(Ljava/lang/Object;)Z"),
            ("add", "(Ljava/lang/Object;)Z"),
            ("remove", "(Ljava/lang/Object;)Z"),
            ("clear", "()V"),
            ("iterator", "()Ljava/util/Iterator;"),
            ("toArray", "()[Ljava/lang/Object;"),
            ("stream", "()Ljava/util/stream/Stream;"),
        ],
    },
    Stub {
        name: "java/util/List",
        super_name: OBJECT,
        interfaces: &["java/util/Collection"],
        methods: &[
            ("get", "(I)Ljava/lang/Object;"),
            ("set", "(ILjava/lang/Object;)Ljava/lang/Object;"),
            ("add", "(ILjava/lang/Object;)V"),
            ("remove", "(I)Ljava/lang/Object;"),
            ("indexOf", "(Ljava/lang/Object;)I"),
        ],
    },
    Stub {
        name: "java/util/Set",
        super_name: OBJECT,
        interfaces: &["java/util/Collection"],
        methods: &[],
    },
    Stub {
        name: "java/util/Map",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[
            ("size", "()I"),
            ("isEmpty", "()Z"),
            ("get", "(Ljava/lang/Object;)Ljava/lang/Object;"),
            ("put", "(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;"),
            ("remove", "(Ljava/lang/Object;)Ljava/lang/Object;"),
            ("containsKey", "(Ljava/lang/Object;)Z"),
            ("keySet", "()Ljava/util/Set;"),
            ("values", "()Ljava/util/Collection;"),
            ("entrySet", "()Ljava/util/Set;"),
        ],
    },
    Stub {
        name: "java/util/Comparator",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[("compare", "(Ljava/lang/Object;Ljava/lang/Object;)I")],
    },
    Stub {
        name: "java/util/AbstractCollection",
        super_name: OBJECT,
        interfaces: &["java/util/Collection"],
        methods: &[("<init>", "()V"), ("size", "()I"), ("iterator", "()Ljava/util/Iterator;")],
    },
    Stub {
        name: "java/util/AbstractList",
        super_name: Some("java/util/AbstractCollection"),
        interfaces: &["java/util/List"],
        methods: &[("<init>", "()V"), ("get", "(I)Ljava/lang/Object;")],
    },
    Stub {
        name: "java/util/ArrayList",
        super_name: Some("java/util/AbstractList"),
        interfaces: &["java/util/List", "java/lang/Cloneable", "java/io/Serializable"],
        methods: &[("<init>", "()V"), ("<init>", "(I)V"), ("size", "()I")],
    },
    Stub {
        name: "java/util/HashMap",
        super_name: OBJECT,
        interfaces: &["java/util/Map", "java/lang/Cloneable", "java/io/Serializable"],
        methods: &[("<init>", "()V"), ("<init>", "(I)V")],
    },
    // java.util.function
    Stub {
        name: "java/util/function/Supplier",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[("get", "()Ljava/lang/Object;")],
    },
    Stub {
        name: "java/util/function/Consumer",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[("accept", "(Ljava/lang/Object;)V")],
    },
    Stub {
        name: "java/util/function/Function",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[("apply", "(Ljava/lang/Object;)Ljava/lang/Object;")],
    },
    Stub {
        name: "java/util/function/Predicate",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[("test", "(Ljava/lang/Object;)Z")],
    },
    Stub {
        name: "java/util/function/BiFunction",
        super_name: OBJECT,
        interfaces: &[],
        methods: &[(
            "apply",
            "(Ljava/lang/Object;Ljava/lang/Object;)Ljava/lang/Object;",
        )],
    },
];

/// Hierarchy facts for platform (JDK) classes that obfuscated archives extend
/// but do not ship.
///
/// `PlatformClassIndex::new()` is a small built-in index that needs no JDK on
/// disk. Collaborators that read a real JDK can [`insert`](Self::insert) more
/// classes; names are accepted in internal (`java/lang/Object`) or binary
/// (`java.lang.Object`) form.
#[derive(Debug, Clone)]
pub struct PlatformClassIndex {
    classes: HashMap<String, Arc<ClassInfo>>,
}

impl Default for PlatformClassIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformClassIndex {
    pub fn new() -> Self {
        let mut this = Self::empty();
        for stub in BUILTINS {
            let mut info = ClassInfo::new(stub.name, stub.super_name);
            for iface in stub.interfaces {
                info.add_interface(*iface);
            }
            for (name, descriptor) in stub.methods {
                info = info.with_method(*name, *descriptor);
            }
            this.insert(info);
        }
        this
    }

    pub fn empty() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    pub fn insert(&mut self, info: ClassInfo) -> Option<Arc<ClassInfo>> {
        let mut info = info;
        info.name = binary_to_internal(&info.name);
        self.classes.insert(info.name.clone(), Arc::new(info))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(binary_to_internal(name).as_str())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassGraphProvider for PlatformClassIndex {
    fn provide(&self, class_name: &str) -> Option<Arc<ClassInfo>> {
        if class_name.contains('/') {
            return self.classes.get(class_name).cloned();
        }
        self.classes.get(&binary_to_internal(class_name)).cloned()
    }
}

fn binary_to_internal(binary: &str) -> String {
    binary.replace('.', "/")
}
