use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use survey_classfile::ClassFile;

/// A field as seen by the hierarchy. Two fields are the same field when their
/// names match; the descriptor is informational.
#[derive(Debug, Clone, Eq)]
pub struct FieldSignature {
    pub name: String,
    pub descriptor: Option<String>,
}

impl FieldSignature {
    pub fn new(name: impl Into<String>, descriptor: Option<&str>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.map(str::to_string),
        }
    }
}

impl PartialEq for FieldSignature {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for FieldSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodSignature {
    pub name: String,
    pub descriptor: String,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

/// Immutable snapshot of a class's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Internal name, e.g. `com/example/Foo$Bar`.
    pub name: String,
    pub super_name: Option<String>,
    /// Declaration order.
    pub interfaces: Vec<String>,
    pub fields: HashSet<FieldSignature>,
    pub methods: HashSet<MethodSignature>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, super_name: Option<&str>) -> Self {
        Self {
            name: name.into(),
            super_name: super_name.map(str::to_string),
            interfaces: Vec::new(),
            fields: HashSet::new(),
            methods: HashSet::new(),
        }
    }

    pub fn from_class_file(class: &ClassFile) -> Self {
        Self {
            name: class.this_class.clone(),
            super_name: class.super_class.clone(),
            interfaces: class.interfaces.clone(),
            fields: class
                .fields
                .iter()
                .map(|f| FieldSignature::new(f.name.clone(), Some(f.descriptor.as_str())))
                .collect(),
            methods: class
                .methods
                .iter()
                .map(|m| MethodSignature::new(m.name.clone(), m.descriptor.clone()))
                .collect(),
        }
    }

    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.add_interface(name);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, descriptor: Option<&str>) -> Self {
        self.fields.insert(FieldSignature::new(name, descriptor));
        self
    }

    pub fn with_method(mut self, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        self.methods.insert(MethodSignature::new(name, descriptor));
        self
    }

    pub(crate) fn add_interface(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.interfaces.contains(&name) {
            self.interfaces.push(name);
        }
    }

    pub fn has_method(&self, signature: &MethodSignature) -> bool {
        self.methods.contains(signature)
    }

    /// Superclass first, then interfaces in declaration order.
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.super_name
            .as_deref()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }
}

/// Answers "what is the shape of class X?".
///
/// `None` means the class is unknown to this provider; callers treat that as
/// the end of the ancestry chain, never as an error.
pub trait ClassGraphProvider: Send + Sync {
    fn provide(&self, class_name: &str) -> Option<Arc<ClassInfo>>;
}

impl<P: ClassGraphProvider + ?Sized> ClassGraphProvider for &P {
    fn provide(&self, class_name: &str) -> Option<Arc<ClassInfo>> {
        (**self).provide(class_name)
    }
}

impl<P: ClassGraphProvider + ?Sized> ClassGraphProvider for Arc<P> {
    fn provide(&self, class_name: &str) -> Option<Arc<ClassInfo>> {
        (**self).provide(class_name)
    }
}

impl<P: ClassGraphProvider + ?Sized> ClassGraphProvider for Box<P> {
    fn provide(&self, class_name: &str) -> Option<Arc<ClassInfo>> {
        (**self).provide(class_name)
    }
}

/// Provider over a closed, pre-indexed set of classes (the input archive).
#[derive(Debug, Default, Clone)]
pub struct SourceSetProvider {
    classes: HashMap<String, Arc<ClassInfo>>,
}

impl SourceSetProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: impl Into<Arc<ClassInfo>>) -> Option<Arc<ClassInfo>> {
        let info = info.into();
        self.classes.insert(info.name.clone(), info)
    }

    pub fn remove(&mut self, class_name: &str) -> Option<Arc<ClassInfo>> {
        self.classes.remove(class_name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl<I: Into<Arc<ClassInfo>>> FromIterator<I> for SourceSetProvider {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut provider = Self::new();
        for info in iter {
            provider.insert(info);
        }
        provider
    }
}

impl ClassGraphProvider for SourceSetProvider {
    fn provide(&self, class_name: &str) -> Option<Arc<ClassInfo>> {
        self.classes.get(class_name).cloned()
    }
}

type Slot = Arc<OnceCell<Option<Arc<ClassInfo>>>>;

/// Memoizes another provider, computing each class at most once even when
/// many threads ask for it at the same time. Misses are cached too.
pub struct CachingProvider<P> {
    inner: P,
    slots: Mutex<HashMap<String, Slot>>,
}

impl<P: ClassGraphProvider> CachingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of distinct class names queried so far.
    pub fn cached_len(&self) -> usize {
        self.slots.lock().expect("mutex poisoned").len()
    }
}

impl<P: ClassGraphProvider> ClassGraphProvider for CachingProvider<P> {
    fn provide(&self, class_name: &str) -> Option<Arc<ClassInfo>> {
        // Clone the slot out so the map lock is not held while the inner
        // provider runs; concurrent callers block on the cell instead.
        let slot = self
            .slots
            .lock()
            .expect("mutex poisoned")
            .entry(class_name.to_string())
            .or_default()
            .clone();

        slot.get_or_init(|| {
            let info = self.inner.provide(class_name);
            tracing::trace!(
                target: "survey.provider",
                class = class_name,
                found = info.is_some(),
                "cache fill"
            );
            info
        })
        .clone()
    }
}

impl<P> std::fmt::Debug for CachingProvider<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingProvider").finish_non_exhaustive()
    }
}

/// Tries installed providers in registration order; the first one that knows
/// the class answers entirely. Results are never merged.
#[derive(Default)]
pub struct CascadingProvider {
    providers: Vec<Box<dyn ClassGraphProvider>>,
}

impl CascadingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(mut self, provider: impl ClassGraphProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ClassGraphProvider for CascadingProvider {
    fn provide(&self, class_name: &str) -> Option<Arc<ClassInfo>> {
        let found = self.providers.iter().find_map(|p| p.provide(class_name));
        if found.is_none() {
            tracing::trace!(target: "survey.provider", class = class_name, "no provider knows class");
        }
        found
    }
}

impl std::fmt::Debug for CascadingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadingProvider")
            .field("providers", &self.providers.len())
            .finish()
    }
}
