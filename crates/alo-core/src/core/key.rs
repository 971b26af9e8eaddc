use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Lookup key for a service: the identity of a concrete type or a trait object type.
///
/// Two keys are equal when they were built from the same type. The type name is
/// carried along for diagnostics only.
#[derive(Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    /// Key for `T`, which may be unsized (`dyn Trait`).
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `alo::bus::CommandBus`
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped, e.g. `CommandBus`
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey({})", self.name)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strip module paths from every path segment of a type name.
///
/// `dyn alo::bus::CommandHandler<app::Greet>` becomes `dyn CommandHandler<Greet>`.
pub fn short_type_name(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    let mut path = String::new();

    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            path.push(ch);
        } else {
            push_last_segment(&mut short, &path);
            path.clear();
            short.push(ch);
        }
    }
    push_last_segment(&mut short, &path);

    short
}

fn push_last_segment(out: &mut String, path: &str) {
    if let Some(segment) = path.rsplit("::").next() {
        out.push_str(segment);
    }
}
