//! Declarative construction descriptors
//!
//! Instead of discovering constructors at runtime, every concrete type that the
//! container builds implements [`Injectable`]: it lists its candidate
//! constructors (each with the service keys it needs) and the capabilities it
//! can be registered under. The container only ever walks this plain data.

use crate::core::{ContainerError, ContainerResult, ServiceKey};
use std::any::Any;
use std::sync::Arc;

/// A constructed concrete object, before it is viewed through any service key.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A resolved service as seen through one service key.
///
/// Always wraps an `Arc<I>` where `I` is the type the key was built from, so
/// [`Service::downcast`] with that same type cannot fail.
#[derive(Clone)]
pub struct Service {
    key: ServiceKey,
    value: Arc<dyn Any + Send + Sync>,
}

impl Service {
    pub fn new<I: ?Sized + Send + Sync + 'static>(value: Arc<I>) -> Self {
        Self {
            key: ServiceKey::of::<I>(),
            value: Arc::new(value),
        }
    }

    pub fn key(&self) -> ServiceKey {
        self.key
    }

    pub fn downcast<I: ?Sized + 'static>(&self) -> Option<Arc<I>> {
        self.value.downcast_ref::<Arc<I>>().cloned()
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service").field("key", &self.key).finish()
    }
}

/// A concrete type the container knows how to build.
///
/// # Example
///
/// ```
/// use alo::di::{Capability, Constructor, Injectable};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// struct FixedClock(u64);
///
/// impl Clock for FixedClock {
///     fn now(&self) -> u64 {
///         self.0
///     }
/// }
///
/// impl Injectable for FixedClock {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             Constructor::nullary(|| FixedClock(0)),
///             Constructor::unary(|start: Arc<u64>| FixedClock(*start)),
///         ]
///     }
///
///     fn capabilities() -> Vec<Capability<Self>> {
///         vec![Capability::<Self>::of::<dyn Clock>(|clock| clock)]
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Candidate constructors. Order does not matter: the container tries them
    /// by ascending parameter count, keeping declaration order for equal counts.
    /// An empty list makes every resolution of the type fail.
    fn constructors() -> Vec<Constructor<Self>>;

    /// The service keys this type can stand in for, used by the
    /// `all_capabilities_*` registrations.
    fn capabilities() -> Vec<Capability<Self>> {
        Vec::new()
    }
}

type Factory<T> = Box<dyn Fn(&mut Arguments) -> ContainerResult<T> + Send + Sync>;

/// One way of building `T`: the services it needs, in order, and the factory
/// that consumes them.
pub struct Constructor<T> {
    params: Vec<ServiceKey>,
    factory: Factory<T>,
}

impl<T: Send + Sync + 'static> Constructor<T> {
    /// Constructor with an explicit parameter list. The factory pulls the
    /// resolved services from [`Arguments`] in the same order.
    pub fn new<F>(params: Vec<ServiceKey>, factory: F) -> Self
    where
        F: Fn(&mut Arguments) -> ContainerResult<T> + Send + Sync + 'static,
    {
        Self {
            params,
            factory: Box::new(factory),
        }
    }

    pub fn nullary<F>(factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(Vec::new(), move |_| Ok(factory()))
    }

    /// Parameterless constructor for value-like types.
    pub fn from_default() -> Self
    where
        T: Default,
    {
        Self::nullary(T::default)
    }

    pub fn unary<A, F>(factory: F) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<A>) -> T + Send + Sync + 'static,
    {
        Self::new(vec![ServiceKey::of::<A>()], move |args| {
            Ok(factory(args.next::<A>()?))
        })
    }

    pub fn binary<A, B, F>(factory: F) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        B: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<A>, Arc<B>) -> T + Send + Sync + 'static,
    {
        Self::new(
            vec![ServiceKey::of::<A>(), ServiceKey::of::<B>()],
            move |args| {
                let a = args.next::<A>()?;
                let b = args.next::<B>()?;
                Ok(factory(a, b))
            },
        )
    }

    pub fn ternary<A, B, C, F>(factory: F) -> Self
    where
        A: ?Sized + Send + Sync + 'static,
        B: ?Sized + Send + Sync + 'static,
        C: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<A>, Arc<B>, Arc<C>) -> T + Send + Sync + 'static,
    {
        Self::new(
            vec![
                ServiceKey::of::<A>(),
                ServiceKey::of::<B>(),
                ServiceKey::of::<C>(),
            ],
            move |args| {
                let a = args.next::<A>()?;
                let b = args.next::<B>()?;
                let c = args.next::<C>()?;
                Ok(factory(a, b, c))
            },
        )
    }
}

/// Resolved constructor arguments, handed out in declaration order.
pub struct Arguments {
    services: std::vec::IntoIter<Service>,
}

impl Arguments {
    pub(crate) fn new(services: Vec<Service>) -> Self {
        Self {
            services: services.into_iter(),
        }
    }

    /// Take the next argument as `I`.
    ///
    /// Fails with [`ContainerError::TypeMismatch`] when the factory asks for
    /// more arguments, or other types, than its constructor declared.
    pub fn next<I: ?Sized + 'static>(&mut self) -> ContainerResult<Arc<I>> {
        let key = ServiceKey::of::<I>();
        self.services
            .next()
            .and_then(|service| service.downcast::<I>())
            .ok_or(ContainerError::TypeMismatch { key })
    }
}

/// A service key that `T` can be registered under, with the upcast from the
/// concrete type to that key's type.
pub struct Capability<T> {
    key: ServiceKey,
    upcast: Arc<dyn Fn(Arc<T>) -> Service + Send + Sync>,
}

impl<T: Send + Sync + 'static> Capability<T> {
    /// Capability for `I`, usually `dyn Trait`. The upcast is almost always
    /// the identity closure `|it| it`, relying on unsized coercion.
    pub fn of<I: ?Sized + Send + Sync + 'static>(upcast: fn(Arc<T>) -> Arc<I>) -> Self {
        Self {
            key: ServiceKey::of::<I>(),
            upcast: Arc::new(move |instance| Service::new(upcast(instance))),
        }
    }

    /// `T` registered under its own type.
    pub fn concrete() -> Self {
        Self::of::<T>(|instance| instance)
    }

    pub fn key(&self) -> ServiceKey {
        self.key
    }

    pub(crate) fn project(&self, instance: Arc<T>) -> Service {
        (self.upcast)(instance)
    }
}

impl<T> Clone for Capability<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            upcast: Arc::clone(&self.upcast),
        }
    }
}

/// Type-erased [`Capability`]: turns a constructed instance into the service
/// registered under one key.
#[derive(Clone)]
pub struct Projection {
    key: ServiceKey,
    project: Arc<dyn Fn(&Instance) -> Option<Service> + Send + Sync>,
}

impl Projection {
    pub fn key(&self) -> ServiceKey {
        self.key
    }

    pub(crate) fn project(&self, instance: &Instance) -> ContainerResult<Service> {
        (self.project)(instance).ok_or(ContainerError::TypeMismatch { key: self.key })
    }
}

impl<T: Send + Sync + 'static> From<Capability<T>> for Projection {
    fn from(capability: Capability<T>) -> Self {
        let key = capability.key;
        Self {
            key,
            project: Arc::new(move |instance: &Instance| {
                Arc::clone(instance)
                    .downcast::<T>()
                    .ok()
                    .map(|concrete| capability.project(concrete))
            }),
        }
    }
}

pub(crate) struct ErasedConstructor {
    pub(crate) params: Vec<ServiceKey>,
    pub(crate) factory: Factory<Instance>,
}

/// Type-erased [`Injectable`] description of one concrete type.
#[derive(Clone)]
pub struct Blueprint {
    concrete: ServiceKey,
    constructors: Arc<[ErasedConstructor]>,
}

impl Blueprint {
    pub fn of<T: Injectable>() -> Self {
        let mut constructors: Vec<ErasedConstructor> = T::constructors()
            .into_iter()
            .map(|Constructor { params, factory }| ErasedConstructor {
                params,
                factory: Box::new(move |args: &mut Arguments| {
                    let instance: Instance = Arc::new(factory(args)?);
                    Ok(instance)
                }),
            })
            .collect();
        // Stable: equal arities keep declaration order
        constructors.sort_by_key(|constructor| constructor.params.len());

        Self {
            concrete: ServiceKey::of::<T>(),
            constructors: constructors.into(),
        }
    }

    /// Key of the concrete type this blueprint builds
    pub fn concrete(&self) -> ServiceKey {
        self.concrete
    }

    pub(crate) fn constructors(&self) -> &[ErasedConstructor] {
        &self.constructors
    }
}

impl std::fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blueprint")
            .field("concrete", &self.concrete)
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

/// Projections for every capability `T` declares.
pub fn capability_projections<T: Injectable>() -> Vec<Projection> {
    T::capabilities().into_iter().map(Projection::from).collect()
}
