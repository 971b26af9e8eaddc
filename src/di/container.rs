//! Service container for dependency injection

use super::injectable::{Arguments, Blueprint, Instance, Projection, Service};
use super::traits::{Registrar, Resolver};
use crate::config::Config;
use crate::core::{ContainerError, ContainerResult, ServiceKey};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tracing::{debug, trace};

/// Service container for dependency injection
///
/// Maps service keys to one of three registrations:
/// - an existing instance,
/// - a type built once on first resolution and then shared (type singleton),
/// - a type built anew on every resolution (transient).
///
/// Types are built from their [`Injectable`](super::Injectable) descriptor:
/// constructors are tried by ascending parameter count and the first one whose
/// parameters are all registered wins. Its parameters are then resolved
/// recursively.
///
/// A type singleton registered under several keys is built once, the first
/// time any of those keys is resolved, and the instance is then cached under
/// all of them.
///
/// # Concurrency
///
/// Registration tables sit behind an `RwLock` that is never held while a
/// constructor runs. Each group of keys sharing a type singleton owns a mutex
/// held from "still pending?" to "promoted", so concurrent first resolutions
/// build the instance at most once and the other callers wait for it.
/// Cyclic dependencies are not detected; resolving one deadlocks or recurses
/// without bound.
///
/// # Example
///
/// ```
/// use alo::di::{Container, RegistrarExt, ResolverExt};
/// use std::sync::Arc;
///
/// # fn example() -> alo::core::ContainerResult<()> {
/// let container = Container::new();
/// container.instance(Arc::new(String::from("postgres://localhost")))?;
///
/// let url = container.get::<String>()?;
/// assert_eq!(url.as_deref().map(String::as_str), Some("postgres://localhost"));
/// # Ok(())
/// # }
/// ```
pub struct Container {
    registry: RwLock<Registry>,
    this: Weak<Container>,
}

#[derive(Default)]
struct Registry {
    singletons: HashMap<ServiceKey, Cached>,
    singleton_types: HashMap<ServiceKey, Pending>,
    transients: HashMap<ServiceKey, Recipe>,
}

impl Registry {
    fn contains(&self, key: &ServiceKey) -> bool {
        self.singletons.contains_key(key)
            || self.singleton_types.contains_key(key)
            || self.transients.contains_key(key)
    }

    /// Drop whatever `key` was bound to, whichever table it lives in
    fn evict(&mut self, key: &ServiceKey) {
        self.singletons.remove(key);
        self.singleton_types.remove(key);
        self.transients.remove(key);
    }

    /// Pending group already collecting keys for this concrete type, if any
    fn pending_group(&self, concrete: ServiceKey) -> Option<Arc<SingletonGroup>> {
        self.singleton_types
            .values()
            .find(|pending| pending.group.concrete == concrete)
            .map(|pending| Arc::clone(&pending.group))
    }
}

#[derive(Clone)]
enum Cached {
    Service(Service),
    /// The container itself, viewed through one of its own capabilities.
    /// Held weakly so the container does not keep itself alive.
    Container(fn(Arc<Container>) -> Service),
}

#[derive(Clone)]
struct Recipe {
    blueprint: Blueprint,
    projection: Projection,
}

#[derive(Clone)]
struct Pending {
    recipe: Recipe,
    group: Arc<SingletonGroup>,
}

/// Keys bound to the same type singleton share one group.
struct SingletonGroup {
    concrete: ServiceKey,
    instance: Mutex<Option<Instance>>,
}

enum Entry {
    Cached(Cached),
    Pending(Pending),
    Transient(Recipe),
    Missing,
}

impl Container {
    /// Create a container that registers itself under `Container`,
    /// `dyn Resolver` and `dyn Registrar`.
    pub fn new() -> Arc<Self> {
        Self::with_config(&Config::default())
    }

    /// Create a container according to `config`.
    pub fn with_config(config: &Config) -> Arc<Self> {
        let container = Arc::new_cyclic(|this| Container {
            registry: RwLock::new(Registry::default()),
            this: this.clone(),
        });

        if config.self_register {
            container.register_self();
        }

        container
    }

    fn register_self(&self) {
        let views: [(ServiceKey, fn(Arc<Container>) -> Service); 3] = [
            (ServiceKey::of::<Container>(), |c| Service::new::<Container>(c)),
            (ServiceKey::of::<dyn Resolver>(), |c| Service::new::<dyn Resolver>(c)),
            (ServiceKey::of::<dyn Registrar>(), |c| Service::new::<dyn Registrar>(c)),
        ];

        let mut registry = self.write();
        for (key, view) in views {
            registry.evict(&key);
            registry.singletons.insert(key, Cached::Container(view));
        }
        debug!("Registered container under its own capabilities");
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn entry(&self, key: &ServiceKey) -> Entry {
        let registry = self.read();
        if let Some(cached) = registry.singletons.get(key) {
            Entry::Cached(cached.clone())
        } else if let Some(pending) = registry.singleton_types.get(key) {
            Entry::Pending(pending.clone())
        } else if let Some(recipe) = registry.transients.get(key) {
            Entry::Transient(recipe.clone())
        } else {
            Entry::Missing
        }
    }

    fn resolve_singleton(&self, key: ServiceKey, pending: Pending) -> ContainerResult<Option<Service>> {
        let mut slot = pending
            .group
            .instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let instance = match slot.clone() {
            // Another resolver built it while we were waiting
            Some(instance) => instance,
            None => match self.construct(&pending.recipe.blueprint)? {
                Some(instance) => {
                    *slot = Some(Arc::clone(&instance));
                    self.promote(&pending.group, &instance)?;
                    instance
                }
                None => {
                    debug!(service = %key, "Singleton cannot be built yet");
                    return Ok(None);
                }
            },
        };
        drop(slot);

        pending.recipe.projection.project(&instance).map(Some)
    }

    /// Cache a freshly built singleton under every key of its group.
    fn promote(&self, group: &Arc<SingletonGroup>, instance: &Instance) -> ContainerResult<()> {
        let mut registry = self.write();
        let aliases: Vec<(ServiceKey, Projection)> = registry
            .singleton_types
            .iter()
            .filter(|(_, pending)| Arc::ptr_eq(&pending.group, group))
            .map(|(key, pending)| (*key, pending.recipe.projection.clone()))
            .collect();

        for (key, projection) in &aliases {
            let service = projection.project(instance)?;
            registry.singleton_types.remove(key);
            registry.singletons.insert(*key, Cached::Service(service));
        }

        debug!(
            concrete = %group.concrete.short_name(),
            aliases = aliases.len(),
            "Promoted singleton"
        );
        Ok(())
    }

    /// Build an instance of the blueprint's type.
    ///
    /// `Ok(None)` means no constructor could be satisfied.
    fn construct(&self, blueprint: &Blueprint) -> ContainerResult<Option<Instance>> {
        let constructors = blueprint.constructors();
        if constructors.is_empty() {
            return Err(ContainerError::Construction {
                type_name: blueprint.concrete().short_name(),
            });
        }

        for constructor in constructors {
            if constructor.params.is_empty() {
                debug!(concrete = %blueprint.concrete(), "Constructing with no arguments");
                return (constructor.factory)(&mut Arguments::new(Vec::new())).map(Some);
            }

            if let Some(missing) = constructor
                .params
                .iter()
                .find(|param| !self.is_registered(**param))
            {
                debug!(
                    concrete = %blueprint.concrete(),
                    arity = constructor.params.len(),
                    missing = %missing,
                    "Skipping constructor with unregistered parameter"
                );
                continue;
            }

            let mut services = Vec::with_capacity(constructor.params.len());
            for param in &constructor.params {
                match self.resolve(*param)? {
                    Some(service) => services.push(service),
                    None => {
                        debug!(
                            concrete = %blueprint.concrete(),
                            dependency = %param,
                            "Registered dependency could not be built"
                        );
                        return Ok(None);
                    }
                }
            }

            debug!(
                concrete = %blueprint.concrete(),
                arity = constructor.params.len(),
                "Constructing"
            );
            return (constructor.factory)(&mut Arguments::new(services)).map(Some);
        }

        debug!(concrete = %blueprint.concrete(), "No satisfiable constructor");
        Ok(None)
    }

    fn bind<V, F>(&self, entries: Vec<(ServiceKey, V)>, mut insert: F) -> ContainerResult<()>
    where
        F: FnMut(&mut Registry, ServiceKey, V),
    {
        let mut seen = HashSet::with_capacity(entries.len());
        for (key, _) in &entries {
            if !seen.insert(*key) {
                return Err(ContainerError::DuplicateRegistration { key: *key });
            }
        }

        let mut registry = self.write();
        for (key, value) in entries {
            registry.evict(&key);
            insert(&mut *registry, key, value);
        }
        Ok(())
    }
}

impl Resolver for Container {
    fn resolve(&self, key: ServiceKey) -> ContainerResult<Option<Service>> {
        match self.entry(&key) {
            Entry::Cached(Cached::Service(service)) => {
                trace!(service = %key, "Resolved cached instance");
                Ok(Some(service))
            }
            Entry::Cached(Cached::Container(view)) => Ok(self.this.upgrade().map(view)),
            Entry::Pending(pending) => self.resolve_singleton(key, pending),
            Entry::Transient(recipe) => match self.construct(&recipe.blueprint)? {
                Some(instance) => recipe.projection.project(&instance).map(Some),
                None => Ok(None),
            },
            Entry::Missing => {
                trace!(service = %key, "Service not registered");
                Ok(None)
            }
        }
    }

    fn is_registered(&self, key: ServiceKey) -> bool {
        self.read().contains(&key)
    }
}

impl Registrar for Container {
    fn register_instance(&self, services: Vec<Service>) -> ContainerResult<()> {
        let entries = services
            .into_iter()
            .map(|service| (service.key(), service))
            .collect();
        self.bind(entries, |registry, key, service| {
            debug!(service = %key, "Registered instance");
            registry.singletons.insert(key, Cached::Service(service));
        })
    }

    fn register_singleton_type(
        &self,
        blueprint: Blueprint,
        projections: Vec<Projection>,
    ) -> ContainerResult<()> {
        let entries = projections
            .into_iter()
            .map(|projection| (projection.key(), projection))
            .collect();
        self.bind(entries, |registry, key, projection| {
            let concrete = blueprint.concrete();
            let group = registry.pending_group(concrete).unwrap_or_else(|| {
                Arc::new(SingletonGroup {
                    concrete,
                    instance: Mutex::new(None),
                })
            });
            debug!(service = %key, concrete = %concrete, "Registered singleton type");
            registry.singleton_types.insert(
                key,
                Pending {
                    recipe: Recipe {
                        blueprint: blueprint.clone(),
                        projection,
                    },
                    group,
                },
            );
        })
    }

    fn register_transient_type(
        &self,
        blueprint: Blueprint,
        projections: Vec<Projection>,
    ) -> ContainerResult<()> {
        let entries = projections
            .into_iter()
            .map(|projection| (projection.key(), projection))
            .collect();
        self.bind(entries, |registry, key, projection| {
            debug!(service = %key, concrete = %blueprint.concrete(), "Registered transient type");
            registry.transients.insert(
                key,
                Recipe {
                    blueprint: blueprint.clone(),
                    projection,
                },
            );
        })
    }
}
