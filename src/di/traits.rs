//! Capabilities exposed by the service container
//!
//! [`Resolver`] and [`Registrar`] are object safe so the container can register
//! itself under them. The typed surface lives in the [`ResolverExt`] and
//! [`RegistrarExt`] extension traits, implemented for every resolver and
//! registrar (trait objects included).

use super::injectable::{
    capability_projections, Blueprint, Capability, Injectable, Projection, Service,
};
use crate::core::{ContainerError, ContainerResult, ServiceKey};
use std::sync::Arc;

/// Read-only access to registered services.
pub trait Resolver: Send + Sync {
    /// Resolve the service registered under `key`, constructing it if needed.
    ///
    /// Returns `Ok(None)` when nothing is registered under `key`, or when no
    /// constructor of the registered type can be satisfied.
    fn resolve(&self, key: ServiceKey) -> ContainerResult<Option<Service>>;

    /// Whether any registration exists for `key`. Does not construct anything.
    fn is_registered(&self, key: ServiceKey) -> bool;
}

/// Registration of services.
///
/// Each call binds a set of keys. Listing the same key twice within one call
/// fails with [`ContainerError::DuplicateRegistration`] and registers nothing;
/// separate calls for the same key overwrite each other, the last one wins.
pub trait Registrar: Send + Sync {
    /// Bind each service's key to that already built service.
    fn register_instance(&self, services: Vec<Service>) -> ContainerResult<()>;

    /// Bind each projection's key to a single, lazily built instance of the
    /// blueprint's type.
    fn register_singleton_type(
        &self,
        blueprint: Blueprint,
        projections: Vec<Projection>,
    ) -> ContainerResult<()>;

    /// Bind each projection's key to a fresh instance of the blueprint's type
    /// per resolution.
    fn register_transient_type(
        &self,
        blueprint: Blueprint,
        projections: Vec<Projection>,
    ) -> ContainerResult<()>;
}

/// Typed resolution helpers.
pub trait ResolverExt: Resolver {
    /// Resolve the service registered under `I` itself.
    fn get<I: ?Sized + Send + Sync + 'static>(&self) -> ContainerResult<Option<Arc<I>>> {
        let key = ServiceKey::of::<I>();
        match self.resolve(key)? {
            Some(service) => service
                .downcast::<I>()
                .map(Some)
                .ok_or(ContainerError::TypeMismatch { key }),
            None => Ok(None),
        }
    }

    fn contains<I: ?Sized + 'static>(&self) -> bool {
        self.is_registered(ServiceKey::of::<I>())
    }
}

impl<R: Resolver + ?Sized> ResolverExt for R {}

/// Typed registration helpers.
pub trait RegistrarExt: Registrar {
    /// Register an existing instance under its own type `I`.
    fn instance<I: ?Sized + Send + Sync + 'static>(&self, instance: Arc<I>) -> ContainerResult<()> {
        self.register_instance(vec![Service::new(instance)])
    }

    /// Register an existing instance under one capability.
    fn instance_as<T: Send + Sync + 'static>(
        &self,
        instance: Arc<T>,
        capability: Capability<T>,
    ) -> ContainerResult<()> {
        self.register_instance(vec![capability.project(instance)])
    }

    /// Register `T` as a lazily built singleton under its own type.
    fn singleton<T: Injectable>(&self) -> ContainerResult<()> {
        self.singleton_as(Capability::<T>::concrete())
    }

    /// Register `T` as a lazily built singleton under one capability.
    fn singleton_as<T: Injectable>(&self, capability: Capability<T>) -> ContainerResult<()> {
        self.register_singleton_type(Blueprint::of::<T>(), vec![capability.into()])
    }

    /// Register `T` as transient under its own type.
    fn transient<T: Injectable>(&self) -> ContainerResult<()> {
        self.transient_as(Capability::<T>::concrete())
    }

    /// Register `T` as transient under one capability.
    fn transient_as<T: Injectable>(&self, capability: Capability<T>) -> ContainerResult<()> {
        self.register_transient_type(Blueprint::of::<T>(), vec![capability.into()])
    }

    /// Register `T` as one shared, lazily built singleton under every
    /// capability it declares.
    fn all_capabilities_singleton<T: Injectable>(&self) -> ContainerResult<()> {
        self.register_singleton_type(Blueprint::of::<T>(), capability_projections::<T>())
    }

    /// Register an existing instance under every capability `T` declares.
    fn all_capabilities_singleton_instance<T: Injectable>(
        &self,
        instance: Arc<T>,
    ) -> ContainerResult<()> {
        let services = T::capabilities()
            .iter()
            .map(|capability| capability.project(Arc::clone(&instance)))
            .collect();
        self.register_instance(services)
    }

    /// Register `T` as transient under every capability it declares.
    fn all_capabilities_transient<T: Injectable>(&self) -> ContainerResult<()> {
        self.register_transient_type(Blueprint::of::<T>(), capability_projections::<T>())
    }
}

impl<R: Registrar + ?Sized> RegistrarExt for R {}
