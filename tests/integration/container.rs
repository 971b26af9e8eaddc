//! Container behaviour: lifetimes, constructor selection, capability registration

use alo::core::{ContainerError, ServiceKey};
use alo::di::{
    Capability, Constructor, Container, Injectable, Registrar, RegistrarExt, Resolver,
    ResolverExt,
};
use std::cell::Cell;
use std::sync::Arc;

thread_local! {
    static CONSTRUCTED: Cell<usize> = const { Cell::new(0) };
}

fn constructed() {
    CONSTRUCTED.with(|count| count.set(count.get() + 1));
}

fn reset_constructed() {
    CONSTRUCTED.with(|count| count.set(0));
}

fn constructed_count() -> usize {
    CONSTRUCTED.with(Cell::get)
}

fn same_object<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

trait Sample: Send + Sync {}

trait Describe: Send + Sync {
    fn describe(&self) -> String;
}

struct SampleService;

impl Sample for SampleService {}

impl Injectable for SampleService {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::nullary(|| {
            constructed();
            SampleService
        })]
    }
}

struct NoConstructors;

impl Injectable for NoConstructors {
    fn constructors() -> Vec<Constructor<Self>> {
        Vec::new()
    }
}

struct SecondValidConstructor {
    via: &'static str,
}

impl Injectable for SecondValidConstructor {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::unary(|_: Arc<String>| {
                constructed();
                SecondValidConstructor { via: "string" }
            }),
            Constructor::nullary(|| {
                constructed();
                SecondValidConstructor { via: "default" }
            }),
        ]
    }
}

struct LastValidConstructor {
    params: Vec<Arc<String>>,
}

impl Injectable for LastValidConstructor {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::unary(|_: Arc<SecondValidConstructor>| {
                constructed();
                LastValidConstructor { params: Vec::new() }
            }),
            Constructor::binary(|_: Arc<NoConstructors>, _: Arc<SecondValidConstructor>| {
                constructed();
                LastValidConstructor { params: Vec::new() }
            }),
            Constructor::ternary(
                |_: Arc<SampleService>, _: Arc<NoConstructors>, _: Arc<u64>| {
                    constructed();
                    LastValidConstructor { params: Vec::new() }
                },
            ),
            Constructor::binary(|_: Arc<dyn Sample>, _: Arc<NoConstructors>| {
                constructed();
                LastValidConstructor { params: Vec::new() }
            }),
            Constructor::new(vec![ServiceKey::of::<String>(); 5], |args| {
                let mut params = Vec::with_capacity(5);
                for _ in 0..5 {
                    params.push(args.next::<String>()?);
                }
                constructed();
                Ok(LastValidConstructor { params })
            }),
        ]
    }
}

struct NoValidConstructors;

impl Injectable for NoValidConstructors {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::unary(|_: Arc<String>| NoValidConstructors),
            Constructor::unary(|_: Arc<i32>| NoValidConstructors),
            Constructor::unary(|_: Arc<u64>| NoValidConstructors),
        ]
    }
}

struct ComplicatedConstruction {
    param: Arc<LastValidConstructor>,
}

impl Injectable for ComplicatedConstruction {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::unary(|param: Arc<LastValidConstructor>| {
            ComplicatedConstruction { param }
        })]
    }
}

struct MultipleCapabilities;

impl Sample for MultipleCapabilities {}

impl Describe for MultipleCapabilities {
    fn describe(&self) -> String {
        "multiple".to_string()
    }
}

impl Injectable for MultipleCapabilities {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::nullary(|| {
            constructed();
            MultipleCapabilities
        })]
    }

    fn capabilities() -> Vec<Capability<Self>> {
        vec![
            Capability::<Self>::of::<dyn Sample>(|it| it),
            Capability::<Self>::of::<dyn Describe>(|it| it),
        ]
    }
}

struct RepeatedCapability;

impl Sample for RepeatedCapability {}

impl Injectable for RepeatedCapability {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::nullary(|| RepeatedCapability)]
    }

    fn capabilities() -> Vec<Capability<Self>> {
        vec![
            Capability::<Self>::of::<dyn Sample>(|it| it),
            Capability::<Self>::concrete(),
            Capability::<Self>::of::<dyn Sample>(|it| it),
        ]
    }
}

#[test]
fn test_returns_same_instance_registered_by_instance() {
    let container = Container::new();
    let expected = Arc::new(SampleService);
    container.instance(expected.clone()).unwrap();

    let actual = container.get::<SampleService>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&actual, &expected));
}

#[test]
fn test_returns_same_instance_registered_by_type() {
    reset_constructed();
    let container = Container::new();
    container.singleton::<SampleService>().unwrap();

    let expected = container.get::<SampleService>().unwrap().unwrap();
    let actual = container.get::<SampleService>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&actual, &expected));
    assert_eq!(constructed_count(), 1);
}

#[test]
fn test_returns_same_instance_under_capability() {
    let container = Container::new();
    let expected = Arc::new(SampleService);
    container
        .instance_as(
            expected.clone(),
            Capability::<SampleService>::of::<dyn Sample>(|it| it),
        )
        .unwrap();

    for _ in 0..3 {
        let actual = container.get::<dyn Sample>().unwrap().unwrap();
        assert!(same_object(&actual, &expected));
    }
}

#[test]
fn test_returns_new_transient_every_time() {
    let container = Container::new();
    container
        .transient_as(Capability::<SampleService>::of::<dyn Sample>(|it| it))
        .unwrap();

    let first = container.get::<dyn Sample>().unwrap().unwrap();
    let second = container.get::<dyn Sample>().unwrap().unwrap();
    assert!(!same_object(&first, &second));
}

#[test]
fn test_returns_none_if_not_registered() {
    let container = Container::new();
    assert!(container.get::<dyn Sample>().unwrap().is_none());
    assert!(container
        .resolve(ServiceKey::of::<SampleService>())
        .unwrap()
        .is_none());
}

#[test]
fn test_fails_if_type_has_no_constructor() {
    let container = Container::new();
    container.transient::<NoConstructors>().unwrap();

    let err = container
        .get::<NoConstructors>()
        .err()
        .expect("construction should fail");
    assert_eq!(
        err,
        ContainerError::Construction {
            type_name: "NoConstructors".to_string()
        }
    );
    assert_eq!(err.to_string(), "Failed to construct type 'NoConstructors'");
}

#[test]
fn test_takes_constructors_ordered_by_parameter_count() {
    reset_constructed();
    let container = Container::new();
    container
        .instance(Arc::new(String::from("registered")))
        .unwrap();
    container.transient::<SecondValidConstructor>().unwrap();

    let actual = container.get::<SecondValidConstructor>().unwrap().unwrap();
    assert_eq!(actual.via, "default");
    assert_eq!(constructed_count(), 1);
}

#[test]
fn test_skips_constructors_with_unregistered_parameters() {
    reset_constructed();
    let container = Container::new();
    let sample = Arc::new(String::from("f3a1c2"));
    container.instance(sample.clone()).unwrap();
    container.transient::<LastValidConstructor>().unwrap();

    let actual = container.get::<LastValidConstructor>().unwrap().unwrap();
    assert_eq!(constructed_count(), 1);
    assert_eq!(actual.params.len(), 5);
    assert!(actual.params.iter().all(|p| Arc::ptr_eq(p, &sample)));
}

#[test]
fn test_returns_none_if_all_constructors_have_unregistered_parameters() {
    let container = Container::new();
    container.transient::<NoValidConstructors>().unwrap();

    assert!(container.get::<NoValidConstructors>().unwrap().is_none());
}

#[test]
fn test_injects_resolved_dependencies_recursively() {
    let container = Container::new();
    let sample = Arc::new(String::from("nested"));
    container.instance(sample.clone()).unwrap();
    container.transient::<LastValidConstructor>().unwrap();
    container.transient::<ComplicatedConstruction>().unwrap();

    let actual = container.get::<ComplicatedConstruction>().unwrap().unwrap();
    assert_eq!(actual.param.params.len(), 5);
    assert!(actual.param.params.iter().all(|p| p.as_str() == "nested"));
}

#[test]
fn test_registers_itself_under_all_capabilities() {
    let container = Container::new();

    let as_container = container.get::<Container>().unwrap().unwrap();
    let as_resolver = container.get::<dyn Resolver>().unwrap().unwrap();
    let as_registrar = container.get::<dyn Registrar>().unwrap().unwrap();

    assert!(Arc::ptr_eq(&as_container, &container));
    assert!(same_object(&as_resolver, &container));
    assert!(same_object(&as_registrar, &container));
}

#[test]
fn test_registers_all_transient_capabilities() {
    let container = Container::new();
    container
        .all_capabilities_transient::<MultipleCapabilities>()
        .unwrap();

    let first = container.get::<dyn Sample>().unwrap().unwrap();
    let second = container.get::<dyn Describe>().unwrap().unwrap();
    assert!(!same_object(&first, &second));
    assert_eq!(second.describe(), "multiple");
}

#[test]
fn test_registers_all_singleton_capabilities() {
    reset_constructed();
    let container = Container::new();
    container
        .all_capabilities_singleton::<MultipleCapabilities>()
        .unwrap();

    let first = container.get::<dyn Sample>().unwrap().unwrap();
    let second = container.get::<dyn Describe>().unwrap().unwrap();
    let again = container.get::<dyn Sample>().unwrap().unwrap();

    assert!(same_object(&first, &second));
    assert!(same_object(&first, &again));
    assert_eq!(constructed_count(), 1);
}

#[test]
fn test_registers_instance_under_all_capabilities() {
    let container = Container::new();
    let instance = Arc::new(MultipleCapabilities);
    container
        .all_capabilities_singleton_instance(instance.clone())
        .unwrap();

    let sample = container.get::<dyn Sample>().unwrap().unwrap();
    let describe = container.get::<dyn Describe>().unwrap().unwrap();
    assert!(same_object(&sample, &instance));
    assert!(same_object(&describe, &instance));
    assert!(container.get::<MultipleCapabilities>().unwrap().is_none());
}

#[test]
fn test_bulk_registration_rejects_repeated_capability() {
    let container = Container::new();
    let err = container
        .all_capabilities_singleton::<RepeatedCapability>()
        .unwrap_err();

    assert_eq!(
        err,
        ContainerError::DuplicateRegistration {
            key: ServiceKey::of::<dyn Sample>()
        }
    );
    assert!(!container.contains::<dyn Sample>());
    assert!(!container.contains::<RepeatedCapability>());
}

#[test]
fn test_separate_registrations_last_one_wins() {
    let container = Container::new();
    container.instance(Arc::new(String::from("first"))).unwrap();
    container.instance(Arc::new(String::from("second"))).unwrap();
    assert_eq!(
        container.get::<String>().unwrap().unwrap().as_str(),
        "second"
    );

    container
        .singleton_as(Capability::<SampleService>::of::<dyn Sample>(|it| it))
        .unwrap();
    container
        .transient_as(Capability::<SampleService>::of::<dyn Sample>(|it| it))
        .unwrap();
    let first = container.get::<dyn Sample>().unwrap().unwrap();
    let second = container.get::<dyn Sample>().unwrap().unwrap();
    assert!(!same_object(&first, &second));
}

#[test]
fn test_resolves_through_registered_resolver() {
    let container = Container::new();
    container.singleton::<SampleService>().unwrap();

    let resolver = container.get::<dyn Resolver>().unwrap().unwrap();
    let direct = container.get::<SampleService>().unwrap().unwrap();
    let through = resolver.get::<SampleService>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&direct, &through));
}

#[test]
fn test_registers_through_registered_registrar() {
    let container = Container::new();
    let registrar = container.get::<dyn Registrar>().unwrap().unwrap();
    registrar.instance(Arc::new(7u64)).unwrap();

    assert_eq!(*container.get::<u64>().unwrap().unwrap(), 7);
}
