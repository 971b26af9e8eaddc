//! Dependency injection infrastructure for ALo
//!
//! A [`Container`] maps service keys (concrete types or `dyn Trait` types) to
//! instances, lazily built singletons, or transients. Concrete types describe
//! how they are built through [`Injectable`].
//!
//! # Example
//! ```
//! use alo::di::{Capability, Constructor, Container, Injectable, RegistrarExt, ResolverExt};
//! use std::sync::Arc;
//!
//! trait Store: Send + Sync {
//!     fn url(&self) -> String;
//! }
//!
//! struct PgStore {
//!     url: Arc<String>,
//! }
//!
//! impl Store for PgStore {
//!     fn url(&self) -> String {
//!         self.url.to_string()
//!     }
//! }
//!
//! impl Injectable for PgStore {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::unary(|url: Arc<String>| PgStore { url })]
//!     }
//!
//!     fn capabilities() -> Vec<Capability<Self>> {
//!         vec![Capability::<Self>::of::<dyn Store>(|store| store)]
//!     }
//! }
//!
//! # fn example() -> alo::core::ContainerResult<()> {
//! let container = Container::new();
//! container.instance(Arc::new(String::from("postgres://localhost")))?;
//! container.all_capabilities_singleton::<PgStore>()?;
//!
//! let store = container.get::<dyn Store>()?.expect("store is registered");
//! assert_eq!(store.url(), "postgres://localhost");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod container;
pub mod injectable;
pub mod traits;

// Re-export key types
pub use container::Container;
pub use injectable::{
    capability_projections, Arguments, Blueprint, Capability, Constructor, Injectable, Instance,
    Projection, Service,
};
pub use traits::{Registrar, RegistrarExt, Resolver, ResolverExt};
