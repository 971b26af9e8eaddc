//! ALo infrastructure: a service container and a command bus
//!
//! This crate provides the dependency injection container and the command bus
//! built on top of it, re-exporting the shared types from `alo-core`.

pub use alo_core::{
    AloError, AloResult, ContainerError, ContainerResult, DispatchError, DispatchResult,
    ServiceKey,
};

/// Core module re-exported from alo-core.
pub mod core {
    pub use alo_core::core::*;
    pub use alo_core::*;
}

/// Configuration management.
pub mod config;

/// Dependency injection infrastructure.
pub mod di;

/// Command dispatch.
pub mod bus;
