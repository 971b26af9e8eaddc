//! Core types shared by the ALo service container and command bus.

pub mod core;

pub use crate::core::error::{
    AloError, AloResult, ContainerError, ContainerResult, DispatchError, DispatchResult,
};
pub use crate::core::key::{short_type_name, ServiceKey};
