//! Command dispatch through the service container
//!
//! A command is any type implementing the [`Command`] marker. Its handler is
//! the service registered under `dyn CommandHandler<C>` for the command's
//! concrete type `C`. [`CommandBus::send`] takes commands as `&dyn Command`
//! and picks the handler key from the runtime type via [`Route`], which is
//! implemented for every command type.

use crate::core::{ContainerError, DispatchError, DispatchResult, ServiceKey};
use crate::di::{Capability, Constructor, Injectable, Resolver, Service};
use std::sync::Arc;
use tracing::debug;

/// Marker for values that can be sent through a [`CommandSender`].
pub trait Command: Route + Send + Sync + 'static {}

/// Executes one concrete command type.
pub trait CommandHandler<C: Command>: Send + Sync {
    fn handle(&self, command: &C) -> anyhow::Result<()>;
}

/// Maps a command's runtime type to its handler.
///
/// Implemented for every [`Command`]; not meant to be implemented by hand.
pub trait Route {
    /// Short type name of the command, used in traces and errors
    fn command_name(&self) -> String;

    /// Key of `dyn CommandHandler<Self>`
    fn handler_key(&self) -> ServiceKey;

    /// Hand the command to `handler`, or `None` if `handler` is not a
    /// `dyn CommandHandler<Self>`.
    fn deliver(&self, handler: &Service) -> Option<anyhow::Result<()>>;
}

impl<C: Command> Route for C {
    fn command_name(&self) -> String {
        ServiceKey::of::<C>().short_name()
    }

    fn handler_key(&self) -> ServiceKey {
        ServiceKey::of::<dyn CommandHandler<C>>()
    }

    fn deliver(&self, handler: &Service) -> Option<anyhow::Result<()>> {
        handler
            .downcast::<dyn CommandHandler<C>>()
            .map(|handler| handler.handle(self))
    }
}

/// Sends commands to their handlers.
pub trait CommandSender: Send + Sync {
    /// Invoke the handler registered for the command's concrete type, once.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::HandlerNotFound`] if no handler resolves
    /// - [`DispatchError::HandlerFailed`] if the handler returns an error
    /// - [`DispatchError::Resolution`] if the container fails to build the handler
    fn send(&self, command: &dyn Command) -> DispatchResult<()>;
}

/// [`CommandSender`] that looks handlers up in a [`Resolver`].
///
/// Holds no state besides the resolver; every `send` resolves the handler
/// again, so transient handlers are built per command.
pub struct CommandBus {
    resolver: Arc<dyn Resolver>,
}

impl CommandBus {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver }
    }
}

impl CommandSender for CommandBus {
    fn send(&self, command: &dyn Command) -> DispatchResult<()> {
        let name = command.command_name();
        debug!(command = %name, "Sending command");

        let key = command.handler_key();
        let handler = self
            .resolver
            .resolve(key)?
            .ok_or_else(|| DispatchError::HandlerNotFound {
                command: name.clone(),
            })?;

        match command.deliver(&handler) {
            Some(Ok(())) => Ok(()),
            Some(Err(source)) => Err(DispatchError::HandlerFailed {
                command: name,
                source: source.into(),
            }),
            None => Err(ContainerError::TypeMismatch { key }.into()),
        }
    }
}

impl Injectable for CommandBus {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::unary(|resolver: Arc<dyn Resolver>| {
            CommandBus::new(resolver)
        })]
    }

    fn capabilities() -> Vec<Capability<Self>> {
        vec![
            Capability::<Self>::concrete(),
            Capability::<Self>::of::<dyn CommandSender>(|bus| bus),
        ]
    }
}
