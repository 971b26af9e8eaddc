//! Demo application wired through the container: a console service, two
//! command handlers and the command bus.

use alo::bus::{Command, CommandBus, CommandHandler, CommandSender};
use alo::config::Config;
use alo::core::ContainerResult;
use alo::di::{Capability, Constructor, Container, Injectable, RegistrarExt, ResolverExt};
use std::sync::Arc;

pub trait Console: Send + Sync {
    fn write_line(&self, line: &str);
}

pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn write_line(&self, line: &str) {
        println!("{}", line);
    }
}

pub struct Greet {
    pub name: String,
}

impl Command for Greet {}

pub struct Shout {
    pub text: String,
}

impl Command for Shout {}

/// Has no handler; sending it fails.
pub struct Unknown;

impl Command for Unknown {}

pub struct GreetHandler {
    console: Arc<dyn Console>,
}

impl CommandHandler<Greet> for GreetHandler {
    fn handle(&self, command: &Greet) -> anyhow::Result<()> {
        anyhow::ensure!(!command.name.trim().is_empty(), "name must not be empty");
        self.console.write_line(&format!("Hello, {}!", command.name));
        Ok(())
    }
}

impl Injectable for GreetHandler {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::unary(|console: Arc<dyn Console>| GreetHandler {
            console,
        })]
    }

    fn capabilities() -> Vec<Capability<Self>> {
        vec![Capability::<Self>::of::<dyn CommandHandler<Greet>>(|it| it)]
    }
}

pub struct ShoutHandler {
    console: Arc<dyn Console>,
}

impl CommandHandler<Shout> for ShoutHandler {
    fn handle(&self, command: &Shout) -> anyhow::Result<()> {
        self.console
            .write_line(&format!("{}!", command.text.to_uppercase()));
        Ok(())
    }
}

impl Injectable for ShoutHandler {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::unary(|console: Arc<dyn Console>| ShoutHandler {
            console,
        })]
    }
}

/// Register the demo services into a fresh container.
pub fn bootstrap(config: &Config) -> ContainerResult<Arc<Container>> {
    let container = Container::with_config(config);

    container.instance::<dyn Console>(Arc::new(StdoutConsole))?;
    container.all_capabilities_singleton::<GreetHandler>()?;
    container.transient_as(Capability::<ShoutHandler>::of::<dyn CommandHandler<Shout>>(
        |it| it,
    ))?;
    container.all_capabilities_singleton::<CommandBus>()?;

    Ok(container)
}

/// The command sender for `container`.
///
/// Without self-registration the container cannot build the bus, so it is
/// built by hand around the container.
pub fn sender(container: &Arc<Container>) -> ContainerResult<Arc<dyn CommandSender>> {
    match container.get::<dyn CommandSender>()? {
        Some(sender) => Ok(sender),
        None => {
            let resolver: Arc<dyn alo::di::Resolver> = container.clone();
            Ok(Arc::new(CommandBus::new(resolver)))
        }
    }
}
