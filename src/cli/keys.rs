use super::demo::{bootstrap, Console, Greet, Shout, Unknown};
use alo::bus::{CommandHandler, CommandSender};
use alo::config::Config;
use alo::core::{AloResult, ServiceKey};
use alo::di::{Container, Registrar, Resolver};

/// How a key fares against the container
fn describe(resolver: &dyn Resolver, key: ServiceKey) -> &'static str {
    match resolver.resolve(key) {
        Ok(Some(_)) => "resolves",
        Ok(None) if resolver.is_registered(key) => "absent",
        Ok(None) => "missing",
        Err(_) => "failed",
    }
}

pub fn run(config: &Config) -> AloResult<()> {
    let container = bootstrap(config)?;

    let keys = [
        ServiceKey::of::<Container>(),
        ServiceKey::of::<dyn Resolver>(),
        ServiceKey::of::<dyn Registrar>(),
        ServiceKey::of::<dyn Console>(),
        ServiceKey::of::<dyn CommandSender>(),
        ServiceKey::of::<dyn CommandHandler<Greet>>(),
        ServiceKey::of::<dyn CommandHandler<Shout>>(),
        ServiceKey::of::<dyn CommandHandler<Unknown>>(),
    ];

    for key in keys {
        println!("{:<32} {}", key.short_name(), describe(&*container, key));
    }

    Ok(())
}
