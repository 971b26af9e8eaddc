use super::demo::{bootstrap, sender, Greet, Shout, Unknown};
use alo::bus::{Command, CommandSender};
use alo::config::Config;
use alo::core::AloResult;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum SendCommands {
    /// Greet someone by name
    Greet {
        /// Name to greet
        name: String,
    },
    /// Print text in upper case
    Shout {
        /// Text to shout
        text: String,
    },
    /// Send a command that has no registered handler
    Unknown,
}

pub fn run(config: &Config, command: SendCommands) -> AloResult<()> {
    let container = bootstrap(config)?;
    let bus = sender(&container)?;

    let command: Box<dyn Command> = match command {
        SendCommands::Greet { name } => Box::new(Greet { name }),
        SendCommands::Shout { text } => Box::new(Shout { text }),
        SendCommands::Unknown => Box::new(Unknown),
    };

    bus.send(&*command)?;
    Ok(())
}
