// ABOUTME: Command module aggregator for the anevazo CLI.
// ABOUTME: Re-exports install, uninstall, push, and env command handlers.

mod env;
mod install;
mod push;

pub use env::env;
pub use install::{install, uninstall};
pub use push::push;
