// ABOUTME: Application-level operations beyond the push pipeline.
// ABOUTME: Currently the environment variable read-modify-write cycle.

mod env;

pub use env::{EnvError, env_list, env_set, env_unset, parse_assignments};
