// ABOUTME: Environment subcommand implementations.
// ABOUTME: Set, unset, and list application environment variables.

use crate::api::HttpPlatformClient;
use crate::application::{env_list, env_set, env_unset, parse_assignments};
use crate::cli::EnvCommands;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::retry::RetryPolicy;
use crate::types::{AppName, AppRef};

pub async fn env(settings: &Settings, command: EnvCommands, output: Output) -> Result<()> {
    let client = HttpPlatformClient::new(settings.api.host.clone(), settings.api.port);
    let retry = RetryPolicy::new(
        settings.budgets.env_conflict_attempts,
        settings.budgets.poll_delay,
    );

    match command {
        EnvCommands::Set {
            name,
            assignments,
            replace,
        } => {
            let app = app_ref(&name, &settings.namespace)?;
            let assignments = parse_assignments(&assignments)?;
            env_set(&client, &retry, &app, &assignments, replace).await?;
            output.success(&format!("Environment updated for {app}"));
        }
        EnvCommands::Unset { name, variable } => {
            let app = app_ref(&name, &settings.namespace)?;
            env_unset(&client, &retry, &app, &variable).await?;
            output.success(&format!("Removed {variable} from {app}"));
        }
        EnvCommands::List { name } => {
            let app = app_ref(&name, &settings.namespace)?;
            let vars = env_list(&client, &app).await?;
            for (name, value) in vars {
                println!("{name}={value}");
            }
        }
    }
    Ok(())
}

fn app_ref(name: &str, namespace: &str) -> Result<AppRef> {
    let name = AppName::new(name)
        .map_err(|e| Error::InvalidConfig(format!("application name {name:?}: {e}")))?;
    Ok(AppRef::new(name, namespace))
}
