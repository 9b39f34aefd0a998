// ABOUTME: Per-application environment variable management.
// ABOUTME: Optimistic-concurrency read-modify-write against the env store.

use crate::api::{ApiError, EnvOps};
use crate::retry::{RetryError, RetryPolicy};
use crate::types::AppRef;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("environment update kept conflicting after {attempts} attempts")]
    Conflict { attempts: u32 },

    #[error("assignment {0:?} is not of the form NAME=value")]
    MalformedAssignment(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Current environment assignments for an application.
pub async fn env_list<C>(client: &C, app: &AppRef) -> Result<BTreeMap<String, String>, EnvError>
where
    C: EnvOps + ?Sized,
{
    let record = client.env_load(app).await?;
    Ok(record.vars)
}

/// Add or replace environment variables.
///
/// With `replace` the given assignments become the whole environment;
/// otherwise they merge over what is already set.
pub async fn env_set<C>(
    client: &C,
    retry: &RetryPolicy,
    app: &AppRef,
    assignments: &[(String, String)],
    replace: bool,
) -> Result<(), EnvError>
where
    C: EnvOps + ?Sized,
{
    update_env(client, retry, app, |vars| {
        if replace {
            vars.clear();
        }
        for (name, value) in assignments {
            vars.insert(name.clone(), value.clone());
        }
    })
    .await
}

/// Remove one environment variable. Removing an absent variable is not an
/// error.
pub async fn env_unset<C>(
    client: &C,
    retry: &RetryPolicy,
    app: &AppRef,
    name: &str,
) -> Result<(), EnvError>
where
    C: EnvOps + ?Sized,
{
    update_env(client, retry, app, |vars| {
        vars.remove(name);
    })
    .await
}

/// The read-modify-write cycle shared by set and unset.
///
/// The env object may be modified concurrently by other clients, so a stale
/// write comes back as a conflict; the cycle re-reads, re-applies the
/// mutation, and re-writes, bounded by the retry policy. There is no
/// in-process locking: contention is cross-process by nature.
async fn update_env<C, F>(
    client: &C,
    retry: &RetryPolicy,
    app: &AppRef,
    mutate: F,
) -> Result<(), EnvError>
where
    C: EnvOps + ?Sized,
    F: Fn(&mut BTreeMap<String, String>),
{
    let result = retry
        .run(
            "environment update",
            || async {
                let mut record = client.env_load(app).await?;
                mutate(&mut record.vars);
                client.env_store(app, &record).await
            },
            ApiError::is_conflict,
        )
        .await;

    match result {
        Ok(()) => Ok(()),
        Err(RetryError::Rejected(source)) => Err(EnvError::Api(source)),
        Err(RetryError::Exhausted { attempts, .. }) => Err(EnvError::Conflict { attempts }),
    }
}

/// Parse `NAME=value` pairs from the command line.
pub fn parse_assignments(raw: &[String]) -> Result<Vec<(String, String)>, EnvError> {
    raw.iter()
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                Ok((name.to_string(), value.to_string()))
            }
            _ => Err(EnvError::MalformedAssignment(entry.clone())),
        })
        .collect()
}
