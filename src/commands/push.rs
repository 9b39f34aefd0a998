// ABOUTME: Push command implementation.
// ABOUTME: Resolves the source spec and hands off to the pipeline.

use crate::api::{AppConfiguration, HttpPlatformClient};
use crate::cli::PushArgs;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::push::{PushParams, PushPipeline, SourceSpec};
use crate::types::ImageRef;
use std::sync::Arc;

pub async fn push(settings: &Settings, args: PushArgs, mut output: Output) -> Result<()> {
    output.start_timer();

    let source = resolve_source(&args)?;
    let builder_image = ImageRef::parse(&args.builder_image)
        .map_err(|e| Error::InvalidConfig(format!("builder image: {e}")))?;

    let configuration = AppConfiguration {
        instances: args.instances,
        ..AppConfiguration::default()
    };

    let client = Arc::new(HttpPlatformClient::new(
        settings.api.host.clone(),
        settings.api.port,
    ));
    let pipeline = PushPipeline::new(
        client,
        settings.namespace.clone(),
        &settings.budgets,
        output,
    );

    pipeline
        .push(PushParams {
            name: args.name,
            source,
            builder_image,
            configuration,
        })
        .await?;
    Ok(())
}

/// Exactly one source per push. With no source flag at all, the current
/// directory is uploaded.
fn resolve_source(args: &PushArgs) -> Result<SourceSpec> {
    match (&args.path, &args.git, &args.image) {
        (Some(path), None, None) => Ok(SourceSpec::Archive(path.clone())),
        (None, Some(url), None) => Ok(SourceSpec::Git {
            url: url.clone(),
            revision: args.rev.clone().unwrap_or_else(|| "main".to_string()),
        }),
        (None, None, Some(image)) => Ok(SourceSpec::Image(
            ImageRef::parse(image).map_err(|e| Error::InvalidConfig(format!("image: {e}")))?,
        )),
        (None, None, None) => Ok(SourceSpec::Archive(std::env::current_dir()?)),
        _ => Err(Error::AmbiguousSource),
    }
}
