// ABOUTME: Install and uninstall command implementations.
// ABOUTME: Resolves options, builds the catalog, runs the orchestrator.

use crate::api::{HttpPlatformClient, SystemDns};
use crate::cli::InstallArgs;
use crate::config::{
    DefaultsReader, FlagsReader, InstallationOptions, InteractiveReader, OptionSource, Settings,
};
use crate::error::Result;
use crate::install::{DeploymentOrchestrator, catalog};
use crate::output::Output;
use std::sync::Arc;

pub async fn install(settings: &Settings, args: InstallArgs, mut output: Output) -> Result<()> {
    output.start_timer();

    let options = resolve_options(&args)?;
    show_configuration(&options, &output);

    let client = Arc::new(HttpPlatformClient::new(
        settings.api.host.clone(),
        settings.api.port,
    ));
    let units = catalog(&options, settings.budgets.unit_timeout)?;
    let orchestrator = DeploymentOrchestrator::new(
        client,
        Arc::new(SystemDns),
        options,
        settings.budgets.clone(),
        output.clone(),
    );

    let report = orchestrator.install(&units).await?;
    output.success(&format!(
        "Platform installed; system domain: {}",
        report.system_domain
    ));
    Ok(())
}

pub async fn uninstall(settings: &Settings, mut output: Output) -> Result<()> {
    output.start_timer();

    // Only defaults are needed here: option values merely parameterize the
    // manifests being deleted.
    let options =
        InstallationOptions::catalog().populate(&DefaultsReader, OptionSource::Default)?;

    let client = Arc::new(HttpPlatformClient::new(
        settings.api.host.clone(),
        settings.api.port,
    ));
    let units = catalog(&options, settings.budgets.unit_timeout)?;
    let orchestrator = DeploymentOrchestrator::new(
        client,
        Arc::new(SystemDns),
        options,
        settings.budgets.clone(),
        output.clone(),
    );

    orchestrator.uninstall(&units).await?;
    output.success("Platform uninstalled");
    Ok(())
}

/// Three resolution passes: flags, then interactive prompts if requested,
/// then computed defaults. Produces the immutable snapshot everything
/// downstream reads.
fn resolve_options(args: &InstallArgs) -> Result<InstallationOptions> {
    let flags = FlagsReader::new()
        .set_str("system_domain", args.system_domain.clone())
        .set_str("tls_issuer", args.tls_issuer.clone())
        .set_bool(
            "use_internal_registry_node_port",
            args.use_internal_registry_node_port,
        )
        .set_str("loadbalancer_ip", args.loadbalancer_ip.clone())
        .set_str("s3_endpoint", args.s3_endpoint.clone())
        .set_str("s3_access_key_id", args.s3_access_key_id.clone())
        .set_str("s3_secret_access_key", args.s3_secret_access_key.clone())
        .set_str("s3_bucket", args.s3_bucket.clone())
        .set_str("s3_location", args.s3_location.clone())
        .set_bool("s3_use_ssl", args.s3_use_ssl);

    let mut options = InstallationOptions::catalog().populate(&flags, OptionSource::Flag)?;

    if args.interactive {
        options = options.populate(&InteractiveReader, OptionSource::Interactive)?;
    }

    Ok(options.populate(&DefaultsReader, OptionSource::Default)?)
}

fn show_configuration(options: &InstallationOptions, output: &Output) {
    output.progress("Configuration:");
    for option in options.iter() {
        let Some(value) = &option.value else { continue };
        if option.name.contains("secret") {
            output.progress(&format!("  {} = ********", option.name));
        } else {
            output.progress(&format!("  {} = {}", option.name, value));
        }
    }
}
