// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anevazo")]
#[command(about = "Install the Anevazo platform on a cluster and push applications to it")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install the platform components on the target cluster
    Install(InstallArgs),

    /// Remove the platform components from the cluster
    Uninstall,

    /// Build and deploy an application
    Push(PushArgs),

    /// Manage application environment variables
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },
}

#[derive(Args)]
pub struct InstallArgs {
    /// Prompt for each option that no flag provided
    #[arg(short, long)]
    pub interactive: bool,

    /// DNS root for application routes (derived from the ingress address if empty)
    #[arg(long)]
    pub system_domain: Option<String>,

    /// Certificate issuer for application routes
    #[arg(long)]
    pub tls_issuer: Option<String>,

    /// Expose the internal registry on a node port
    #[arg(long)]
    pub use_internal_registry_node_port: Option<bool>,

    /// Expected ingress load-balancer address; the system domain must resolve to it
    #[arg(long)]
    pub loadbalancer_ip: Option<String>,

    /// External object storage endpoint (internal store if empty)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    #[arg(long)]
    pub s3_access_key_id: Option<String>,

    #[arg(long)]
    pub s3_secret_access_key: Option<String>,

    #[arg(long)]
    pub s3_bucket: Option<String>,

    #[arg(long)]
    pub s3_location: Option<String>,

    #[arg(long)]
    pub s3_use_ssl: Option<bool>,
}

#[derive(Args)]
pub struct PushArgs {
    /// Application name (subdomain label)
    pub name: String,

    /// Local source directory or archive to upload
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Git URL to import source from
    #[arg(long, requires = "rev")]
    pub git: Option<String>,

    /// Git revision to import
    #[arg(long)]
    pub rev: Option<String>,

    /// Prebuilt image to deploy without staging
    #[arg(long)]
    pub image: Option<String>,

    /// Builder image the stage runs the source through
    #[arg(long, default_value = "paketobuildpacks/builder:base")]
    pub builder_image: String,

    /// Number of instances to run
    #[arg(long)]
    pub instances: Option<u32>,
}

#[derive(Subcommand)]
pub enum EnvCommands {
    /// Set NAME=value assignments on an application
    Set {
        /// Application name
        name: String,

        /// NAME=value pairs
        #[arg(required = true)]
        assignments: Vec<String>,

        /// Replace the whole environment instead of merging
        #[arg(long)]
        replace: bool,
    },

    /// Remove a variable from an application
    Unset {
        /// Application name
        name: String,

        /// Variable name
        variable: String,
    },

    /// Show an application's variables
    List {
        /// Application name
        name: String,
    },
}
