//! Command-line arguments

use crate::config::{OutputFormat, DEFAULT_REGION};
use crate::domain::ports::VolumeType;
use clap::Parser;

/// Inventory Kubernetes persistent volumes against their EBS volume types
///
/// Lists every bound claim whose volume is backed by EBS, together with the
/// live volume type. With --migrate, reports which storage class still has
/// gp2 volumes that should move to gp3. Nothing is modified.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// AWS region to query for EBS volumes
    #[arg(long, default_value = DEFAULT_REGION)]
    pub region: String,

    /// Filter by storage class name
    #[arg(long)]
    pub storage_class: Option<String>,

    /// Filter by volume type (e.g. gp2, gp3, io1)
    #[arg(long, value_parser = parse_volume_type)]
    pub volume_type: Option<VolumeType>,

    /// Kubernetes namespace to filter on
    #[arg(long)]
    pub namespace: Option<String>,

    /// Report gp2 volumes to migrate to gp3 (requires --storage-class and --volume-type)
    #[arg(long)]
    pub migrate: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Kubeconfig context (defaults to the current context)
    #[arg(long, env = "KUBE_CONTEXT")]
    pub context: Option<String>,

    /// AWS shared-config profile
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

/// Blank volume types are rejected while parsing
fn parse_volume_type(value: &str) -> Result<VolumeType, String> {
    value.parse()
}
