//! Run configuration
//!
//! Turns parsed command-line arguments into the typed configuration each
//! component takes through its constructor. All validation happens here, so a
//! bad invocation fails before any API client is built.

use crate::cli::Args;
use crate::domain::ports::VolumeType;
use crate::error::{Error, Result};
use crate::inventory::VolumeFilter;
use crate::sources::{EbsConfig, KubernetesConfig};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Region queried when none is given
pub const DEFAULT_REGION: &str = "us-east-1";

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned table (migration mode prints a plain list)
    #[default]
    Table,
    /// Pretty-printed JSON document
    Json,
    /// YAML document
    Yaml,
}

/// What the run reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportMode {
    /// Every joined and filtered volume
    Inventory,
    /// Storage classes with gp2 volumes to move to gp3
    Migrate {
        storage_class: String,
        volume_type: VolumeType,
    },
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    pub kubernetes: KubernetesConfig,
    pub ebs: EbsConfig,
    pub filter: VolumeFilter,
    pub mode: ReportMode,
    pub output: OutputFormat,
}

impl InventoryConfig {
    /// Validate arguments and build the run configuration
    pub fn from_args(args: &Args) -> Result<Self> {
        let region = args.region.trim();
        if region.is_empty() || region.contains(char::is_whitespace) {
            return Err(Error::Configuration(format!(
                "Invalid AWS region: {:?}",
                args.region
            )));
        }

        let storage_class = non_empty("storage-class", args.storage_class.as_deref())?;
        let namespace = non_empty("namespace", args.namespace.as_deref())?;
        let volume_type = args.volume_type.clone();

        let mode = if args.migrate {
            match (&storage_class, &volume_type) {
                (Some(sc), Some(vt)) => ReportMode::Migrate {
                    storage_class: sc.clone(),
                    volume_type: vt.clone(),
                },
                _ => {
                    return Err(Error::Configuration(
                        "You must set both --volume-type and --storage-class to migrate volumes"
                            .to_string(),
                    ))
                }
            }
        } else {
            ReportMode::Inventory
        };

        Ok(Self {
            kubernetes: KubernetesConfig {
                namespace: namespace.clone(),
                context: args.context.clone(),
            },
            ebs: EbsConfig {
                region: region.to_string(),
                profile: args.profile.clone(),
                volume_type_hint: volume_type.clone(),
            },
            filter: VolumeFilter {
                storage_class,
                volume_type,
                namespace,
            },
            mode,
            output: args.output,
        })
    }

    /// Whether the run produces a migration plan
    pub fn is_migration(&self) -> bool {
        matches!(self.mode, ReportMode::Migrate { .. })
    }
}

fn non_empty(flag: &str, value: Option<&str>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Err(Error::Configuration(format!(
            "--{} must not be empty",
            flag
        ))),
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}
