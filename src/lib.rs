//! PV/EBS Inventory
//!
//! Inventories the persistent volumes bound in a Kubernetes cluster running on
//! AWS, cross-references each one with its live EBS volume type, and reports
//! which storage classes still carry gp2 volumes that should move to gp3.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐     ┌──────────────────────────┐
//! │  KubernetesVolumeLister  │     │     EbsVolumeLister      │
//! │  (PVC + PV, kube-rs)     │     │  (DescribeVolumes, EC2)  │
//! └────────────┬─────────────┘     └────────────┬─────────────┘
//!              │        VolumeSource port        │
//!              └───────────────┬─────────────────┘
//!                    ┌─────────┴─────────┐
//!                    │ Inventory (join + │
//!                    │  filter)          │
//!                    └─────────┬─────────┘
//!                    ┌─────────┴─────────┐
//!                    │ Report / Migration│
//!                    │  plan             │
//!                    └───────────────────┘
//! ```
//!
//! Everything is read-only: no volume, claim or tag is ever modified.
//!
//! # Modules
//!
//! - [`sources`]: Kubernetes and EBS volume sources
//! - [`inventory`]: Join and filters
//! - [`migration`]: gp2 to gp3 migration plan
//! - [`report`]: Table, JSON and YAML rendering
//! - [`domain`]: Core records and the volume source trait
//! - [`config`]: Validated run configuration
//! - [`error`]: Error types and handling

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod migration;
pub mod report;
pub mod sources;

// Re-export commonly used types
pub use cli::Args;

pub use config::{InventoryConfig, OutputFormat, ReportMode, DEFAULT_REGION};

pub use domain::ports::{
    CloudSourceRef, CloudVolume, ClusterSourceRef, ClusterVolume, StaticVolumeSource,
    VolumeRecord, VolumeSource, VolumeType,
};

pub use error::{Error, Result};

pub use inventory::{join, Inventory, JoinOutcome, VolumeFilter};

pub use migration::{MigrationPlan, MigrationTarget};

pub use report::{render, Report};

pub use sources::{
    EbsConfig, EbsVolumeLister, KubernetesConfig, KubernetesVolumeLister, SourceFactory,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run one inventory over already-built sources and render the result.
///
/// Sources are passed in so callers (and tests) decide where volumes come from.
pub async fn run(config: &InventoryConfig, inventory: &Inventory) -> Result<String> {
    let outcome = inventory.collect(&config.filter).await?;

    let report = match &config.mode {
        ReportMode::Inventory => Report::Inventory(outcome.records),
        ReportMode::Migrate {
            storage_class,
            volume_type,
        } => {
            let targets = VolumeFilter {
                storage_class: Some(storage_class.clone()),
                volume_type: Some(volume_type.clone()),
                namespace: config.filter.namespace.clone(),
            };
            let plan = MigrationPlan::from_records(&outcome.records, &targets);
            if plan.is_empty() {
                tracing::info!("No gp2 volumes to migrate");
            } else {
                tracing::info!(
                    "{} gp2 volumes to migrate to gp3",
                    plan.volume_count()
                );
            }
            Report::Migration(plan)
        }
    };

    render(&report, config.output, &config.ebs.region)
}
