//! Volume Source Adapters
//!
//! Provides adapters for the two read-only enumerations:
//! - Kubernetes: bound PersistentVolumeClaims and their PersistentVolumes
//! - EBS: volumes in one AWS region

pub mod ebs;
pub mod kubernetes;

pub use ebs::*;
pub use kubernetes::*;

use crate::config::InventoryConfig;
use crate::domain::ports::{CloudSourceRef, ClusterSourceRef};
use crate::error::Result;
use std::sync::Arc;

/// Factory for creating the live volume sources
pub struct SourceFactory;

impl SourceFactory {
    /// Create the cluster source from kubeconfig or in-cluster config
    pub async fn cluster(config: &InventoryConfig) -> Result<ClusterSourceRef> {
        let lister = KubernetesVolumeLister::connect(config.kubernetes.clone()).await?;
        Ok(Arc::new(lister))
    }

    /// Create the cloud source from the AWS default credential chain
    pub async fn cloud(config: &InventoryConfig) -> CloudSourceRef {
        Arc::new(EbsVolumeLister::connect(config.ebs.clone()).await)
    }
}
