//! Volume Inventory
//!
//! Joins cluster claims with EBS volumes on the volume id and applies the
//! optional storage-class, volume-type and namespace filters.
//!
//! The join is an inner join: a claim whose volume is not found in the region,
//! and a volume that no claim references, are both left out of the result.

use crate::domain::ports::{
    CloudSourceRef, CloudVolume, ClusterSourceRef, ClusterVolume, VolumeRecord, VolumeType,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

// =============================================================================
// Filters
// =============================================================================

/// Equality filters over joined records. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeFilter {
    pub storage_class: Option<String>,
    pub volume_type: Option<VolumeType>,
    pub namespace: Option<String>,
}

impl VolumeFilter {
    /// Filter that passes everything
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage_class(mut self, storage_class: impl Into<String>) -> Self {
        self.storage_class = Some(storage_class.into());
        self
    }

    pub fn with_volume_type(mut self, volume_type: VolumeType) -> Self {
        self.volume_type = Some(volume_type);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        self.storage_class.is_none() && self.volume_type.is_none() && self.namespace.is_none()
    }

    /// Check a single record against every set filter
    pub fn matches(&self, record: &VolumeRecord) -> bool {
        let storage_class_ok = match &self.storage_class {
            Some(sc) => record.storage_class.as_deref() == Some(sc.as_str()),
            None => true,
        };
        let volume_type_ok = match &self.volume_type {
            Some(vt) => &record.volume_type == vt,
            None => true,
        };
        let namespace_ok = match &self.namespace {
            Some(ns) => &record.namespace == ns,
            None => true,
        };

        storage_class_ok && volume_type_ok && namespace_ok
    }

    /// Keep the records that match, preserving order
    pub fn apply(&self, records: Vec<VolumeRecord>) -> Vec<VolumeRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

// =============================================================================
// Join
// =============================================================================

/// Result of joining both sides, with counts of what was left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOutcome {
    /// Joined records, in cluster enumeration order
    pub records: Vec<VolumeRecord>,
    /// Claims whose EBS volume was not found
    pub unmatched_claims: usize,
    /// EBS volumes that no claim references
    pub orphaned_volumes: usize,
}

/// Inner join of cluster and cloud volumes on the volume id.
///
/// Each volume id appears at most once in the output; a second claim pointing
/// at an id already joined is counted as unmatched.
pub fn join(cluster: &[ClusterVolume], cloud: &[CloudVolume]) -> JoinOutcome {
    let by_id: HashMap<&str, &CloudVolume> =
        cloud.iter().map(|v| (v.volume_id.as_str(), v)).collect();

    let mut joined: HashSet<&str> = HashSet::with_capacity(cluster.len());
    let mut records = Vec::with_capacity(cluster.len().min(cloud.len()));
    let mut unmatched_claims = 0;

    for claim in cluster {
        match by_id.get(claim.volume_id.as_str()) {
            Some(volume) if joined.insert(volume.volume_id.as_str()) => {
                records.push(VolumeRecord::from_parts(claim, volume));
            }
            _ => {
                debug!(
                    "No EBS volume for claim {}/{} ({})",
                    claim.namespace, claim.pvc_name, claim.volume_id
                );
                unmatched_claims += 1;
            }
        }
    }

    let orphaned_volumes = by_id.len() - joined.len();

    JoinOutcome {
        records,
        unmatched_claims,
        orphaned_volumes,
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Collects and joins volumes from a cluster source and a cloud source
pub struct Inventory {
    cluster: ClusterSourceRef,
    cloud: CloudSourceRef,
}

impl Inventory {
    /// Create an inventory over the two sources
    pub fn new(cluster: ClusterSourceRef, cloud: CloudSourceRef) -> Self {
        Self { cluster, cloud }
    }

    /// List both sources concurrently, join, then filter.
    ///
    /// Fails on the first source error; nothing is returned for a partial run.
    pub async fn collect(&self, filter: &VolumeFilter) -> Result<JoinOutcome> {
        info!(
            "Listing volumes from {} and {}",
            self.cluster.source_name(),
            self.cloud.source_name()
        );

        let (claims, volumes) = tokio::try_join!(self.cluster.list(), self.cloud.list())?;
        info!(
            "Found {} bound claims and {} EBS volumes",
            claims.len(),
            volumes.len()
        );

        let mut outcome = join(&claims, &volumes);
        debug!(
            "Joined {} volumes ({} claims without EBS volume, {} volumes without claim)",
            outcome.records.len(),
            outcome.unmatched_claims,
            outcome.orphaned_volumes
        );

        outcome.records = filter.apply(outcome.records);
        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn claim(pvc: &str, ns: &str, sc: Option<&str>, volume_id: &str) -> ClusterVolume {
        ClusterVolume {
            pvc_name: pvc.into(),
            namespace: ns.into(),
            pv_name: format!("pv-{}", pvc),
            storage_class: sc.map(Into::into),
            volume_id: volume_id.into(),
        }
    }

    pub fn record(pvc: &str, ns: &str, sc: Option<&str>, volume_id: &str, vt: VolumeType) -> VolumeRecord {
        VolumeRecord {
            pvc_name: pvc.into(),
            volume_id: volume_id.into(),
            namespace: ns.into(),
            pv_name: format!("pv-{}", pvc),
            storage_class: sc.map(Into::into),
            volume_type: vt,
            size_gib: None,
            iops: None,
            throughput_mibps: None,
            state: None,
            availability_zone: None,
        }
    }

    pub fn mixed_records() -> Vec<VolumeRecord> {
        vec![
            record("a", "prod", Some("ssd"), "vol-a", VolumeType::Gp2),
            record("b", "prod", Some("ssd"), "vol-b", VolumeType::Gp3),
            record("c", "dev", Some("standard"), "vol-c", VolumeType::Gp2),
            record("d", "dev", None, "vol-d", VolumeType::Io1),
            record("e", "prod", Some("standard"), "vol-e", VolumeType::Gp3),
        ]
    }
}
