//! Domain Ports - Core types and the volume source trait
//!
//! The two data sources (cluster and cloud) are adapters behind the
//! [`VolumeSource`] port, so the join pipeline never talks to an API directly.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Volume Types
// =============================================================================

/// EBS volume type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum VolumeType {
    Gp2,
    Gp3,
    Io1,
    Io2,
    St1,
    Sc1,
    Standard,
    Other(String),
}

impl VolumeType {
    /// AWS spelling of the type
    pub fn as_str(&self) -> &str {
        match self {
            VolumeType::Gp2 => "gp2",
            VolumeType::Gp3 => "gp3",
            VolumeType::Io1 => "io1",
            VolumeType::Io2 => "io2",
            VolumeType::St1 => "st1",
            VolumeType::Sc1 => "sc1",
            VolumeType::Standard => "standard",
            VolumeType::Other(s) => s,
        }
    }

    /// Whether volumes of this type are candidates for a gp3 migration
    pub fn is_legacy_general_purpose(&self) -> bool {
        matches!(self, VolumeType::Gp2)
    }
}

impl std::fmt::Display for VolumeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for VolumeType {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "gp2" => VolumeType::Gp2,
            "gp3" => VolumeType::Gp3,
            "io1" => VolumeType::Io1,
            "io2" => VolumeType::Io2,
            "st1" => VolumeType::St1,
            "sc1" => VolumeType::Sc1,
            "standard" => VolumeType::Standard,
            other => VolumeType::Other(other.to_string()),
        }
    }
}

impl From<String> for VolumeType {
    fn from(s: String) -> Self {
        VolumeType::from(s.as_str())
    }
}

impl From<VolumeType> for String {
    fn from(t: VolumeType) -> Self {
        t.as_str().to_string()
    }
}

impl FromStr for VolumeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("volume type must not be empty".to_string());
        }
        Ok(VolumeType::from(s))
    }
}

// =============================================================================
// Partial Records
// =============================================================================

/// Kubernetes side of a volume: a bound claim and its persistent volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterVolume {
    /// PersistentVolumeClaim name
    pub pvc_name: String,
    /// Namespace of the claim
    pub namespace: String,
    /// Bound PersistentVolume name
    pub pv_name: String,
    /// Storage class, if the volume has one
    pub storage_class: Option<String>,
    /// Backing EBS volume id (vol-...)
    pub volume_id: String,
}

/// AWS side of a volume, as reported by DescribeVolumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudVolume {
    /// EBS volume id (vol-...)
    pub volume_id: String,
    /// Declared volume type
    pub volume_type: VolumeType,
    /// Size in GiB
    pub size_gib: Option<i32>,
    /// Provisioned IOPS
    pub iops: Option<i32>,
    /// Provisioned throughput in MiB/s (gp3 only)
    pub throughput_mibps: Option<i32>,
    /// Volume state (available, in-use, ...)
    pub state: Option<String>,
    /// Availability zone
    pub availability_zone: Option<String>,
}

impl CloudVolume {
    /// Create a cloud volume with only the fields the join needs
    pub fn new(volume_id: impl Into<String>, volume_type: VolumeType) -> Self {
        Self {
            volume_id: volume_id.into(),
            volume_type,
            size_gib: None,
            iops: None,
            throughput_mibps: None,
            state: None,
            availability_zone: None,
        }
    }
}

// =============================================================================
// Joined Record
// =============================================================================

/// A claim joined with its live EBS volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub pvc_name: String,
    pub volume_id: String,
    pub namespace: String,
    pub pv_name: String,
    pub storage_class: Option<String>,
    pub volume_type: VolumeType,
    /// Details carried over from DescribeVolumes
    pub size_gib: Option<i32>,
    pub iops: Option<i32>,
    pub throughput_mibps: Option<i32>,
    pub state: Option<String>,
    pub availability_zone: Option<String>,
}

impl VolumeRecord {
    /// Join the two partial records. Ids are assumed to match.
    pub fn from_parts(cluster: &ClusterVolume, cloud: &CloudVolume) -> Self {
        Self {
            pvc_name: cluster.pvc_name.clone(),
            volume_id: cluster.volume_id.clone(),
            namespace: cluster.namespace.clone(),
            pv_name: cluster.pv_name.clone(),
            storage_class: cluster.storage_class.clone(),
            volume_type: cloud.volume_type.clone(),
            size_gib: cloud.size_gib,
            iops: cloud.iops,
            throughput_mibps: cloud.throughput_mibps,
            state: cloud.state.clone(),
            availability_zone: cloud.availability_zone.clone(),
        }
    }

    /// Storage class as displayed in reports
    pub fn storage_class_display(&self) -> &str {
        self.storage_class.as_deref().unwrap_or("None")
    }
}

// =============================================================================
// Volume Source Port
// =============================================================================

/// Port for read-only volume enumeration
#[async_trait]
pub trait VolumeSource: Send + Sync {
    /// Partial record produced by this source
    type Item: Send;

    /// List every volume in scope
    async fn list(&self) -> Result<Vec<Self::Item>>;

    /// Get source name for logging
    fn source_name(&self) -> &str;
}

pub type ClusterSourceRef = Arc<dyn VolumeSource<Item = ClusterVolume>>;
pub type CloudSourceRef = Arc<dyn VolumeSource<Item = CloudVolume>>;

/// In-memory volume source for tests
#[derive(Debug, Clone)]
pub struct StaticVolumeSource<T> {
    name: String,
    items: Vec<T>,
}

impl<T> StaticVolumeSource<T> {
    /// Create a source that always returns `items`
    pub fn new(name: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

#[async_trait]
impl<T> VolumeSource for StaticVolumeSource<T>
where
    T: Clone + Send + Sync,
{
    type Item = T;

    async fn list(&self) -> Result<Vec<T>> {
        Ok(self.items.clone())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_type_display() {
        assert_eq!(format!("{}", VolumeType::Gp2), "gp2");
        assert_eq!(format!("{}", VolumeType::Io2), "io2");
        assert_eq!(format!("{}", VolumeType::Other("foo".into())), "foo");
    }

    #[test]
    fn test_volume_type_parse() {
        assert_eq!("GP2".parse::<VolumeType>().unwrap(), VolumeType::Gp2);
        assert_eq!(" gp3 ".parse::<VolumeType>().unwrap(), VolumeType::Gp3);
        assert_eq!(
            "io3".parse::<VolumeType>().unwrap(),
            VolumeType::Other("io3".into())
        );
        assert!("".parse::<VolumeType>().is_err());
    }

    #[test]
    fn test_volume_type_serde() {
        let json = serde_json::to_string(&VolumeType::Gp3).unwrap();
        assert_eq!(json, "\"gp3\"");
        let parsed: VolumeType = serde_json::from_str("\"st1\"").unwrap();
        assert_eq!(parsed, VolumeType::St1);
    }

    #[test]
    fn test_storage_class_display() {
        let cluster = ClusterVolume {
            pvc_name: "data-0".into(),
            namespace: "default".into(),
            pv_name: "pvc-1".into(),
            storage_class: None,
            volume_id: "vol-1".into(),
        };
        let cloud = CloudVolume::new("vol-1", VolumeType::Gp2);
        let record = VolumeRecord::from_parts(&cluster, &cloud);
        assert_eq!(record.storage_class_display(), "None");
    }

    #[test]
    fn test_from_parts_keeps_volume_details() {
        let cluster = ClusterVolume {
            pvc_name: "data-an-0".into(),
            namespace: "bbbbbbbbbb".into(),
            pv_name: "pvc-0d1f".into(),
            storage_class: Some("ssd".into()),
            volume_id: "vol-0f158c6555f293fb0".into(),
        };
        let cloud = CloudVolume {
            size_gib: Some(100),
            iops: Some(300),
            throughput_mibps: None,
            state: Some("in-use".into()),
            availability_zone: Some("us-east-1a".into()),
            ..CloudVolume::new("vol-0f158c6555f293fb0", VolumeType::Gp2)
        };

        let record = VolumeRecord::from_parts(&cluster, &cloud);
        assert_eq!(record.volume_type, VolumeType::Gp2);
        assert_eq!(record.size_gib, Some(100));
        assert_eq!(record.iops, Some(300));
        assert_eq!(record.throughput_mibps, None);
        assert_eq!(record.state.as_deref(), Some("in-use"));
        assert_eq!(record.availability_zone.as_deref(), Some("us-east-1a"));
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticVolumeSource::new(
            "fixture",
            vec![CloudVolume::new("vol-1", VolumeType::Gp2)],
        );
        let items = source.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(source.source_name(), "fixture");
    }
}
