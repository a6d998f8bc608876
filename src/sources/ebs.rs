//! AWS EBS Volume Source
//!
//! Enumerates EBS volumes in one region through EC2 DescribeVolumes.

use crate::domain::ports::{CloudVolume, VolumeSource, VolumeType};
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::types::{Filter, Volume};
use tracing::{debug, info};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the EBS volume source
#[derive(Debug, Clone)]
pub struct EbsConfig {
    /// AWS region to query
    pub region: String,
    /// Shared-config profile, if not the default chain
    pub profile: Option<String>,
    /// Restrict DescribeVolumes to one volume type
    pub volume_type_hint: Option<VolumeType>,
}

impl Default for EbsConfig {
    fn default() -> Self {
        Self {
            region: crate::config::DEFAULT_REGION.to_string(),
            profile: None,
            volume_type_hint: None,
        }
    }
}

// =============================================================================
// EBS Volume Lister
// =============================================================================

/// Lists EBS volumes with their declared type
pub struct EbsVolumeLister {
    config: EbsConfig,
    client: aws_sdk_ec2::Client,
}

impl EbsVolumeLister {
    /// Create a lister over an existing EC2 client
    pub fn new(config: EbsConfig, client: aws_sdk_ec2::Client) -> Self {
        Self { config, client }
    }

    /// Resolve credentials through the default chain and create a lister
    pub async fn connect(config: EbsConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        info!(
            "Using AWS region {} (profile: {})",
            config.region,
            config.profile.as_deref().unwrap_or("default")
        );

        Self::new(config, aws_sdk_ec2::Client::new(&sdk_config))
    }
}

#[async_trait]
impl VolumeSource for EbsVolumeLister {
    type Item = CloudVolume;

    async fn list(&self) -> Result<Vec<CloudVolume>> {
        let filters = volume_type_filters(self.config.volume_type_hint.as_ref());
        let mut request = self.client.describe_volumes();
        if !filters.is_empty() {
            request = request.set_filters(Some(filters));
        }

        let mut pages = request.into_paginator().items().send();
        let mut volumes = Vec::new();

        while let Some(volume) = pages
            .try_next()
            .await
            .map_err(|e| Error::aws("DescribeVolumes", e))?
        {
            if let Some(v) = cloud_volume(&volume) {
                volumes.push(v);
            }
        }

        debug!(
            "Listed {} EBS volumes in {}",
            volumes.len(),
            self.config.region
        );
        Ok(volumes)
    }

    fn source_name(&self) -> &str {
        "ebs"
    }
}

/// DescribeVolumes filters for an optional volume type
pub fn volume_type_filters(hint: Option<&VolumeType>) -> Vec<Filter> {
    hint.map(|t| Filter::builder().name("volume-type").values(t.as_str()).build())
        .into_iter()
        .collect()
}

/// Convert an SDK volume into a cloud volume. Volumes without an id or a
/// type are dropped.
pub fn cloud_volume(volume: &Volume) -> Option<CloudVolume> {
    let volume_id = volume.volume_id()?;
    let volume_type = volume.volume_type()?;

    Some(CloudVolume {
        volume_id: volume_id.to_string(),
        volume_type: VolumeType::from(volume_type.as_str()),
        size_gib: volume.size(),
        iops: volume.iops(),
        throughput_mibps: volume.throughput(),
        state: volume.state().map(|s| s.as_str().to_string()),
        availability_zone: volume.availability_zone().map(str::to_string),
    })
}
