//! Kubernetes Volume Source
//!
//! Lists bound PersistentVolumeClaims and resolves the EBS volume behind each
//! claim's PersistentVolume.

use crate::domain::ports::{ClusterVolume, VolumeSource};
use crate::error::{Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};
use kube::api::{Api, ListParams};
use kube::config::KubeConfigOptions;
use kube::Client;
use std::collections::HashMap;
use tracing::{debug, info};

/// Phase of a claim that is bound to a volume
const BOUND_PHASE: &str = "Bound";

/// Prefix of every EBS volume id
const EBS_VOLUME_PREFIX: &str = "vol-";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the Kubernetes volume source
#[derive(Debug, Clone, Default)]
pub struct KubernetesConfig {
    /// Only list claims in this namespace
    pub namespace: Option<String>,
    /// Kubeconfig context to use instead of the current one
    pub context: Option<String>,
}

// =============================================================================
// Kubernetes Volume Lister
// =============================================================================

/// Lists bound claims together with their backing EBS volume ids
pub struct KubernetesVolumeLister {
    config: KubernetesConfig,
    client: Client,
}

impl KubernetesVolumeLister {
    /// Create a lister over an existing client
    pub fn new(config: KubernetesConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Build a client from kubeconfig (or in-cluster config) and create a lister
    pub async fn connect(config: KubernetesConfig) -> Result<Self> {
        let kube_config = match &config.context {
            Some(context) => {
                let options = KubeConfigOptions {
                    context: Some(context.clone()),
                    ..Default::default()
                };
                kube::Config::from_kubeconfig(&options)
                    .await
                    .map_err(|e| Error::KubeConfig(e.to_string()))?
            }
            None => kube::Config::infer()
                .await
                .map_err(|e| Error::KubeConfig(e.to_string()))?,
        };

        info!(
            "Connecting to Kubernetes API at {} (context: {})",
            kube_config.cluster_url,
            config.context.as_deref().unwrap_or("current")
        );

        let client = Client::try_from(kube_config)?;
        Ok(Self::new(config, client))
    }

    fn claims_api(&self) -> Api<PersistentVolumeClaim> {
        match &self.config.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

#[async_trait]
impl VolumeSource for KubernetesVolumeLister {
    type Item = ClusterVolume;

    async fn list(&self) -> Result<Vec<ClusterVolume>> {
        let lp = ListParams::default();

        let claims = self.claims_api().list(&lp).await?;
        debug!("Listed {} persistent volume claims", claims.items.len());

        let volumes_api: Api<PersistentVolume> = Api::all(self.client.clone());
        let volumes = volumes_api.list(&lp).await?;
        debug!("Listed {} persistent volumes", volumes.items.len());

        Ok(bind_claims(&claims.items, &volumes.items))
    }

    fn source_name(&self) -> &str {
        "kubernetes"
    }
}

// =============================================================================
// Claim Resolution
// =============================================================================

/// Pair each bound claim with its persistent volume and EBS volume id.
///
/// Claims that are not bound, whose volume is missing, or whose volume has no
/// EBS reference are skipped. Output keeps the claim order.
pub fn bind_claims(
    claims: &[PersistentVolumeClaim],
    volumes: &[PersistentVolume],
) -> Vec<ClusterVolume> {
    let by_name: HashMap<&str, &PersistentVolume> = volumes
        .iter()
        .filter_map(|pv| pv.metadata.name.as_deref().map(|name| (name, pv)))
        .collect();

    let mut bound = Vec::new();

    for claim in claims {
        let pvc_name = claim.metadata.name.as_deref().unwrap_or_default();
        let namespace = claim.metadata.namespace.as_deref().unwrap_or_default();

        let phase = claim.status.as_ref().and_then(|s| s.phase.as_deref());
        if phase != Some(BOUND_PHASE) {
            debug!("Skipping claim {}/{}: not bound", namespace, pvc_name);
            continue;
        }

        let Some(pv_name) = claim.spec.as_ref().and_then(|s| s.volume_name.as_deref()) else {
            debug!("Skipping claim {}/{}: no volume name", namespace, pvc_name);
            continue;
        };

        let Some(pv) = by_name.get(pv_name) else {
            debug!(
                "Skipping claim {}/{}: volume {} not found",
                namespace, pvc_name, pv_name
            );
            continue;
        };

        let Some(volume_id) = ebs_volume_id(pv) else {
            debug!(
                "Skipping claim {}/{}: volume {} has no EBS reference",
                namespace, pvc_name, pv_name
            );
            continue;
        };

        let storage_class = pv
            .spec
            .as_ref()
            .and_then(|s| s.storage_class_name.clone())
            .or_else(|| claim.spec.as_ref().and_then(|s| s.storage_class_name.clone()))
            .filter(|sc| !sc.is_empty());

        bound.push(ClusterVolume {
            pvc_name: pvc_name.to_string(),
            namespace: namespace.to_string(),
            pv_name: pv_name.to_string(),
            storage_class,
            volume_id,
        });
    }

    bound
}

/// Extract the EBS volume id from a persistent volume.
///
/// The in-tree `awsElasticBlockStore` source wins over a CSI handle.
pub fn ebs_volume_id(pv: &PersistentVolume) -> Option<String> {
    let spec = pv.spec.as_ref()?;

    let reference = spec
        .aws_elastic_block_store
        .as_ref()
        .map(|ebs| ebs.volume_id.as_str())
        .or_else(|| spec.csi.as_ref().map(|csi| csi.volume_handle.as_str()))?;

    parse_volume_reference(reference)
}

/// Normalize a volume reference to a bare EBS id.
///
/// Accepts `vol-...` and `aws://<zone>/vol-...`.
pub fn parse_volume_reference(reference: &str) -> Option<String> {
    let reference = reference.trim();
    let id = match reference.strip_prefix("aws://") {
        Some(rest) => rest.rsplit('/').next().unwrap_or_default(),
        None => reference,
    };

    if id.starts_with(EBS_VOLUME_PREFIX) && id.len() > EBS_VOLUME_PREFIX.len() {
        Some(id.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        AWSElasticBlockStoreVolumeSource, CSIPersistentVolumeSource, PersistentVolumeClaimSpec,
        PersistentVolumeClaimStatus, PersistentVolumeSpec,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn claim(name: &str, ns: &str, pv: Option<&str>, phase: &str, sc: Option<&str>) -> PersistentVolumeClaim {
        PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(name.into()),
                namespace: Some(ns.into()),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                volume_name: pv.map(Into::into),
                storage_class_name: sc.map(Into::into),
                ..Default::default()
            }),
            status: Some(PersistentVolumeClaimStatus {
                phase: Some(phase.into()),
                ..Default::default()
            }),
        }
    }

    fn csi_volume(name: &str, handle: &str, sc: Option<&str>) -> PersistentVolume {
        PersistentVolume {
            metadata: ObjectMeta {
                name: Some(name.into()),
                ..Default::default()
            },
            spec: Some(PersistentVolumeSpec {
                csi: Some(CSIPersistentVolumeSource {
                    driver: "ebs.csi.aws.com".into(),
                    volume_handle: handle.into(),
                    ..Default::default()
                }),
                storage_class_name: sc.map(Into::into),
                ..Default::default()
            }),
            status: None,
        }
    }

    fn in_tree_volume(name: &str, volume_id: &str) -> PersistentVolume {
        PersistentVolume {
            metadata: ObjectMeta {
                name: Some(name.into()),
                ..Default::default()
            },
            spec: Some(PersistentVolumeSpec {
                aws_elastic_block_store: Some(AWSElasticBlockStoreVolumeSource {
                    volume_id: volume_id.into(),
                    ..Default::default()
                }),
                storage_class_name: Some("gp2".into()),
                ..Default::default()
            }),
            status: None,
        }
    }

    #[test]
    fn test_parse_volume_reference() {
        assert_eq!(
            parse_volume_reference("vol-0f158c6555f293fb0").as_deref(),
            Some("vol-0f158c6555f293fb0")
        );
        assert_eq!(
            parse_volume_reference("aws://us-east-1a/vol-0abc").as_deref(),
            Some("vol-0abc")
        );
        assert_eq!(parse_volume_reference("aws:///vol-0abc").as_deref(), Some("vol-0abc"));
        assert_eq!(parse_volume_reference("fs-12345678"), None);
        assert_eq!(parse_volume_reference("vol-"), None);
        assert_eq!(parse_volume_reference(""), None);
    }

    #[test]
    fn test_ebs_volume_id_sources() {
        let csi = csi_volume("pv-a", "vol-aaa", Some("ssd"));
        assert_eq!(ebs_volume_id(&csi).as_deref(), Some("vol-aaa"));

        let legacy = in_tree_volume("pv-b", "aws://eu-west-1b/vol-bbb");
        assert_eq!(ebs_volume_id(&legacy).as_deref(), Some("vol-bbb"));

        let efs = csi_volume("pv-c", "fs-0123::fsap-0456", Some("efs"));
        assert_eq!(ebs_volume_id(&efs), None);
    }

    #[test]
    fn test_bind_claims() {
        let claims = vec![
            claim("data-an-0", "bbbbbbbbbb", Some("pv-a"), "Bound", Some("ssd")),
            claim("pending", "default", None, "Pending", Some("ssd")),
            claim("lost", "default", Some("pv-missing"), "Bound", Some("ssd")),
            claim("legacy", "default", Some("pv-b"), "Bound", None),
        ];
        let volumes = vec![
            csi_volume("pv-a", "vol-0f158c6555f293fb0", Some("ssd")),
            in_tree_volume("pv-b", "aws://us-east-1a/vol-0bbb"),
        ];

        let bound = bind_claims(&claims, &volumes);
        assert_eq!(bound.len(), 2);

        assert_eq!(bound[0].pvc_name, "data-an-0");
        assert_eq!(bound[0].namespace, "bbbbbbbbbb");
        assert_eq!(bound[0].pv_name, "pv-a");
        assert_eq!(bound[0].storage_class.as_deref(), Some("ssd"));
        assert_eq!(bound[0].volume_id, "vol-0f158c6555f293fb0");

        // Storage class comes from the PV when the claim has none
        assert_eq!(bound[1].pvc_name, "legacy");
        assert_eq!(bound[1].storage_class.as_deref(), Some("gp2"));
        assert_eq!(bound[1].volume_id, "vol-0bbb");
    }

    #[test]
    fn test_bind_claims_skips_non_ebs() {
        let claims = vec![claim("shared", "default", Some("pv-efs"), "Bound", Some("efs"))];
        let volumes = vec![csi_volume("pv-efs", "fs-0123", Some("efs"))];
        assert!(bind_claims(&claims, &volumes).is_empty());
    }
}
