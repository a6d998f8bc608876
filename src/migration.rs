//! gp2 to gp3 Migration Plan
//!
//! Groups joined gp2 volumes by (storage class, volume type). The plan is a
//! report only; no volume is modified.

use crate::domain::ports::{VolumeRecord, VolumeType};
use crate::inventory::VolumeFilter;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A storage class whose gp2 volumes should move to gp3
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTarget {
    /// Storage class, `None` rendered as in the inventory table
    pub storage_class: String,
    /// Current volume type
    pub volume_type: VolumeType,
    /// Type to migrate to
    pub target_type: VolumeType,
    /// Volumes in this group
    pub volume_ids: Vec<String>,
}

/// Distinct migration targets, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub targets: Vec<MigrationTarget>,
}

impl MigrationPlan {
    /// Build a plan from joined records.
    ///
    /// Only gp2 volumes that pass `filter` are considered.
    pub fn from_records(records: &[VolumeRecord], filter: &VolumeFilter) -> Self {
        let mut groups: IndexMap<(String, VolumeType), Vec<String>> = IndexMap::new();

        for record in records
            .iter()
            .filter(|r| r.volume_type.is_legacy_general_purpose() && filter.matches(r))
        {
            groups
                .entry((
                    record.storage_class_display().to_string(),
                    record.volume_type.clone(),
                ))
                .or_default()
                .push(record.volume_id.clone());
        }

        let targets = groups
            .into_iter()
            .map(|((storage_class, volume_type), volume_ids)| MigrationTarget {
                storage_class,
                volume_type,
                target_type: VolumeType::Gp3,
                volume_ids,
            })
            .collect();

        Self { targets }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Number of volumes across all targets
    pub fn volume_count(&self) -> usize {
        self.targets.iter().map(|t| t.volume_ids.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::fixtures::{mixed_records, record};

    fn migrate_filter(sc: &str, vt: VolumeType) -> VolumeFilter {
        VolumeFilter::new().with_storage_class(sc).with_volume_type(vt)
    }

    #[test]
    fn test_plan_for_requested_combination() {
        let records = vec![record(
            "data-an-0",
            "bbbbbbbbbb",
            Some("ssd"),
            "vol-0f158c6555f293fb0",
            VolumeType::Gp2,
        )];

        let plan = MigrationPlan::from_records(&records, &migrate_filter("ssd", VolumeType::Gp2));
        assert_eq!(plan.targets.len(), 1);

        let target = &plan.targets[0];
        assert_eq!(target.storage_class, "ssd");
        assert_eq!(target.volume_type, VolumeType::Gp2);
        assert_eq!(target.target_type, VolumeType::Gp3);
        assert_eq!(target.volume_ids, vec!["vol-0f158c6555f293fb0".to_string()]);
    }

    #[test]
    fn test_plan_groups_volumes() {
        let mut records = mixed_records();
        records.push(record("f", "qa", Some("ssd"), "vol-f", VolumeType::Gp2));

        let plan = MigrationPlan::from_records(&records, &migrate_filter("ssd", VolumeType::Gp2));
        assert_eq!(plan.targets.len(), 1);
        assert_eq!(plan.volume_count(), 2);
        assert_eq!(
            plan.targets[0].volume_ids,
            vec!["vol-a".to_string(), "vol-f".to_string()]
        );
    }

    #[test]
    fn test_plan_empty_without_gp2() {
        let plan = MigrationPlan::from_records(
            &mixed_records(),
            &migrate_filter("ssd", VolumeType::Gp3),
        );
        assert!(plan.is_empty());

        let plan = MigrationPlan::from_records(
            &mixed_records(),
            &migrate_filter("premium", VolumeType::Gp2),
        );
        assert!(plan.is_empty());
        assert_eq!(plan.volume_count(), 0);
    }

    #[test]
    fn test_plan_respects_namespace() {
        let filter = migrate_filter("standard", VolumeType::Gp2).with_namespace("prod");
        let plan = MigrationPlan::from_records(&mixed_records(), &filter);
        assert!(plan.is_empty());

        let filter = migrate_filter("standard", VolumeType::Gp2).with_namespace("dev");
        let plan = MigrationPlan::from_records(&mixed_records(), &filter);
        assert_eq!(plan.volume_count(), 1);
    }
}
