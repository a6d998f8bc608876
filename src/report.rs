//! Report rendering: inventory table, migration list, JSON and YAML.
use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Cell, Table};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::domain::ports::VolumeRecord;
use crate::error::Result;
use crate::migration::{MigrationPlan, MigrationTarget};

/// Inventory table columns, in display order
pub const COLUMNS: [&str; 6] = [
    "PVC Name",
    "Volume ID",
    "Namespace",
    "PV Name",
    "Storage Class",
    "Volume Type",
];

/// What a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Inventory(Vec<VolumeRecord>),
    Migration(MigrationPlan),
}

/// Serialized form of a report
#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    region: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    volumes: Option<&'a [VolumeRecord]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    migrations: Option<&'a [MigrationTarget]>,
}

impl<'a> ReportDocument<'a> {
    fn new(report: &'a Report, region: &'a str) -> Self {
        let (volumes, migrations) = match report {
            Report::Inventory(records) => (Some(records.as_slice()), None),
            Report::Migration(plan) => (None, Some(plan.targets.as_slice())),
        };
        Self {
            generated_at: Utc::now(),
            region,
            volumes,
            migrations,
        }
    }
}

/// Render a report in the requested format.
///
/// An empty migration plan renders as an empty string in table format.
pub fn render(report: &Report, format: OutputFormat, region: &str) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(match report {
            Report::Inventory(records) => volume_table(records).to_string(),
            Report::Migration(plan) => migration_list(plan),
        }),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&ReportDocument::new(
            report, region,
        ))?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&ReportDocument::new(report, region))?),
    }
}

/// Build the inventory table, one row per record
pub fn volume_table(records: &[VolumeRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(COLUMNS.iter().map(Cell::new).collect::<Vec<_>>());

    for record in records {
        table.add_row(vec![
            Cell::new(&record.pvc_name),
            Cell::new(&record.volume_id),
            Cell::new(&record.namespace),
            Cell::new(&record.pv_name),
            Cell::new(record.storage_class_display()),
            Cell::new(&record.volume_type),
        ]);
    }

    table
}

/// Plain-text migration list
pub fn migration_list(plan: &MigrationPlan) -> String {
    if plan.is_empty() {
        return String::new();
    }

    let mut out = String::from("The following storage classes have volumes to migrate:\n");
    for target in &plan.targets {
        let noun = if target.volume_ids.len() == 1 {
            "volume"
        } else {
            "volumes"
        };
        out.push_str(&format!(
            "  {} ({} -> {}): {} {}\n",
            target.storage_class,
            target.volume_type,
            target.target_type,
            target.volume_ids.len(),
            noun
        ));
        for id in &target.volume_ids {
            out.push_str(&format!("    {}\n", id));
        }
    }
    out
}
