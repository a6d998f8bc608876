//! PV/EBS Inventory
//!
//! Lists Kubernetes persistent volumes with their live AWS EBS volume type and
//! reports gp2 volumes that should be migrated to gp3.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

use pv_ebs_inventory::{Args, Inventory, InventoryConfig, Result, SourceFactory};

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    match execute(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(transient = e.is_transient(), "Inventory failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn execute(args: &Args) -> Result<()> {
    // Validate before touching either API
    let config = InventoryConfig::from_args(args)?;

    info!("Starting PV/EBS inventory");
    info!("  Version: {}", pv_ebs_inventory::VERSION);
    info!("  Region: {}", config.ebs.region);
    info!(
        "  Namespace: {}",
        config.kubernetes.namespace.as_deref().unwrap_or("all")
    );
    info!("  Migration plan: {}", config.is_migration());

    let cluster = SourceFactory::cluster(&config).await?;
    let cloud = SourceFactory::cloud(&config).await;
    let inventory = Inventory::new(cluster, cloud);

    let rendered = pv_ebs_inventory::run(&config, &inventory).await?;

    if !rendered.is_empty() {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", rendered.trim_end())?;
        stdout.flush()?;
    }

    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = ["hyper=warn", "kube=warn", "aws_config=warn", "aws_smithy_runtime=warn"]
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(
            EnvFilter::from_default_env().add_directive(level.into()),
            |filter, directive| filter.add_directive(directive),
        );

    // Logs go to stderr; stdout carries only the report
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
