use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use unify_lib::config::UnifyPolicy;
use unify_lib::utils::env::load_env;

/// Batch identity resolution over configured source snapshots.
#[derive(Parser, Debug)]
#[command(name = "unify")]
struct Args {
    /// Path to the run policy document
    #[arg(long, default_value = "configs/unify_policy.yaml")]
    policy: PathBuf,

    /// Directory for golden records, match events, and run metrics
    #[arg(long, default_value = "reports")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();

    info!("Starting identity unification pipeline");
    let policy = UnifyPolicy::from_yaml_file(&args.policy)
        .context("Failed to load run policy")?;
    info!(
        "Policy loaded: {} sources, blocking rules {:?}",
        policy.sources.len(),
        policy.blocking
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Resolving identities...");

    let start = Instant::now();
    let metrics = unify_lib::pipeline::run(&policy, &args.out_dir)?;
    spinner.finish_with_message(format!(
        "Done: {} records -> {} golden records",
        metrics.total_records, metrics.golden_records
    ));

    info!(
        "Outputs written to {} in {:.2?}",
        args.out_dir.display(),
        start.elapsed()
    );
    Ok(())
}
