//! # `ectd missing` — Required-Document Preview
//!
//! Runs the required-document checker over a plan file without touching
//! the submission root. Exit code 0 when the plan is complete, 2 when
//! required modules are uncovered.

use std::path::{Path, PathBuf};

use clap::Args;

use ectd_region::find_missing;

use crate::plan_file::PlanFile;
use crate::regions::load_region_table;

#[derive(Args, Debug)]
pub struct MissingArgs {
    /// Plan file (JSON or YAML).
    #[arg(long)]
    pub plan: PathBuf,
}

pub fn run_missing(args: &MissingArgs, config: Option<&Path>) -> anyhow::Result<u8> {
    let plan = PlanFile::load(&args.plan)?;
    let table = load_region_table(config)?;
    let profile = table
        .profile(plan.region)
        .ok_or_else(|| anyhow::anyhow!("no rule profile configured for region {}", plan.region))?;

    let missing = find_missing(&plan.slots, profile);
    if missing.is_empty() {
        println!("plan covers all required modules for {}", plan.region);
        return Ok(0);
    }
    println!(
        "plan is missing {} required module(s) for {}:",
        missing.len(),
        plan.region
    );
    for module in &missing {
        println!("  {module}");
    }
    Ok(2)
}
