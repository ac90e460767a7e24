//! `salvage`: list quarantined attempts

use clap::ArgMatches;
use std::path::PathBuf;
use std::process::ExitCode;
use terrain_salvage::QuarantineStore;

use crate::config::TerrainConfig;

pub(crate) fn run(args: &ArgMatches, config: TerrainConfig) -> anyhow::Result<ExitCode> {
    let root = args
        .get_one::<PathBuf>("quarantine-dir")
        .cloned()
        .unwrap_or(config.quarantine_dir);
    let runs = QuarantineStore::new(root).list()?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&runs)?);
    } else if runs.is_empty() {
        println!("[salvage] none");
    } else {
        for run in &runs {
            println!("{} diffs={} findings={}", run.run_id, run.diffs, run.findings);
        }
    }

    Ok(ExitCode::SUCCESS)
}
