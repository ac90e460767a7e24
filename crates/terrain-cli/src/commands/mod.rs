//! Subcommand implementations
//!
//! Each returns the process exit code; errors are reported by `main`.

pub(crate) mod drift;
pub(crate) mod ratchet;
pub(crate) mod run_all;
pub(crate) mod salvage;
pub(crate) mod sync;
pub(crate) mod validate;

use clap::ArgMatches;
use std::path::PathBuf;
use std::process::ExitCode;
use terrain_sync::Strategy;

use crate::config::TerrainConfig;

/// Apply `--src`/`--doc` overrides
pub(crate) fn with_paths(args: &ArgMatches, mut config: TerrainConfig) -> TerrainConfig {
    if let Some(src) = args.get_one::<PathBuf>("src") {
        config = config.with_src(src.clone());
    }
    if let Some(doc) = args.get_one::<PathBuf>("doc") {
        config = config.with_doc(doc.clone());
    }
    config
}

/// Strategy from `--strategy` and `--seed`
pub(crate) fn strategy(args: &ArgMatches) -> anyhow::Result<Strategy> {
    let name = args
        .get_one::<String>("strategy")
        .map_or("pass", String::as_str);
    let seed = args.get_one::<u64>("seed").copied();
    Ok(Strategy::from_name(name, seed)?)
}

/// 0 on success, 1 otherwise
pub(crate) fn exit(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
