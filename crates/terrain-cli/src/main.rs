//! `terrain` command-line entry point

mod cli;
mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use config::TerrainConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::command().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map_or("warn", String::as_str);
    logging::init(level, matches.get_flag("log-json"));

    let config = match TerrainConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = match matches.subcommand() {
        Some(("sync", args)) => commands::sync::run(args, config, args.get_flag("apply")),
        Some(("apply-sync", args)) => commands::sync::run(args, config, true),
        Some(("validate", args)) => commands::validate::run(args, config),
        Some(("run-all", args)) => commands::run_all::run(args, config).await,
        Some(("salvage", args)) => commands::salvage::run(args, config),
        Some(("measure-drift", args)) => commands::drift::run(args, config).await,
        Some(("ratchet-check", args)) => commands::ratchet::check(args, config),
        Some(("ratchet-baseline", args)) => commands::ratchet::baseline(args, config),
        _ => Ok(ExitCode::FAILURE),
    };

    result.unwrap_or_else(|e| {
        eprintln!("error: {e:#}");
        ExitCode::FAILURE
    })
}
