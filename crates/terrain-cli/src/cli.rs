//! Command-line definition

use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

/// Values accepted by `--strategy`
pub(crate) const STRATEGIES: [&str; 7] =
    ["pass", "typed", "duplicate", "missing", "extra", "stochastic", "mock"];

fn src_arg() -> Arg {
    Arg::new("src")
        .long("src")
        .value_parser(value_parser!(PathBuf))
        .help("Terrain root (default from config)")
}

fn doc_arg() -> Arg {
    Arg::new("doc")
        .long("doc")
        .value_parser(value_parser!(PathBuf))
        .help("Map file (default from config)")
}

fn strategy_arg() -> Arg {
    Arg::new("strategy")
        .long("strategy")
        .default_value("pass")
        .value_parser(PossibleValuesParser::new(STRATEGIES))
        .help("Effector rendering strategy")
}

fn seed_arg(help: &'static str) -> Arg {
    Arg::new("seed")
        .long("seed")
        .value_parser(value_parser!(u64))
        .help(help)
}

fn json_arg(help: &'static str) -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help(help)
}

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn sync_command(name: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(src_arg())
        .arg(doc_arg())
        .arg(strategy_arg())
        .arg(seed_arg("Seed for the stochastic and mock strategies"))
        .arg(
            Arg::new("label")
                .long("label")
                .help("Name used in the diff headers (default: the Map path)"),
        )
}

/// Full command tree
pub(crate) fn command() -> Command {
    Command::new("terrain")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Keep a Map's Public Interfaces block in sync with its Terrain")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: ./terrain.toml if present)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value("warn")
                .help("Log filter, e.g. info or terrain_salvage=debug"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            sync_command("sync", "Print the Effector's proposed diff")
                .arg(flag("apply", "Write the proposed Map")),
        )
        .subcommand(sync_command("apply-sync", "Run the Effector and write the Map"))
        .subcommand(
            Command::new("validate")
                .about("Check Map claims against Terrain")
                .arg(src_arg())
                .arg(doc_arg())
                .arg(json_arg("Print findings as a JSON array")),
        )
        .subcommand(
            Command::new("run-all")
                .about("Apply, validate, and revert + quarantine on failure")
                .arg(src_arg())
                .arg(doc_arg())
                .arg(strategy_arg())
                .arg(seed_arg("Seed for the stochastic and mock strategies"))
                .arg(
                    Arg::new("effector")
                        .long("effector")
                        .value_parser(value_parser!(PathBuf))
                        .conflicts_with("in-process")
                        .help("External Effector program"),
                )
                .arg(
                    Arg::new("quarantine-dir")
                        .long("quarantine-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Quarantine root (default from config)"),
                )
                .arg(
                    Arg::new("timeout-secs")
                        .long("timeout-secs")
                        .value_parser(value_parser!(u64))
                        .help("Per-step subprocess timeout (default from config)"),
                )
                .arg(flag("in-process", "Run steps inside this process")),
        )
        .subcommand(
            Command::new("salvage")
                .about("List quarantined attempts")
                .arg(
                    Arg::new("quarantine-dir")
                        .long("quarantine-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Quarantine root (default from config)"),
                )
                .arg(json_arg("Print the listing as JSON")),
        )
        .subcommand(
            Command::new("measure-drift")
                .about("Measure output variance of the stochastic Effector")
                .arg(src_arg())
                .arg(doc_arg())
                .arg(
                    Arg::new("runs")
                        .long("runs")
                        .value_parser(value_parser!(u32))
                        .help("Number of runs (default from config)"),
                )
                .arg(seed_arg("Base seed; run i uses seed + i"))
                .arg(flag("mock", "Use the error-injecting variants"))
                .arg(flag("validate", "Validate each candidate on an isolated copy"))
                .arg(json_arg("Print the report as JSON"))
                .arg(flag("in-process", "Run steps inside this process")),
        )
        .subcommand(
            Command::new("ratchet-check")
                .about("Compare metrics against their baselines")
                .arg(
                    Arg::new("config-file")
                        .long("config-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Ratchet configuration (default from config)"),
                )
                .arg(json_arg("Print findings as a JSON array")),
        )
        .subcommand(
            Command::new("ratchet-baseline")
                .about("Overwrite baselines with current metrics")
                .arg(
                    Arg::new("config-file")
                        .long("config-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("Ratchet configuration (default from config)"),
                )
                .arg(flag("yes", "Confirm the irreversible update")),
        )
}
