//! `validate`

use anyhow::Context;
use clap::ArgMatches;
use std::process::ExitCode;
use terrain_sync::Validator;

use super::{exit, with_paths};
use crate::config::TerrainConfig;

pub(crate) fn run(args: &ArgMatches, config: TerrainConfig) -> anyhow::Result<ExitCode> {
    let config = with_paths(args, config);

    let report = Validator::new()
        .validate(&config.src, &config.doc)
        .with_context(|| format!("validator could not check {}", config.doc.display()))?;

    if args.get_flag("json") {
        println!("{}", report.render_json()?);
    } else {
        let (stdout, stderr) = report.render_plain();
        print!("{stdout}");
        eprint!("{stderr}");
    }

    Ok(exit(report.passed()))
}
