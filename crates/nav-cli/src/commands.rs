use std::path::Path;

use anyhow::{Context, Result};
use nav_cli::replay::{Replay, replay};
use nav_cli::scenario::Scenario;
use nav_cli::summary::print_report;
use nav_core::NavigationConfig;

use crate::cli::{CheckArgs, RunArgs};

pub fn run_scenario(args: &RunArgs, styled: bool) -> Result<()> {
    let mut scenario = load_scenario(&args.scenario, args.config.as_deref())?;
    if args.strict {
        scenario.config.strict_mode = true;
    }

    let mut replay = Replay::new(&scenario)?;
    replay.run()?;
    if let Some(path) = &args.save {
        replay
            .controller()
            .save_snapshot(path)
            .with_context(|| format!("save snapshot to {}", path.display()))?;
    }

    let report = replay.report();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, styled);
    }
    Ok(())
}

pub fn check_scenario(args: &CheckArgs) -> Result<()> {
    let scenario = load_scenario(&args.scenario, args.config.as_deref())?;
    let report = replay(&scenario)?;
    println!(
        "{}: ok ({} events, {} containers)",
        args.scenario.display(),
        scenario.events.len(),
        report.containers.len()
    );
    Ok(())
}

fn load_scenario(path: &Path, config: Option<&Path>) -> Result<Scenario> {
    let mut scenario = Scenario::load(path)?.validated()?;
    if let Some(config) = config {
        scenario.config = NavigationConfig::load(config)
            .with_context(|| format!("load config {}", config.display()))?;
    }
    tracing::debug!(
        destinations = scenario.destinations.len(),
        containers = scenario.containers.len(),
        events = scenario.events.len(),
        "Loaded scenario"
    );
    Ok(scenario)
}
