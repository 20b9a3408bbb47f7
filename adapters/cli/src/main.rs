#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the store floor simulation headlessly.

mod layout;
mod report;
mod scenario;
mod schedule;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shopfloor_system_spawning::Spawning;
use shopfloor_world::{query, Simulation};
use tracing_subscriber::EnvFilter;

use crate::{
    layout::Layout,
    report::{render_frame, Tally},
    scenario::Scenario,
    schedule::Schedule,
};

/// Headless store floor movement simulation.
#[derive(Debug, Parser)]
#[command(name = "shopfloor", version)]
struct Args {
    /// Scenario file to load instead of the built-in store.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 600)]
    ticks: u64,
    /// Overrides the spawning seed from the scenario.
    #[arg(long)]
    seed: Option<u64>,
    /// Prints an ASCII frame every N ticks.
    #[arg(long, value_name = "N")]
    frame_every: Option<u64>,
}

/// Entry point for the shopfloor command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    let tally = run(&args)?;
    println!("{tally}");
    Ok(())
}

fn run(args: &Args) -> Result<Tally> {
    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin()?,
    };
    if let Some(seed) = args.seed {
        scenario.spawning.seed = seed;
    }

    let layout = Layout::from_floor(&scenario.floor).context("invalid floor plan")?;
    let Layout { grid, venue } = layout;
    let mut simulation =
        Simulation::new(grid, scenario.movement).context("invalid movement settings")?;
    let mut spawning = Spawning::new(scenario.spawning);
    let mut schedule = Schedule::new(scenario.schedule);
    let mut tally = Tally::default();
    let mut events = Vec::new();

    for (index, employee) in scenario.employees.iter().enumerate() {
        let _ = simulation
            .spawn_employee(
                employee.start_cell(),
                employee.route_cells(),
                employee.patrol,
                &mut events,
            )
            .with_context(|| format!("cannot place employee #{index}"))?;
    }
    tally.record(&events);
    events.clear();

    tracing::info!(
        ticks = args.ticks,
        seed = spawning.config().seed,
        entrances = venue.entrances.len(),
        shelves = venue.shelves.len(),
        checkouts = venue.checkouts.len(),
        scheduled_ticks = schedule.len(),
        "starting simulation"
    );

    let frame_every = args.frame_every.filter(|every| *every > 0);
    let mut requests = Vec::new();
    for _ in 0..args.ticks {
        let upcoming = query::tick_index(&simulation) + 1;
        schedule.run_due(upcoming, &mut simulation, &mut events);
        simulation.tick(&mut events);

        spawning.handle(
            &events,
            query::active_customers(&simulation),
            &venue,
            &mut requests,
        );
        for request in requests.drain(..) {
            let spawned = simulation.spawn_customer(
                request.entrance,
                request.color,
                request.destinations,
                &mut events,
            );
            if let Err(error) = spawned {
                tally.turned_away += 1;
                tracing::debug!(%error, "customer turned away");
            }
        }

        tally.record(&events);
        events.clear();

        let tick = query::tick_index(&simulation);
        if frame_every.is_some_and(|every| tick % every == 0) {
            println!("tick {tick}");
            print!(
                "{}",
                render_frame(query::grid(&simulation), &query::agent_view(&simulation))
            );
            println!();
        }
    }

    Ok(tally)
}
