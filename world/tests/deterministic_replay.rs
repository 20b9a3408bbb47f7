use std::{
    collections::{hash_map::DefaultHasher, BTreeSet},
    hash::{Hash, Hasher},
};

use shopfloor_core::{AgentColor, CellCoord, Event, Grid, GridBuilder, TileSpan};
use shopfloor_system_movement::MovementConfig;
use shopfloor_system_reservations::ReservationLedger;
use shopfloor_world::{query, Simulation};

const TICKS: usize = 300;

#[test]
fn deterministic_replay_produces_identical_fingerprint() {
    let first = replay();
    let second = replay();

    assert_eq!(first.events, second.events, "event streams diverged");
    assert_eq!(first.fingerprint, second.fingerprint);
}

#[test]
fn invariants_hold_on_every_tick() {
    let (mut simulation, mut events) = store();

    for _ in 0..TICKS {
        simulation.tick(&mut events);
        assert_floor_invariants(&simulation);
    }

    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::AgentSpawned { .. }))
        .count();
    assert_eq!(spawned, 4);
}

#[test]
fn crossing_customers_both_leave() {
    let grid = GridBuilder::from_ascii(&[
        "#######", //
        "#.....#", //
        "###.###", //
        "#######",
    ])
    .expect("plan")
    .build();
    let mut simulation = Simulation::new(grid, MovementConfig::default()).expect("simulation");
    let mut events = Vec::new();
    let color = AgentColor::from_rgb(0x10, 0x20, 0x30);
    let _ = simulation
        .spawn_customer(CellCoord::new(1, 1), color, [CellCoord::new(5, 1)], &mut events)
        .expect("west customer");
    let _ = simulation
        .spawn_customer(CellCoord::new(5, 1), color, [CellCoord::new(1, 1)], &mut events)
        .expect("east customer");

    for _ in 0..400 {
        if simulation.is_empty() {
            break;
        }
        simulation.tick(&mut events);
        assert_floor_invariants(&simulation);
    }

    assert!(simulation.is_empty(), "customers failed to pass each other");
    let departures = events
        .iter()
        .filter(|event| matches!(event, Event::AgentDeactivated { .. }))
        .count();
    assert_eq!(departures, 2);
}

#[test]
fn staff_wins_contested_cell_over_earlier_customer() {
    let mut simulation =
        Simulation::new(Grid::open(3, 1).expect("grid"), MovementConfig::default())
            .expect("simulation");
    let mut events = Vec::new();
    let contested = CellCoord::new(1, 0);
    let customer = simulation
        .spawn_customer(
            CellCoord::new(0, 0),
            AgentColor::from_rgb(0, 0, 0),
            [contested],
            &mut events,
        )
        .expect("customer");
    let employee = simulation
        .spawn_employee(CellCoord::new(2, 0), [contested], true, &mut events)
        .expect("employee");

    simulation.tick(&mut events);

    assert_eq!(
        query::reservations(&simulation).owner(contested),
        Some(employee)
    );
    assert!(events.contains(&Event::AgentBlocked {
        agent: customer,
        at: CellCoord::new(0, 0),
        wanted: contested,
        owner: Some(employee),
    }));
}

struct Replay {
    events: Vec<Event>,
    fingerprint: u64,
}

fn replay() -> Replay {
    let (mut simulation, mut events) = store();
    let mut hasher = DefaultHasher::new();

    for _ in 0..TICKS {
        simulation.tick(&mut events);
        for snapshot in query::agent_view(&simulation) {
            snapshot.id.hash(&mut hasher);
            snapshot.tile.hash(&mut hasher);
            snapshot.visual.x.to_bits().hash(&mut hasher);
            snapshot.visual.y.to_bits().hash(&mut hasher);
            snapshot.phase.hash(&mut hasher);
            snapshot.goal.hash(&mut hasher);
            snapshot.blocked_ticks.hash(&mut hasher);
        }
    }

    Replay {
        events,
        fingerprint: hasher.finish(),
    }
}

/// Small store with two aisles of shelving, a checkout block and staff.
fn store() -> (Simulation, Vec<Event>) {
    let mut builder = GridBuilder::from_ascii(&[
        "############", //
        "#..........#", //
        "#..........#", //
        "#..........#", //
        "#..........#", //
        "#..........#", //
        "#..........#", //
        "############",
    ])
    .expect("plan");
    builder
        .place_fixture(CellCoord::new(3, 2), TileSpan::new(1, 3), "shelf")
        .expect("west shelf");
    builder
        .place_fixture(CellCoord::new(7, 2), TileSpan::new(1, 3), "shelf")
        .expect("east shelf");
    builder
        .place_fixture(CellCoord::new(9, 5), TileSpan::new(2, 1), "checkout")
        .expect("checkout");
    let grid = builder.build();

    let config = MovementConfig {
        animation_step: 0.5,
        ..MovementConfig::default()
    };
    let mut simulation = Simulation::new(grid, config).expect("simulation");
    let mut events = Vec::new();

    let _ = simulation
        .spawn_customer(
            CellCoord::new(1, 6),
            AgentColor::from_rgb(0x2f, 0x95, 0x32),
            [
                CellCoord::new(2, 3),
                CellCoord::new(8, 3),
                CellCoord::new(9, 4),
                CellCoord::new(10, 6),
            ],
            &mut events,
        )
        .expect("first customer");
    let _ = simulation
        .spawn_customer(
            CellCoord::new(10, 1),
            AgentColor::from_rgb(0xc8, 0x2a, 0x36),
            [CellCoord::new(4, 3), CellCoord::new(9, 4), CellCoord::new(1, 6)],
            &mut events,
        )
        .expect("second customer");
    let _ = simulation
        .spawn_customer(
            CellCoord::new(5, 6),
            AgentColor::from_rgb(0xff, 0xc1, 0x07),
            [CellCoord::new(6, 1), CellCoord::new(1, 1)],
            &mut events,
        )
        .expect("third customer");
    let _ = simulation
        .spawn_employee(
            CellCoord::new(5, 3),
            [CellCoord::new(5, 1), CellCoord::new(5, 6)],
            true,
            &mut events,
        )
        .expect("employee");

    (simulation, events)
}

fn assert_floor_invariants(simulation: &Simulation) {
    let agents = query::agent_view(simulation);
    let grid = query::grid(simulation);
    let ledger = query::reservations(simulation);

    let tiles: BTreeSet<CellCoord> = agents.iter().map(|agent| agent.tile).collect();
    assert_eq!(tiles.len(), agents.len(), "two agents share a cell");
    assert_eq!(ledger.len(), agents.len(), "reservations out of sync with roster");

    for agent in &agents {
        assert!(grid.is_walkable(agent.tile), "agent stands on {:?}", agent.tile);
        assert_eq!(ledger.owner(agent.tile), Some(agent.id));
    }
}
