use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shopfloor_core::CellCoord;
use shopfloor_system_movement::MovementConfig;
use shopfloor_system_spawning::Config as SpawningConfig;

use crate::schedule::ScheduleEntry;

const SUPPORTED_SCENARIO_VERSION: u32 = 1;

/// Store used when no scenario file is supplied.
pub(crate) const BUILTIN_STORE: &str = r#########################"
version = 1

[floor]
plan = [
    "######################",
    "#....................#",
    "#..S..S..S....S..S...#",
    "#..S..S..S....S..S...#",
    "#..S..S..S....S..S...#",
    "#....................#",
    "#....................#",
    "#..S..S..S....S..S...#",
    "#..S..S..S....S..S...#",
    "#....................#",
    "#....................#",
    "#...C...C...C........#",
    "#....................#",
    "#..X..............E..#",
    "######################",
]

[[floor.fixtures]]
origin = [19, 2]
size = [2, 2]
label = "freezer"

[movement]
animation_step = 0.5

[spawning]
interval_ticks = 50
max_customers = 5
shelves_per_visit = 2

[[employees]]
start = [1, 6]
route = [[1, 5], [20, 5], [20, 10], [1, 10]]
patrol = true
"#########################;

/// Scenario file describing the floor, tunables and staff.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    version: u32,
    pub(crate) floor: FloorSection,
    #[serde(default)]
    pub(crate) movement: MovementConfig,
    #[serde(default)]
    pub(crate) spawning: SpawningConfig,
    #[serde(default)]
    pub(crate) employees: Vec<EmployeeSection>,
    #[serde(default)]
    pub(crate) schedule: Vec<ScheduleEntry>,
}

/// Floor plan rows plus any multi-cell fixtures laid over them.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FloorSection {
    pub(crate) plan: Vec<String>,
    #[serde(default)]
    pub(crate) fixtures: Vec<FixtureSection>,
}

/// Fixture covering a rectangle of cells.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FixtureSection {
    pub(crate) origin: [u32; 2],
    pub(crate) size: [u32; 2],
    pub(crate) label: String,
}

/// Staff member present from the first tick.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EmployeeSection {
    pub(crate) start: [u32; 2],
    #[serde(default)]
    pub(crate) route: Vec<[u32; 2]>,
    #[serde(default)]
    pub(crate) patrol: bool,
}

impl Scenario {
    /// Reads and validates a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        parse_scenario(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Parses the built-in store.
    pub(crate) fn builtin() -> Result<Self> {
        parse_scenario(BUILTIN_STORE).context("built-in store scenario is invalid")
    }
}

impl EmployeeSection {
    pub(crate) fn start_cell(&self) -> CellCoord {
        cell(self.start)
    }

    pub(crate) fn route_cells(&self) -> Vec<CellCoord> {
        self.route.iter().copied().map(cell).collect()
    }
}

pub(crate) fn cell([column, row]: [u32; 2]) -> CellCoord {
    CellCoord::new(column, row)
}

pub(crate) fn parse_scenario(contents: &str) -> Result<Scenario> {
    let scenario: Scenario =
        toml::from_str(contents).context("failed to parse scenario toml contents")?;
    if scenario.version != SUPPORTED_SCENARIO_VERSION {
        bail!(
            "unsupported scenario version {}; expected {}",
            scenario.version,
            SUPPORTED_SCENARIO_VERSION
        );
    }
    scenario
        .movement
        .validate()
        .context("invalid [movement] section")?;
    scenario
        .spawning
        .validate()
        .context("invalid [spawning] section")?;
    if scenario.floor.plan.is_empty() {
        bail!("floor plan must contain at least one row");
    }
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_store_parses() {
        let scenario = Scenario::builtin().expect("builtin");
        assert_eq!(scenario.floor.plan.len(), 15);
        assert_eq!(scenario.floor.fixtures.len(), 1);
        assert_eq!(scenario.movement.animation_step, 0.5);
        assert_eq!(scenario.movement.reroute_after, 20);
        assert_eq!(scenario.spawning.max_customers, 5);
        assert_eq!(scenario.employees.len(), 1);
        assert!(scenario.employees[0].patrol);
        assert_eq!(scenario.employees[0].start_cell(), CellCoord::new(1, 6));
    }

    #[test]
    fn sections_fall_back_to_defaults() {
        let scenario = parse_scenario(
            r#"
            version = 1

            [floor]
            plan = ["E..X"]
            "#,
        )
        .expect("minimal scenario");
        assert_eq!(scenario.movement, MovementConfig::default());
        assert_eq!(scenario.spawning, SpawningConfig::default());
        assert!(scenario.employees.is_empty());
        assert!(scenario.schedule.is_empty());
    }

    #[test]
    fn rejects_unknown_version() {
        let result = parse_scenario(
            r#"
            version = 2

            [floor]
            plan = ["E..X"]
            "#,
        );
        assert!(result.is_err(), "version 2 must be rejected");
    }

    #[test]
    fn rejects_invalid_movement_thresholds() {
        let result = parse_scenario(
            r#"
            version = 1

            [floor]
            plan = ["E..X"]

            [movement]
            reroute_after = 30
            sidestep_after = 10
            "#,
        );
        let message = format!("{:#}", result.expect_err("inverted thresholds"));
        assert!(message.contains("[movement]"), "unexpected error: {message}");
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = parse_scenario(
            r#"
            version = 1

            [floor]
            plan = ["E..X"]

            [movement]
            speed = 3
            "#,
        );
        assert!(result.is_err(), "unknown movement key must be rejected");
    }
}
