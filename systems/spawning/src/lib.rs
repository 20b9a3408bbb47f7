#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for admitting customers.

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use shopfloor_core::{AgentColor, CellCoord, Event};
use thiserror::Error;

const DEFAULT_INTERVAL_TICKS: u64 = 50;
const DEFAULT_MAX_CUSTOMERS: usize = 5;
const DEFAULT_SHELVES_PER_VISIT: usize = 2;
const DEFAULT_SEED: u64 = 0x5eed_cafe_f00d_0001;
const CUSTOMER_COLORS: [AgentColor; 5] = [
    AgentColor::from_rgb(0x2f, 0x95, 0x32),
    AgentColor::from_rgb(0xc8, 0x2a, 0x36),
    AgentColor::from_rgb(0xff, 0xc1, 0x07),
    AgentColor::from_rgb(0x58, 0x47, 0xff),
    AgentColor::from_rgb(0xe0, 0x6c, 0xc4),
];

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ticks between admissions after the opening one.
    pub interval_ticks: u64,
    /// Upper bound on simultaneously active customers.
    pub max_customers: usize,
    /// Distinct shelves each customer visits before checking out.
    pub shelves_per_visit: usize,
    /// Seed for the itinerary generator.
    pub seed: u64,
}

impl Config {
    /// Rejects cadences that would never admit anyone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ticks == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ticks: DEFAULT_INTERVAL_TICKS,
            max_customers: DEFAULT_MAX_CUSTOMERS,
            shelves_per_visit: DEFAULT_SHELVES_PER_VISIT,
            seed: DEFAULT_SEED,
        }
    }
}

/// Reasons a spawning [`Config`] is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A zero interval has no meaningful cadence.
    #[error("spawn interval must be at least one tick")]
    ZeroInterval,
}

/// Access points customers can be routed through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Venue {
    /// Cells new customers appear on.
    pub entrances: Vec<CellCoord>,
    /// Cells in front of shelves.
    pub shelves: Vec<CellCoord>,
    /// Cells in front of checkouts.
    pub checkouts: Vec<CellCoord>,
    /// Cells customers leave through.
    pub exits: Vec<CellCoord>,
}

/// Request for the driver to place a customer on the floor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Cell the customer appears on.
    pub entrance: CellCoord,
    /// Colour used when no sprite is available.
    pub color: AgentColor,
    /// Ordered itinerary ending at an exit.
    pub destinations: Vec<CellCoord>,
}

/// Pure system that deterministically admits customers on a fixed cadence.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    rng: ChaCha8Rng,
    color_index: usize,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            color_index: 0,
        }
    }

    /// Configuration the system was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Consumes tick events and emits spawn requests that fall due.
    ///
    /// A customer is admitted on the first tick and on every multiple of the
    /// interval afterwards, provided fewer than `max_customers` are active.
    pub fn handle(
        &mut self,
        events: &[Event],
        active_customers: usize,
        venue: &Venue,
        out: &mut Vec<SpawnRequest>,
    ) {
        if self.config.interval_ticks == 0 || venue.entrances.is_empty() || venue.exits.is_empty() {
            return;
        }

        let mut active = active_customers;
        for event in events {
            let Event::TimeAdvanced { tick } = event else {
                continue;
            };
            if !self.is_due(*tick) || active >= self.config.max_customers {
                continue;
            }

            if let Some(request) = self.admit(venue) {
                tracing::info!(
                    tick = *tick,
                    entrance = ?request.entrance,
                    stops = request.destinations.len(),
                    "admitting customer"
                );
                out.push(request);
                active += 1;
            }
        }
    }

    fn is_due(&self, tick: u64) -> bool {
        tick == 1 || tick % self.config.interval_ticks == 0
    }

    fn admit(&mut self, venue: &Venue) -> Option<SpawnRequest> {
        let entrance = *venue.entrances.choose(&mut self.rng)?;
        let mut destinations: Vec<CellCoord> = venue
            .shelves
            .choose_multiple(&mut self.rng, self.config.shelves_per_visit)
            .copied()
            .collect();
        if let Some(checkout) = venue.checkouts.choose(&mut self.rng) {
            destinations.push(*checkout);
        }
        destinations.push(*venue.exits.choose(&mut self.rng)?);

        Some(SpawnRequest {
            entrance,
            color: self.next_color(),
            destinations,
        })
    }

    fn next_color(&mut self) -> AgentColor {
        let color = CUSTOMER_COLORS[self.color_index % CUSTOMER_COLORS.len()];
        self.color_index = (self.color_index + 1) % CUSTOMER_COLORS.len();
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_on_first_tick_and_interval_multiples() {
        let spawning = Spawning::new(Config {
            interval_ticks: 10,
            ..Config::default()
        });
        let due: Vec<u64> = (1..=35).filter(|tick| spawning.is_due(*tick)).collect();
        assert_eq!(due, vec![1, 10, 20, 30]);
    }

    #[test]
    fn colors_cycle_through_palette() {
        let mut spawning = Spawning::new(Config::default());
        let colors: Vec<_> = (0..6).map(|_| spawning.next_color()).collect();
        assert_eq!(colors[0], colors[5]);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = Config {
            interval_ticks: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
        assert_eq!(Config::default().validate(), Ok(()));
    }
}
