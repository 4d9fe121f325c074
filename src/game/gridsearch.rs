//! Grid Search Puzzle
//!
//! Hidden access ports sit on a square grid; the player probes cells
//! under a probe budget. A miss reports how many ports touch the probed
//! cell's 8-neighborhood, which is the only signal available.

use serde::{Deserialize, Serialize};

use crate::core::{all_cells, Cell, GameRng};
use crate::game::balance::{self, Modifier};
use crate::game::session::MoveError;
use crate::game::target::GameKind;

/// Client-visible tuning for a grid-search session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSearchConfig {
    /// Square grid edge length.
    pub grid_size: u8,
    /// Hidden ports to find.
    pub port_count: u32,
    /// Probe budget.
    pub max_probes: u32,
    /// Session clock.
    pub time_limit_ms: u64,
    /// Optional twist rolled at generation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

/// Server-side state of one grid-search session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSearchState {
    /// Hidden port locations. Never serialized toward clients.
    pub ports: Vec<Cell>,
    /// Probes consumed so far.
    pub probes_used: u32,
    /// Ports uncovered so far.
    pub ports_found: u32,
    /// Probed cells in submission order.
    pub probed: Vec<Cell>,
    /// Tuning for this session.
    pub config: GridSearchConfig,
}

/// Outcome of one accepted probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSearchResult {
    /// Probed row.
    pub row: u8,
    /// Probed column.
    pub col: u8,
    /// True when the probe uncovered a port.
    pub hit: bool,
    /// On a miss, the number of ports in the 8 surrounding cells.
    /// Zero is still reported; a hit carries no adjacency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjacency: Option<u32>,
    /// Ports uncovered including this probe.
    pub ports_found: u32,
    /// Probes consumed including this one.
    pub probes_used: u32,
    /// Probes left in the budget.
    pub probes_remaining: u32,
    /// True when every port has been uncovered.
    pub all_found: bool,
    /// True when the session cannot accept further probes.
    pub game_over: bool,
}

impl GridSearchState {
    /// Generates a fresh puzzle for a security level.
    ///
    /// Ports are a shuffled prefix of the full cell list, so they are
    /// always distinct and the deal consumes a fixed number of draws.
    pub fn generate(rng: &mut GameRng, security_level: u8) -> Self {
        let tier = balance::grid_search_tier(security_level);

        let mut ports = all_cells(tier.grid_size);
        rng.shuffle(&mut ports);
        ports.truncate(tier.port_count as usize);

        let modifier = balance::roll_modifier(rng, security_level, GameKind::GridSearch);

        GridSearchState {
            ports,
            probes_used: 0,
            ports_found: 0,
            probed: Vec::new(),
            config: GridSearchConfig {
                grid_size: tier.grid_size,
                port_count: tier.port_count,
                max_probes: tier.max_probes,
                time_limit_ms: tier.time_limit_ms,
                modifier,
            },
        }
    }

    /// Applies one probe.
    pub fn probe(&mut self, row: i32, col: i32) -> Result<GridSearchResult, MoveError> {
        if self.ports_found >= self.config.port_count {
            return Err(MoveError::AllPortsFound);
        }
        let cell = Cell::checked(row, col, self.config.grid_size).ok_or(MoveError::OutOfBounds {
            size: self.config.grid_size,
        })?;
        if self.probed.contains(&cell) {
            return Err(MoveError::AlreadyProbed);
        }
        if self.probes_used >= self.config.max_probes {
            return Err(MoveError::NoProbesRemaining);
        }

        self.probes_used += 1;
        self.probed.push(cell);

        let hit = self.ports.contains(&cell);
        let adjacency = if hit {
            self.ports_found += 1;
            None
        } else {
            let touching = self
                .ports
                .iter()
                .filter(|port| cell.is_adjacent8(**port))
                .count();
            Some(touching as u32)
        };

        let all_found = self.ports_found >= self.config.port_count;
        let game_over = all_found || self.probes_used >= self.config.max_probes;

        Ok(GridSearchResult {
            row: cell.row,
            col: cell.col,
            hit,
            adjacency,
            ports_found: self.ports_found,
            probes_used: self.probes_used,
            probes_remaining: self.config.max_probes - self.probes_used,
            all_found,
            game_over,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
