//! Path Linking Puzzle
//!
//! Endpoint pairs on a square grid must be connected by orthogonal,
//! non-crossing paths. Boards are carved out of a Hamiltonian path over
//! the whole grid, so a perfect solution that fills every cell always
//! exists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::{all_cells, Cell, GameRng};
use crate::game::balance::{self, Modifier};
use crate::game::score;
use crate::game::session::MoveError;
use crate::game::target::GameKind;

/// Orthogonal step order used by the path walker.
const DIRS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// DFS call budget per start cell before giving up.
const WALK_BUDGET: i32 = 10_000;

/// Start cells tried before falling back to the snake path.
const WALK_ATTEMPTS: usize = 5;

/// One endpoint pair the player must connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPair {
    /// First endpoint.
    pub a: Cell,
    /// Second endpoint.
    pub b: Cell,
}

/// Client-visible tuning for a path-linking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLinkingConfig {
    /// Square grid edge length.
    pub grid_size: u8,
    /// Endpoint pairs to connect.
    pub pairs: u32,
    /// Session clock.
    pub time_limit_ms: u64,
    /// The endpoint pairs, in carve order.
    pub endpoints: Vec<EndpointPair>,
    /// Optional twist rolled at generation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

/// Server-side state of one path-linking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLinkingState {
    /// The Hamiltonian path the endpoints were carved from. Never
    /// serialized toward clients.
    pub solution: Vec<Cell>,
    /// True once the single submission has been consumed.
    pub submitted: bool,
    /// Tuning for this session.
    pub config: PathLinkingConfig,
}

/// One claimed path in a submission, straight off the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathClaim {
    /// Which endpoint pair this path claims to connect.
    pub pair_index: i32,
    /// Path cells as `[row, col]` pairs, endpoints included.
    pub cells: Vec<(i32, i32)>,
}

/// Outcome of the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLinkingResult {
    /// Pairs connected by valid paths.
    pub connected_pairs: u32,
    /// Pairs on the board.
    pub total_pairs: u32,
    /// Cells covered by valid paths.
    pub filled_cells: u32,
    /// Cells on the board.
    pub total_cells: u32,
    /// Final score for the session.
    pub score: u32,
    /// Always true; a submission ends the game.
    pub game_over: bool,
}

impl PathLinkingState {
    /// Generates a fresh puzzle for a security level.
    pub fn generate(rng: &mut GameRng, security_level: u8) -> Self {
        let tier = balance::path_linking_tier(security_level);
        let solution = hamiltonian_path(rng, tier.grid_size);
        let endpoints = carve_endpoints(rng, &solution, tier.pairs as usize);
        let modifier = balance::roll_modifier(rng, security_level, GameKind::PathLinking);

        PathLinkingState {
            solution,
            submitted: false,
            config: PathLinkingConfig {
                grid_size: tier.grid_size,
                pairs: tier.pairs,
                time_limit_ms: tier.time_limit_ms,
                endpoints,
                modifier,
            },
        }
    }

    /// Consumes the single submission and scores it.
    ///
    /// Invalid claims are skipped rather than rejected: the score simply
    /// reflects whatever subset of the claims holds up.
    pub fn submit(
        &mut self,
        claims: &[PathClaim],
        elapsed_ms: u64,
    ) -> Result<PathLinkingResult, MoveError> {
        if self.submitted {
            return Err(MoveError::AlreadySubmitted);
        }

        let mut used: BTreeSet<Cell> = BTreeSet::new();
        let mut connected = 0u32;
        for claim in claims {
            if let Some(cells) = self.validate_claim(claim, &used) {
                used.extend(cells);
                connected += 1;
            }
        }

        let total_cells =
            u32::from(self.config.grid_size) * u32::from(self.config.grid_size);
        let filled = used.len() as u32;
        let score = score::path_linking_score(
            connected,
            self.config.pairs,
            filled,
            total_cells,
            elapsed_ms,
            self.config.time_limit_ms,
        );

        self.submitted = true;

        Ok(PathLinkingResult {
            connected_pairs: connected,
            total_pairs: self.config.pairs,
            filled_cells: filled,
            total_cells,
            score,
            game_over: true,
        })
    }

    /// Checks one claim against the board and already-used cells.
    /// Returns the validated cells, or `None` when the claim is skipped.
    fn validate_claim(&self, claim: &PathClaim, used: &BTreeSet<Cell>) -> Option<Vec<Cell>> {
        if claim.pair_index < 0 || claim.pair_index >= self.config.pairs as i32 {
            return None;
        }
        if claim.cells.len() < 2 {
            return None;
        }

        let size = self.config.grid_size;
        let mut cells = Vec::with_capacity(claim.cells.len());
        for &(row, col) in &claim.cells {
            cells.push(Cell::checked(row, col, size)?);
        }

        let pair = self.config.endpoints[claim.pair_index as usize];
        let first = cells[0];
        let last = cells[cells.len() - 1];
        if !((first == pair.a && last == pair.b) || (first == pair.b && last == pair.a)) {
            return None;
        }

        let mut seen = BTreeSet::new();
        for cell in &cells {
            if used.contains(cell) || !seen.insert(*cell) {
                return None;
            }
        }

        for step in cells.windows(2) {
            if !step[0].is_adjacent4(step[1]) {
                return None;
            }
        }

        Some(cells)
    }
}

/// Walks a Hamiltonian path over the grid.
///
/// Tries a handful of shuffled start cells with a Warnsdorff-ordered
/// DFS under a call budget; if every attempt runs out, falls back to
/// the boustrophedon snake, which always covers the grid.
fn hamiltonian_path(rng: &mut GameRng, size: u8) -> Vec<Cell> {
    let total = usize::from(size) * usize::from(size);
    let mut starts = all_cells(size);
    rng.shuffle(&mut starts);

    for &start in starts.iter().take(WALK_ATTEMPTS.min(starts.len())) {
        let mut visited = vec![false; total];
        let mut path = Vec::with_capacity(total);
        visited[start.index(size)] = true;
        path.push(start);

        let mut budget = WALK_BUDGET;
        if extend_path(rng, size, start, &mut visited, &mut path, &mut budget) {
            return path;
        }
    }

    snake_path(size)
}

fn extend_path(
    rng: &mut GameRng,
    size: u8,
    current: Cell,
    visited: &mut [bool],
    path: &mut Vec<Cell>,
    budget: &mut i32,
) -> bool {
    if path.len() == visited.len() {
        return true;
    }
    if *budget <= 0 {
        return false;
    }
    *budget -= 1;

    // Fewest-onward-moves first; the random key breaks ties so different
    // seeds explore different boards.
    let mut candidates: Vec<(u32, u32, Cell)> = Vec::with_capacity(4);
    for (dr, dc) in DIRS {
        let row = i32::from(current.row) + dr;
        let col = i32::from(current.col) + dc;
        if let Some(next) = Cell::checked(row, col, size) {
            if !visited[next.index(size)] {
                candidates.push((free_degree(next, size, visited), rng.next_u32(), next));
            }
        }
    }
    candidates.sort_by_key(|&(degree, tiebreak, _)| (degree, tiebreak));

    for (_, _, next) in candidates {
        visited[next.index(size)] = true;
        path.push(next);
        if extend_path(rng, size, next, visited, path, budget) {
            return true;
        }
        path.pop();
        visited[next.index(size)] = false;
    }
    false
}

/// Unvisited orthogonal neighbors of a cell.
fn free_degree(cell: Cell, size: u8, visited: &[bool]) -> u32 {
    let mut degree = 0;
    for (dr, dc) in DIRS {
        let row = i32::from(cell.row) + dr;
        let col = i32::from(cell.col) + dc;
        if let Some(next) = Cell::checked(row, col, size) {
            if !visited[next.index(size)] {
                degree += 1;
            }
        }
    }
    degree
}

/// Row-by-row serpentine covering of the grid.
fn snake_path(size: u8) -> Vec<Cell> {
    let mut path = Vec::with_capacity(usize::from(size) * usize::from(size));
    for row in 0..size {
        if row % 2 == 0 {
            for col in 0..size {
                path.push(Cell::new(row, col));
            }
        } else {
            for col in (0..size).rev() {
                path.push(Cell::new(row, col));
            }
        }
    }
    path
}

/// Splits the path into one contiguous run per pair and keeps the run
/// ends as endpoints.
///
/// Every run is at least 3 cells, so no pair is trivially adjacent. The
/// spare length is sprinkled over the runs in random bites, then the
/// run lengths are shuffled so long runs are not biased toward the path
/// head.
fn carve_endpoints(rng: &mut GameRng, path: &[Cell], pairs: usize) -> Vec<EndpointPair> {
    let total = path.len();
    let mut run_lengths = vec![3usize; pairs];
    let mut remaining = total - pairs * 3;
    while remaining > 0 {
        let run = rng.next_range(0, pairs as u32 - 1) as usize;
        let bite = (rng.next_range(1, remaining.max(1) as u32) as usize).min(remaining);
        run_lengths[run] += bite;
        remaining -= bite;
    }
    rng.shuffle(&mut run_lengths);

    let mut endpoints = Vec::with_capacity(pairs);
    let mut cursor = 0usize;
    for (i, run) in run_lengths.iter().enumerate() {
        let end = if i == pairs - 1 { total - 1 } else { cursor + run - 1 };
        endpoints.push(EndpointPair {
            a: path[cursor],
            b: path[end],
        });
        cursor = end + 1;
    }
    endpoints
}

// =============================================================================
// TESTS
// =============================================================================
