use std::collections::HashMap;

use rand::seq::IndexedRandom;
use tracing::debug;

use crate::map::{GridMap, Terrain, Tile};
use crate::strategy::ExplorationStrategy;
use crate::types::{Direction, Position};

const TREASURE_BONUS: f64 = 200.0;
const FOREIGN_CASTLE_WEIGHT: f64 = -100.0;
const WATER_WEIGHT: f64 = -999.0;
const REVISIT_SHRINK_BASE: f64 = 1.3;

/// Frontier-chasing exploration: every discovered tile gets a desirability
/// weight each turn, the four neighbors of the current position get one
/// round of look-ahead smoothing, and the best-scoring neighbor wins.
///
/// The weight rewards tiles whose coverage neighborhood is still largely
/// unknown and punishes revisits, so the bot keeps pushing into fresh
/// terrain instead of pacing over old ground.
pub struct WeightedExplorer {
    player_name: String,
    visits: HashMap<Position, u32>,
}

impl WeightedExplorer {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            visits: HashMap::new(),
        }
    }

    /// Static desirability of a single tile.
    ///
    /// Terrain picks a coverage radius (grass 5, forest 3, mountain 7);
    /// the base score is how much of the radius-sized square around the
    /// tile is still undiscovered. Mountains score half, they cost two
    /// moves. A known treasure adds a flat bonus that dominates everything
    /// else; otherwise each prior visit shrinks the score and subtracts a
    /// radius-scaled penalty. Foreign castles and water are avoided
    /// outright.
    pub fn score_tile(&self, map: &GridMap, pos: Position, tile: &Tile) -> f64 {
        if let Some(owner) = &tile.castle
            && *owner != self.player_name
        {
            return FOREIGN_CASTLE_WEIGHT;
        }

        let radius = match tile.terrain {
            Terrain::Water => return WATER_WEIGHT,
            Terrain::Grass => 5,
            Terrain::Mountain => 7,
            Terrain::Forest => 3,
        };

        let mut weight = (radius * radius - self.discovered_around(map, pos, radius)) as f64;
        if tile.terrain == Terrain::Mountain {
            weight /= 2.0;
        }

        if tile.treasure {
            weight += TREASURE_BONUS;
        } else {
            let visits = self.visits.get(&pos).copied().unwrap_or(0);
            weight *= 2.0 - REVISIT_SHRINK_BASE.powi(visits as i32);
            weight -= visits as f64 * 0.5 * radius as f64;
        }

        weight
    }

    /// Discovered tiles inside the radius-sized square centered on a
    /// coordinate, the tile itself included.
    fn discovered_around(&self, map: &GridMap, center: Position, radius: i32) -> i32 {
        let offset = (radius - 1) / 2;
        let mut seen = 0;
        for dy in -offset..=offset {
            for dx in -offset..=offset {
                if map.has_seen(Position::new(center.x + dx, center.y + dy)) {
                    seen += 1;
                }
            }
        }
        seen
    }

    fn weigh_all(&self, map: &GridMap) -> HashMap<Position, f64> {
        map.iter()
            .map(|(&pos, tile)| (pos, self.score_tile(map, pos, tile)))
            .collect()
    }

    /// One round of look-ahead: each tile around the current position is
    /// nudged by the average weight of the discovered tiles in its own
    /// ring that lie more than one step away from us on both axes.
    fn smooth_neighborhood(&self, map: &GridMap, weights: &mut HashMap<Position, f64>) {
        let center = map.position();
        for neighbor in ring(center) {
            if !map.has_seen(neighbor) {
                continue;
            }
            let mut sum = 0.0;
            let mut count = 0;
            for tile_pos in ring(neighbor) {
                if !map.has_seen(tile_pos) {
                    continue;
                }
                if (tile_pos.x - center.x).abs() > 1 && (tile_pos.y - center.y).abs() > 1 {
                    sum += weights[&tile_pos];
                    count += 1;
                }
            }
            *weights.get_mut(&neighbor).unwrap() += sum / (count + 1) as f64;
        }
    }
}

impl ExplorationStrategy for WeightedExplorer {
    fn decide_move(&mut self, map: &GridMap) -> Option<Direction> {
        let mut weights = self.weigh_all(map);
        self.smooth_neighborhood(map, &mut weights);

        let position = map.position();
        let candidates: Vec<(Direction, Position, f64)> = Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                let target = position.step(direction);
                map.has_seen(target)
                    .then(|| (direction, target, weights[&target]))
            })
            .collect();

        let mut rng = rand::rng();

        if candidates.is_empty() {
            // Nothing around us is discovered. Move blind rather than
            // stall; the controller still validates the pick.
            debug!("no discovered neighbors, picking a random direction");
            return Direction::ALL.choose(&mut rng).copied();
        }

        for (direction, _, weight) in &candidates {
            debug!("candidate {direction}: weight {weight:.1}");
        }

        let best = candidates
            .iter()
            .map(|(_, _, weight)| *weight)
            .fold(f64::NEG_INFINITY, f64::max);
        let top: Vec<(Direction, Position)> = candidates
            .iter()
            .filter(|candidate| candidate.2 == best)
            .map(|&(direction, target, _)| (direction, target))
            .collect();
        let &(direction, target) = top.choose(&mut rng)?;

        *self.visits.entry(target).or_insert(0) += 1;
        debug!("going {direction}");
        Some(direction)
    }

    fn on_treasure_found(&mut self, pos: Position) {
        debug!("weighing in newly found treasure at ({}, {})", pos.x, pos.y);
    }

    fn on_castle_found(&mut self, pos: Position, own: bool) {
        if !own {
            debug!("avoiding enemy castle at ({}, {})", pos.x, pos.y);
        }
    }

    fn on_treasure_taken(&mut self, pos: Position) {
        debug!("treasure at ({}, {}) is gone", pos.x, pos.y);
    }
}

/// The eight tiles surrounding a coordinate.
fn ring(center: Position) -> impl Iterator<Item = Position> {
    (-1..=1).flat_map(move |dy| {
        (-1..=1).filter_map(move |dx| {
            (dx != 0 || dy != 0).then(|| Position::new(center.x + dx, center.y + dy))
        })
    })
}
