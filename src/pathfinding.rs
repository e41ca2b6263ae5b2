use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::map::{GridMap, Terrain};
use crate::types::{Direction, Position};

#[derive(Clone, Eq, PartialEq)]
struct Node {
    pos: Position,
    cost: i32,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.cmp(&self.cost)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct Dijkstra;

impl Dijkstra {
    /// Minimum-cost move sequence between two discovered coordinates.
    ///
    /// Uniform-cost search over the discovered, non-water subgraph: grass
    /// and forest cost 1 to enter, mountains cost 2. Returns `None` when
    /// either endpoint is undiscovered or no route exists; water is never
    /// entered. Each step appears once in the returned sequence regardless
    /// of its cost, so the sequence length can exceed the coordinate
    /// distance only through route shape, never through mountain doubling.
    #[tracing::instrument(level = "trace", skip(map), fields(start_x = start.x, start_y = start.y, goal_x = goal.x, goal_y = goal.y))]
    pub fn shortest_path(map: &GridMap, start: Position, goal: Position) -> Option<Vec<Direction>> {
        if !map.has_seen(start) || !map.has_seen(goal) {
            return None;
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<Position, (Position, Direction)> = HashMap::new();
        let mut cost_so_far: HashMap<Position, i32> = HashMap::new();
        let mut closed_set: HashSet<Position> = HashSet::new();

        cost_so_far.insert(start, 0);
        open_set.push(Node { pos: start, cost: 0 });

        while let Some(Node { pos: current, .. }) = open_set.pop() {
            if current == goal {
                tracing::trace!("path found");
                return Some(reconstruct_path(&came_from, current));
            }

            if !closed_set.insert(current) {
                continue;
            }

            for (direction, neighbor) in current.neighbors() {
                if closed_set.contains(&neighbor) {
                    continue;
                }
                let Some(tile) = map.tile_at(neighbor) else {
                    continue;
                };
                if tile.terrain == Terrain::Water {
                    continue;
                }

                let tentative = cost_so_far[&current] + tile.terrain.move_cost();
                if tentative < *cost_so_far.get(&neighbor).unwrap_or(&i32::MAX) {
                    came_from.insert(neighbor, (current, direction));
                    cost_so_far.insert(neighbor, tentative);
                    open_set.push(Node {
                        pos: neighbor,
                        cost: tentative,
                    });
                }
            }
        }

        tracing::trace!("no path found");
        None
    }
}

fn reconstruct_path(
    came_from: &HashMap<Position, (Position, Direction)>,
    mut current: Position,
) -> Vec<Direction> {
    let mut path = Vec::new();
    while let Some(&(prev, direction)) = came_from.get(&current) {
        path.push(direction);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::fixtures::map_from;

    #[test]
    fn test_path_to_self_is_empty() {
        let map = map_from(
            "grass grass grass
             grass grass grass
             grass grass grass",
        );
        assert_eq!(
            Dijkstra::shortest_path(&map, Position::ORIGIN, Position::ORIGIN),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_undiscovered_endpoints_have_no_path() {
        let map = map_from(
            "grass grass grass
             grass grass grass
             grass grass grass",
        );
        let far = Position::new(5, 5);
        assert_eq!(Dijkstra::shortest_path(&map, Position::ORIGIN, far), None);
        assert_eq!(Dijkstra::shortest_path(&map, far, Position::ORIGIN), None);
    }

    #[test]
    fn test_single_step() {
        let map = map_from(
            "grass grass grass
             grass grass grass
             grass grass grass",
        );
        assert_eq!(
            Dijkstra::shortest_path(&map, Position::ORIGIN, Position::new(0, 1)),
            Some(vec![Direction::Up])
        );
    }

    #[test]
    fn test_routes_around_mountain_when_grass_is_cheaper() {
        // Mountain at (0, -1), due east of the start. Crossing it costs 3,
        // going around over grass costs 2.
        let map = map_from(
            "grass grass    grass
             grass grass    grass
             grass mountain grass",
        );
        let path =
            Dijkstra::shortest_path(&map, Position::new(-1, -1), Position::new(0, 0)).unwrap();
        assert_eq!(path, vec![Direction::Up, Direction::Right]);
    }

    #[test]
    fn test_crosses_mountain_when_it_is_the_only_route() {
        let map = map_from(
            "water water    water
             grass mountain grass
             water water    water",
        );
        let path =
            Dijkstra::shortest_path(&map, Position::new(-1, 0), Position::new(1, 0)).unwrap();
        // The mountain step is emitted once even though it costs two.
        assert_eq!(path, vec![Direction::Right, Direction::Right]);
    }

    #[test]
    fn test_mountain_route_never_beats_equal_length_grass() {
        // Two-step routes from (-1, 0) to (0, 1): over the mountain at
        // (0, 0) or over the grass at (-1, 1). Grass must win.
        let map = map_from(
            "grass    grass grass
             grass mountain grass
             grass    grass grass",
        );
        let path =
            Dijkstra::shortest_path(&map, Position::new(-1, 0), Position::new(0, 1)).unwrap();
        assert_eq!(path, vec![Direction::Up, Direction::Right]);
    }

    #[test]
    fn test_water_is_impassable() {
        let map = map_from(
            "grass water grass
             water water water
             water water water",
        );
        assert_eq!(
            Dijkstra::shortest_path(&map, Position::new(-1, 1), Position::new(1, 1)),
            None
        );
    }
}
