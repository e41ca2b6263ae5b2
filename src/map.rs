use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Grass,
    Forest,
    Mountain,
    Water,
}

impl Terrain {
    pub fn initial(self) -> char {
        match self {
            Terrain::Grass => 'g',
            Terrain::Forest => 'f',
            Terrain::Mountain => 'm',
            Terrain::Water => 'w',
        }
    }

    /// Cost of moving onto a tile of this terrain. Mountains take an extra
    /// turn to cross.
    pub fn move_cost(self) -> i32 {
        match self {
            Terrain::Mountain => 2,
            _ => 1,
        }
    }
}

/// One cell of a server view, as it arrives on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct TileData {
    #[serde(rename = "type")]
    pub terrain: Terrain,
    #[serde(default)]
    pub castle: Option<String>,
    #[serde(default)]
    pub treasure: bool,
}

/// A recorded terrain fact. Terrain and castle owner never change after
/// first discovery; only `treasure` may be retracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub terrain: Terrain,
    pub castle: Option<String>,
    pub treasure: bool,
}

/// Notable outcome of merging one view into the map. Consumed by the
/// controller right away, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    TreasureFound(Position),
    CastleFound { pos: Position, owner: String },
    TreasureTaken(Position),
}

/// Incrementally built map of the partially observed grid, keyed by
/// absolute coordinate, plus the bot's own position. The origin is wherever
/// the bot started.
pub struct GridMap {
    tiles: HashMap<Position, Tile>,
    position: Position,
}

impl GridMap {
    pub fn new() -> Self {
        Self {
            tiles: HashMap::new(),
            position: Position::ORIGIN,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn has_seen(&self, pos: Position) -> bool {
        self.tiles.contains_key(&pos)
    }

    pub fn tile_at(&self, pos: Position) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    pub fn tile_in_direction(&self, pos: Position, direction: Direction) -> Option<&Tile> {
        self.tile_at(pos.step(direction))
    }

    /// The up-to-four discovered cardinal neighbors of a coordinate.
    /// Undiscovered neighbors are omitted.
    pub fn neighbors_of(&self, pos: Position) -> Vec<(Direction, &Tile)> {
        pos.neighbors()
            .into_iter()
            .filter_map(|(direction, neighbor)| {
                self.tile_at(neighbor).map(|tile| (direction, tile))
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &Tile)> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Advance the current position one step. Must be called exactly once
    /// per move the server has confirmed; the caller is trusted on the
    /// direction.
    pub fn record_move(&mut self, direction: Direction) {
        self.position = self.position.step(direction);
    }

    /// Merge a square view centered on the current position into the map.
    ///
    /// Never-seen cells become new tiles; a previously seen treasure that
    /// the view no longer reports is retracted. Everything else about a
    /// known tile is immutable and later views cannot change it. Returns
    /// the first notable event, if any; a newly found treasure outranks a
    /// newly found castle on the same cell.
    pub fn discover(&mut self, view: &[Vec<TileData>]) -> Result<Option<Discovery>> {
        let size = view.len();
        if size == 0 || size % 2 == 0 {
            return Err(Error::InvalidView(format!(
                "expected an odd-sized square, got {size} rows"
            )));
        }
        if let Some(row) = view.iter().find(|row| row.len() != size) {
            return Err(Error::InvalidView(format!(
                "expected {size} cells per row, got {}",
                row.len()
            )));
        }

        let offset = (size as i32 - 1) / 2;
        let mut discovery = None;

        for (row, cells) in view.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                // Row 0 is the northernmost row of the view.
                let pos = Position::new(
                    self.position.x + col as i32 - offset,
                    self.position.y - row as i32 + offset,
                );

                match self.tiles.get_mut(&pos) {
                    None => {
                        let event = if cell.treasure {
                            Some(Discovery::TreasureFound(pos))
                        } else {
                            cell.castle.as_ref().map(|owner| Discovery::CastleFound {
                                pos,
                                owner: owner.clone(),
                            })
                        };
                        self.tiles.insert(
                            pos,
                            Tile {
                                terrain: cell.terrain,
                                castle: cell.castle.clone(),
                                treasure: cell.treasure,
                            },
                        );
                        if discovery.is_none() {
                            discovery = event;
                        }
                    }
                    Some(tile) if tile.treasure && !cell.treasure => {
                        // Someone else got there first.
                        tile.treasure = false;
                        if discovery.is_none() {
                            discovery = Some(Discovery::TreasureTaken(pos));
                        }
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(discovery)
    }

    /// Diagnostic rendering of everything discovered so far: terrain
    /// initials over the bounding box, `?` for gaps, the current position
    /// parenthesized.
    pub fn render(&self) -> String {
        if self.tiles.is_empty() {
            return String::new();
        }

        let min_x = self.tiles.keys().map(|p| p.x).min().unwrap();
        let max_x = self.tiles.keys().map(|p| p.x).max().unwrap();
        let min_y = self.tiles.keys().map(|p| p.y).min().unwrap();
        let max_y = self.tiles.keys().map(|p| p.y).max().unwrap();

        let mut lines = Vec::new();
        for y in (min_y..=max_y).rev() {
            let mut line = String::new();
            for x in min_x..=max_x {
                let pos = Position::new(x, y);
                match self.tile_at(pos) {
                    Some(tile) if pos == self.position => {
                        line.push('(');
                        line.push(tile.terrain.initial());
                        line.push(')');
                    }
                    Some(tile) => {
                        line.push(' ');
                        line.push(tile.terrain.initial());
                        line.push(' ');
                    }
                    None => line.push_str(" ? "),
                }
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

impl Default for GridMap {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{map_from, view};
    use super::*;

    #[test]
    fn test_render_single_tile() {
        let map = map_from("grass");
        assert_eq!(map.render(), "(g)");
    }

    #[test]
    fn test_render_marks_current_position() {
        let map = map_from(
            "grass    forest  mountain
             water    grass   grass
             mountain grass   grass",
        );
        assert_eq!(map.render(), " g  f  m \n w (g) g \n m  g  g ");
    }

    #[test]
    fn test_discover_stitches_views_across_moves() {
        let mut map = map_from(
            "grass    forest  mountain
             water    grass   grass
             mountain grass   grass",
        );

        map.record_move(Direction::Up);
        map.discover(&view(
            "mountain water   water
             grass    forest  mountain
             water    grass   grass",
        ))
        .unwrap();

        assert_eq!(map.position(), Position::new(0, 1));
        assert_eq!(map.render(), " m  w  w \n g (f) m \n w  g  g \n m  g  g ");

        map.record_move(Direction::Right);
        map.discover(&view(
            "water   water    grass
             forest  mountain water
             grass   grass    water",
        ))
        .unwrap();

        assert_eq!(map.position(), Position::new(1, 1));
        assert_eq!(
            map.render(),
            " m  w  w  g \n g  f (m) w \n w  g  g  w \n m  g  g  ? "
        );
    }

    #[test]
    fn test_has_seen() {
        let map = map_from(
            "grass    forest  mountain
             water    grass   grass
             mountain grass   grass",
        );

        assert!(map.has_seen(Position::new(0, 0)));
        assert!(map.has_seen(Position::new(1, 1)));
        assert!(!map.has_seen(Position::new(3, 1)));
        assert!(!map.has_seen(Position::new(0, -3)));
        assert!(!map.has_seen(Position::new(2, 2)));
    }

    #[test]
    fn test_tile_in_direction_round_trip() {
        let mut map = map_from(
            "grass    forest  mountain
             water    grass   grass
             mountain grass   grass",
        );

        let before = map.tile_at(map.position()).unwrap().clone();
        map.record_move(Direction::Right);
        let looking_back = map
            .tile_in_direction(map.position(), Direction::Left)
            .unwrap();
        assert_eq!(*looking_back, before);
    }

    #[test]
    fn test_neighbors_of_omits_undiscovered() {
        let map = map_from(
            "grass    forest  mountain
             water    grass   grass
             mountain grass   grass",
        );

        // Corner of the discovered area: only two neighbors are known.
        let neighbors = map.neighbors_of(Position::new(1, 1));
        assert_eq!(neighbors.len(), 2);
        for (direction, _) in &neighbors {
            assert!(matches!(direction, Direction::Down | Direction::Left));
        }
    }

    #[test]
    fn test_terrain_and_castle_immutable_after_discovery() {
        let mut map = map_from("grass");

        let mut conflicting = view("mountain");
        conflicting[0][0].castle = Some("intruder".to_string());
        map.discover(&conflicting).unwrap();

        let tile = map.tile_at(Position::ORIGIN).unwrap();
        assert_eq!(tile.terrain, Terrain::Grass);
        assert_eq!(tile.castle, None);
    }

    #[test]
    fn test_treasure_taken_by_other_player() {
        let mut map = GridMap::new();

        let with_treasure: Vec<Vec<TileData>> = serde_json::from_str(
            r#"[[{"type":"grass"},{"type":"grass","treasure":true},{"type":"grass"}],
                [{"type":"grass"},{"type":"grass"},{"type":"grass"}],
                [{"type":"grass"},{"type":"grass"},{"type":"grass"}]]"#,
        )
        .unwrap();
        let treasure_pos = Position::new(0, 1);

        let found = map.discover(&with_treasure).unwrap();
        assert_eq!(found, Some(Discovery::TreasureFound(treasure_pos)));
        assert!(map.tile_at(treasure_pos).unwrap().treasure);

        let without_treasure = view(
            "grass grass grass
             grass grass grass
             grass grass grass",
        );
        let taken = map.discover(&without_treasure).unwrap();
        assert_eq!(taken, Some(Discovery::TreasureTaken(treasure_pos)));
        assert!(!map.tile_at(treasure_pos).unwrap().treasure);

        // A later view claiming the treasure is back is ignored; the flag
        // never goes false to true.
        let back_again = map.discover(&with_treasure).unwrap();
        assert_eq!(back_again, None);
        assert!(!map.tile_at(treasure_pos).unwrap().treasure);
    }

    #[test]
    fn test_castle_discovery_reports_owner() {
        let mut map = GridMap::new();
        let mut cells = view(
            "grass grass grass
             grass grass grass
             grass grass grass",
        );
        cells[2][0].castle = Some("rival".to_string());

        let found = map.discover(&cells).unwrap();
        assert_eq!(
            found,
            Some(Discovery::CastleFound {
                pos: Position::new(-1, -1),
                owner: "rival".to_string()
            })
        );
    }

    #[test]
    fn test_new_treasure_outranks_new_castle() {
        let mut map = GridMap::new();
        let mut cells = view("grass");
        cells[0][0].castle = Some("rival".to_string());
        cells[0][0].treasure = true;

        let found = map.discover(&cells).unwrap();
        assert_eq!(found, Some(Discovery::TreasureFound(Position::ORIGIN)));
    }

    #[test]
    fn test_discover_rejects_malformed_views() {
        let mut map = GridMap::new();

        let even = view(
            "grass grass
             grass grass",
        );
        assert!(matches!(map.discover(&even), Err(Error::InvalidView(_))));

        let mut ragged = view(
            "grass grass grass
             grass grass grass
             grass grass grass",
        );
        ragged[1].pop();
        assert!(matches!(map.discover(&ragged), Err(Error::InvalidView(_))));

        // Nothing was recorded by the failed merges.
        assert!(map.is_empty());
    }
}
