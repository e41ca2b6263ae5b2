use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::client::{GameClient, GameOutcome, MoveReply};
use crate::error::{Error, Result};
use crate::map::{Discovery, GridMap, Terrain, TileData};
use crate::pathfinding::Dijkstra;
use crate::strategy::ExplorationStrategy;
use crate::types::{Direction, Position};

/// What a confirmed move does to the map. The first command of a mountain
/// crossing does not advance the position; the second one does.
#[derive(Debug)]
enum MoveEffect {
    Advance,
    BeginClimb,
}

#[derive(Debug)]
struct Decision {
    direction: Direction,
    effect: MoveEffect,
}

/// Turn-by-turn orchestration: merges views into the map, dispatches
/// discovery events to the injected strategy, and picks the next command
/// from the pending mountain climb, the route home, or the strategy, in
/// that order.
pub struct Bot<C: GameClient> {
    client: C,
    strategy: Box<dyn ExplorationStrategy>,
    map: GridMap,
    has_treasure: bool,
    climbing: Option<Direction>,
    route_home: Vec<Direction>,
    think_delay: Duration,
}

impl<C: GameClient> Bot<C> {
    pub fn new(
        client: C,
        strategy: impl ExplorationStrategy + 'static,
        think_delay: Duration,
    ) -> Self {
        Self {
            client,
            strategy: Box::new(strategy),
            map: GridMap::new(),
            has_treasure: false,
            climbing: None,
            route_home: Vec::new(),
            think_delay,
        }
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    /// Play until the server ends the game. One outstanding request at a
    /// time; the map is only touched between responses.
    pub async fn run(&mut self) -> Result<GameOutcome> {
        let registration = self.client.register().await?;
        self.has_treasure = registration.treasure;
        self.handle_view(&registration.view, registration.treasure)?;
        info!(
            "registered as {}, {} tiles visible",
            self.client.player_name(),
            self.map.len()
        );

        loop {
            if !self.think_delay.is_zero() {
                sleep(self.think_delay).await;
            }

            let decision = match self.next_move() {
                Ok(decision) => decision,
                Err(err) => {
                    // Broken decision, not a broken game: skip the turn
                    // instead of sending a malformed command.
                    error!("abstaining this turn: {err}");
                    continue;
                }
            };

            debug!("moving {}", decision.direction);
            match self.client.send_move(decision.direction).await? {
                MoveReply::GameOver(outcome) => {
                    match outcome {
                        GameOutcome::Won => info!("game won!"),
                        GameOutcome::Lost => info!("game lost"),
                        GameOutcome::Draw => info!("draw"),
                    }
                    return Ok(outcome);
                }
                MoveReply::View { view, treasure } => {
                    if matches!(decision.effect, MoveEffect::Advance) {
                        self.map.record_move(decision.direction);
                    }
                    self.handle_view(&view, treasure)?;
                    if treasure && !self.has_treasure {
                        self.has_treasure = true;
                        self.picked_up_treasure();
                    }
                    debug!("map so far:\n{}", self.map.render());
                }
            }
        }
    }

    fn next_move(&mut self) -> Result<Decision> {
        if let Some(direction) = self.climbing.take() {
            debug!("finishing the climb {direction}");
            return Ok(Decision {
                direction,
                effect: MoveEffect::Advance,
            });
        }

        if self.has_treasure
            && let Some(direction) = self.route_home.pop()
        {
            debug!("heading home, {} steps to go", self.route_home.len());
            return Ok(self.step(direction));
        }

        let direction = self
            .strategy
            .decide_move(&self.map)
            .ok_or_else(|| Error::InvalidMove("strategy produced no direction".to_string()))?;

        match self.map.tile_in_direction(self.map.position(), direction) {
            Some(tile) if tile.terrain != Terrain::Water => {}
            Some(_) => {
                return Err(Error::InvalidMove(format!("{direction} leads into water")));
            }
            None => {
                return Err(Error::InvalidMove(format!(
                    "{direction} leads off the known map"
                )));
            }
        }

        Ok(self.step(direction))
    }

    /// Turn a chosen direction into a command, starting a two-command
    /// mountain climb when the target tile is a mountain.
    fn step(&mut self, direction: Direction) -> Decision {
        let into_mountain = matches!(
            self.map.tile_in_direction(self.map.position(), direction),
            Some(tile) if tile.terrain == Terrain::Mountain
        );

        if into_mountain {
            self.climbing = Some(direction);
            Decision {
                direction,
                effect: MoveEffect::BeginClimb,
            }
        } else {
            Decision {
                direction,
                effect: MoveEffect::Advance,
            }
        }
    }

    fn handle_view(&mut self, view: &[Vec<TileData>], holding: bool) -> Result<()> {
        match self.map.discover(view)? {
            Some(Discovery::TreasureFound(pos)) => {
                info!("treasure spotted at ({}, {})", pos.x, pos.y);
                self.strategy.on_treasure_found(pos);
            }
            Some(Discovery::CastleFound { pos, owner }) => {
                let own = owner == self.client.player_name();
                if own {
                    debug!("own castle at ({}, {})", pos.x, pos.y);
                } else {
                    info!("castle of {owner} at ({}, {})", pos.x, pos.y);
                }
                self.strategy.on_castle_found(pos, own);
            }
            Some(Discovery::TreasureTaken(pos)) => {
                if holding && pos == self.map.position() {
                    // That was us picking it up, not an opponent.
                    debug!("treasure flag cleared under our feet");
                } else {
                    warn!("treasure at ({}, {}) was taken by another player", pos.x, pos.y);
                    self.strategy.on_treasure_taken(pos);
                }
            }
            None => {}
        }
        Ok(())
    }

    /// Plan the way back once, at pickup time. The route is consumed from
    /// the back and deliberately never recomputed, even if the map learns
    /// more afterwards.
    fn picked_up_treasure(&mut self) {
        info!(
            "picked up treasure at ({}, {}), heading home",
            self.map.position().x,
            self.map.position().y
        );
        match Dijkstra::shortest_path(&self.map, self.map.position(), Position::ORIGIN) {
            Some(mut path) => {
                path.reverse();
                self.route_home = path;
            }
            None => {
                warn!("no known route home, continuing to explore");
                self.route_home.clear();
            }
        }
    }
}
