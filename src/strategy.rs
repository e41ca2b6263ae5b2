use crate::map::GridMap;
use crate::types::{Direction, Position};

/// Decision-making capability injected into the bot controller.
///
/// The controller feeds discovery events to the hooks and asks
/// `decide_move` for the next exploration step whenever no route home or
/// mountain climb is pending.
pub trait ExplorationStrategy {
    /// Pick the next move from the current position, or `None` when the
    /// strategy has no viable candidate.
    fn decide_move(&mut self, map: &GridMap) -> Option<Direction>;

    /// A view revealed a tile currently holding treasure.
    fn on_treasure_found(&mut self, pos: Position) {
        let _ = pos;
    }

    /// A view revealed a castle tile. `own` is true when it belongs to
    /// this bot.
    fn on_castle_found(&mut self, pos: Position, own: bool) {
        let _ = (pos, own);
    }

    /// A previously seen treasure disappeared; another player took it.
    fn on_treasure_taken(&mut self, pos: Position) {
        let _ = pos;
    }
}
