pub mod bot;
pub mod client;
pub mod error;
pub mod heuristic;
pub mod map;
pub mod pathfinding;
pub mod strategy;
pub mod types;

// Re-export commonly used types for convenience
pub use bot::Bot;
pub use client::{GameClient, GameOutcome, RestClient};
pub use error::{Error, Result};
pub use heuristic::WeightedExplorer;
pub use map::{GridMap, Terrain, Tile};
pub use pathfinding::Dijkstra;
pub use strategy::ExplorationStrategy;
pub use types::{Direction, Position};
