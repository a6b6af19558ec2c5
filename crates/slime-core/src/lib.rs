//! SlimeWars - an infection board game engine
//!
//! Players take turns moving one of their slimes to an empty cell one or two
//! steps away in a straight line. Moving one step grows a new slime; moving
//! two steps jumps. Either way, every neighbouring slime is converted to the
//! mover's colour. A player wins by being the only colour left on the board,
//! or by leaving nobody else with a legal move.
//!
//! This crate provides:
//! - Square-grid geometry (distance, straight lines, neighbourhoods)
//! - Board representation with per-cell selection flags
//! - Player roster, game status, and an optional per-turn timer
//! - The rule engine, driven by actions and answering with events
//! - A random bot player
//!
//! # Architecture
//!
//! The engine is synchronous and owns no clock or threads. A host feeds it
//! [`GameAction`]s (including timer ticks at the configured sample rate) and
//! forwards the resulting [`GameEvent`]s to whoever is watching.
//!
//! # Modules
//!
//! - [`geometry`]: Coordinates and neighbourhood queries
//! - [`board`]: Positions, selection flags, and change notifications
//! - [`player`]: Player ids and colours
//! - [`lifecycle`]: Roster and game status
//! - [`timer`]: Per-turn countdown
//! - [`actions`]: Actions, events, and outcomes
//! - [`game`]: The rule engine
//! - [`bot`]: Random automated player

pub mod actions;
pub mod board;
pub mod bot;
pub mod game;
pub mod geometry;
pub mod lifecycle;
pub mod player;
pub mod timer;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent, MoveKind, Outcome, WinType};
pub use board::{Board, BoardChange, Position, PositionFlag};
pub use bot::{RandomBot, ThinkingTime};
pub use game::{GameConfig, GameError, GameStateJson, SlimeWars, TurnPhase};
pub use geometry::{Coord, Located};
pub use lifecycle::{GameLifecycle, GameStatus};
pub use player::{Player, PlayerColor, PlayerId};
pub use timer::{TickOutcome, TimerState, TurnTimer};
