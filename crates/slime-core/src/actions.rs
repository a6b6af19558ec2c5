//! Game actions and the events they produce.
//!
//! Every mutation of a game goes through a [`GameAction`]: UI clicks, bot
//! moves, and timer ticks alike. The engine answers each action with the
//! list of [`GameEvent`]s it caused, ending with [`GameEvent::BoardSettled`]
//! whenever anything changed.

use crate::board::PositionFlag;
use crate::geometry::Coord;
use crate::lifecycle::GameStatus;
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// All possible inputs to a running game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Pick the piece to move
    SelectStart(Coord),
    /// Put the selected piece back down
    DeselectStart(Coord),
    /// Pick the destination, completing the move
    SelectEnd(Coord),
    /// Clear a destination choice
    DeselectEnd(Coord),
    /// One sample of the turn timer
    TimerTick,
}

/// How a move relocated the moving piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Distance 1: the origin keeps its piece
    Duplicate,
    /// Distance 2: the origin is vacated
    Jump,
}

/// How (and whether) the mover won
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinType {
    /// No win yet
    NoWin,
    /// Every occupied cell belongs to the mover
    LastManStanding,
    /// Nobody else has a legal move
    LegalMoves,
    /// Board complete, decided on score (not produced by SlimeWars)
    Score,
}

/// Result of a finished game from one player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
    Lose,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A selection flag was assigned
    PositionChanged { coord: Coord, flag: PositionFlag },

    /// A piece moved and infected its new neighbours
    MoveResolved {
        player: PlayerId,
        from: Coord,
        to: Coord,
        kind: MoveKind,
        /// Cells that changed hands
        infected: Vec<Coord>,
    },

    /// The turn timer ran out for the current player
    TimerExpired { player: Option<PlayerId> },

    /// Turn advancement ran
    TurnIterated { player: Option<PlayerId> },

    /// Turn advancement could not find the current player among the players
    /// who still own a cell; the turn stays with them
    TurnStalled { player: PlayerId },

    /// The game status changed
    StatusChanged { status: GameStatus },

    /// A player won the game
    GameWon { player: PlayerId, win_type: WinType },

    /// The batch of changes caused by one action is complete
    BoardSettled,
}
