//! Player roster and game status.
//!
//! `GameLifecycle` owns the ordered roster, the overall status, and the
//! winner. The roster is shuffled exactly once, while the game is still
//! `New`; status only ever moves forward.

use crate::game::GameError;
use crate::player::{Player, PlayerColor, PlayerId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Overall game status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Created, players not yet released to move
    New,
    /// Turns are being played
    InProgress,
    /// Someone has won (or the game ended in a draw)
    Completed,
}

/// Roster, status, and winner of one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLifecycle {
    players: Vec<Player>,
    status: GameStatus,
    winner: Option<PlayerId>,
}

impl GameLifecycle {
    /// Build the roster and shuffle it once.
    ///
    /// Colours are popped from the end of `palette`, one per player.
    pub fn new<R: Rng>(
        player_ids: &[PlayerId],
        mut palette: Vec<PlayerColor>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if palette.len() < player_ids.len() {
            return Err(GameError::NotEnoughColors {
                players: player_ids.len(),
                colors: palette.len(),
            });
        }

        let mut players = Vec::with_capacity(player_ids.len());
        for &id in player_ids {
            // Length checked above
            if let Some(color) = palette.pop() {
                players.push(Player::new(id, color));
            }
        }

        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let mut lifecycle = Self {
            players,
            status: GameStatus::New,
            winner: None,
        };
        lifecycle.shuffle_players(rng);
        Ok(lifecycle)
    }

    /// Fisher-Yates shuffle of the roster.
    ///
    /// Only runs while the game is `New`; returns whether a shuffle happened.
    pub fn shuffle_players<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.status != GameStatus::New || self.players.is_empty() {
            return false;
        }
        self.players.shuffle(rng);
        true
    }

    /// Players in turn order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Move the status forward.
    ///
    /// Returns true if the status changed. Requests to go backwards (or to
    /// stay put) are ignored.
    pub fn set_status(&mut self, status: GameStatus) -> bool {
        if status <= self.status {
            return false;
        }
        self.status = status;
        true
    }

    /// The winner, once the game is completed. `None` after completion is a draw.
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub(crate) fn set_winner(&mut self, winner: Option<PlayerId>) {
        self.winner = winner;
    }
}
