//! Automated players for SlimeWars.
//!
//! `RandomBot` knows how to make a legal move and nothing more: it picks a
//! random selectable piece, and if that piece has somewhere to go, a random
//! destination. Pieces with no destinations are skipped and another is
//! tried, without thinking again.

use crate::actions::{GameAction, GameEvent};
use crate::board::{Board, Position};
use crate::game::SlimeWars;
use crate::geometry::Coord;
use crate::lifecycle::GameStatus;
use crate::player::PlayerId;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a bot pretends to think before each move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThinkingTime {
    None,
    /// Up to half a second
    #[default]
    Fast,
    /// Up to two seconds
    Slow,
}

impl ThinkingTime {
    /// Upper bound of the thinking delay
    pub fn max_millis(&self) -> u64 {
        match self {
            ThinkingTime::None => 0,
            ThinkingTime::Fast => 500,
            ThinkingTime::Slow => 2000,
        }
    }
}

impl std::str::FromStr for ThinkingTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ThinkingTime::None),
            "fast" => Ok(ThinkingTime::Fast),
            "slow" => Ok(ThinkingTime::Slow),
            other => Err(format!("unknown thinking time: {}", other)),
        }
    }
}

/// A bot player that makes random legal moves
pub struct RandomBot {
    pub player_id: PlayerId,
    pub thinking_time: ThinkingTime,
    rng: StdRng,
}

impl RandomBot {
    pub fn new(player_id: PlayerId, thinking_time: ThinkingTime) -> Self {
        Self {
            player_id,
            thinking_time,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, thinking_time: ThinkingTime, seed: u64) -> Self {
        Self {
            player_id,
            thinking_time,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Random delay in `[0, max)` for the configured thinking time
    pub fn thinking_delay(&mut self) -> Duration {
        match self.thinking_time.max_millis() {
            0 => Duration::ZERO,
            max => Duration::from_millis(self.rng.gen_range(0..max)),
        }
    }

    /// Whether the game is waiting on this bot
    pub fn is_my_turn(&self, game: &SlimeWars) -> bool {
        game.status() == GameStatus::InProgress && game.current_turn() == Some(self.player_id)
    }

    /// Pick one of our selectable pieces that has not been tried this turn
    pub fn choose_start(&mut self, board: &Board, attempted: &[Coord]) -> Option<Coord> {
        let candidates: Vec<Coord> = board
            .owned_by(self.player_id)
            .filter(|p| p.can_start_select() && !attempted.contains(&p.coord()))
            .map(Position::coord)
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    /// Pick one of the marked destinations
    pub fn choose_end(&mut self, board: &Board) -> Option<Coord> {
        let candidates: Vec<Coord> = board
            .positions()
            .iter()
            .filter(|p| p.can_end_select())
            .map(Position::coord)
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    /// Play a whole turn immediately, ignoring the thinking time.
    ///
    /// Returns every event the turn caused. If no piece can move the last
    /// attempted piece stays selected and the turn is left to the timer.
    pub fn play_turn(&mut self, game: &mut SlimeWars) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.is_my_turn(game) {
            return events;
        }

        let mut attempted = Vec::new();
        while let Some(start) = self.choose_start(game.board(), &attempted) {
            attempted.push(start);
            events.extend(game.apply_action(GameAction::SelectStart(start)));

            if let Some(end) = self.choose_end(game.board()) {
                events.extend(game.apply_action(GameAction::SelectEnd(end)));
                break;
            }
        }

        events
    }
}
