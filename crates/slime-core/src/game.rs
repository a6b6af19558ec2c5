//! Core game state machine.
//!
//! This module contains the `SlimeWars` engine: it composes the board, the
//! player lifecycle, and the optional turn timer, and applies
//! [`GameAction`]s to them.
//!
//! A turn runs through these phases (derived, never stored):
//! `AwaitingStart` (owned pieces marked `can_start_select`) → `AwaitingEnd`
//! (one piece selected, destinations marked `can_end_select`) → resolving
//! (move applied, win checked, turn advanced) → `AwaitingStart` for the next
//! player, or `Completed`.

use crate::actions::{GameAction, GameEvent, MoveKind, Outcome, WinType};
use crate::board::{Board, Position, PositionFlag};
use crate::geometry::Coord;
use crate::lifecycle::{GameLifecycle, GameStatus};
use crate::player::{Player, PlayerColor, PlayerId};
use crate::timer::{TickOutcome, TurnTimer};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// One player per anchor cell
pub const MAX_PLAYERS: usize = 4;

/// Default time limit per turn
pub const DEFAULT_TIME_LIMIT_MS: i64 = 60_000;

/// Default timer sample rate
pub const DEFAULT_SAMPLE_RATE_MS: i64 = 100;

/// Errors raised while constructing a game
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Board width must be non-zero")]
    InvalidWidth,

    #[error("Board height must be non-zero")]
    InvalidHeight,

    #[error("Board too large: {width}x{height}")]
    BoardTooLarge { width: u32, height: u32 },

    #[error("Too many players: {0} (at most 4)")]
    TooManyPlayers(usize),

    #[error("Too many players for board size: {players} players, {cells} cells")]
    BoardTooSmall { players: usize, cells: usize },

    #[error("No players for this game")]
    NoPlayers,

    #[error("Not enough colours for the number of players: {players} players, {colors} colours")]
    NotEnoughColors { players: usize, colors: usize },

    #[error("Time limit per turn must be positive, got {0}ms")]
    InvalidTimeLimit(i64),

    #[error("Sample rate must not be negative, got {0}ms")]
    InvalidSampleRate(i64),
}

/// Turn phase, derived from status and selection flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Pieces placed, game not yet started
    Setup,
    /// No piece selected
    AwaitingStart,
    /// A piece is selected and destinations are marked
    AwaitingEnd,
    /// A move is being applied. Only exists inside `apply_action`.
    Resolving,
    Completed,
}

/// Construction-time configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    /// Player ids; turn order is shuffled at construction
    pub players: Vec<PlayerId>,
    /// Colour supply, handed out from the end
    pub palette: Vec<PlayerColor>,
    /// `None` disables the turn timer
    pub time_limit_per_turn_ms: Option<i64>,
    pub sample_rate_ms: i64,
}

impl GameConfig {
    /// Configuration with the default palette and timer settings
    pub fn new(width: i32, height: i32, players: Vec<PlayerId>) -> Self {
        Self {
            width,
            height,
            players,
            palette: PlayerColor::default_palette(),
            time_limit_per_turn_ms: Some(DEFAULT_TIME_LIMIT_MS),
            sample_rate_ms: DEFAULT_SAMPLE_RATE_MS,
        }
    }

    pub fn with_palette(mut self, palette: Vec<PlayerColor>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_time_limit_ms(mut self, limit: Option<i64>) -> Self {
        self.time_limit_per_turn_ms = limit;
        self
    }

    pub fn with_sample_rate_ms(mut self, rate: i64) -> Self {
        self.sample_rate_ms = rate;
        self
    }
}

/// The complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlimeWars {
    board: Board,
    lifecycle: GameLifecycle,
    timer: Option<TurnTimer>,
    sample_rate_ms: u64,
    /// Set when turn advancement could not find the current player
    stalled: bool,
    /// How the game was won, once completed
    win_type: WinType,
}

impl SlimeWars {
    /// Create a game and start it.
    ///
    /// Players are shuffled, placed on the anchor cells, the first player's
    /// pieces are marked selectable, and the status moves to `InProgress`.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::new_with_rng(config, &mut rand::thread_rng())
    }

    /// Create a game using `rng` for the roster shuffle
    pub fn new_with_rng<R: Rng>(config: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        let lifecycle = GameLifecycle::new(&config.players, config.palette, rng)?;
        let board = Board::new(config.width, config.height)?;

        if config.sample_rate_ms < 0 {
            return Err(GameError::InvalidSampleRate(config.sample_rate_ms));
        }
        let timer = config
            .time_limit_per_turn_ms
            .map(|limit| TurnTimer::new(limit, config.sample_rate_ms))
            .transpose()?;

        let mut game = Self {
            board,
            lifecycle,
            timer,
            sample_rate_ms: config.sample_rate_ms.unsigned_abs(),
            stalled: false,
            win_type: WinType::NoWin,
        };
        game.occupy_initial_positions()?;

        // Nobody is listening yet; construction events are dropped
        let mut events = Vec::new();
        game.iterate_player_turn_into(&mut events);
        game.set_status(GameStatus::InProgress, &mut events);
        game.board.take_changes();

        debug!(
            width = game.board.width(),
            height = game.board.height(),
            players = game.lifecycle.player_count(),
            "game started"
        );

        Ok(game)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Players in turn order
    pub fn players(&self) -> &[Player] {
        self.lifecycle.players()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.lifecycle.player(id)
    }

    pub fn status(&self) -> GameStatus {
        self.lifecycle.status()
    }

    /// The winner, once completed. `None` after completion means a draw.
    pub fn winner(&self) -> Option<PlayerId> {
        self.lifecycle.winner()
    }

    pub fn current_turn(&self) -> Option<PlayerId> {
        self.board.current_turn()
    }

    /// How the game was won; `NoWin` until it completes
    pub fn win_type(&self) -> WinType {
        self.win_type
    }

    pub fn is_finished(&self) -> bool {
        self.status() == GameStatus::Completed
    }

    /// True when the last turn advance could not find the current player
    /// among the players who still own a cell. The turn stays where it is
    /// until something else changes.
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Time left in the current turn, if a time limit is configured
    pub fn turn_time_remaining(&self) -> Option<Duration> {
        self.timer.as_ref().map(TurnTimer::remaining)
    }

    pub fn time_limit_per_turn(&self) -> Option<Duration> {
        self.timer.as_ref().map(TurnTimer::time_limit)
    }

    pub fn sample_rate_milliseconds(&self) -> u64 {
        self.sample_rate_ms
    }

    pub fn timer(&self) -> Option<&TurnTimer> {
        self.timer.as_ref()
    }

    /// Current phase of the turn
    pub fn phase(&self) -> TurnPhase {
        match self.status() {
            GameStatus::New => TurnPhase::Setup,
            GameStatus::Completed => TurnPhase::Completed,
            GameStatus::InProgress if self.board.start_selected().is_some() => {
                TurnPhase::AwaitingEnd
            }
            GameStatus::InProgress => TurnPhase::AwaitingStart,
        }
    }

    /// How the game ended for `player`, once it has ended
    pub fn outcome_for(&self, player: PlayerId) -> Option<Outcome> {
        if !self.is_finished() {
            return None;
        }
        Some(match self.winner() {
            None => Outcome::Draw,
            Some(winner) if winner == player => Outcome::Win,
            Some(_) => Outcome::Lose,
        })
    }

    /// Apply an action and return the events it caused.
    ///
    /// Actions that make no sense in the current state (a destination with no
    /// piece selected, a cell that is not selectable, a coordinate off the
    /// board, anything after completion) are ignored and return no events.
    pub fn apply_action(&mut self, action: GameAction) -> Vec<GameEvent> {
        let mut events = Vec::new();

        match action {
            GameAction::SelectStart(coord) => {
                if self.accepts(coord, Position::can_start_select) {
                    self.board.set_flag(coord, PositionFlag::IsStartSelected, true);
                    self.update_end_selectable_positions(coord);
                }
            }

            GameAction::DeselectStart(coord) => {
                // Only the selected piece can be put back down
                if self.accepts(coord, Position::is_start_selected) {
                    self.board.set_flag(coord, PositionFlag::IsStartSelected, false);
                    self.clear_end_selectable_positions();
                }
            }

            GameAction::SelectEnd(coord) => {
                if self.accepts(coord, Position::can_end_select)
                    && self.board.start_selected().is_some()
                {
                    self.board.set_flag(coord, PositionFlag::IsEndSelected, true);
                    self.complete_move_from_end_selected(coord, &mut events);
                }
            }

            GameAction::DeselectEnd(coord) => {
                if self.accepts(coord, |_| true) {
                    self.board.set_flag(coord, PositionFlag::IsEndSelected, false);
                }
            }

            GameAction::TimerTick => self.on_timer_tick(&mut events),
        }

        self.settle(&mut events);
        events
    }

    /// Advance to the next player's turn.
    ///
    /// Called after every resolved move and on timer expiry; exposed for
    /// hosts that advance turns manually.
    pub fn iterate_player_turn(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.iterate_player_turn_into(&mut events);
        self.settle(&mut events);
        events
    }

    /// Decide whether the current player has just won
    pub fn check_for_win_condition_of_current_player(&self) -> WinType {
        let Some(current) = self.board.current_turn() else {
            return WinType::NoWin;
        };

        let sole_occupant = self
            .board
            .positions()
            .iter()
            .filter_map(Position::occupier)
            .all(|occupier| occupier == current);
        if sole_occupant {
            return WinType::LastManStanding;
        }

        let anyone_else_can_move = self
            .lifecycle
            .players()
            .iter()
            .filter(|p| p.id != current)
            .any(|p| self.can_make_move(p.id));
        if !anyone_else_can_move {
            return WinType::LegalMoves;
        }

        WinType::NoWin
    }

    /// Whether `player` has at least one legal move, regardless of whose turn it is
    pub fn can_make_move(&self, player: PlayerId) -> bool {
        if self.status() != GameStatus::InProgress {
            return false;
        }
        self.board
            .owned_by(player)
            .any(|p| !self.board.destinations_from(p.coord()).is_empty())
    }

    /// JSON snapshot for consumers that render or log the game
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&GameStateJson::from(self))
    }

    // ==================== Helper Methods ====================

    fn accepts(&self, coord: Coord, eligible: impl Fn(&Position) -> bool) -> bool {
        self.status() == GameStatus::InProgress && self.board.position(coord).is_some_and(eligible)
    }

    fn occupy_initial_positions(&mut self) -> Result<(), GameError> {
        let players = self.lifecycle.player_count();
        if players > MAX_PLAYERS {
            return Err(GameError::TooManyPlayers(players));
        }
        if players >= self.board.len() {
            return Err(GameError::BoardTooSmall {
                players,
                cells: self.board.len(),
            });
        }
        if self.status() != GameStatus::New {
            return Ok(());
        }

        let anchors = self.board.anchor_indices();
        let roster: Vec<PlayerId> = self.lifecycle.players().iter().map(|p| p.id).collect();
        for player in roster {
            let free = anchors
                .iter()
                .filter_map(|&i| self.board.positions().get(i))
                .find(|p| !p.is_occupied())
                .map(Position::coord);
            if let Some(coord) = free {
                self.board.set_occupier(coord, Some(player));
            }
        }

        Ok(())
    }

    fn update_start_selectable_positions(&mut self) {
        let Some(current) = self.board.current_turn() else {
            return;
        };
        let owned: Vec<Coord> = self.board.owned_by(current).map(Position::coord).collect();
        for coord in owned {
            self.board.set_flag(coord, PositionFlag::CanStartSelect, true);
        }
    }

    fn update_end_selectable_positions(&mut self, selected: Coord) {
        // Only one start selection may stand
        let others: Vec<Coord> = self
            .board
            .positions()
            .iter()
            .filter(|p| p.is_start_selected() && p.coord() != selected)
            .map(Position::coord)
            .collect();
        for coord in others {
            self.board.set_flag(coord, PositionFlag::IsStartSelected, false);
        }

        let destinations = self.board.destinations_from(selected);
        let stale: Vec<Coord> = self
            .board
            .positions()
            .iter()
            .filter(|p| p.can_end_select() && !destinations.contains(&p.coord()))
            .map(Position::coord)
            .collect();
        for coord in stale {
            self.board.set_flag(coord, PositionFlag::CanEndSelect, false);
        }
        for coord in destinations {
            self.board.set_flag(coord, PositionFlag::CanEndSelect, true);
        }
    }

    fn clear_end_selectable_positions(&mut self) {
        let marked: Vec<Coord> = self
            .board
            .positions()
            .iter()
            .filter(|p| p.can_end_select())
            .map(Position::coord)
            .collect();
        for coord in marked {
            self.board.set_flag(coord, PositionFlag::CanEndSelect, false);
        }
    }

    fn complete_move_from_end_selected(&mut self, destination: Coord, events: &mut Vec<GameEvent>) {
        let Some(player) = self.board.current_turn() else {
            return;
        };
        let Some(origin) = self.board.start_selected().map(Position::coord) else {
            return;
        };

        self.board.set_occupier(destination, Some(player));

        // Infect every occupied neighbour, including our own
        let adjacent = self.board.adjacent_coords(destination);
        let mut infected = Vec::new();
        for &coord in &adjacent {
            let Some(occupier) = self.board.position(coord).and_then(Position::occupier) else {
                continue;
            };
            if occupier != player {
                infected.push(coord);
            }
            self.board.set_occupier(coord, Some(player));
        }

        let kind = if adjacent.contains(&origin) {
            MoveKind::Duplicate
        } else {
            self.board.set_occupier(origin, None);
            MoveKind::Jump
        };

        debug!(
            %player,
            from = %origin,
            to = %destination,
            ?kind,
            infected = infected.len(),
            "move resolved"
        );
        self.push_event(
            events,
            GameEvent::MoveResolved {
                player,
                from: origin,
                to: destination,
                kind,
                infected,
            },
        );

        match self.check_for_win_condition_of_current_player() {
            WinType::NoWin => self.iterate_player_turn_into(events),
            win_type => self.complete_game(player, win_type, events),
        }
    }

    fn complete_game(&mut self, winner: PlayerId, win_type: WinType, events: &mut Vec<GameEvent>) {
        self.set_status(GameStatus::Completed, events);
        self.lifecycle.set_winner(Some(winner));
        self.win_type = win_type;
        self.board.reset_selection();

        if win_type == WinType::LegalMoves {
            // Fill the board with the winner's slime for display
            let empty: Vec<Coord> = self
                .board
                .positions()
                .iter()
                .filter(|p| !p.is_occupied())
                .map(Position::coord)
                .collect();
            for coord in empty {
                self.board.set_occupier(coord, Some(winner));
            }
        }

        debug!(%winner, ?win_type, "game won");
        self.push_event(events, GameEvent::GameWon { player: winner, win_type });
    }

    fn iterate_player_turn_into(&mut self, events: &mut Vec<GameEvent>) {
        if self.status() == GameStatus::Completed {
            return;
        }

        match self.board.current_turn() {
            None => {
                let first = self.lifecycle.players().first().map(|p| p.id);
                self.board.set_current_turn(first);
                self.update_start_selectable_positions();
            }
            Some(current) => {
                self.board.reset_selection();

                let next = {
                    let players = self.lifecycle.players();
                    players
                        .iter()
                        .position(|p| p.id == current && self.board.count_owned(p.id) > 0)
                        .and_then(|index| players.get((index + 1) % players.len()))
                        .map(|p| p.id)
                };

                match next {
                    Some(next) => {
                        self.stalled = false;
                        self.board.set_current_turn(Some(next));
                        self.update_start_selectable_positions();
                    }
                    None => {
                        // The current player owns nothing, so the roster scan
                        // finds no match and the turn does not move
                        self.stalled = true;
                        warn!(player = %current, "turn stalled on a player with no pieces");
                        self.push_event(events, GameEvent::TurnStalled { player: current });
                    }
                }
            }
        }

        if let Some(timer) = self.timer.as_mut() {
            timer.reset();
        }

        let player = self.board.current_turn();
        debug!(player = ?player, "turn iterated");
        self.push_event(events, GameEvent::TurnIterated { player });
    }

    fn on_timer_tick(&mut self, events: &mut Vec<GameEvent>) {
        let status = self.status();
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        if timer.tick(status) != TickOutcome::Expired {
            return;
        }

        let player = self.board.current_turn();
        debug!(player = ?player, "turn timer expired");
        self.push_event(events, GameEvent::TimerExpired { player });

        self.iterate_player_turn_into(events);

        let status = self.status();
        if let Some(timer) = self.timer.as_mut() {
            timer.resume(status);
        }
    }

    fn set_status(&mut self, status: GameStatus, events: &mut Vec<GameEvent>) {
        if !self.lifecycle.set_status(status) {
            return;
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.on_status_changed(status);
        }
        self.push_event(events, GameEvent::StatusChanged { status });
    }

    /// Report pending flag changes before `event` so ordering is preserved
    fn push_event(&mut self, events: &mut Vec<GameEvent>, event: GameEvent) {
        self.flush_changes(events);
        events.push(event);
    }

    fn flush_changes(&mut self, events: &mut Vec<GameEvent>) {
        events.extend(
            self.board
                .take_changes()
                .into_iter()
                .map(|change| GameEvent::PositionChanged {
                    coord: change.coord,
                    flag: change.flag,
                }),
        );
    }

    fn settle(&mut self, events: &mut Vec<GameEvent>) {
        self.flush_changes(events);
        if !events.is_empty() {
            events.push(GameEvent::BoardSettled);
        }
    }
}

/// JSON-friendly game snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateJson {
    pub status: GameStatus,
    pub current_turn: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub stalled: bool,
    pub turn_time_remaining_ms: Option<u64>,
    pub players: Vec<Player>,
    pub board: Board,
}

impl From<&SlimeWars> for GameStateJson {
    fn from(game: &SlimeWars) -> Self {
        Self {
            status: game.status(),
            current_turn: game.current_turn(),
            winner: game.winner(),
            stalled: game.is_stalled(),
            turn_time_remaining_ms: game
                .turn_time_remaining()
                .map(|d| d.as_millis().try_into().unwrap_or(u64::MAX)),
            players: game.players().to_vec(),
            board: game.board.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use uuid::Uuid;

    fn new_game(width: i32, height: i32, players: usize) -> SlimeWars {
        let ids = (0..players).map(|_| Uuid::new_v4()).collect();
        let config = GameConfig::new(width, height, ids).with_time_limit_ms(None);
        SlimeWars::new_with_rng(config, &mut StdRng::seed_from_u64(42)).unwrap()
    }

    fn roster(game: &SlimeWars) -> Vec<PlayerId> {
        game.players().iter().map(|p| p.id).collect()
    }

    /// Replace the board contents and hand the turn to `mover`
    fn arrange(game: &mut SlimeWars, mover: PlayerId, cells: &[((i32, i32), PlayerId)]) {
        let all: Vec<Coord> = game.board.positions().iter().map(Position::coord).collect();
        for coord in all {
            game.board.set_occupier(coord, None);
        }
        for &((x, y), player) in cells {
            game.board.set_occupier(Coord::new(x, y), Some(player));
        }
        game.board.set_current_turn(Some(mover));
        game.board.reset_selection();
        game.update_start_selectable_positions();
        game.board.take_changes();
    }

    fn start_selected_count(game: &SlimeWars) -> usize {
        game.board().positions().iter().filter(|p| p.is_start_selected()).count()
    }

    #[test]
    fn test_new_game_is_in_progress() {
        let game = new_game(5, 5, 2);
        let ids = roster(&game);

        assert_eq!(game.status(), GameStatus::InProgress);
        assert_eq!(game.current_turn(), Some(ids[0]));
        assert_eq!(game.phase(), TurnPhase::AwaitingStart);
        assert_eq!(game.winner(), None);
        assert!(!game.is_stalled());
    }

    #[test]
    fn test_initial_placement_uses_anchor_cells() {
        let game = new_game(5, 4, 4);
        let ids = roster(&game);
        let owner = |x, y| game.board().position(Coord::new(x, y)).and_then(Position::occupier);

        assert_eq!(owner(0, 0), Some(ids[0]));
        assert_eq!(owner(4, 3), Some(ids[1]));
        assert_eq!(owner(4, 0), Some(ids[2]));
        assert_eq!(owner(0, 3), Some(ids[3]));
        assert_eq!(game.board().occupied_count(), 4);
    }

    #[test]
    fn test_construction_errors() {
        let ids = |n: usize| (0..n).map(|_| Uuid::new_v4()).collect::<Vec<_>>();

        assert_eq!(
            SlimeWars::new(GameConfig::new(0, 5, ids(2))).unwrap_err(),
            GameError::InvalidWidth
        );
        assert_eq!(
            SlimeWars::new(GameConfig::new(5, 5, ids(5)).with_palette(vec![PlayerColor::Red; 5]))
                .unwrap_err(),
            GameError::TooManyPlayers(5)
        );
        assert_eq!(
            SlimeWars::new(GameConfig::new(2, 1, ids(2))).unwrap_err(),
            GameError::BoardTooSmall { players: 2, cells: 2 }
        );
        assert_eq!(
            SlimeWars::new(GameConfig::new(5, 5, Vec::new())).unwrap_err(),
            GameError::NoPlayers
        );
        assert_eq!(
            SlimeWars::new(GameConfig::new(5, 5, ids(3)).with_palette(vec![PlayerColor::Red]))
                .unwrap_err(),
            GameError::NotEnoughColors { players: 3, colors: 1 }
        );
        assert_eq!(
            SlimeWars::new(GameConfig::new(5, 5, ids(2)).with_time_limit_ms(Some(0))).unwrap_err(),
            GameError::InvalidTimeLimit(0)
        );
        assert_eq!(
            SlimeWars::new(GameConfig::new(5, 5, ids(2)).with_sample_rate_ms(-10)).unwrap_err(),
            GameError::InvalidSampleRate(-10)
        );
        assert_eq!(
            SlimeWars::new(
                GameConfig::new(5, 5, ids(2))
                    .with_time_limit_ms(None)
                    .with_sample_rate_ms(-10)
            )
            .unwrap_err(),
            GameError::InvalidSampleRate(-10)
        );
    }

    #[test]
    fn test_only_current_player_is_start_selectable() {
        let game = new_game(5, 5, 2);
        let ids = roster(&game);

        for position in game.board().positions() {
            assert_eq!(position.can_start_select(), position.is_occupied_by(ids[0]));
        }
    }

    #[test]
    fn test_select_start_marks_destinations() {
        let mut game = new_game(5, 5, 2);

        let events = game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));
        assert_eq!(events.last(), Some(&GameEvent::BoardSettled));
        assert!(events.contains(&GameEvent::PositionChanged {
            coord: Coord::new(0, 0),
            flag: PositionFlag::IsStartSelected,
        }));

        let mut marked: Vec<Coord> = game
            .board()
            .positions()
            .iter()
            .filter(|p| p.can_end_select())
            .map(Position::coord)
            .collect();
        marked.sort();
        let mut expected = vec![
            Coord::new(1, 0),
            Coord::new(2, 0),
            Coord::new(0, 1),
            Coord::new(0, 2),
            Coord::new(1, 1),
            Coord::new(2, 2),
        ];
        expected.sort();

        assert_eq!(marked, expected);
        assert_eq!(game.phase(), TurnPhase::AwaitingEnd);
    }

    #[test]
    fn test_reselecting_keeps_a_single_start_selection() {
        let mut game = new_game(5, 5, 2);
        let ids = roster(&game);
        arrange(&mut game, ids[0], &[((0, 0), ids[0]), ((4, 0), ids[0]), ((4, 4), ids[1])]);

        game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));
        game.apply_action(GameAction::SelectStart(Coord::new(4, 0)));

        assert_eq!(start_selected_count(&game), 1);
        assert_eq!(game.board().start_selected().map(Position::coord), Some(Coord::new(4, 0)));

        // Destinations of the old selection are gone
        let still_marked = game.board().position(Coord::new(0, 1)).map(Position::can_end_select);
        assert_eq!(still_marked, Some(false));
        let newly_marked = game.board().position(Coord::new(3, 0)).map(Position::can_end_select);
        assert_eq!(newly_marked, Some(true));
    }

    #[test]
    fn test_deselect_start_clears_destinations() {
        let mut game = new_game(5, 5, 2);
        game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));
        game.apply_action(GameAction::DeselectStart(Coord::new(0, 0)));

        assert_eq!(start_selected_count(&game), 0);
        assert!(game.board().positions().iter().all(|p| !p.can_end_select()));
        assert_eq!(game.phase(), TurnPhase::AwaitingStart);
    }

    #[test]
    fn test_deselecting_an_unselected_cell_is_ignored() {
        let mut game = new_game(5, 5, 2);
        game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));

        let events = game.apply_action(GameAction::DeselectStart(Coord::new(3, 3)));

        assert!(events.is_empty());
        assert_eq!(
            game.board().start_selected().map(Position::coord),
            Some(Coord::new(0, 0))
        );
        let destinations = game.board().positions().iter().filter(|p| p.can_end_select()).count();
        assert_eq!(destinations, 6);
        assert_eq!(game.phase(), TurnPhase::AwaitingEnd);
    }

    #[test]
    fn test_invalid_selections_are_ignored() {
        let mut game = new_game(5, 5, 2);

        // End selection with nothing selected
        assert!(game.apply_action(GameAction::SelectEnd(Coord::new(1, 1))).is_empty());
        // Opponent's piece
        assert!(game.apply_action(GameAction::SelectStart(Coord::new(4, 4))).is_empty());
        // Off the board
        assert!(game.apply_action(GameAction::SelectStart(Coord::new(9, 9))).is_empty());

        game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));
        // Not a legal destination
        assert!(game.apply_action(GameAction::SelectEnd(Coord::new(3, 3))).is_empty());
        assert_eq!(game.phase(), TurnPhase::AwaitingEnd);
    }

    #[test]
    fn test_duplicate_move_keeps_origin() {
        let mut game = new_game(5, 5, 2);
        let ids = roster(&game);

        game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));
        let events = game.apply_action(GameAction::SelectEnd(Coord::new(1, 1)));

        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::MoveResolved { kind: MoveKind::Duplicate, .. }
        )));
        assert_eq!(game.board().count_owned(ids[0]), 2);
        assert_eq!(game.current_turn(), Some(ids[1]));
        assert_eq!(start_selected_count(&game), 0);
        assert!(game.board().positions().iter().all(|p| !p.is_end_selected()));
    }

    #[test]
    fn test_jump_move_vacates_origin() {
        let mut game = new_game(5, 5, 2);
        let ids = roster(&game);

        game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));
        game.apply_action(GameAction::SelectEnd(Coord::new(2, 0)));

        let owner = |x, y| game.board().position(Coord::new(x, y)).and_then(Position::occupier);
        assert_eq!(owner(0, 0), None);
        assert_eq!(owner(2, 0), Some(ids[0]));
        assert_eq!(game.board().count_owned(ids[0]), 1);
    }

    #[test]
    fn test_win_by_legal_moves_fills_board() {
        let mut game = new_game(5, 5, 2);
        let ids = roster(&game);
        let (mover, boxed_in) = (ids[0], ids[1]);

        arrange(
            &mut game,
            mover,
            &[
                ((0, 0), boxed_in),
                ((1, 0), mover),
                ((2, 0), mover),
                ((0, 1), mover),
                ((0, 2), mover),
                ((1, 1), mover),
                ((3, 3), mover),
            ],
        );

        game.apply_action(GameAction::SelectStart(Coord::new(3, 3)));
        let events = game.apply_action(GameAction::SelectEnd(Coord::new(2, 2)));

        assert!(events.contains(&GameEvent::GameWon {
            player: mover,
            win_type: WinType::LegalMoves,
        }));
        assert!(events.contains(&GameEvent::StatusChanged {
            status: GameStatus::Completed
        }));
        assert_eq!(game.status(), GameStatus::Completed);
        assert_eq!(game.winner(), Some(mover));
        assert_eq!(game.win_type(), WinType::LegalMoves);
        assert_eq!(game.outcome_for(mover), Some(Outcome::Win));
        assert_eq!(game.outcome_for(boxed_in), Some(Outcome::Lose));

        assert_eq!(game.board().count_owned(boxed_in), 1);
        assert_eq!(game.board().count_owned(mover), 24);
        for position in game.board().positions() {
            assert!(PositionFlag::ALL.iter().all(|f| !position.flag(*f)));
        }
    }

    #[test]
    fn test_completed_game_ignores_actions() {
        let mut game = new_game(3, 1, 2);
        let ids = roster(&game);

        game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));
        game.apply_action(GameAction::SelectEnd(Coord::new(1, 0)));
        assert_eq!(game.winner(), Some(ids[0]));
        assert_eq!(game.win_type(), WinType::LastManStanding);

        assert!(game.apply_action(GameAction::SelectStart(Coord::new(1, 0))).is_empty());
        assert!(game.apply_action(GameAction::TimerTick).is_empty());
        assert!(game.iterate_player_turn().is_empty());
        assert_eq!(game.phase(), TurnPhase::Completed);
    }

    #[test]
    fn test_timer_expiry_advances_turn_once() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let config = GameConfig::new(5, 5, ids)
            .with_time_limit_ms(Some(1000))
            .with_sample_rate_ms(250);
        let mut game = SlimeWars::new_with_rng(config, &mut StdRng::seed_from_u64(5)).unwrap();
        let order = roster(&game);

        let mut iterations = 0;
        for _ in 0..4 {
            let events = game.apply_action(GameAction::TimerTick);
            iterations += events
                .iter()
                .filter(|e| matches!(e, GameEvent::TurnIterated { .. }))
                .count();
        }

        assert_eq!(iterations, 1);
        assert_eq!(game.current_turn(), Some(order[1]));
        assert_eq!(game.turn_time_remaining(), Some(Duration::from_millis(1000)));
        assert_eq!(game.sample_rate_milliseconds(), 250);
    }

    #[test]
    fn test_countdown_ticks_emit_nothing() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let config = GameConfig::new(5, 5, ids)
            .with_time_limit_ms(Some(1000))
            .with_sample_rate_ms(250);
        let mut game = SlimeWars::new(config).unwrap();

        assert!(game.apply_action(GameAction::TimerTick).is_empty());
        assert_eq!(game.turn_time_remaining(), Some(Duration::from_millis(750)));
    }

    #[test]
    fn test_move_resets_turn_timer() {
        let ids = vec![Uuid::new_v4(), Uuid::new_v4()];
        let config = GameConfig::new(5, 5, ids)
            .with_time_limit_ms(Some(1000))
            .with_sample_rate_ms(250);
        let mut game = SlimeWars::new(config).unwrap();

        game.apply_action(GameAction::TimerTick);
        game.apply_action(GameAction::TimerTick);
        assert_eq!(game.turn_time_remaining(), Some(Duration::from_millis(500)));

        game.apply_action(GameAction::SelectStart(Coord::new(0, 0)));
        game.apply_action(GameAction::SelectEnd(Coord::new(1, 0)));
        assert_eq!(game.turn_time_remaining(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_no_timer_without_limit() {
        let game = new_game(5, 5, 2);
        assert_eq!(game.turn_time_remaining(), None);
        assert!(game.timer().is_none());
    }

    #[test]
    fn test_json_snapshot() {
        let game = new_game(3, 3, 2);
        let json = game.to_json().unwrap();
        let parsed: GameStateJson = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.status, GameStatus::InProgress);
        assert_eq!(parsed.players.len(), 2);
        assert_eq!(parsed.board.len(), 9);
    }
}
