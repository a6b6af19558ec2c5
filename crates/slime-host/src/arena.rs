//! Bot-versus-bot matches.
//!
//! A match spawns the game actor, a ticker when the game has a turn timer,
//! and one bot driver per player, then watches the event stream until
//! somebody wins, the turn stalls, the turn cap is hit, or nothing happens
//! for too long.

use crate::actor::{spawn_game, spawn_ticker, GameHandle};
use crate::config::{ArenaConfig, ArenaError};
use crate::turk::drive_bot;
use serde::Serialize;
use slime_core::{GameEvent, Outcome, PlayerColor, PlayerId, RandomBot, SlimeWars, WinType};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};
use uuid::Uuid;

/// How a match ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchResult {
    Won { winner: PlayerId, win_type: WinType },
    /// The turn landed on a player with no pieces and cannot move on
    Stalled { player: PlayerId },
    TurnLimit,
    Idle,
}

/// One player's final position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub player: PlayerId,
    pub color: PlayerColor,
    pub cells: usize,
    pub outcome: Option<Outcome>,
}

/// Summary of a finished match
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub result: MatchResult,
    pub turns: usize,
    /// Sorted by cells held, most first
    pub standings: Vec<Standing>,
}

impl MatchReport {
    fn new(result: MatchResult, turns: usize, game: &SlimeWars) -> Self {
        let mut standings: Vec<Standing> = game
            .players()
            .iter()
            .map(|p| Standing {
                player: p.id,
                color: p.color,
                cells: game.board().count_owned(p.id),
                outcome: game.outcome_for(p.id),
            })
            .collect();
        standings.sort_by(|a, b| b.cells.cmp(&a.cells));

        Self {
            result,
            turns,
            standings,
        }
    }
}

/// Play one match with fresh players
pub async fn run_match(config: &ArenaConfig) -> Result<MatchReport, ArenaError> {
    let ids: Vec<PlayerId> = (0..config.players).map(|_| Uuid::new_v4()).collect();
    let game = SlimeWars::new(config.game_config(ids))?;

    info!(
        width = config.width,
        height = config.height,
        players = config.players,
        "starting match"
    );
    for player in game.players() {
        info!(player = %player.id, color = %player.color, "player joined");
    }

    let sample_rate = Duration::from_millis(game.sample_rate_milliseconds());
    let has_timer = game.timer().is_some();
    let roster: Vec<PlayerId> = game.players().iter().map(|p| p.id).collect();

    let (handle, actor) = spawn_game(game);
    let mut events = handle.subscribe();

    let ticker = if has_timer {
        spawn_ticker(handle.clone(), sample_rate)
    } else {
        None
    };
    let drivers: Vec<_> = roster
        .into_iter()
        .map(|id| tokio::spawn(drive_bot(handle.clone(), RandomBot::new(id, config.thinking))))
        .collect();

    let outcome = supervise(&handle, &mut events, config.max_turns, config.idle_timeout).await;

    if let Some(ticker) = ticker {
        ticker.abort();
    }
    for driver in drivers {
        driver.abort();
    }

    let (result, turns) = outcome?;
    let game = handle.snapshot().await?;
    actor.abort();

    info!(?result, turns, "match finished");
    Ok(MatchReport::new(result, turns, &game))
}

async fn supervise(
    handle: &GameHandle,
    events: &mut broadcast::Receiver<GameEvent>,
    max_turns: usize,
    idle_timeout: Duration,
) -> Result<(MatchResult, usize), ArenaError> {
    let mut turns = 0;

    loop {
        let Ok(received) = tokio::time::timeout(idle_timeout, events.recv()).await else {
            warn!(?idle_timeout, "no game events, giving up");
            return Ok((MatchResult::Idle, turns));
        };

        match received {
            Ok(GameEvent::GameWon { player, win_type }) => {
                return Ok((MatchResult::Won { winner: player, win_type }, turns));
            }
            Ok(GameEvent::TurnStalled { player }) => {
                warn!(%player, "turn stalled");
                return Ok((MatchResult::Stalled { player }, turns));
            }
            Ok(GameEvent::TurnIterated { .. }) => {
                turns += 1;
                if turns >= max_turns {
                    return Ok((MatchResult::TurnLimit, turns));
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "arena lagged behind game events");
                let game = handle.snapshot().await?;
                if let Some(result) = settled_result(&game) {
                    return Ok((result, turns));
                }
            }
            Err(RecvError::Closed) => return Err(ArenaError::ActorClosed),
        }
    }
}

/// The result of a game that has already ended, read from its state
fn settled_result(game: &SlimeWars) -> Option<MatchResult> {
    if let Some(winner) = game.winner() {
        return Some(MatchResult::Won {
            winner,
            win_type: game.win_type(),
        });
    }
    match (game.is_stalled(), game.current_turn()) {
        (true, Some(player)) => Some(MatchResult::Stalled { player }),
        _ => None,
    }
}
