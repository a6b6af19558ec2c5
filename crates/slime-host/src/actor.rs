//! Game actor: owns a `SlimeWars` and serialises every action on it.
//!
//! Everything that wants to touch the game (bot drivers, the ticker, the
//! arena) holds a cloneable [`GameHandle`]. Actions go through an mpsc
//! mailbox, replies come back on a oneshot, and every resulting event is
//! also broadcast to subscribers.

use crate::config::ArenaError;
use slime_core::{GameAction, GameEvent, GameStatus, PlayerId, SlimeWars};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, trace};

const MAILBOX_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 1024;

/// Commands accepted by the game actor
#[derive(Debug)]
pub enum GameCommand {
    Apply {
        action: GameAction,
        reply: oneshot::Sender<Vec<GameEvent>>,
    },
    /// Apply only while it is `player`'s turn; `None` otherwise
    ApplyAs {
        player: PlayerId,
        action: GameAction,
        reply: oneshot::Sender<Option<Vec<GameEvent>>>,
    },
    Status {
        reply: oneshot::Sender<GameStatus>,
    },
    Snapshot {
        reply: oneshot::Sender<SlimeWars>,
    },
}

/// Cloneable access to a running game actor
#[derive(Debug, Clone)]
pub struct GameHandle {
    sender: mpsc::Sender<GameCommand>,
    events: broadcast::Sender<GameEvent>,
}

impl GameHandle {
    /// Apply an action and wait for the events it caused
    pub async fn apply(&self, action: GameAction) -> Result<Vec<GameEvent>, ArenaError> {
        self.request(|reply| GameCommand::Apply { action, reply }).await
    }

    /// Apply an action on behalf of `player`.
    ///
    /// The turn check and the action happen in one step, so a turn that
    /// moved on in the meantime is never played by the wrong player.
    pub async fn apply_as(
        &self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Option<Vec<GameEvent>>, ArenaError> {
        self.request(|reply| GameCommand::ApplyAs { player, action, reply })
            .await
    }

    pub async fn status(&self) -> Result<GameStatus, ArenaError> {
        self.request(|reply| GameCommand::Status { reply }).await
    }

    /// A copy of the current game state
    pub async fn snapshot(&self) -> Result<SlimeWars, ArenaError> {
        self.request(|reply| GameCommand::Snapshot { reply }).await
    }

    /// Receive every event from now on
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> GameCommand,
    ) -> Result<T, ArenaError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| ArenaError::ActorClosed)?;
        rx.await.map_err(|_| ArenaError::ActorClosed)
    }
}

/// Move `game` into a new actor task
pub fn spawn_game(mut game: SlimeWars) -> (GameHandle, JoinHandle<()>) {
    let (sender, mut mailbox) = mpsc::channel(MAILBOX_CAPACITY);
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    let handle = GameHandle {
        sender,
        events: events.clone(),
    };

    let task = tokio::spawn(async move {
        while let Some(command) = mailbox.recv().await {
            match command {
                GameCommand::Apply { action, reply } => {
                    let _ = reply.send(apply_and_broadcast(&mut game, &events, action));
                }
                GameCommand::ApplyAs {
                    player,
                    action,
                    reply,
                } => {
                    let produced = (game.status() == GameStatus::InProgress
                        && game.current_turn() == Some(player))
                    .then(|| apply_and_broadcast(&mut game, &events, action));
                    if produced.is_none() {
                        trace!(%player, ?action, "not this player's turn");
                    }
                    let _ = reply.send(produced);
                }
                GameCommand::Status { reply } => {
                    let _ = reply.send(game.status());
                }
                GameCommand::Snapshot { reply } => {
                    let _ = reply.send(game.clone());
                }
            }
        }
        debug!("game actor stopped");
    });

    (handle, task)
}

fn apply_and_broadcast(
    game: &mut SlimeWars,
    events: &broadcast::Sender<GameEvent>,
    action: GameAction,
) -> Vec<GameEvent> {
    let produced = game.apply_action(action);
    trace!(?action, events = produced.len(), "action applied");
    for event in &produced {
        // No subscribers is fine
        let _ = events.send(event.clone());
    }
    produced
}

/// Send a timer tick every `sample_rate` until the game completes.
///
/// Returns `None` for a zero sample rate, which would never advance the
/// countdown anyway.
pub fn spawn_ticker(handle: GameHandle, sample_rate: Duration) -> Option<JoinHandle<()>> {
    if sample_rate.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = interval(sample_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if handle.apply(GameAction::TimerTick).await.is_err() {
                break;
            }
            // Moves complete the game between ticks, so ask rather than
            // looking at the tick's own events
            match handle.status().await {
                Ok(GameStatus::InProgress) => {}
                _ => break,
            }
        }
        debug!("ticker stopped");
    }))
}
