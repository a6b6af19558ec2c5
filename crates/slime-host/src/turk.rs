//! Bot driver: plays a `RandomBot` against a running game actor.
//!
//! The driver wakes up whenever the board settles, and when the game is
//! waiting on its bot it thinks for a while and then makes a move through
//! the actor, one selection at a time.

use crate::actor::GameHandle;
use crate::config::ArenaError;
use slime_core::{GameAction, GameEvent, RandomBot, TurnPhase};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Play `bot` until the game completes or the actor goes away
pub async fn drive_bot(handle: GameHandle, mut bot: RandomBot) -> Result<(), ArenaError> {
    let mut events = handle.subscribe();

    loop {
        let game = handle.snapshot().await?;
        if game.is_finished() {
            debug!(player = %bot.player_id, "game over, bot leaving");
            return Ok(());
        }

        // A piece left selected means this turn already failed to find a
        // move; the timer will take it from here
        if bot.is_my_turn(&game) && game.phase() == TurnPhase::AwaitingStart {
            take_turn(&handle, &mut bot).await?;
        }

        wait_for_settle(&mut events).await?;
    }
}

async fn take_turn(handle: &GameHandle, bot: &mut RandomBot) -> Result<(), ArenaError> {
    tokio::time::sleep(bot.thinking_delay()).await;

    // Pieces with nowhere to go are retried without thinking again
    let mut attempted = Vec::new();
    loop {
        let game = handle.snapshot().await?;
        if !bot.is_my_turn(&game) {
            debug!(player = %bot.player_id, "turn passed while thinking");
            return Ok(());
        }

        let Some(start) = bot.choose_start(game.board(), &attempted) else {
            debug!(player = %bot.player_id, "no piece can move");
            return Ok(());
        };
        attempted.push(start);
        let selected = handle
            .apply_as(bot.player_id, GameAction::SelectStart(start))
            .await?;
        if selected.is_none() {
            debug!(player = %bot.player_id, "turn passed before selecting");
            return Ok(());
        }

        let game = handle.snapshot().await?;
        if let Some(end) = bot.choose_end(game.board()) {
            debug!(player = %bot.player_id, from = %start, to = %end, "bot moving");
            // Refused if the timer moved the turn on since the snapshot
            handle
                .apply_as(bot.player_id, GameAction::SelectEnd(end))
                .await?;
            return Ok(());
        }
    }
}

/// Wait until the next batch of changes is complete
async fn wait_for_settle(events: &mut broadcast::Receiver<GameEvent>) -> Result<(), ArenaError> {
    loop {
        match events.recv().await {
            Ok(GameEvent::BoardSettled) => return Ok(()),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                // The caller re-reads a snapshot anyway
                warn!(skipped, "bot driver lagged behind game events");
                return Ok(());
            }
            Err(RecvError::Closed) => return Err(ArenaError::ActorClosed),
        }
    }
}
