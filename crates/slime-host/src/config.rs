//! Arena configuration read from the environment.

use slime_core::{GameConfig, GameError, PlayerId, ThinkingTime};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Game rejected configuration: {0}")]
    Game(#[from] GameError),

    #[error("Game actor has shut down")]
    ActorClosed,
}

/// Settings for one bot-versus-bot match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    pub width: i32,
    pub height: i32,
    pub players: usize,
    /// `None` runs without a turn timer
    pub turn_limit_ms: Option<i64>,
    pub sample_rate_ms: i64,
    pub thinking: ThinkingTime,
    /// Turn advances after which the match is called off
    pub max_turns: usize,
    /// How long the match may go without any event
    pub idle_timeout: Duration,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 7,
            height: 7,
            players: 2,
            turn_limit_ms: Some(5_000),
            sample_rate_ms: 100,
            thinking: ThinkingTime::Fast,
            max_turns: 500,
            idle_timeout: Duration::from_secs(30),
        }
    }
}

impl ArenaConfig {
    /// Read `BOARD_WIDTH`, `BOARD_HEIGHT`, `PLAYERS`, `TURN_LIMIT_MS`,
    /// `SAMPLE_RATE_MS`, `THINKING`, `MAX_TURNS` and `IDLE_TIMEOUT_MS`,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Result<Self, ArenaError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ArenaConfig::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ArenaError> {
        let defaults = Self::default();

        let turn_limit_ms = match lookup("TURN_LIMIT_MS") {
            Some(value) if value.eq_ignore_ascii_case("none") => None,
            Some(value) => Some(parse("TURN_LIMIT_MS", value)?),
            None => defaults.turn_limit_ms,
        };

        let idle_timeout = match lookup("IDLE_TIMEOUT_MS") {
            Some(value) => Duration::from_millis(parse("IDLE_TIMEOUT_MS", value)?),
            None => defaults.idle_timeout,
        };

        Ok(Self {
            width: parse_or(&lookup, "BOARD_WIDTH", defaults.width)?,
            height: parse_or(&lookup, "BOARD_HEIGHT", defaults.height)?,
            players: parse_or(&lookup, "PLAYERS", defaults.players)?,
            turn_limit_ms,
            sample_rate_ms: parse_or(&lookup, "SAMPLE_RATE_MS", defaults.sample_rate_ms)?,
            thinking: parse_or(&lookup, "THINKING", defaults.thinking)?,
            max_turns: parse_or(&lookup, "MAX_TURNS", defaults.max_turns)?,
            idle_timeout,
        })
    }

    /// Engine configuration for the given players
    pub fn game_config(&self, players: Vec<PlayerId>) -> GameConfig {
        GameConfig::new(self.width, self.height, players)
            .with_time_limit_ms(self.turn_limit_ms)
            .with_sample_rate_ms(self.sample_rate_ms)
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ArenaError> {
    value
        .trim()
        .parse()
        .map_err(|_| ArenaError::InvalidEnv { name, value })
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ArenaError> {
    match lookup(name) {
        Some(value) => parse(name, value),
        None => Ok(default),
    }
}
