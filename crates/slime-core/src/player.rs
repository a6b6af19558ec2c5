//! Player identity and colours.
//!
//! A player is nothing more than an opaque id and the colour its slime is
//! drawn in. Players never change once created; the board only refers to
//! them by [`PlayerId`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique player identifier
pub type PlayerId = Uuid;

/// Slime colour for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    Yellow,
    Red,
    Green,
    Blue,
}

impl PlayerColor {
    /// The SlimeWars palette.
    ///
    /// Colours are handed out from the end of the palette, so the first
    /// player built gets `Blue`, then `Green`, `Red`, `Yellow`.
    pub fn default_palette() -> Vec<PlayerColor> {
        vec![
            PlayerColor::Yellow,
            PlayerColor::Red,
            PlayerColor::Green,
            PlayerColor::Blue,
        ]
    }

    /// Colour name
    pub fn name(&self) -> &'static str {
        match self {
            PlayerColor::Yellow => "Yellow",
            PlayerColor::Red => "Red",
            PlayerColor::Green => "Green",
            PlayerColor::Blue => "Blue",
        }
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            PlayerColor::Yellow => 0xF1C40F,
            PlayerColor::Red => 0xE74C3C,
            PlayerColor::Green => 0x2ECC71,
            PlayerColor::Blue => 0x3498DB,
        }
    }
}

impl std::fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A player taking part in a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier
    pub id: PlayerId,
    /// Colour representing this player's slime
    pub color: PlayerColor,
}

impl Player {
    /// Create a player with the given id and colour
    pub fn new(id: PlayerId, color: PlayerColor) -> Self {
        Self { id, color }
    }
}
