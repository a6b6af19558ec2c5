//! Game board representation.
//!
//! This module contains:
//! - `Position`: a single cell with its occupier and selection flags
//! - `PositionFlag` / `BoardChange`: change notifications raised by flag writes
//! - `Board`: the rectangular grid, the current turn, and the pending change buffer
//!
//! Selection flags can only be written through [`Board`], which records a
//! [`BoardChange`] for every assignment. The rule engine drains that buffer
//! after each action and reports it as events.

use crate::game::GameError;
use crate::geometry::{neighbors, straight_line_neighbors, Coord, Located};
use crate::player::PlayerId;
use serde::{Deserialize, Serialize};

/// The four selection flags carried by every position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionFlag {
    /// The current player may pick this cell as the piece to move
    CanStartSelect,
    /// This cell is the piece being moved
    IsStartSelected,
    /// This cell is a legal destination for the selected piece
    CanEndSelect,
    /// This cell was chosen as the destination
    IsEndSelected,
}

impl PositionFlag {
    pub const ALL: [PositionFlag; 4] = [
        PositionFlag::CanStartSelect,
        PositionFlag::IsStartSelected,
        PositionFlag::CanEndSelect,
        PositionFlag::IsEndSelected,
    ];
}

/// A single flag assignment on a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardChange {
    pub coord: Coord,
    pub flag: PositionFlag,
}

/// One cell of the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    coord: Coord,
    occupier: Option<PlayerId>,
    can_start_select: bool,
    is_start_selected: bool,
    can_end_select: bool,
    is_end_selected: bool,
}

impl Position {
    /// Create an empty, unselected position. Negative coordinates are
    /// treated as their absolute value.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            coord: Coord::new(x, y),
            occupier: None,
            can_start_select: false,
            is_start_selected: false,
            can_end_select: false,
            is_end_selected: false,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn x(&self) -> u32 {
        self.coord.x
    }

    pub fn y(&self) -> u32 {
        self.coord.y
    }

    /// The player whose slime sits here, if any
    pub fn occupier(&self) -> Option<PlayerId> {
        self.occupier
    }

    pub fn is_occupied(&self) -> bool {
        self.occupier.is_some()
    }

    pub fn is_occupied_by(&self, player: PlayerId) -> bool {
        self.occupier == Some(player)
    }

    pub fn can_start_select(&self) -> bool {
        self.can_start_select
    }

    pub fn is_start_selected(&self) -> bool {
        self.is_start_selected
    }

    pub fn can_end_select(&self) -> bool {
        self.can_end_select
    }

    pub fn is_end_selected(&self) -> bool {
        self.is_end_selected
    }

    /// Read a flag by name
    pub fn flag(&self, flag: PositionFlag) -> bool {
        match flag {
            PositionFlag::CanStartSelect => self.can_start_select,
            PositionFlag::IsStartSelected => self.is_start_selected,
            PositionFlag::CanEndSelect => self.can_end_select,
            PositionFlag::IsEndSelected => self.is_end_selected,
        }
    }

    fn set_flag(&mut self, flag: PositionFlag, value: bool) -> BoardChange {
        match flag {
            PositionFlag::CanStartSelect => self.can_start_select = value,
            PositionFlag::IsStartSelected => self.is_start_selected = value,
            PositionFlag::CanEndSelect => self.can_end_select = value,
            PositionFlag::IsEndSelected => self.is_end_selected = value,
        }
        BoardChange {
            coord: self.coord,
            flag,
        }
    }
}

impl Located for Position {
    fn coord(&self) -> Coord {
        self.coord
    }
}

/// The rectangular SlimeWars board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: u32,
    height: u32,
    /// Row-major: index = y * width + x
    positions: Vec<Position>,
    current_turn: Option<PlayerId>,
    #[serde(skip)]
    changes: Vec<BoardChange>,
}

impl Board {
    /// Create an empty board.
    ///
    /// Zero in either dimension is rejected, as is a board whose cell count
    /// overflows `u32`; negative dimensions are taken as their absolute value.
    pub fn new(width: i32, height: i32) -> Result<Self, GameError> {
        if width == 0 {
            return Err(GameError::InvalidWidth);
        }
        if height == 0 {
            return Err(GameError::InvalidHeight);
        }

        let width = width.unsigned_abs();
        let height = height.unsigned_abs();

        // Cell indices are computed in u32
        let cells = width
            .checked_mul(height)
            .ok_or(GameError::BoardTooLarge { width, height })?;

        let mut positions = Vec::with_capacity(cells as usize);
        for y in 0..height {
            for x in 0..width {
                positions.push(Position {
                    coord: Coord { x, y },
                    ..Position::new(0, 0)
                });
            }
        }

        Ok(Self {
            width,
            height,
            positions,
            current_turn: None,
            changes: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All positions in creation (row-major) order
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Index of a coordinate, or `None` if it is off the board
    pub fn index_of(&self, coord: Coord) -> Option<usize> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        Some((coord.y * self.width + coord.x) as usize)
    }

    pub fn position(&self, coord: Coord) -> Option<&Position> {
        self.index_of(coord).and_then(|i| self.positions.get(i))
    }

    fn position_mut(&mut self, coord: Coord) -> Option<&mut Position> {
        self.index_of(coord).and_then(|i| self.positions.get_mut(i))
    }

    /// Whose turn it is, if the game has started
    pub fn current_turn(&self) -> Option<PlayerId> {
        self.current_turn
    }

    pub(crate) fn set_current_turn(&mut self, player: Option<PlayerId>) {
        self.current_turn = player;
    }

    /// Assign a selection flag and record the change.
    ///
    /// The notification is recorded on every assignment, even when the value
    /// does not change. Returns false if the coordinate is off the board.
    pub(crate) fn set_flag(&mut self, coord: Coord, flag: PositionFlag, value: bool) -> bool {
        let Some(position) = self.position_mut(coord) else {
            return false;
        };
        let change = position.set_flag(flag, value);
        self.changes.push(change);
        true
    }

    pub(crate) fn set_occupier(&mut self, coord: Coord, player: Option<PlayerId>) {
        if let Some(position) = self.position_mut(coord) {
            position.occupier = player;
        }
    }

    /// Clear all four selection flags on every position.
    ///
    /// Occupiers are left untouched.
    pub(crate) fn reset_selection(&mut self) {
        for position in &mut self.positions {
            for flag in PositionFlag::ALL {
                self.changes.push(position.set_flag(flag, false));
            }
        }
    }

    /// Drain the pending change notifications
    pub(crate) fn take_changes(&mut self) -> Vec<BoardChange> {
        std::mem::take(&mut self.changes)
    }

    /// The position currently selected as the piece to move
    pub fn start_selected(&self) -> Option<&Position> {
        self.positions.iter().find(|p| p.is_start_selected)
    }

    /// Positions occupied by a player
    pub fn owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Position> {
        self.positions.iter().filter(move |p| p.is_occupied_by(player))
    }

    /// Number of cells a player occupies
    pub fn count_owned(&self, player: PlayerId) -> usize {
        self.owned_by(player).count()
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_occupied()).count()
    }

    /// Coordinates within one step of `coord` (the infection zone)
    pub fn adjacent_coords(&self, coord: Coord) -> Vec<Coord> {
        neighbors(coord, &self.positions, 1)
            .into_iter()
            .map(Position::coord)
            .collect()
    }

    /// Empty cells a piece at `coord` could move to: within two steps, on a
    /// straight line, and unoccupied
    pub fn destinations_from(&self, coord: Coord) -> Vec<Coord> {
        straight_line_neighbors(coord, &self.positions)
            .into_iter()
            .filter(|p| !p.is_occupied())
            .map(Position::coord)
            .collect()
    }

    /// The four starting cells in placement order: first, last, end of the
    /// top row, start of the bottom row
    pub fn anchor_indices(&self) -> [usize; 4] {
        let len = self.positions.len();
        let width = self.width as usize;
        [0, len - 1, width - 1, len - width]
    }
}
