//! Height-mapped terrain grid. Read-only once built.

use serde::{Deserialize, Serialize};

use crate::{Cell, GridError, Rgb, SideId};

/// Tiles higher than this block movement and placement.
pub const FLOOR_HEIGHT: u8 = 1;

const MARKER_CHANNEL: u8 = 128;
const FIRST_SEAT_MARKER: u8 = 129;
const SECOND_SEAT_MARKER: u8 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub height: u8,
    pub color: Rgb,
}

impl Tile {
    pub const fn floor() -> Self {
        Self {
            height: FLOOR_HEIGHT,
            color: Rgb::new(200, 200, 200),
        }
    }

    pub const fn is_obstructed(&self) -> bool {
        self.height > FLOOR_HEIGHT
    }
}

/// Default owner encoded by an objective marker tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerOwner {
    Neutral,
    /// Owned by whoever holds the first seat.
    FirstSeat,
    /// Owned by the second seat; stored under the placeholder side until claimed.
    SecondSeat,
}

impl MarkerOwner {
    /// Placeholder side recorded for second-seat markers before the second
    /// player has joined.
    pub fn placeholder() -> SideId {
        SideId::from("user2")
    }

    pub fn side(&self, first_seat: &SideId) -> SideId {
        match self {
            MarkerOwner::Neutral => SideId::neutral(),
            MarkerOwner::FirstSeat => first_seat.clone(),
            MarkerOwner::SecondSeat => Self::placeholder(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    depth: i32,
    /// Row-major: index = z * width + x.
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: i32, depth: i32, tiles: Vec<Tile>) -> Result<Self, GridError> {
        if width <= 0 || depth <= 0 {
            return Err(GridError::EmptyGrid { width, depth });
        }
        let expected = width as usize * depth as usize;
        if tiles.len() != expected {
            return Err(GridError::TileCount {
                expected,
                actual: tiles.len(),
            });
        }
        let grid = Self {
            width,
            depth,
            tiles,
        };
        if let Some(cell) = grid.cells().find(|&c| grid.height(c) == Some(0)) {
            return Err(GridError::ZeroHeight(cell));
        }
        Ok(grid)
    }

    /// A grid of floor tiles.
    pub fn flat(width: i32, depth: i32) -> Result<Self, GridError> {
        let count = width.max(0) as usize * depth.max(0) as usize;
        Self::new(width, depth, vec![Tile::floor(); count])
    }

    /// Replace one tile while building a grid. Out-of-range cells are ignored.
    #[must_use]
    pub fn with_tile(mut self, cell: Cell, tile: Tile) -> Self {
        if let Some(index) = self.index(cell) {
            self.tiles[index] = tile;
        }
        self
    }

    #[must_use]
    pub fn with_height(self, cell: Cell, height: u8) -> Self {
        match self.tile(cell).copied() {
            Some(tile) => self.with_tile(cell, Tile { height, ..tile }),
            None => self,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn in_range(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && x < self.width && z < self.depth
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.in_range(cell.x, cell.z)
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.z as usize * self.width as usize + cell.x as usize)
    }

    pub fn tile(&self, cell: Cell) -> Option<&Tile> {
        self.index(cell).map(|i| &self.tiles[i])
    }

    pub fn height(&self, cell: Cell) -> Option<u8> {
        self.tile(cell).map(|t| t.height)
    }

    pub fn tile_kind(&self, cell: Cell) -> Option<Rgb> {
        self.tile(cell).map(|t| t.color)
    }

    /// Out-of-range cells count as obstructed.
    pub fn is_obstructed(&self, cell: Cell) -> bool {
        self.tile(cell).map_or(true, Tile::is_obstructed)
    }

    /// In range and not obstructed.
    pub fn is_open(&self, cell: Cell) -> bool {
        !self.is_obstructed(cell)
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.depth).flat_map(move |z| (0..self.width).map(move |x| Cell::new(x, z)))
    }

    /// Objective marker tiles (`r == g == 128`) in row-major order.
    pub fn markers(&self) -> impl Iterator<Item = (Cell, MarkerOwner)> + '_ {
        self.cells().filter_map(move |cell| {
            let color = self.tile_kind(cell)?;
            if color.r != MARKER_CHANNEL || color.g != MARKER_CHANNEL {
                return None;
            }
            let owner = match color.b {
                FIRST_SEAT_MARKER => MarkerOwner::FirstSeat,
                SECOND_SEAT_MARKER => MarkerOwner::SecondSeat,
                _ => MarkerOwner::Neutral,
            };
            Some((cell, owner))
        })
    }
}
