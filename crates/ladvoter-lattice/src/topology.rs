//! Periodic square lattice topology.
//!
//! Sites are numbered row-major, `i = row * L + col`, on an `L x L` torus.
//! The four neighbor tables are precomputed once per run:
//!
//! ```text
//! right(i) = (i + 1) mod L + (i div L) * L
//! left(i)  = (i - 1 + L) mod L + (i div L) * L
//! up(i)    = (i - L + N) mod N
//! down(i)  = (i + L) mod N
//! ```
//!
//! The neighbor order `[right, left, up, down]` is part of the random draw
//! contract: a uniform draw in `[0, 4)` selects the neighbor at that slot.

// Neighbor tables are built once from `side`; every entry is below N.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use crate::error::LatticeError;

/// Number of nearest neighbors on the square lattice.
pub const NEIGHBOR_COUNT: usize = 4;

/// Precomputed neighbor tables for an `L x L` periodic lattice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    side: usize,
    sites: usize,
    right: Vec<usize>,
    left: Vec<usize>,
    up: Vec<usize>,
    down: Vec<usize>,
}

impl Topology {
    /// Build the neighbor tables for a lattice of linear size `side`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::InvalidSide`] if `side < 2`, or
    /// [`LatticeError::SideTooLarge`] if `side * side` overflows or exceeds
    /// the opinion id range.
    pub fn new(side: usize) -> Result<Self, LatticeError> {
        if side < 2 {
            return Err(LatticeError::InvalidSide(side));
        }
        let sites = side
            .checked_mul(side)
            .filter(|n| i32::try_from(*n).is_ok())
            .ok_or(LatticeError::SideTooLarge(side))?;

        let right = (0..sites).map(|i| (i + 1) % side + (i / side) * side).collect();
        let left = (0..sites)
            .map(|i| (i + side - 1) % side + (i / side) * side)
            .collect();
        let up = (0..sites).map(|i| (i + sites - side) % sites).collect();
        let down = (0..sites).map(|i| (i + side) % sites).collect();

        Ok(Self {
            side,
            sites,
            right,
            left,
            up,
            down,
        })
    }

    /// Linear size `L`.
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Number of sites `N = L * L`.
    pub const fn site_count(&self) -> usize {
        self.sites
    }

    /// Right neighbor (same row, next column, wrapping).
    pub fn right(&self, site: usize) -> usize {
        self.right[site]
    }

    /// Left neighbor (same row, previous column, wrapping).
    pub fn left(&self, site: usize) -> usize {
        self.left[site]
    }

    /// Up neighbor (previous row, wrapping).
    pub fn up(&self, site: usize) -> usize {
        self.up[site]
    }

    /// Down neighbor (next row, wrapping).
    pub fn down(&self, site: usize) -> usize {
        self.down[site]
    }

    /// Neighbor in slot `slot` of `[right, left, up, down]`.
    pub fn neighbor(&self, site: usize, slot: usize) -> usize {
        match slot {
            0 => self.right[site],
            1 => self.left[site],
            2 => self.up[site],
            _ => self.down[site],
        }
    }

    /// All four neighbors in `[right, left, up, down]` order.
    pub fn neighbors(&self, site: usize) -> [usize; NEIGHBOR_COUNT] {
        [
            self.right[site],
            self.left[site],
            self.up[site],
            self.down[site],
        ]
    }

    /// Row of a site.
    pub const fn row(&self, site: usize) -> usize {
        site / self.side
    }

    /// Column of a site.
    pub const fn column(&self, site: usize) -> usize {
        site % self.side
    }

    /// Site index of `(row, column)`.
    pub const fn site_at(&self, row: usize, column: usize) -> usize {
        row * self.side + column
    }
}
