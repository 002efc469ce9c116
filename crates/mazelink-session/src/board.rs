//! Full-board snapshots.
//!
//! `MAZE` answers with every tile of the board as one flat list, row by
//! row: token `i` is the tile at column `i % width`, row `i / width`. A
//! [`Board`] reshapes that list into columns so that `board[x][y]` is the
//! tile at `(x, y)`.
//!
//! ```text
//! DATA a b c d e f        width = 3, height = 2
//!
//!        x=0 x=1 x=2
//!  y=0    a   b   c       board[0] = [a, d]
//!  y=1    d   e   f       board[2] = [c, f]
//! ```

use std::fmt;
use std::ops::Index;

use mazelink_protocol::ProtocolError;
use serde::Serialize;

/// An immutable `width × height` grid of tile values.
///
/// Boards are rebuilt from a fresh `MAZE` response on every request; they
/// are never patched as the player moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    width: usize,
    height: usize,
    columns: Vec<Vec<i32>>,
}

impl Board {
    /// Builds a board from a row-major list of `width * height` values.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidPayload`] if the number of values
    /// does not match the dimensions.
    pub fn from_row_major(
        width: usize,
        height: usize,
        values: &[i32],
    ) -> Result<Self, ProtocolError> {
        let expected = width.checked_mul(height).ok_or_else(|| {
            ProtocolError::InvalidPayload(format!(
                "board dimensions {width}x{height} overflow"
            ))
        })?;
        if values.len() != expected {
            return Err(ProtocolError::InvalidPayload(format!(
                "expected {expected} tiles for a {width}x{height} board, got {}",
                values.len()
            )));
        }

        let mut columns = vec![Vec::with_capacity(height); width];
        for (i, &value) in values.iter().enumerate() {
            columns[i % width].push(value);
        }

        Ok(Self {
            width,
            height,
            columns,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the tile at `(x, y)`, or `None` if it is off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        self.columns.get(x)?.get(y).copied()
    }

    /// Like [`get`](Self::get) but takes signed coordinates, so a
    /// neighbour lookup such as `(x - 1, y)` at the left edge just returns
    /// `None`.
    pub fn try_get(&self, x: i32, y: i32) -> Option<i32> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.get(x, y)
    }

    /// The columns, left to right. Each column is `height` values, top to
    /// bottom.
    pub fn columns(&self) -> &[Vec<i32>] {
        &self.columns
    }

    /// Iterates over `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| (x, y, self.columns[x][y]))
        })
    }

    /// Flattens the board back into the row-major order `MAZE` uses.
    pub fn to_row_major(&self) -> Vec<i32> {
        self.iter().map(|(_, _, value)| value).collect()
    }
}

/// `board[x]` is column `x`, so `board[x][y]` is the tile at `(x, y)`.
impl Index<usize> for Board {
    type Output = [i32];

    fn index(&self, x: usize) -> &[i32] {
        &self.columns[x]
    }
}

/// `board[(x, y)]` is the tile at `(x, y)`.
impl Index<(usize, usize)> for Board {
    type Output = i32;

    fn index(&self, (x, y): (usize, usize)) -> &i32 {
        &self.columns[x][y]
    }
}

/// Prints one row per line, values separated by spaces.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                if x > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", self.columns[x][y])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
