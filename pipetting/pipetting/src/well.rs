use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;

/// A well position on a piece of labware, e.g. `A1` or `H12`.
///
/// Row letter first, then the 1-based column number. Ordering is column-major
/// (`A1 < B1 < ... < H1 < A2`), the order the tips of a multichannel pipette
/// sweep a plate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct WellName {
    row: char,
    column: u32,
}

impl WellName {
    pub fn new(row: char, column: u32) -> Result<Self, WellNameError> {
        if !row.is_ascii_uppercase() {
            return Err(WellNameError::InvalidRow(row));
        }
        if column == 0 {
            return Err(WellNameError::InvalidColumn(column));
        }
        Ok(Self {
            row,
            column,
        })
    }

    pub fn row(&self) -> char {
        self.row
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index, `A` = 0.
    pub fn row_index(&self) -> u32 {
        self.row as u32 - 'A' as u32
    }
}

impl FromStr for WellName {
    type Err = WellNameError;

    fn from_str(maybe_well: &str) -> Result<Self, Self::Err> {
        let mut chars = maybe_well.chars();
        let row = chars
            .next()
            .ok_or_else(|| WellNameError::InvalidFormat(maybe_well.to_string()))?;
        let column = chars
            .as_str()
            .parse::<u32>()
            .map_err(|_| WellNameError::InvalidFormat(maybe_well.to_string()))?;

        Self::new(row, column).map_err(|_| WellNameError::InvalidFormat(maybe_well.to_string()))
    }
}

impl Display for WellName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl PartialOrd for WellName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WellName {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.column, self.row).cmp(&(other.column, other.row))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WellNameError {
    #[error("Invalid well name format. Required format is a row letter followed by a column number, e.g. 'A1'. Input: '{0}'")]
    InvalidFormat(String),
    #[error("Invalid row letter. Required range is 'A'-'Z'. Input: '{0}'")]
    InvalidRow(char),
    #[error("Invalid column number. Columns are numbered from 1. Input: '{0}'")]
    InvalidColumn(u32),
}
