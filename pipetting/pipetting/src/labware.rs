use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use indexmap::IndexMap;
use itertools::Itertools;
use thiserror::Error;

use crate::well::WellName;

/// Labware definition identifier, e.g. `plate_96_flat`.
#[derive(
    Debug,
    serde::Serialize,
    serde::Deserialize,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash
)]
pub struct LabwareKind(String);

impl FromStr for LabwareKind {
    type Err = LabwareKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LabwareKind(s.to_string()))
    }
}

impl Display for LabwareKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for LabwareKind {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Deref for LabwareKind {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Error)]
#[error("Labware kind error")]
pub struct LabwareKindError;

/// Well geometry for one kind of labware.
///
/// Wells are ordered column-major. `channel_groups` maps a primary well (the
/// well under the first tip of a multichannel pipette) to every well the
/// pipette occupies at once.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabwareDefinition {
    wells: Vec<WellName>,
    channel_groups: IndexMap<WellName, Vec<WellName>>,
}

impl LabwareDefinition {
    /// Builds a rows x columns grid.
    ///
    /// Multichannel groups depend on the row count: a single row (troughs)
    /// makes every well its own group, 8 rows make one group per column keyed
    /// at row A, 16 rows make two interleaved groups per column keyed at rows
    /// A and B. Other row counts are not reachable by an eight-channel
    /// pipette and get no groups.
    pub fn rectangular(rows: u32, columns: u32) -> Result<Self, LabwareDefinitionError> {
        if rows == 0 || rows > 26 {
            return Err(LabwareDefinitionError::UnsupportedRows(rows));
        }
        if columns == 0 {
            return Err(LabwareDefinitionError::UnsupportedColumns(columns));
        }

        let row_letter = |row_index: u32| char::from(b'A' + row_index as u8);
        let well = |row_index: u32, column: u32| {
            WellName::new(row_letter(row_index), column).expect("row and column ranges were validated")
        };

        let wells = (1..=columns)
            .cartesian_product(0..rows)
            .map(|(column, row_index)| well(row_index, column))
            .collect();

        let mut channel_groups = IndexMap::new();
        for column in 1..=columns {
            match rows {
                1 => {
                    channel_groups.insert(well(0, column), vec![well(0, column)]);
                }
                8 => {
                    let group = (0..rows)
                        .map(|row_index| well(row_index, column))
                        .collect();
                    channel_groups.insert(well(0, column), group);
                }
                16 => {
                    for offset in 0..2 {
                        let group = (0..8)
                            .map(|tip| well(tip * 2 + offset, column))
                            .collect();
                        channel_groups.insert(well(offset, column), group);
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            wells,
            channel_groups,
        })
    }

    pub fn wells(&self) -> &[WellName] {
        &self.wells
    }

    /// Wells an eight-channel pipette occupies when its first tip is in
    /// `primary`. `None` when `primary` is not a primary well of this
    /// geometry.
    pub fn channel_group(&self, primary: &WellName) -> Option<&[WellName]> {
        self.channel_groups
            .get(primary)
            .map(Vec::as_slice)
    }

    /// Expands a primary-well selection to every well actually touched.
    /// Primaries without a group contribute nothing.
    pub fn all_wells_from_primary_wells(&self, primary_wells: &[WellName]) -> Vec<WellName> {
        primary_wells
            .iter()
            .filter_map(|primary| self.channel_group(primary))
            .flatten()
            .cloned()
            .collect()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LabwareDefinitionError {
    #[error("Unsupported row count. Supported range is 1-26 rows. rows: {0}")]
    UnsupportedRows(u32),
    #[error("Unsupported column count. At least one column is required. columns: {0}")]
    UnsupportedColumns(u32),
}

/// Resolves a labware kind to its definition.
pub trait LabwareDefLookup {
    fn labware_definition(&self, kind: &LabwareKind) -> Option<&LabwareDefinition>;
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LabwareCatalog {
    definitions: IndexMap<LabwareKind, LabwareDefinition>,
}

impl LabwareCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definition(mut self, kind: LabwareKind, definition: LabwareDefinition) -> Self {
        self.definitions.insert(kind, definition);
        self
    }

    /// The stock plates, troughs and racks.
    pub fn standard() -> Self {
        let rectangular = |rows, columns| {
            LabwareDefinition::rectangular(rows, columns).expect("stock geometry is within the supported ranges")
        };

        Self::new()
            .with_definition("plate_96_flat".into(), rectangular(8, 12))
            .with_definition("plate_384_flat".into(), rectangular(16, 24))
            .with_definition("trough_12".into(), rectangular(1, 12))
            .with_definition("tuberack_24".into(), rectangular(4, 6))
    }
}

impl LabwareDefLookup for LabwareCatalog {
    fn labware_definition(&self, kind: &LabwareKind) -> Option<&LabwareDefinition> {
        self.definitions.get(kind)
    }
}
