use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::labware::LabwareKind;
use crate::pipette::{ChannelCount, PipetteModel, PipetteSpecLookup};

/// Identifies one pipette instance within a protocol.
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
pub struct PipetteId(String);

impl FromStr for PipetteId {
    type Err = PipetteIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PipetteId(s.to_string()))
    }
}

impl Display for PipetteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for PipetteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Deref for PipetteId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Error)]
#[error("Pipette id error")]
pub struct PipetteIdError;

/// Identifies one piece of labware on the deck.
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
pub struct LabwareId(String);

impl FromStr for LabwareId {
    type Err = LabwareIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LabwareId(s.to_string()))
    }
}

impl Display for LabwareId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for LabwareId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Deref for LabwareId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Error)]
#[error("Labware id error")]
pub struct LabwareIdError;

/// A pipette as the designer stores it, un-hydrated: only the model
/// reference, resolvable through a [`PipetteSpecLookup`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PipetteEntity {
    pub model: PipetteModel,
}

/// A piece of labware as the designer stores it, un-hydrated.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabwareEntity {
    pub kind: LabwareKind,
}

pub type PipetteEntities = IndexMap<PipetteId, PipetteEntity>;
pub type LabwareEntities = IndexMap<LabwareId, LabwareEntity>;

/// Channel count for a referenced pipette. `None` when the reference or its
/// spec does not resolve.
pub fn channels(
    pipette: Option<&PipetteId>,
    entities: &PipetteEntities,
    specs: &dyn PipetteSpecLookup,
) -> Option<ChannelCount> {
    let entity = entities.get(pipette?)?;
    specs
        .pipette_spec(&entity.model)
        .map(|spec| spec.channels)
}

/// Tip capacity for a referenced pipette, in µL.
pub fn pipette_capacity(
    pipette: Option<&PipetteId>,
    entities: &PipetteEntities,
    specs: &dyn PipetteSpecLookup,
) -> Option<Decimal> {
    let entity = entities.get(pipette?)?;
    specs
        .pipette_spec(&entity.model)
        .map(|spec| spec.max_volume)
}

/// Smallest accurately-handled volume for a referenced pipette, in µL.
pub fn pipette_min_volume(
    pipette: Option<&PipetteId>,
    entities: &PipetteEntities,
    specs: &dyn PipetteSpecLookup,
) -> Option<Decimal> {
    let entity = entities.get(pipette?)?;
    specs
        .pipette_spec(&entity.model)
        .map(|spec| spec.min_volume)
}
