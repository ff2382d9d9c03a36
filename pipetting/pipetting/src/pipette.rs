use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

/// Number of tips a pipette picks up at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelCount {
    Single,
    Eight,
}

impl ChannelCount {
    pub fn tips(&self) -> u8 {
        match self {
            ChannelCount::Single => 1,
            ChannelCount::Eight => 8,
        }
    }
}

/// Pipette model identifier, e.g. `p300_multi`.
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
pub struct PipetteModel(String);

impl FromStr for PipetteModel {
    type Err = PipetteModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PipetteModel(s.to_string()))
    }
}

impl Display for PipetteModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for PipetteModel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Deref for PipetteModel {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Error)]
#[error("Pipette model error")]
pub struct PipetteModelError;

/// Capabilities of one pipette model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipetteSpec {
    pub channels: ChannelCount,
    /// Smallest volume the pipette handles accurately, in µL.
    pub min_volume: Decimal,
    /// Tip capacity, in µL.
    pub max_volume: Decimal,
}

/// Resolves a pipette model to its spec.
pub trait PipetteSpecLookup {
    fn pipette_spec(&self, model: &PipetteModel) -> Option<&PipetteSpec>;
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipetteCatalog {
    specs: IndexMap<PipetteModel, PipetteSpec>,
}

impl PipetteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(mut self, model: PipetteModel, spec: PipetteSpec) -> Self {
        self.specs.insert(model, spec);
        self
    }

    /// The stock single- and eight-channel models.
    pub fn standard() -> Self {
        Self::new()
            .with_spec("p10_single".into(), PipetteSpec {
                channels: ChannelCount::Single,
                min_volume: dec!(1),
                max_volume: dec!(10),
            })
            .with_spec("p10_multi".into(), PipetteSpec {
                channels: ChannelCount::Eight,
                min_volume: dec!(1),
                max_volume: dec!(10),
            })
            .with_spec("p50_single".into(), PipetteSpec {
                channels: ChannelCount::Single,
                min_volume: dec!(5),
                max_volume: dec!(50),
            })
            .with_spec("p50_multi".into(), PipetteSpec {
                channels: ChannelCount::Eight,
                min_volume: dec!(5),
                max_volume: dec!(50),
            })
            .with_spec("p300_single".into(), PipetteSpec {
                channels: ChannelCount::Single,
                min_volume: dec!(30),
                max_volume: dec!(300),
            })
            .with_spec("p300_multi".into(), PipetteSpec {
                channels: ChannelCount::Eight,
                min_volume: dec!(30),
                max_volume: dec!(300),
            })
            .with_spec("p1000_single".into(), PipetteSpec {
                channels: ChannelCount::Single,
                min_volume: dec!(100),
                max_volume: dec!(1000),
            })
    }
}

impl PipetteSpecLookup for PipetteCatalog {
    fn pipette_spec(&self, model: &PipetteModel) -> Option<&PipetteSpec> {
        self.specs.get(model)
    }
}
