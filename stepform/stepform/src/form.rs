use std::fmt::{Display, Formatter};
use std::str::FromStr;

use pipetting::{LabwareId, PipetteId, WellName};
use rust_decimal::Decimal;
use thiserror::Error;

/// Transfer execution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferPath {
    Single,
    MultiAspirate,
    MultiDispense,
}

impl Display for TransferPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferPath::Single => f.write_str("single"),
            TransferPath::MultiAspirate => f.write_str("multiAspirate"),
            TransferPath::MultiDispense => f.write_str("multiDispense"),
        }
    }
}

impl FromStr for TransferPath {
    type Err = TransferPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(TransferPath::Single),
            "multiAspirate" => Ok(TransferPath::MultiAspirate),
            "multiDispense" => Ok(TransferPath::MultiDispense),
            _ => Err(TransferPathError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown transfer path. Input: '{0}'")]
pub struct TransferPathError(String);

/// When the pipette exchanges its tip during a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeTip {
    Always,
    Once,
    Never,
    PerSource,
    PerDest,
}

impl Display for ChangeTip {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeTip::Always => f.write_str("always"),
            ChangeTip::Once => f.write_str("once"),
            ChangeTip::Never => f.write_str("never"),
            ChangeTip::PerSource => f.write_str("perSource"),
            ChangeTip::PerDest => f.write_str("perDest"),
        }
    }
}

impl FromStr for ChangeTip {
    type Err = ChangeTipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(ChangeTip::Always),
            "once" => Ok(ChangeTip::Once),
            "never" => Ok(ChangeTip::Never),
            "perSource" => Ok(ChangeTip::PerSource),
            "perDest" => Ok(ChangeTip::PerDest),
            _ => Err(ChangeTipError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown change-tip setting. Input: '{0}'")]
pub struct ChangeTipError(String);

/// Numeric text exactly as the user typed it into a form field.
///
/// The raw text is preserved so a value like `5.0` or a half-typed `5.` is
/// not rewritten under the user's cursor.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NumericInput(String);

impl NumericInput {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` while the user has typed only a bare decimal point.
    pub fn is_partial(&self) -> bool {
        self.0 == "."
    }

    /// The parsed value, `None` for empty or not-yet-numeric text.
    pub fn value(&self) -> Option<Decimal> {
        Decimal::from_str(self.0.trim()).ok()
    }
}

impl From<&str> for NumericInput {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        Self(value.normalize().to_string())
    }
}

impl Display for NumericInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// One liquid-transfer step as the designer stores it.
///
/// Well selections hold literal wells for a single-channel pipette and
/// primary wells for a multichannel one.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MoveLiquidForm {
    pub pipette: Option<PipetteId>,
    pub volume: Option<NumericInput>,

    pub aspirate_labware: Option<LabwareId>,
    pub aspirate_wells: Option<Vec<WellName>>,
    pub aspirate_flow_rate: Option<NumericInput>,
    pub aspirate_mix_volume: Option<NumericInput>,
    pub aspirate_mm_from_bottom: Option<NumericInput>,
    pub aspirate_touch_tip_mm_from_bottom: Option<NumericInput>,

    pub dispense_labware: Option<LabwareId>,
    pub dispense_wells: Option<Vec<WellName>>,
    pub dispense_flow_rate: Option<NumericInput>,
    pub dispense_mix_volume: Option<NumericInput>,
    pub dispense_mm_from_bottom: Option<NumericInput>,
    pub dispense_touch_tip_mm_from_bottom: Option<NumericInput>,

    pub path: Option<TransferPath>,
    pub change_tip: Option<ChangeTip>,

    pub disposal_volume_checkbox: bool,
    pub disposal_volume_volume: Option<NumericInput>,
}

impl Default for MoveLiquidForm {
    /// A freshly created step: plain transfer, tip changed on every
    /// aspiration, nothing selected yet.
    fn default() -> Self {
        Self {
            pipette: None,
            volume: None,
            aspirate_labware: None,
            aspirate_wells: None,
            aspirate_flow_rate: None,
            aspirate_mix_volume: None,
            aspirate_mm_from_bottom: None,
            aspirate_touch_tip_mm_from_bottom: None,
            dispense_labware: None,
            dispense_wells: None,
            dispense_flow_rate: None,
            dispense_mix_volume: None,
            dispense_mm_from_bottom: None,
            dispense_touch_tip_mm_from_bottom: None,
            path: Some(TransferPath::Single),
            change_tip: Some(ChangeTip::Always),
            disposal_volume_checkbox: false,
            disposal_volume_volume: None,
        }
    }
}
