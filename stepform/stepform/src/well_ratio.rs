use std::fmt::{Display, Formatter};

use pipetting::WellName;
use transitions::{DependentFieldUpdate, TransitionRule, TransitionTable};

use crate::form::{ChangeTip, TransferPath};

/// Shape of the aspirate-to-dispense well cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WellRatio {
    #[serde(rename = "n:n")]
    NToN,
    #[serde(rename = "1:many")]
    OneToMany,
    #[serde(rename = "many:1")]
    ManyToOne,
}

impl Display for WellRatio {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WellRatio::NToN => f.write_str("n:n"),
            WellRatio::OneToMany => f.write_str("1:many"),
            WellRatio::ManyToOne => f.write_str("many:1"),
        }
    }
}

/// Classifies a pair of well selections. `None` for shapes no transfer can
/// express (2:3, 0:1, missing selections, ...).
pub fn well_ratio(aspirate: Option<&[WellName]>, dispense: Option<&[WellName]>) -> Option<WellRatio> {
    let aspirate = aspirate?;
    let dispense = dispense?;
    if aspirate.is_empty() || dispense.is_empty() {
        return None;
    }

    match (aspirate.len(), dispense.len()) {
        (sources, destinations) if sources == destinations => Some(WellRatio::NToN),
        (1, _) => Some(WellRatio::OneToMany),
        (_, 1) => Some(WellRatio::ManyToOne),
        _ => None,
    }
}

/// Field slots the well-ratio transition table may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferSetting {
    ChangeTip,
    Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferSettingValue {
    ChangeTip(ChangeTip),
    Path(TransferPath),
}

pub type WellRatioTransitions = TransitionTable<WellRatio, TransferSetting, TransferSettingValue>;

fn change_tip_reset(prev: ChangeTip) -> DependentFieldUpdate<TransferSetting, TransferSettingValue> {
    DependentFieldUpdate {
        field: TransferSetting::ChangeTip,
        prev_value: TransferSettingValue::ChangeTip(prev),
        next_value: TransferSettingValue::ChangeTip(ChangeTip::Always),
    }
}

fn path_reset(prev: TransferPath) -> DependentFieldUpdate<TransferSetting, TransferSettingValue> {
    DependentFieldUpdate {
        field: TransferSetting::Path,
        prev_value: TransferSettingValue::Path(prev),
        next_value: TransferSettingValue::Path(TransferPath::Single),
    }
}

/// Overrides applied when the well ratio moves between valid shapes.
///
/// Per-side tip exchange only makes sense while the matching side has many
/// wells, and each multi path needs its one-to-many (or many-to-one) shape.
pub fn well_ratio_transitions() -> WellRatioTransitions {
    TransitionTable::new(vec![
        TransitionRule {
            prev_value: WellRatio::NToN,
            next_value: WellRatio::OneToMany,
            dependent_fields: vec![
                change_tip_reset(ChangeTip::PerSource),
                change_tip_reset(ChangeTip::PerDest),
            ],
        },
        TransitionRule {
            prev_value: WellRatio::NToN,
            next_value: WellRatio::ManyToOne,
            // every setting stays legal
            dependent_fields: vec![],
        },
        TransitionRule {
            prev_value: WellRatio::OneToMany,
            next_value: WellRatio::NToN,
            dependent_fields: vec![
                change_tip_reset(ChangeTip::PerSource),
                change_tip_reset(ChangeTip::PerDest),
                path_reset(TransferPath::MultiDispense),
            ],
        },
        TransitionRule {
            prev_value: WellRatio::OneToMany,
            next_value: WellRatio::ManyToOne,
            dependent_fields: vec![
                change_tip_reset(ChangeTip::PerSource),
                change_tip_reset(ChangeTip::PerDest),
                path_reset(TransferPath::MultiDispense),
            ],
        },
        TransitionRule {
            prev_value: WellRatio::ManyToOne,
            next_value: WellRatio::NToN,
            dependent_fields: vec![path_reset(TransferPath::MultiAspirate)],
        },
        TransitionRule {
            prev_value: WellRatio::ManyToOne,
            next_value: WellRatio::OneToMany,
            dependent_fields: vec![
                change_tip_reset(ChangeTip::PerSource),
                path_reset(TransferPath::MultiAspirate),
            ],
        },
    ])
}
