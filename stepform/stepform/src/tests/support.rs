use indexmap::IndexMap;
use pipetting::{
    LabwareCatalog, LabwareEntities, LabwareEntity, PipetteCatalog, PipetteEntities, PipetteEntity, WellName,
};

use crate::form::MoveLiquidForm;

pub(crate) fn pipette_specs() -> PipetteCatalog {
    PipetteCatalog::standard()
}

pub(crate) fn labware_defs() -> LabwareCatalog {
    LabwareCatalog::standard()
}

/// `ghost` references a model no catalog knows.
pub(crate) fn pipette_entities() -> PipetteEntities {
    IndexMap::from([
        ("single_300".into(), PipetteEntity {
            model: "p300_single".into(),
        }),
        ("multi_300".into(), PipetteEntity {
            model: "p300_multi".into(),
        }),
        ("single_50".into(), PipetteEntity {
            model: "p50_single".into(),
        }),
        ("ghost".into(), PipetteEntity {
            model: "p0_prototype".into(),
        }),
    ])
}

pub(crate) fn labware_entities() -> LabwareEntities {
    IndexMap::from([
        ("source_plate".into(), LabwareEntity {
            kind: "plate_96_flat".into(),
        }),
        ("dest_plate".into(), LabwareEntity {
            kind: "plate_96_flat".into(),
        }),
        ("trough".into(), LabwareEntity {
            kind: "trough_12".into(),
        }),
    ])
}

pub(crate) fn wells(names: &[&str]) -> Vec<WellName> {
    names
        .iter()
        .map(|name| name.parse().unwrap())
        .collect()
}

/// A filled-in single-channel transfer: one source well to one destination
/// well across two 96-well plates.
pub(crate) fn form_with_selections() -> MoveLiquidForm {
    MoveLiquidForm {
        pipette: Some("single_300".into()),
        volume: Some("50".into()),
        aspirate_labware: Some("source_plate".into()),
        aspirate_wells: Some(wells(&["A1"])),
        dispense_labware: Some("dest_plate".into()),
        dispense_wells: Some(wells(&["B1"])),
        ..MoveLiquidForm::default()
    }
}
